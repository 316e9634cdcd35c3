/// Serialize any AST or result type to pretty-printed JSON.
///
/// Thin wrapper kept as the single place that chooses the output format for
/// dump tooling and snapshot tests.
pub fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}
