/// RACF command abstract syntax tree types.
pub mod ast;
/// Re-exports from the diagnostics crate.
pub mod diag;
/// JSON serialization helpers for the AST.
pub mod dump;
/// RACF lexer — splits raw input into logical statements of tokens.
pub mod lexer;
/// RACF parser — converts statements into an AST using the grammar schema.
pub mod parser;
