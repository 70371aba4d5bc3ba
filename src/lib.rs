// HypeScript Interpreter Library
//
// Lexer, parser and tree-walking interpreter for HypeScript, a small
// dynamically-typed C-like scripting language with transliterated Russian
// keywords.

// Public modules
pub mod ast;
pub mod builtins;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod runner;
pub mod value;

// Re-export commonly used items
pub use ast::{Expr, Program, Stmt};
pub use environment::{Environment, FunctionTable, ScopeId};
pub use error::{Diagnostic, RunError, Span};
pub use interpreter::Interpreter;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;
pub use value::Value;

// Re-export main functions
pub use runner::{run, run_file, run_with_io};
