//! Mica — an embeddable interpreter for a small dynamically typed
//! scripting language: scanner + lexer, Pratt parser, and an AST-walking
//! evaluator over a chain of environment frames.
//!
//! See `DESIGN.md` for the design notes.

pub mod ast;
pub mod builtins;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod scanner;
pub mod value;

pub use ast::{program_to_string, Expr, Stmt};
pub use error::{Error, Result};
pub use interpreter::Interpreter;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::parse;
pub use value::{BuiltinFn, Value};
