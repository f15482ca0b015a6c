//! SIL interpreter library
//!
//! A small scripting language: whitespace-separated words, infix operators
//! without precedence, lexically scoped declarations, block control flow,
//! and extensions loaded from shared libraries.

pub mod ast;
pub mod error;
pub mod ident;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod repl;

pub use ast::{Expression, Span, Statement};
pub use error::{Result, SilError};
pub use ident::{Handle, Identifier};
pub use interp::Interpreter;
