//! Runtime errors for the interpreter

use crate::ident::Handle;
use std::fmt;

/// Runtime error during evaluation
#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Kinds of runtime errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Handle out of range, destroyed, or recycled
    InvalidReference,
    /// Declaration right side is not exactly one type
    TypeArity,
    /// Declaration right side is not a type name
    NotAType,
    /// Declaration target is not a name
    InvalidTarget,
    /// Name already bound in the target scope
    Redefinition,
    /// Vectorized operands of different lengths
    LengthMismatch,
    /// Extension module could not be opened
    ModuleOpen,
    /// Extension module lacks its entry point
    ModuleSymbol,
    /// Non-numeric text cast to a number
    NumericCast,
    /// Integer division by zero
    DivisionByZero,
    /// Assignment to something that is not a variable
    AssignTarget,
    /// Qualified name refers to a namespace nobody created
    UnknownNamespace,
    /// Block condition did not yield exactly one value
    Condition,
    /// Callee is not a function
    NotCallable,
    /// Output stream failure
    IoError,
}

impl RuntimeError {
    fn new(kind: ErrorKind, message: String) -> Self {
        RuntimeError { kind, message }
    }

    pub fn invalid_reference(handle: Handle) -> Self {
        Self::new(
            ErrorKind::InvalidReference,
            format!("invalid identifier referenced (id {handle})"),
        )
    }

    pub fn type_arity(got: usize) -> Self {
        Self::new(
            ErrorKind::TypeArity,
            format!("declaration expects exactly one type, got {got}"),
        )
    }

    pub fn not_a_type(name: &str) -> Self {
        Self::new(ErrorKind::NotAType, format!("'{name}' is not a type"))
    }

    pub fn invalid_target(what: &str) -> Self {
        Self::new(
            ErrorKind::InvalidTarget,
            format!("cannot declare {what} as a variable"),
        )
    }

    pub fn redefinition(name: &str) -> Self {
        Self::new(
            ErrorKind::Redefinition,
            format!("redefinition of '{name}' not supported"),
        )
    }

    pub fn length_mismatch(left: usize, right: usize) -> Self {
        Self::new(
            ErrorKind::LengthMismatch,
            format!("lvalue count {left} not equal to rvalue count {right}"),
        )
    }

    pub fn module_open(path: &str, diagnostic: &str) -> Self {
        Self::new(
            ErrorKind::ModuleOpen,
            format!("library file '{path}' couldn't open\n{diagnostic}"),
        )
    }

    pub fn module_symbol(symbol: &str, diagnostic: &str) -> Self {
        Self::new(
            ErrorKind::ModuleSymbol,
            format!("library function '{symbol}' couldn't load\n{diagnostic}"),
        )
    }

    pub fn numeric_cast(text: &str, to: &str) -> Self {
        Self::new(
            ErrorKind::NumericCast,
            format!("cannot cast {text:?} to {to}"),
        )
    }

    pub fn division_by_zero() -> Self {
        Self::new(ErrorKind::DivisionByZero, "division by zero".to_string())
    }

    pub fn assign_target(name: &str, what: &str) -> Self {
        Self::new(
            ErrorKind::AssignTarget,
            format!("cannot assign to {what} '{name}'"),
        )
    }

    pub fn unknown_namespace(namespace: &str) -> Self {
        Self::new(
            ErrorKind::UnknownNamespace,
            format!("unknown namespace '{namespace}'"),
        )
    }

    pub fn condition(got: usize) -> Self {
        Self::new(
            ErrorKind::Condition,
            format!("condition must yield exactly one value, got {got}"),
        )
    }

    pub fn else_without_if() -> Self {
        Self::new(
            ErrorKind::Condition,
            "'else' without a preceding 'if'".to_string(),
        )
    }

    pub fn not_callable(name: &str) -> Self {
        Self::new(ErrorKind::NotCallable, format!("'{name}' is not callable"))
    }

    pub fn io_error(msg: &str) -> Self {
        Self::new(ErrorKind::IoError, format!("IO error: {msg}"))
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Runtime error: {}", self.message)
    }
}

impl std::error::Error for RuntimeError {}

impl From<std::io::Error> for RuntimeError {
    fn from(e: std::io::Error) -> Self {
        RuntimeError::io_error(&e.to_string())
    }
}

/// Result type for interpreter operations
pub type InterpResult<T> = Result<T, RuntimeError>;
