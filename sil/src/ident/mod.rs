//! Identifier model
//!
//! Everything the interpreter manipulates is an [`Identifier`]: literals,
//! declared variables, type names, builtins, and names nobody has declared
//! yet. Identifiers live in the [`Arena`] and are referenced by [`Handle`].

mod arena;
mod ops;

pub use arena::{Arena, Handle};
pub use ops::{ArithOp, CmpOp, LogicOp, format_double};

use crate::ast::Expression;
use crate::interp::{Builtin, InterpResult, Interpreter};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Built-in type names
pub mod types {
    pub const INT: &str = "int";
    pub const DOUBLE: &str = "double";
    pub const BOOL: &str = "bool";
    pub const STRING: &str = "string";
    pub const ARRAY: &str = "array";
    pub const MAP: &str = "map";
    /// Declared type of every type-name identifier
    pub const TYPE: &str = "type";
    pub const VOID: &str = "void";
    pub const ANY: &str = "any";
    pub const UNDEFINED: &str = "undefined";
}

use types::*;

/// What kind of entity an identifier is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Definition {
    Control,
    Function,
    Variable,
    Constant,
    TypeName,
    Undefined,
    Invalid,
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Definition::Control => "control",
            Definition::Function => "function",
            Definition::Variable => "variable",
            Definition::Constant => "constant",
            Definition::TypeName => "typeName",
            Definition::Undefined => "undefined",
            Definition::Invalid => "invalid",
        };
        f.write_str(name)
    }
}

/// Host- or extension-provided function body.
///
/// Receives the operands exactly as the evaluator collected them; element 0
/// is always the callee itself.
pub type NativeFn = Rc<dyn Fn(&mut Interpreter, &[Expression]) -> InterpResult<Vec<Handle>>>;

/// Something an identifier can invoke
#[derive(Clone)]
pub enum Callable {
    Builtin(Builtin),
    Native(NativeFn),
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Builtin(b) => write!(f, "Builtin({b:?})"),
            Callable::Native(_) => f.write_str("Native(..)"),
        }
    }
}

/// Identifier payload
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    None,
    Int(i64),
    Double(f64),
    Bool(bool),
    Str(String),
    Callable(Callable),
    Array(Vec<Handle>),
    Map(HashMap<String, Handle>),
}

impl Value {
    /// The value a freshly declared variable of `ty` starts with
    pub fn zero(ty: &str) -> Value {
        match ty {
            INT => Value::Int(0),
            DOUBLE => Value::Double(0.0),
            BOOL => Value::Bool(false),
            STRING => Value::Str(String::new()),
            ARRAY => Value::Array(Vec::new()),
            MAP => Value::Map(HashMap::new()),
            _ => Value::None,
        }
    }
}

/// A named or literal entity
#[derive(Debug, Clone)]
pub struct Identifier {
    surface: String,
    def: Definition,
    ty: String,
    scope: usize,
    infix: bool,
    value: Value,
}

impl Default for Identifier {
    fn default() -> Self {
        Identifier {
            surface: String::new(),
            def: Definition::Undefined,
            ty: UNDEFINED.to_string(),
            scope: 0,
            infix: false,
            value: Value::None,
        }
    }
}

impl Identifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalid() -> Self {
        Identifier::new().with_def(Definition::Invalid)
    }

    /// Build an identifier from an unquoted word.
    ///
    /// Numeric words become `int` (when integral) or `double` constants;
    /// anything else is kept as an undefined name to be resolved later.
    pub fn from_text(text: &str) -> Self {
        if let Ok(n) = text.parse::<i64>() {
            return Identifier::int(n);
        }
        match parse_number(text) {
            Some(n) if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 => {
                Identifier::int(n as i64)
            }
            Some(n) => Identifier::double(n),
            None => Identifier::new().with_surface(text),
        }
    }

    pub fn constant(ty: &str, value: Value) -> Self {
        Identifier::new()
            .with_def(Definition::Constant)
            .with_type(ty)
            .with_value(value)
    }

    pub fn int(v: i64) -> Self {
        Self::constant(INT, Value::Int(v))
    }

    pub fn double(v: f64) -> Self {
        Self::constant(DOUBLE, Value::Double(v))
    }

    pub fn boolean(v: bool) -> Self {
        Self::constant(BOOL, Value::Bool(v))
    }

    pub fn string(v: impl Into<String>) -> Self {
        Self::constant(STRING, Value::Str(v.into()))
    }

    pub fn type_name(name: &str) -> Self {
        Identifier::new()
            .with_surface(name)
            .with_def(Definition::TypeName)
            .with_type(TYPE)
    }

    pub fn function(name: &str, ty: &str, infix: bool, callable: Callable) -> Self {
        Identifier::new()
            .with_surface(name)
            .with_def(Definition::Function)
            .with_type(ty)
            .with_infix(infix)
            .with_value(Value::Callable(callable))
    }

    pub fn with_surface(mut self, surface: impl Into<String>) -> Self {
        self.surface = surface.into();
        self
    }

    pub fn with_def(mut self, def: Definition) -> Self {
        self.def = def;
        self
    }

    pub fn with_type(mut self, ty: impl Into<String>) -> Self {
        self.ty = ty.into();
        self
    }

    pub fn with_scope(mut self, scope: usize) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_infix(mut self, infix: bool) -> Self {
        self.infix = infix;
        self
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = value;
        self
    }

    /// Turn this identifier into a variable of `ty` declared at `scope`,
    /// starting from the type's zero value
    pub fn into_variable(self, ty: &str, scope: usize) -> Self {
        self.with_def(Definition::Variable)
            .with_type(ty)
            .with_scope(scope)
            .with_value(Value::zero(ty))
    }

    pub fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    pub fn surface(&self) -> &str {
        &self.surface
    }

    pub fn def(&self) -> Definition {
        self.def
    }

    pub fn ty(&self) -> &str {
        &self.ty
    }

    pub fn scope(&self) -> usize {
        self.scope
    }

    pub fn is_infix(&self) -> bool {
        self.infix
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn callable(&self) -> Option<&Callable> {
        match &self.value {
            Value::Callable(c) => Some(c),
            _ => None,
        }
    }

    /// The builtin this identifier stands for, if any
    pub fn builtin(&self) -> Option<Builtin> {
        match self.callable() {
            Some(Callable::Builtin(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn is_control(&self) -> bool {
        self.def == Definition::Control
    }

    pub fn is_function(&self) -> bool {
        self.def == Definition::Function
    }

    pub fn is_variable(&self) -> bool {
        self.def == Definition::Variable
    }

    pub fn is_constant(&self) -> bool {
        self.def == Definition::Constant
    }

    pub fn is_type(&self) -> bool {
        self.def == Definition::TypeName
    }

    pub fn is_undefined(&self) -> bool {
        self.def == Definition::Undefined
    }

    pub fn is_invalid(&self) -> bool {
        self.def == Definition::Invalid
    }
}

/// Parse a word as a number. Only words that look numeric qualify, so
/// names like `inf` or `nan` stay names.
fn parse_number(text: &str) -> Option<f64> {
    let mut chars = text.chars();
    let lead = match chars.next()? {
        '+' | '-' => chars.next()?,
        c => c,
    };
    if !(lead.is_ascii_digit() || lead == '.') {
        return None;
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}
