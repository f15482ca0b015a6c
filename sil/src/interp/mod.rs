//! Interpreter
//!
//! The [`Interpreter`] is the whole evaluation context: the identifier
//! arena, the per-namespace scopes, the output stream and the extension
//! loader. Independent interpreters share nothing.

mod builtins;
mod error;
mod eval;
mod loader;
mod scope;
mod tree;

pub use builtins::{Builtin, INDEX_OPERATOR};
pub use error::{ErrorKind, InterpResult, RuntimeError};
pub use loader::{
    DylibLoader, ENTRY_SYMBOL, EntryPoint, MODULE_PATH_VAR, ModuleLoader, ModuleRegistry,
    RawEntryPoint,
};
pub use scope::{DEFAULT_NAMESPACE, ScopeState, Scopes};
pub use tree::{ExprNode, LeafNode, TreeNode};

use crate::ast::{Expression, Statement};
use crate::ident::{Arena, Callable, Handle, Identifier, NativeFn};
use std::io::{self, Write};
use std::rc::Rc;

/// Evaluation context
pub struct Interpreter {
    arena: Arena,
    scopes: Scopes,
    out: Box<dyn Write>,
    // dropped last: native functions may point into loaded libraries
    loader: Box<dyn ModuleLoader>,
}

impl Interpreter {
    /// Interpreter writing to stdout, loading extensions from shared
    /// libraries found through `SIL_MODULE_PATH`
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }

    pub fn with_output(out: impl Write + 'static) -> Self {
        let mut interp = Interpreter {
            arena: Arena::new(),
            scopes: Scopes::new(),
            out: Box::new(out),
            loader: Box::new(DylibLoader::from_env()),
        };
        builtins::install(&mut interp);
        interp
    }

    pub fn with_loader(mut self, loader: impl ModuleLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    /// Parse source text; literals and names become arena slots
    pub fn parse(&mut self, source: &str) -> crate::Result<Statement> {
        crate::parser::parse(source, &mut self.arena)
    }

    /// Parse and run source text as one block
    pub fn run_str(&mut self, source: &str) -> crate::Result<()> {
        let root = self.parse(source)?;
        self.run(&root)?;
        Ok(())
    }

    /// Parse and run source text in the current scope
    pub fn run_str_toplevel(&mut self, source: &str) -> crate::Result<()> {
        let root = self.parse(source)?;
        self.run_toplevel(&root)?;
        Ok(())
    }

    /// Resolve a name, binding it as undefined in the current scope if
    /// nothing visible declares it
    pub fn ident_of(&mut self, name: &str) -> InterpResult<Handle> {
        self.scopes.resolve(&mut self.arena, name)
    }

    /// Declare `ident` under its surface name in the current scope
    pub fn declare_identifier(&mut self, ident: Identifier) -> InterpResult<Handle> {
        let name = ident.surface().to_string();
        self.scopes
            .declare(&mut self.arena, ident)?
            .ok_or_else(|| RuntimeError::redefinition(&name))
    }

    /// Declare a native function in the current scope
    pub fn register_function<F>(&mut self, name: &str, infix: bool, f: F) -> InterpResult<Handle>
    where
        F: Fn(&mut Interpreter, &[Expression]) -> InterpResult<Vec<Handle>> + 'static,
    {
        let native: NativeFn = Rc::new(f);
        let ty = crate::ident::types::ANY;
        self.declare_identifier(Identifier::function(name, ty, infix, Callable::Native(native)))
    }

    /// Declare a named constant in the current scope
    pub fn register_constant(&mut self, name: &str, value: Identifier) -> InterpResult<Handle> {
        self.declare_identifier(value.with_surface(name))
    }

    /// Bind unconditionally in the current scope
    fn define(&mut self, ident: Identifier) -> Handle {
        let name = ident.surface().to_string();
        let handle = self.arena.push(ident.with_scope(self.scopes.depth()));
        self.scopes.bind(&name, handle);
        handle
    }

    /// Store an unnamed identifier owned by the current scope
    pub fn push_identifier(&mut self, ident: Identifier) -> Handle {
        let handle = self.arena.push(ident);
        self.scopes.adopt(handle);
        handle
    }

    pub fn identifier(&self, handle: Handle) -> InterpResult<&Identifier> {
        self.arena.get(handle)
    }

    pub fn identifier_mut(&mut self, handle: Handle) -> InterpResult<&mut Identifier> {
        self.arena.get_mut(handle)
    }

    pub fn current_namespace(&self) -> &str {
        self.scopes.namespace()
    }

    pub fn depth(&self) -> usize {
        self.scopes.depth()
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    fn write_output(&mut self, text: &str) -> InterpResult<()> {
        self.out.write_all(text.as_bytes())?;
        Ok(())
    }

    fn flush_output(&mut self) -> InterpResult<()> {
        self.out.flush()?;
        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
