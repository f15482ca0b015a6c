//! Extension modules
//!
//! `include path as alias` opens a module through the interpreter's
//! [`ModuleLoader`] and calls its entry point with the interpreter and the
//! `include` call's operands. While the entry point runs, the current
//! namespace is `alias` at its global depth, so everything the module
//! declares lands there and is reachable as `alias.name`.

use super::Interpreter;
use super::error::{InterpResult, RuntimeError};
use crate::ast::Expression;
use libloading::Library;
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Name of the symbol every dynamic extension exports
pub const ENTRY_SYMBOL: &str = "sil_load_lib";

/// Environment variable listing extra module directories
pub const MODULE_PATH_VAR: &str = "SIL_MODULE_PATH";

/// Registration callback of an opened module
pub type EntryPoint = Rc<dyn Fn(&mut Interpreter, &[Expression]) -> InterpResult<()>>;

/// C signature of [`ENTRY_SYMBOL`]: interpreter, operand array, operand count
#[allow(improper_ctypes_definitions)]
pub type RawEntryPoint = unsafe extern "C" fn(*mut Interpreter, *const Expression, usize);

/// Capability to turn a module path into its entry point
pub trait ModuleLoader {
    fn open(&mut self, path: &str) -> InterpResult<EntryPoint>;
}

/// Loads extensions as platform shared libraries
#[derive(Debug, Default)]
pub struct DylibLoader {
    search_dirs: Vec<PathBuf>,
    libraries: HashMap<PathBuf, Library>,
}

impl DylibLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search directories taken from `SIL_MODULE_PATH`
    pub fn from_env() -> Self {
        let search_dirs = env::var_os(MODULE_PATH_VAR)
            .map(|paths| env::split_paths(&paths).collect())
            .unwrap_or_default();
        DylibLoader {
            search_dirs,
            libraries: HashMap::new(),
        }
    }

    /// `path` plus the platform library suffix, found in the first search
    /// directory that has it, else taken as given
    pub fn locate(&self, path: &str) -> PathBuf {
        let file = format!("{path}{}", env::consts::DLL_SUFFIX);
        self.search_dirs
            .iter()
            .map(|dir| dir.join(&file))
            .find(|candidate| candidate.is_file())
            .unwrap_or_else(|| PathBuf::from(file))
    }

    fn library(&mut self, file: &Path) -> InterpResult<&Library> {
        if !self.libraries.contains_key(file) {
            // SAFETY: running a library's initialisers is inherent to
            // loading extensions; the library stays loaded until the
            // loader is dropped.
            let library = unsafe { Library::new(file) }.map_err(|e| {
                RuntimeError::module_open(&file.display().to_string(), &e.to_string())
            })?;
            tracing::debug!(file = %file.display(), "opened extension library");
            self.libraries.insert(file.to_path_buf(), library);
        }
        self.libraries
            .get(file)
            .ok_or_else(|| RuntimeError::module_open(&file.display().to_string(), "not cached"))
    }
}

impl ModuleLoader for DylibLoader {
    fn open(&mut self, path: &str) -> InterpResult<EntryPoint> {
        let file = self.locate(path);
        let library = self.library(&file)?;
        // SAFETY: extensions export `sil_load_lib` with the `RawEntryPoint`
        // signature. The pointer is only called while `self.libraries`
        // keeps the library mapped.
        let entry: RawEntryPoint = unsafe { library.get::<RawEntryPoint>(ENTRY_SYMBOL.as_bytes()) }
            .map(|symbol| *symbol)
            .map_err(|e| RuntimeError::module_symbol(ENTRY_SYMBOL, &e.to_string()))?;

        Ok(Rc::new(move |interp: &mut Interpreter, args: &[Expression]| {
            // SAFETY: both pointers are valid for the duration of the call.
            unsafe { entry(interp, args.as_ptr(), args.len()) };
            Ok(())
        }))
    }
}

/// In-process modules, keyed by path
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, EntryPoint>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(mut self, path: &str, entry: F) -> Self
    where
        F: Fn(&mut Interpreter, &[Expression]) -> InterpResult<()> + 'static,
    {
        self.modules.insert(path.to_string(), Rc::new(entry));
        self
    }
}

impl ModuleLoader for ModuleRegistry {
    fn open(&mut self, path: &str) -> InterpResult<EntryPoint> {
        self.modules
            .get(path)
            .cloned()
            .ok_or_else(|| RuntimeError::module_open(path, "no module registered under this path"))
    }
}

impl Interpreter {
    /// Open `path` and run its entry point with `alias` as the current
    /// namespace. The previous namespace and depth come back afterwards,
    /// whether or not the entry point succeeded.
    pub fn include_module(&mut self, path: &str, alias: &str, args: &[Expression]) -> InterpResult<()> {
        let entry = self.loader.open(path)?;
        tracing::debug!(path, alias, "including module");
        let saved = self.scopes.switch_namespace(alias);
        let result = entry(self, args);
        self.scopes.restore(saved);
        result
    }
}
