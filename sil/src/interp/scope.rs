//! Per-namespace lexical scopes
//!
//! Every namespace owns a stack of frames, one per block depth; frame 0 is
//! the namespace's global scope and is never popped. A frame maps names to
//! arena handles and also owns the temporaries produced while it was the
//! innermost frame. Leaving a block destroys everything its frame owns.

use super::error::{InterpResult, RuntimeError};
use crate::ident::{Arena, Handle, Identifier};
use std::collections::HashMap;

/// Name of the namespace programs run in
pub const DEFAULT_NAMESPACE: &str = "";

#[derive(Debug, Default)]
struct Frame {
    names: HashMap<String, Handle>,
    temporaries: Vec<Handle>,
}

impl Frame {
    fn handles(self) -> impl Iterator<Item = Handle> {
        self.names.into_values().chain(self.temporaries)
    }
}

/// Which namespace and depth lookups currently run against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeState {
    namespace: String,
    depth: usize,
    visible: usize,
}

/// Scope resolver
#[derive(Debug)]
pub struct Scopes {
    namespaces: HashMap<String, Vec<Frame>>,
    namespace: String,
    /// Index of the innermost frame of the current namespace
    depth: usize,
    /// How many frames, counted outward from `depth`, unqualified lookup sees
    visible: usize,
}

impl Scopes {
    pub fn new() -> Self {
        let mut namespaces = HashMap::new();
        namespaces.insert(DEFAULT_NAMESPACE.to_string(), vec![Frame::default()]);
        Scopes {
            namespaces,
            namespace: DEFAULT_NAMESPACE.to_string(),
            depth: 0,
            visible: 1,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn frames_mut(&mut self) -> &mut Vec<Frame> {
        self.namespaces.entry(self.namespace.clone()).or_default()
    }

    fn current_frame(&mut self) -> &mut Frame {
        let depth = self.depth;
        let frames = self.frames_mut();
        if frames.len() <= depth {
            frames.resize_with(depth + 1, Frame::default);
        }
        &mut frames[depth]
    }

    /// Open a block scope
    pub fn enter(&mut self) {
        self.frames_mut().push(Frame::default());
        self.depth += 1;
        self.visible += 1;
        tracing::trace!(namespace = %self.namespace, depth = self.depth, "enter scope");
    }

    /// Close the innermost block scope, destroying every handle it owns.
    ///
    /// The global frame is never popped. Every handle is destroyed even if
    /// one of them fails; the first failure is reported.
    pub fn leave(&mut self, arena: &mut Arena) -> InterpResult<()> {
        if self.depth == 0 {
            return Ok(());
        }
        let frame = self.frames_mut().pop().unwrap_or_default();
        self.depth -= 1;
        self.visible = self.visible.saturating_sub(1).max(1);
        tracing::trace!(namespace = %self.namespace, depth = self.depth, "leave scope");

        let mut first_error = None;
        for handle in frame.handles() {
            if let Err(e) = arena.destroy(handle) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Resolve a name to a handle.
    ///
    /// Unqualified names are looked up outward through the visible frames.
    /// `ns.name` looks only in the global frame of namespace `ns`. A miss
    /// binds a fresh undefined identifier in the frame the lookup started
    /// from, so the first reference to a name creates its binding.
    pub fn resolve(&mut self, arena: &mut Arena, name: &str) -> InterpResult<Handle> {
        if let Some((namespace, member)) = name.split_once('.') {
            let frames = self
                .namespaces
                .get_mut(namespace)
                .ok_or_else(|| RuntimeError::unknown_namespace(namespace))?;
            if frames.is_empty() {
                frames.push(Frame::default());
            }
            let global = &mut frames[0];
            if let Some(&handle) = global.names.get(member) {
                return Ok(handle);
            }
            let handle = arena.push(Identifier::new().with_surface(member));
            global.names.insert(member.to_string(), handle);
            return Ok(handle);
        }

        if let Some(handle) = self.lookup(name) {
            return Ok(handle);
        }
        let depth = self.depth;
        let handle = arena.push(Identifier::new().with_surface(name).with_scope(depth));
        self.current_frame().names.insert(name.to_string(), handle);
        Ok(handle)
    }

    /// Look a name up without binding it on a miss
    pub fn lookup(&self, name: &str) -> Option<Handle> {
        let frames = self.namespaces.get(&self.namespace)?;
        let innermost = self.depth.min(frames.len().checked_sub(1)?);
        let outermost = (innermost + 1).saturating_sub(self.visible);
        frames[outermost..=innermost]
            .iter()
            .rev()
            .find_map(|frame| frame.names.get(name).copied())
    }

    /// Bind `ident` under its surface name in the innermost frame.
    ///
    /// An undefined binding of the same name is upgraded in place and keeps
    /// its handle. Returns `None` if the frame already holds a real binding.
    pub fn declare(&mut self, arena: &mut Arena, ident: Identifier) -> InterpResult<Option<Handle>> {
        let depth = self.depth;
        let ident = ident.with_scope(depth);
        let name = ident.surface().to_string();
        let frame = self.current_frame();
        match frame.names.get(&name).copied() {
            Some(handle) if arena.get(handle)?.is_undefined() => {
                arena.replace(handle, ident)?;
                Ok(Some(handle))
            }
            Some(_) => {
                tracing::debug!(name = %name, depth, "refusing redefinition");
                Ok(None)
            }
            None => {
                let handle = arena.push(ident);
                frame.names.insert(name, handle);
                Ok(Some(handle))
            }
        }
    }

    /// Bind `name` in the innermost frame, replacing any previous binding
    pub fn bind(&mut self, name: &str, handle: Handle) {
        self.current_frame().names.insert(name.to_string(), handle);
    }

    /// Hand an unnamed identifier to the innermost frame so it is destroyed
    /// with it
    pub fn adopt(&mut self, handle: Handle) {
        self.current_frame().temporaries.push(handle);
    }

    /// Make `namespace` current at its global depth, creating it if needed.
    /// Returns the state to hand back to [`Scopes::restore`].
    pub fn switch_namespace(&mut self, namespace: &str) -> ScopeState {
        let saved = ScopeState {
            namespace: std::mem::replace(&mut self.namespace, namespace.to_string()),
            depth: self.depth,
            visible: self.visible,
        };
        self.namespaces
            .entry(namespace.to_string())
            .or_insert_with(|| vec![Frame::default()]);
        self.depth = 0;
        self.visible = 1;
        tracing::trace!(from = %saved.namespace, to = %namespace, "switch namespace");
        saved
    }

    pub fn restore(&mut self, state: ScopeState) {
        self.namespace = state.namespace;
        self.depth = state.depth;
        self.visible = state.visible;
    }
}

impl Default for Scopes {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::types;

    fn int_var(name: &str) -> Identifier {
        Identifier::new().with_surface(name).into_variable(types::INT, 0)
    }

    #[test]
    fn test_miss_binds_undefined_at_current_depth() {
        let mut arena = Arena::new();
        let mut scopes = Scopes::new();
        scopes.enter();
        let h = scopes.resolve(&mut arena, "x").unwrap();
        let ident = arena.get(h).unwrap();
        assert!(ident.is_undefined());
        assert_eq!(ident.surface(), "x");
        assert_eq!(ident.scope(), 1);
        assert_eq!(scopes.resolve(&mut arena, "x").unwrap(), h);
    }

    #[test]
    fn test_outer_names_visible_inside() {
        let mut arena = Arena::new();
        let mut scopes = Scopes::new();
        let outer = scopes.declare(&mut arena, int_var("x")).unwrap().unwrap();
        scopes.enter();
        scopes.enter();
        assert_eq!(scopes.lookup("x"), Some(outer));
        assert_eq!(scopes.resolve(&mut arena, "x").unwrap(), outer);
    }

    #[test]
    fn test_leave_destroys_frame() {
        let mut arena = Arena::new();
        let mut scopes = Scopes::new();
        scopes.enter();
        let inner = scopes.declare(&mut arena, int_var("y")).unwrap().unwrap();
        scopes.leave(&mut arena).unwrap();
        assert_eq!(scopes.depth(), 0);
        assert!(arena.get(inner).is_err());
        assert_eq!(scopes.lookup("y"), None);
    }

    #[test]
    fn test_leave_global_is_noop() {
        let mut arena = Arena::new();
        let mut scopes = Scopes::new();
        let h = scopes.declare(&mut arena, int_var("g")).unwrap().unwrap();
        scopes.leave(&mut arena).unwrap();
        assert!(arena.get(h).is_ok());
    }

    #[test]
    fn test_declare_upgrades_undefined_in_place() {
        let mut arena = Arena::new();
        let mut scopes = Scopes::new();
        let h = scopes.resolve(&mut arena, "x").unwrap();
        let declared = scopes.declare(&mut arena, int_var("x")).unwrap();
        assert_eq!(declared, Some(h));
        assert!(arena.get(h).unwrap().is_variable());
    }

    #[test]
    fn test_redefinition_refused() {
        let mut arena = Arena::new();
        let mut scopes = Scopes::new();
        assert!(scopes.declare(&mut arena, int_var("x")).unwrap().is_some());
        assert!(scopes.declare(&mut arena, int_var("x")).unwrap().is_none());
    }

    #[test]
    fn test_shadowing_in_nested_scope() {
        let mut arena = Arena::new();
        let mut scopes = Scopes::new();
        let outer = scopes.declare(&mut arena, int_var("x")).unwrap().unwrap();
        scopes.enter();
        let inner = scopes.declare(&mut arena, int_var("x")).unwrap().unwrap();
        assert_ne!(outer, inner);
        assert_eq!(arena.get(inner).unwrap().scope(), 1);
        scopes.leave(&mut arena).unwrap();
        assert_eq!(scopes.lookup("x"), Some(outer));
    }

    #[test]
    fn test_temporaries_die_with_frame() {
        let mut arena = Arena::new();
        let mut scopes = Scopes::new();
        scopes.enter();
        let tmp = arena.push(Identifier::int(3));
        scopes.adopt(tmp);
        scopes.leave(&mut arena).unwrap();
        assert!(arena.get(tmp).is_err());
    }

    #[test]
    fn test_qualified_lookup() {
        let mut arena = Arena::new();
        let mut scopes = Scopes::new();
        let saved = scopes.switch_namespace("m");
        assert_eq!(scopes.namespace(), "m");
        let pi = scopes
            .declare(&mut arena, Identifier::double(3.25).with_surface("pi"))
            .unwrap()
            .unwrap();
        scopes.restore(saved);
        assert_eq!(scopes.namespace(), DEFAULT_NAMESPACE);
        assert_eq!(scopes.resolve(&mut arena, "m.pi").unwrap(), pi);
        assert_eq!(scopes.lookup("pi"), None);
    }

    #[test]
    fn test_unknown_namespace() {
        let mut arena = Arena::new();
        let mut scopes = Scopes::new();
        let err = scopes.resolve(&mut arena, "nowhere.x").unwrap_err();
        assert_eq!(err.kind, crate::interp::ErrorKind::UnknownNamespace);
    }

    #[test]
    fn test_switch_restores_depth() {
        let mut scopes = Scopes::new();
        scopes.enter();
        scopes.enter();
        let saved = scopes.switch_namespace("lib");
        assert_eq!(scopes.depth(), 0);
        scopes.restore(saved);
        assert_eq!(scopes.depth(), 2);
    }
}
