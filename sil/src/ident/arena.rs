//! Identifier arena
//!
//! Every identifier lives in a slot addressed by a [`Handle`]. Freed slots
//! go on a LIFO free list and are reused before the arena grows. Slot 0 is
//! a permanent invalid sentinel.
//!
//! Each slot also carries a generation that is bumped on destroy, so a
//! handle minted before a slot was recycled no longer dereferences.

use super::Identifier;
use crate::interp::{InterpResult, RuntimeError};
use std::fmt;

/// Stable reference to an arena slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    /// The sentinel slot; never dereferences
    pub const INVALID: Handle = Handle {
        index: 0,
        generation: 0,
    };

    pub const fn from_raw(index: u32, generation: u32) -> Self {
        Handle { index, generation }
    }

    pub const fn index(self) -> usize {
        self.index as usize
    }

    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index)
    }
}

#[derive(Debug)]
struct Slot {
    ident: Identifier,
    generation: u32,
}

/// Growable slot store with free-list reuse
#[derive(Debug)]
pub struct Arena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl Arena {
    pub fn new() -> Self {
        Arena {
            slots: vec![Slot {
                ident: Identifier::invalid(),
                generation: 0,
            }],
            free: Vec::new(),
        }
    }

    /// Store an identifier, reusing the most recently freed slot if any
    pub fn push(&mut self, ident: Identifier) -> Handle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.ident = ident;
            tracing::trace!(index, generation = slot.generation, "reusing arena slot");
            return Handle::from_raw(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            ident,
            generation: 0,
        });
        Handle::from_raw(index, 0)
    }

    fn slot(&self, handle: Handle) -> InterpResult<&Slot> {
        match self.slots.get(handle.index()) {
            Some(slot) if slot.generation == handle.generation && !slot.ident.is_invalid() => {
                Ok(slot)
            }
            _ => Err(RuntimeError::invalid_reference(handle)),
        }
    }

    fn slot_mut(&mut self, handle: Handle) -> InterpResult<&mut Slot> {
        match self.slots.get_mut(handle.index()) {
            Some(slot) if slot.generation == handle.generation && !slot.ident.is_invalid() => {
                Ok(slot)
            }
            _ => Err(RuntimeError::invalid_reference(handle)),
        }
    }

    pub fn get(&self, handle: Handle) -> InterpResult<&Identifier> {
        self.slot(handle).map(|slot| &slot.ident)
    }

    pub fn get_mut(&mut self, handle: Handle) -> InterpResult<&mut Identifier> {
        self.slot_mut(handle).map(|slot| &mut slot.ident)
    }

    /// Overwrite a live slot in place; the handle stays valid
    pub fn replace(&mut self, handle: Handle, ident: Identifier) -> InterpResult<()> {
        self.slot_mut(handle)?.ident = ident;
        Ok(())
    }

    /// Invalidate a slot and return it to the free list
    pub fn destroy(&mut self, handle: Handle) -> InterpResult<()> {
        let slot = self.slot_mut(handle)?;
        slot.ident = Identifier::invalid();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        Ok(())
    }

    /// Number of slots, including the sentinel and freed ones
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots currently holding a usable identifier
    pub fn live(&self) -> usize {
        self.slots.len() - 1 - self.free.len()
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::ErrorKind;

    #[test]
    fn test_sentinel_never_dereferences() {
        let mut arena = Arena::new();
        assert!(arena.get(Handle::INVALID).is_err());
        assert!(arena.destroy(Handle::INVALID).is_err());
        let h = arena.push(Identifier::from_text("a"));
        assert_eq!(h.index(), 1);
    }

    #[test]
    fn test_out_of_range() {
        let mut arena = Arena::new();
        let bogus = Handle::from_raw(42, 0);
        let err = arena.get(bogus).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidReference);
        assert!(arena.destroy(bogus).is_err());
    }

    #[test]
    fn test_destroy_then_get_fails() {
        let mut arena = Arena::new();
        let h = arena.push(Identifier::from_text("x"));
        arena.destroy(h).unwrap();
        assert!(arena.get(h).is_err());
        assert!(arena.destroy(h).is_err());
    }

    #[test]
    fn test_lifo_reuse() {
        let mut arena = Arena::new();
        let a = arena.push(Identifier::from_text("a"));
        let b = arena.push(Identifier::from_text("b"));
        arena.destroy(a).unwrap();
        arena.destroy(b).unwrap();
        let c = arena.push(Identifier::from_text("c"));
        assert_eq!(c.index(), b.index());
        let d = arena.push(Identifier::from_text("d"));
        assert_eq!(d.index(), a.index());
        assert_eq!(arena.capacity(), 3);
    }

    #[test]
    fn test_stale_handle_after_reuse() {
        let mut arena = Arena::new();
        let old = arena.push(Identifier::from_text("old"));
        arena.destroy(old).unwrap();
        let new = arena.push(Identifier::from_text("new"));
        assert_eq!(old.index(), new.index());
        assert!(arena.get(old).is_err());
        assert_eq!(arena.get(new).unwrap().surface(), "new");
    }

    #[test]
    fn test_replace_keeps_handle() {
        let mut arena = Arena::new();
        let h = arena.push(Identifier::from_text("x"));
        arena.replace(h, Identifier::from_text("y")).unwrap();
        assert_eq!(arena.get(h).unwrap().surface(), "y");
        assert_eq!(arena.live(), 1);
    }
}
