//! Bump-allocated arena backing every parsed value tree.
//!
//! Design: a single parse call allocates every [`Value`](crate::value::Value)
//! and every synthesized byte slice (decoded strings, text blocks, namespaced
//! keys) from one [`Arena`]. The arena is freed as a unit when the owning
//! [`Document`](crate::parser::Document) is dropped; there is no
//! per-node deallocation.
//!
//! The underlying bump allocator is [`bumpalo::Bump`], which already
//! implements the "first block small, later blocks double up to a cap"
//! growth policy this crate wants — the same choice the `cem3` runtime
//! makes for its per-thread value arena. This module adds a thin
//! fallible-allocation surface on top so allocator exhaustion becomes
//! [`Error::OutOfMemory`](crate::error::Error::OutOfMemory) instead of a
//! panic.

use std::alloc::Layout;
use std::mem::MaybeUninit;

use bumpalo::Bump;

use crate::error::{Error, ParseError};

/// A bump-allocated region owning every value produced by one parse.
///
/// `Arena` is deliberately not `Sync`: exactly one parse borrows it at a
/// time. `bumpalo::Bump` itself allocates through
/// `&self` via interior mutability, so no extra locking is needed here —
/// only single-threaded *use* is assumed, not enforced.
pub struct Arena {
    bump: Bump,
}

impl Arena {
    /// Creates a new, empty arena with the allocator's default initial
    /// block size.
    pub fn new() -> Self {
        Self { bump: Bump::new() }
    }

    /// Creates a new arena whose first block is pre-sized to `bytes`, to
    /// amortize growth when the input size is known up front.
    pub fn with_capacity(bytes: usize) -> Self {
        Self { bump: Bump::with_capacity(bytes) }
    }

    /// Allocates `value`, moving it into the arena and returning a
    /// reference whose lifetime is tied to the arena.
    pub fn alloc_value<T>(&self, value: T) -> Result<&T, ParseError> {
        let layout = Layout::new::<T>();
        let ptr = self
            .bump
            .try_alloc_layout(layout)
            .map_err(|_| ParseError::without_span(Error::OutOfMemory))?;
        let typed = ptr.cast::<T>();
        // Safety: `ptr` points to `size_of::<T>()` freshly allocated,
        // correctly aligned, arena-owned bytes that nothing else observes
        // yet; writing `value` into it and reborrowing for the arena's
        // lifetime is the same pattern `Bump::alloc` applies internally.
        unsafe {
            typed.as_ptr().write(value);
            Ok(&*typed.as_ptr())
        }
    }

    /// Allocates a copy of `bytes` into the arena and returns a slice
    /// reference into it.
    pub fn alloc_bytes(&self, bytes: &[u8]) -> Result<&[u8], ParseError> {
        self.alloc_slice(bytes)
    }

    /// Allocates a copy of `s` into the arena and returns a `str` slice
    /// reference into it (used for decoded strings and text blocks).
    pub fn alloc_str(&self, s: &str) -> Result<&str, ParseError> {
        let bytes = self.alloc_bytes(s.as_bytes())?;
        // Safety: `bytes` is a verbatim copy of a valid `&str`'s bytes.
        Ok(unsafe { std::str::from_utf8_unchecked(bytes) })
    }

    /// Allocates `items` into a single contiguous arena-owned slice.
    pub fn alloc_slice<T: Copy>(&self, items: &[T]) -> Result<&[T], ParseError> {
        if items.is_empty() {
            return Ok(&[]);
        }
        let layout = Layout::array::<T>(items.len())
            .map_err(|_| ParseError::without_span(Error::OutOfMemory))?;
        let ptr = self
            .bump
            .try_alloc_layout(layout)
            .map_err(|_| ParseError::without_span(Error::OutOfMemory))?;
        let dest = ptr.cast::<MaybeUninit<T>>();
        // Safety: `dest` points to `items.len()` elements of freshly
        // allocated, correctly aligned, arena-owned memory.
        unsafe {
            let dest_slice = std::slice::from_raw_parts_mut(dest.as_ptr(), items.len());
            for (slot, item) in dest_slice.iter_mut().zip(items) {
                slot.write(*item);
            }
            Ok(std::slice::from_raw_parts(dest.as_ptr().cast::<T>(), items.len()))
        }
    }

    /// Total bytes currently allocated from this arena, across all blocks.
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
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

    #[test]
    fn allocates_values() {
        let arena = Arena::new();
        let a = arena.alloc_value(42i64).unwrap();
        let b = arena.alloc_value(43i64).unwrap();
        assert_eq!(*a, 42);
        assert_eq!(*b, 43);
    }

    #[test]
    fn allocates_bytes_and_str() {
        let arena = Arena::new();
        let bytes = arena.alloc_bytes(b"hello").unwrap();
        assert_eq!(bytes, b"hello");
        let s = arena.alloc_str("world").unwrap();
        assert_eq!(s, "world");
    }

    #[test]
    fn allocates_slices() {
        let arena = Arena::new();
        let nums = [1i32, 2, 3, 4];
        let slice = arena.alloc_slice(&nums).unwrap();
        assert_eq!(slice, &[1, 2, 3, 4]);
    }

    #[test]
    fn grows_across_many_allocations() {
        let arena = Arena::new();
        for i in 0..10_000i64 {
            arena.alloc_value(i).unwrap();
        }
        assert!(arena.allocated_bytes() > 0);
    }

    #[test]
    fn empty_slice_allocation_is_free() {
        let arena = Arena::new();
        let empty: &[u8] = arena.alloc_bytes(&[]).unwrap();
        assert!(empty.is_empty());
    }
}
