//! List/vector/set/map builders: small-object inline accumulation before
//! arena promotion, plus the sort-then-scan uniqueness checks sets and
//! maps require.
//!
//! Each builder uses a `smallvec` with 8 inline slots — the "small-object
//! optimization" — so that typical short collections
//! never touch the heap before their contents are copied into the arena as
//! one contiguous slice.

use smallvec::SmallVec;

use crate::arena::Arena;
use crate::error::{Error, ParseError, Span};
use crate::identity::{value_compare, value_equal};
use crate::value::Value;

const INLINE_CAPACITY: usize = 8;

/// Accumulates parsed elements for a List, Vector, or Set.
pub struct ElementBuilder<'a> {
    items: SmallVec<[&'a Value<'a>; INLINE_CAPACITY]>,
}

impl<'a> ElementBuilder<'a> {
    pub fn new() -> Self {
        Self { items: SmallVec::new() }
    }

    pub fn push(&mut self, value: &'a Value<'a>) {
        self.items.push(value);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Finalizes a List or Vector: no uniqueness constraint, items keep
    /// their parse order.
    pub fn finish_ordered(self, arena: &'a Arena) -> Result<&'a [&'a Value<'a>], ParseError> {
        arena.alloc_slice(&self.items)
    }

    /// Finalizes a Set: sorts a scratch copy by the total order and scans
    /// for adjacent structural duplicates, then allocates the
    /// parse-order slice (Set element order is otherwise unspecified, but
    /// preserving parse order rather than the sorted order avoids
    /// surprising callers who iterate `set_elements`).
    pub fn finish_set(self, arena: &'a Arena, span: Span) -> Result<&'a [&'a Value<'a>], ParseError> {
        check_no_duplicates(&self.items, span, Error::DuplicateElement)?;
        arena.alloc_slice(&self.items)
    }
}

impl Default for ElementBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Accumulates parsed key/value entries for a Map.
pub struct EntryBuilder<'a> {
    entries: SmallVec<[(&'a Value<'a>, &'a Value<'a>); INLINE_CAPACITY]>,
}

impl<'a> EntryBuilder<'a> {
    pub fn new() -> Self {
        Self { entries: SmallVec::new() }
    }

    pub fn push(&mut self, key: &'a Value<'a>, value: &'a Value<'a>) {
        self.entries.push((key, value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Finalizes a Map: checks key uniqueness, then allocates the
    /// insertion-ordered entry slice (`map_entries` is documented as
    /// insertion-order).
    pub fn finish(self, arena: &'a Arena, span: Span) -> Result<&'a [(&'a Value<'a>, &'a Value<'a>)], ParseError> {
        let keys: SmallVec<[&'a Value<'a>; INLINE_CAPACITY]> = self.entries.iter().map(|(k, _)| *k).collect();
        check_no_duplicates(&keys, span, Error::DuplicateKey)?;
        arena.alloc_slice(&self.entries)
    }

    /// Rewrites every entry whose key is an *unqualified* Keyword or Symbol
    /// to be namespaced under `ns`, for the `#:ns{...}` extension
    /// Qualified keys and non-symbolic keys pass
    /// through unchanged.
    #[cfg(feature = "namespaced-maps")]
    pub fn namespace_unqualified_keys(&mut self, ns: &'a [u8], arena: &'a Arena) -> Result<(), ParseError> {
        use crate::value::{SymbolRef, Variant};

        for (key, _) in self.entries.iter_mut() {
            let namespaced_variant = match key.variant() {
                Variant::Keyword(s) if !s.is_qualified() => Some(Variant::Keyword(SymbolRef::qualified(ns, s.name))),
                Variant::Symbol(s) if !s.is_qualified() => Some(Variant::Symbol(SymbolRef::qualified(ns, s.name))),
                _ => None,
            };
            if let Some(variant) = namespaced_variant {
                *key = arena.alloc_value(Value::new(arena, variant))?;
            }
        }
        Ok(())
    }
}

impl Default for EntryBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Sorts a scratch copy of `items` by the total order and scans adjacent
/// pairs for structural equality, reporting `kind` (DuplicateElement or
/// DuplicateKey) on the first collision found.
///
/// Sorting first turns the general O(n²) membership problem into an O(n log
/// n) one while still only requiring `value_compare` to be a *consistent*
/// total order (pointer-fallback ordering for collections is sufficient for
/// exactly this purpose).
fn check_no_duplicates<'a>(items: &[&'a Value<'a>], span: Span, kind: Error) -> Result<(), ParseError> {
    if items.len() < 2 {
        return Ok(());
    }
    let mut order: SmallVec<[&'a Value<'a>; INLINE_CAPACITY]> = items.iter().copied().collect();
    order.sort_by(|a, b| value_compare(a, b));
    for pair in order.windows(2) {
        if value_equal(pair[0], pair[1]) {
            return Err(ParseError::new(kind, span));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Variant;

    fn val<'a>(arena: &'a Arena, n: i64) -> &'a Value<'a> {
        arena.alloc_value(Value::new(arena, Variant::Int(n))).unwrap()
    }

    #[test]
    fn ordered_collection_preserves_parse_order() {
        let arena = Arena::new();
        let mut b = ElementBuilder::new();
        b.push(val(&arena, 3));
        b.push(val(&arena, 1));
        b.push(val(&arena, 2));
        let items = b.finish_ordered(&arena).unwrap();
        let nums: Vec<i64> = items.iter().map(|v| v.int_get().unwrap()).collect();
        assert_eq!(nums, vec![3, 1, 2]);
    }

    #[test]
    fn set_rejects_duplicate_elements() {
        let arena = Arena::new();
        let mut b = ElementBuilder::new();
        b.push(val(&arena, 1));
        b.push(val(&arena, 2));
        b.push(val(&arena, 2));
        let err = b.finish_set(&arena, Span::point(0)).unwrap_err();
        assert!(matches!(err.kind(), Error::DuplicateElement));
    }

    #[test]
    fn set_accepts_unique_elements_in_parse_order() {
        let arena = Arena::new();
        let mut b = ElementBuilder::new();
        b.push(val(&arena, 1));
        b.push(val(&arena, 2));
        b.push(val(&arena, 3));
        let items = b.finish_set(&arena, Span::point(0)).unwrap();
        let nums: Vec<i64> = items.iter().map(|v| v.int_get().unwrap()).collect();
        assert_eq!(nums, vec![1, 2, 3]);
    }

    #[test]
    fn map_rejects_duplicate_keys() {
        let arena = Arena::new();
        let mut b = EntryBuilder::new();
        b.push(val(&arena, 1), val(&arena, 10));
        b.push(val(&arena, 1), val(&arena, 20));
        let err = b.finish(&arena, Span::point(0)).unwrap_err();
        assert!(matches!(err.kind(), Error::DuplicateKey));
    }

    #[test]
    fn map_preserves_insertion_order() {
        let arena = Arena::new();
        let mut b = EntryBuilder::new();
        b.push(val(&arena, 2), val(&arena, 20));
        b.push(val(&arena, 1), val(&arena, 10));
        let entries = b.finish(&arena, Span::point(0)).unwrap();
        let keys: Vec<i64> = entries.iter().map(|(k, _)| k.int_get().unwrap()).collect();
        assert_eq!(keys, vec![2, 1]);
    }

    #[test]
    fn large_set_beyond_inline_capacity_still_catches_duplicates() {
        let arena = Arena::new();
        let mut b = ElementBuilder::new();
        for i in 0..20 {
            b.push(val(&arena, i));
        }
        b.push(val(&arena, 5));
        let err = b.finish_set(&arena, Span::point(0)).unwrap_err();
        assert!(matches!(err.kind(), Error::DuplicateElement));
    }
}
