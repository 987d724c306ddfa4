//! Metadata reader (optional, `metadata` feature): `^meta form` accumulation
//! with shape-dependent synthesis and innermost-wins merge across multiple
//! prefixes.

use crate::arena::Arena;
use crate::error::{Error, ParseError, Span};
use crate::value::{SymbolRef, Value, Variant};

/// Converts one `^meta` prefix's already-parsed value into the map it
/// contributes, per its shape:
/// - Map → used directly.
/// - Keyword `k` → `{k true}`.
/// - String or Symbol `s` → `{:tag s}`.
/// - Vector `v` → `{:param-tags v}`.
///
/// Anything else is `InvalidSyntax`.
pub fn metadata_shape_to_map<'a>(meta: &'a Value<'a>, arena: &'a Arena, span: Span) -> Result<&'a Value<'a>, ParseError> {
    match meta.variant() {
        Variant::Map(_) => Ok(meta),
        Variant::Keyword(_) => {
            let true_val = arena.alloc_value(Value::new(arena, Variant::Bool(true)))?;
            single_entry_map(arena, meta, true_val)
        }
        Variant::String(_) | Variant::Symbol(_) => {
            let tag_key = keyword(arena, b"tag")?;
            single_entry_map(arena, tag_key, meta)
        }
        Variant::Vector(_) => {
            let param_tags_key = keyword(arena, b"param-tags")?;
            single_entry_map(arena, param_tags_key, meta)
        }
        _ => Err(ParseError::new(
            Error::InvalidSyntax("metadata must be a map, keyword, string, symbol, or vector".into()),
            span,
        )),
    }
}

/// Merges metadata maps from multiple stacked `^` prefixes, with the
/// right-most (innermost, i.e. closest to the annotated form) prefix
/// winning key conflicts. `prefixes` is ordered outermost-first, matching
/// source order (`^a ^b form` parses `a` before `b`); `b`, having been
/// written closer to `form`, must win.
pub fn merge_metadata<'a>(prefixes: &[&'a Value<'a>], arena: &'a Arena) -> Result<&'a Value<'a>, ParseError> {
    debug_assert!(!prefixes.is_empty());
    if prefixes.len() == 1 {
        return Ok(prefixes[0]);
    }
    let mut merged: Vec<(&'a Value<'a>, &'a Value<'a>)> = Vec::new();
    for map in prefixes {
        let entries = map.map_entries().expect("metadata_shape_to_map always yields a Map");
        for &(k, v) in entries {
            if let Some(existing) = merged.iter_mut().find(|(ek, _)| crate::identity::value_equal(ek, k)) {
                existing.1 = v;
            } else {
                merged.push((k, v));
            }
        }
    }
    let slice = arena.alloc_slice(&merged)?;
    arena.alloc_value(Value::new(arena, Variant::Map(slice)))
}

/// True for the value shapes metadata is permitted to attach to:
/// List/Vector/Set/Map/Tagged/Symbol.
pub fn can_carry_metadata(value: &Value<'_>) -> bool {
    matches!(
        value.variant(),
        Variant::List(_) | Variant::Vector(_) | Variant::Set(_) | Variant::Map(_) | Variant::Tagged(_) | Variant::Symbol(_)
    )
}

fn keyword<'a>(arena: &'a Arena, name: &'static [u8]) -> Result<&'a Value<'a>, ParseError> {
    arena.alloc_value(Value::new(arena, Variant::Keyword(SymbolRef::unqualified(name))))
}

fn single_entry_map<'a>(arena: &'a Arena, key: &'a Value<'a>, value: &'a Value<'a>) -> Result<&'a Value<'a>, ParseError> {
    let entries = arena.alloc_slice(&[(key, value)])?;
    arena.alloc_value(Value::new(arena, Variant::Map(entries)))
}
