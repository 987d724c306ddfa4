//! Tagged-literal resolution: given a tag name and its already-parsed
//! wrapped value, decides the final `Value` per the registry and
//! unknown-tag policy.

use crate::arena::Arena;
use crate::error::{Error, ParseError, Span};
use crate::registry::{Registry, UnknownTagMode};
use crate::value::{TaggedRef, Value, Variant};

/// Resolves `#tag wrapped` to its final value.
///
/// `in_discard` suppresses reader invocation entirely (readers must not run
/// inside a discarded `#_` subtree, since their side effects would
/// otherwise be observable even though the value itself is thrown away);
/// while discarding, every tag is treated as `Passthrough` regardless of
/// the configured registry or unknown-tag mode.
pub fn resolve_tagged<'a>(
    tag: &'a [u8],
    wrapped: &'a Value<'a>,
    arena: &'a Arena,
    registry: Option<&Registry>,
    unknown_mode: UnknownTagMode,
    in_discard: bool,
    span: Span,
) -> Result<&'a Value<'a>, ParseError> {
    if in_discard {
        return passthrough(tag, wrapped, arena);
    }

    if let Some(reader) = registry.and_then(|r| r.get(tag)) {
        return reader(wrapped, arena).map_err(|msg| ParseError::new(Error::ReaderError(msg), span));
    }

    match unknown_mode {
        UnknownTagMode::Passthrough => passthrough(tag, wrapped, arena),
        UnknownTagMode::Unwrap => Ok(wrapped),
        UnknownTagMode::Error => Err(ParseError::new(Error::UnknownTag(String::from_utf8_lossy(tag).into_owned()), span)),
    }
}

fn passthrough<'a>(tag: &'a [u8], wrapped: &'a Value<'a>, arena: &'a Arena) -> Result<&'a Value<'a>, ParseError> {
    arena.alloc_value(Value::new(arena, Variant::Tagged(TaggedRef { tag, value: wrapped })))
}
