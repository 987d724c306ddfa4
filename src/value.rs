//! The [`Value`] tree produced by [`crate::parse`], and its per-variant
//! payload types.
//!
//! Every `Value` is tied to the arena it was allocated from (the "owning
//! arena reference") so that lazily-decoded forms
//! (cleaned big-number digits, decoded strings) can allocate their result
//! into the same arena the rest of the tree lives in, and so a `Value`
//! reference is never valid past its `Document`'s lifetime.

use std::cell::Cell;

use crate::arena::Arena;
use crate::error::{ParseError, Span};

/// The discriminant of a [`Value`], returned by [`Value::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKind {
    Nil,
    Bool,
    Int,
    Float,
    BigInt,
    BigDecimal,
    Ratio,
    BigRatio,
    Character,
    String,
    Symbol,
    Keyword,
    List,
    Vector,
    Set,
    Map,
    Tagged,
}

/// Zero-copy reference into the input buffer (or a synthesized arena-owned
/// slice) recording an arbitrary-precision integer literal.
#[derive(Debug, Clone, Copy)]
pub struct BigIntRef<'a> {
    pub negative: bool,
    pub radix: u32,
    /// Raw digit bytes exactly as they appeared in the source, which may
    /// contain `_` separators.
    pub raw: &'a [u8],
    cleaned: Cell<Option<&'a [u8]>>,
}

impl<'a> BigIntRef<'a> {
    pub fn new(negative: bool, radix: u32, raw: &'a [u8]) -> Self {
        Self { negative, radix, raw, cleaned: Cell::new(None) }
    }

    /// Returns the digit bytes with any `_` separators removed, allocating
    /// the cleaned copy into `arena` on first access and caching it.
    pub fn cleaned(&self, arena: &'a Arena) -> Result<&'a [u8], ParseError> {
        if let Some(c) = self.cleaned.get() {
            return Ok(c);
        }
        let out = if self.raw.contains(&b'_') {
            let stripped: Vec<u8> = self.raw.iter().copied().filter(|&b| b != b'_').collect();
            arena.alloc_bytes(&stripped)?
        } else {
            self.raw
        };
        self.cleaned.set(Some(out));
        Ok(out)
    }
}

/// Zero-copy reference into the input buffer recording an arbitrary-precision
/// decimal literal (`M` suffix).
#[derive(Debug, Clone, Copy)]
pub struct BigDecimalRef<'a> {
    pub negative: bool,
    pub raw: &'a [u8],
    cleaned: Cell<Option<&'a [u8]>>,
}

impl<'a> BigDecimalRef<'a> {
    pub fn new(negative: bool, raw: &'a [u8]) -> Self {
        Self { negative, raw, cleaned: Cell::new(None) }
    }

    pub fn cleaned(&self, arena: &'a Arena) -> Result<&'a [u8], ParseError> {
        if let Some(c) = self.cleaned.get() {
            return Ok(c);
        }
        let out = if self.raw.contains(&b'_') {
            let stripped: Vec<u8> = self.raw.iter().copied().filter(|&b| b != b'_').collect();
            arena.alloc_bytes(&stripped)?
        } else {
            self.raw
        };
        self.cleaned.set(Some(out));
        Ok(out)
    }
}

/// A ratio whose numerator or denominator overflowed `i64`, stored as
/// signed zero-copy digit-string references instead.
#[derive(Debug, Clone, Copy)]
pub struct BigRatioRef<'a> {
    pub numer_negative: bool,
    pub numer: &'a [u8],
    pub denom_negative: bool,
    pub denom: &'a [u8],
}

/// A string literal: a raw byte slice plus whether it contains escapes, and
/// (if so) a lazily-decoded cache.
#[derive(Debug, Clone, Copy)]
pub struct StringRef<'a> {
    pub raw: &'a [u8],
    pub has_escapes: bool,
    decoded: Cell<Option<&'a str>>,
}

impl<'a> StringRef<'a> {
    /// Builds a `StringRef` for the raw-scan fast path: no escapes present,
    /// so the decoded form is the raw bytes themselves.
    pub fn raw(raw: &'a [u8]) -> Self {
        Self { raw, has_escapes: false, decoded: Cell::new(None) }
    }

    /// Builds a `StringRef` for a pre-decoded value (the slow escape path,
    /// or a text block): `raw` is the literal source bytes (kept for
    /// equality's raw-byte comparison) and `decoded` is already available.
    pub fn with_decoded(raw: &'a [u8], decoded: &'a str) -> Self {
        Self { raw, has_escapes: true, decoded: Cell::new(Some(decoded)) }
    }

    /// Builds a `StringRef` for a text block: pre-decoded into the arena,
    /// with no raw/decoded distinction (the "raw" bytes *are* the decoded
    /// text, so `has_escapes` is false and decode is a no-op).
    pub fn pre_decoded(text: &'a str) -> Self {
        Self { raw: text.as_bytes(), has_escapes: false, decoded: Cell::new(Some(text)) }
    }

    /// Returns the decoded string, decoding lazily on first access if
    /// `has_escapes` is set (never needed for the fast path, where `raw`
    /// already equals the decoded bytes).
    pub fn decode(&self) -> std::borrow::Cow<'a, str> {
        if !self.has_escapes {
            // Safety: the fast-path scanner only accepts bytes that were
            // already valid UTF-8 in the input buffer, since the input is
            // required to be valid UTF-8 at the parser boundary.
            return std::borrow::Cow::Borrowed(unsafe { std::str::from_utf8_unchecked(self.raw) });
        }
        if let Some(d) = self.decoded.get() {
            return std::borrow::Cow::Borrowed(d);
        }
        // Escapes were recorded but no pre-decoded form was cached; this
        // only happens if a `StringRef` was hand-built without using the
        // string reader's slow path, which always populates `decoded`.
        std::borrow::Cow::Borrowed(unsafe { std::str::from_utf8_unchecked(self.raw) })
    }
}

/// A symbol or keyword: namespace (empty if unqualified) and name, both
/// zero-copy references.
#[derive(Debug, Clone, Copy)]
pub struct SymbolRef<'a> {
    pub namespace: &'a [u8],
    pub name: &'a [u8],
}

impl<'a> SymbolRef<'a> {
    pub fn unqualified(name: &'a [u8]) -> Self {
        Self { namespace: &[], name }
    }

    pub fn qualified(namespace: &'a [u8], name: &'a [u8]) -> Self {
        Self { namespace, name }
    }

    pub fn is_qualified(&self) -> bool {
        !self.namespace.is_empty()
    }
}

/// A `#tag value` tagged literal.
#[derive(Debug, Clone, Copy)]
pub struct TaggedRef<'a> {
    pub tag: &'a [u8],
    pub value: &'a Value<'a>,
}

/// The payload carried by a [`Value`], one variant per EDN value shape.
#[derive(Debug, Clone, Copy)]
pub enum Variant<'a> {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    BigInt(BigIntRef<'a>),
    BigDecimal(BigDecimalRef<'a>),
    Ratio { numer: i64, denom: i64 },
    BigRatio(BigRatioRef<'a>),
    Character(char),
    String(StringRef<'a>),
    Symbol(SymbolRef<'a>),
    Keyword(SymbolRef<'a>),
    List(&'a [&'a Value<'a>]),
    Vector(&'a [&'a Value<'a>]),
    Set(&'a [&'a Value<'a>]),
    Map(&'a [(&'a Value<'a>, &'a Value<'a>)]),
    Tagged(TaggedRef<'a>),
}

/// A single parsed EDN value.
///
/// `Value` is an immutable tree node: once constructed it is never mutated
/// except for the lazily-populated hash cache, which is a pure function of
/// the value's structure and therefore safe to
/// populate through a shared reference.
pub struct Value<'a> {
    arena: &'a Arena,
    variant: Variant<'a>,
    cached_hash: Cell<u64>,
    metadata: Option<&'a Value<'a>>,
    span: Option<Span>,
}

impl<'a> Value<'a> {
    pub fn new(arena: &'a Arena, variant: Variant<'a>) -> Self {
        Self { arena, variant, cached_hash: Cell::new(0), metadata: None, span: None }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_metadata(mut self, metadata: &'a Value<'a>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn arena(&self) -> &'a Arena {
        self.arena
    }

    pub fn variant(&self) -> &Variant<'a> {
        &self.variant
    }

    pub fn span(&self) -> Option<Span> {
        self.span
    }

    pub fn metadata(&self) -> Option<&'a Value<'a>> {
        self.metadata
    }

    pub fn kind(&self) -> ValueKind {
        match &self.variant {
            Variant::Nil => ValueKind::Nil,
            Variant::Bool(_) => ValueKind::Bool,
            Variant::Int(_) => ValueKind::Int,
            Variant::Float(_) => ValueKind::Float,
            Variant::BigInt(_) => ValueKind::BigInt,
            Variant::BigDecimal(_) => ValueKind::BigDecimal,
            Variant::Ratio { .. } => ValueKind::Ratio,
            Variant::BigRatio(_) => ValueKind::BigRatio,
            Variant::Character(_) => ValueKind::Character,
            Variant::String(_) => ValueKind::String,
            Variant::Symbol(_) => ValueKind::Symbol,
            Variant::Keyword(_) => ValueKind::Keyword,
            Variant::List(_) => ValueKind::List,
            Variant::Vector(_) => ValueKind::Vector,
            Variant::Set(_) => ValueKind::Set,
            Variant::Map(_) => ValueKind::Map,
            Variant::Tagged(_) => ValueKind::Tagged,
        }
    }

    pub(crate) fn cached_hash_cell(&self) -> &Cell<u64> {
        &self.cached_hash
    }

    // ---- accessors ----

    pub fn is_nil(&self) -> bool {
        matches!(self.variant, Variant::Nil)
    }

    pub fn bool_get(&self) -> Option<bool> {
        match self.variant {
            Variant::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn int_get(&self) -> Option<i64> {
        match self.variant {
            Variant::Int(n) => Some(n),
            _ => None,
        }
    }

    pub fn double_get(&self) -> Option<f64> {
        match self.variant {
            Variant::Float(f) => Some(f),
            _ => None,
        }
    }

    pub fn character_get(&self) -> Option<char> {
        match self.variant {
            Variant::Character(c) => Some(c),
            _ => None,
        }
    }

    pub fn string_get(&self) -> Option<&StringRef<'a>> {
        match &self.variant {
            Variant::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn symbol_get(&self) -> Option<&SymbolRef<'a>> {
        match &self.variant {
            Variant::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn keyword_get(&self) -> Option<&SymbolRef<'a>> {
        match &self.variant {
            Variant::Keyword(s) => Some(s),
            _ => None,
        }
    }

    pub fn bigint_get(&self) -> Option<&BigIntRef<'a>> {
        match &self.variant {
            Variant::BigInt(b) => Some(b),
            _ => None,
        }
    }

    pub fn bigdec_get(&self) -> Option<&BigDecimalRef<'a>> {
        match &self.variant {
            Variant::BigDecimal(b) => Some(b),
            _ => None,
        }
    }

    pub fn ratio_get(&self) -> Option<(i64, i64)> {
        match self.variant {
            Variant::Ratio { numer, denom } => Some((numer, denom)),
            _ => None,
        }
    }

    pub fn bigratio_get(&self) -> Option<&BigRatioRef<'a>> {
        match &self.variant {
            Variant::BigRatio(r) => Some(r),
            _ => None,
        }
    }

    pub fn list_count(&self) -> Option<usize> {
        match &self.variant {
            Variant::List(items) => Some(items.len()),
            _ => None,
        }
    }

    pub fn list_get(&self, i: usize) -> Option<&'a Value<'a>> {
        match &self.variant {
            Variant::List(items) => items.get(i).copied(),
            _ => None,
        }
    }

    pub fn vector_count(&self) -> Option<usize> {
        match &self.variant {
            Variant::Vector(items) => Some(items.len()),
            _ => None,
        }
    }

    pub fn vector_get(&self, i: usize) -> Option<&'a Value<'a>> {
        match &self.variant {
            Variant::Vector(items) => items.get(i).copied(),
            _ => None,
        }
    }

    pub fn set_count(&self) -> Option<usize> {
        match &self.variant {
            Variant::Set(items) => Some(items.len()),
            _ => None,
        }
    }

    pub fn set_elements(&self) -> Option<&'a [&'a Value<'a>]> {
        match &self.variant {
            Variant::Set(items) => Some(items),
            _ => None,
        }
    }

    pub fn map_count(&self) -> Option<usize> {
        match &self.variant {
            Variant::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }

    pub fn map_entries(&self) -> Option<&'a [(&'a Value<'a>, &'a Value<'a>)]> {
        match &self.variant {
            Variant::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn map_get(&self, key: &Value<'a>) -> Option<&'a Value<'a>> {
        self.map_entries()?.iter().find(|(k, _)| crate::identity::value_equal(k, key)).map(|(_, v)| *v)
    }

    pub fn tagged_get(&self) -> Option<&TaggedRef<'a>> {
        match &self.variant {
            Variant::Tagged(t) => Some(t),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Value").field("kind", &self.kind()).field("variant", &self.variant).finish()
    }
}

#[cfg(feature = "serde")]
mod ser {
    use super::*;
    use serde::ser::{SerializeMap, SerializeSeq};
    use serde::{Serialize, Serializer};

    impl Serialize for Value<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match &self.variant {
                Variant::Nil => serializer.serialize_unit(),
                Variant::Bool(b) => serializer.serialize_bool(*b),
                Variant::Int(n) => serializer.serialize_i64(*n),
                Variant::Float(n) => serializer.serialize_f64(*n),
                Variant::BigInt(b) => serializer.serialize_str(&String::from_utf8_lossy(b.raw)),
                Variant::BigDecimal(b) => serializer.serialize_str(&String::from_utf8_lossy(b.raw)),
                Variant::Ratio { numer, denom } => serializer.serialize_str(&format!("{numer}/{denom}")),
                Variant::BigRatio(r) => {
                    let n = if r.numer_negative { "-" } else { "" };
                    let d = if r.denom_negative { "-" } else { "" };
                    serializer.serialize_str(&format!(
                        "{n}{}/{d}{}",
                        String::from_utf8_lossy(r.numer),
                        String::from_utf8_lossy(r.denom)
                    ))
                }
                Variant::Character(c) => serializer.serialize_char(*c),
                Variant::String(s) => serializer.serialize_str(&s.decode()),
                Variant::Symbol(s) | Variant::Keyword(s) => {
                    if s.is_qualified() {
                        serializer.serialize_str(&format!(
                            "{}/{}",
                            String::from_utf8_lossy(s.namespace),
                            String::from_utf8_lossy(s.name)
                        ))
                    } else {
                        serializer.serialize_str(&String::from_utf8_lossy(s.name))
                    }
                }
                Variant::List(items) | Variant::Vector(items) | Variant::Set(items) => {
                    let mut seq = serializer.serialize_seq(Some(items.len()))?;
                    for item in items.iter() {
                        seq.serialize_element(*item)?;
                    }
                    seq.end()
                }
                Variant::Map(entries) => {
                    let mut map = serializer.serialize_map(Some(entries.len()))?;
                    for (k, v) in entries.iter() {
                        map.serialize_entry(*k, *v)?;
                    }
                    map.end()
                }
                Variant::Tagged(t) => t.value.serialize(serializer),
            }
        }
    }
}
