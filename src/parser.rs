//! The recursive-descent driver that ties every reader in this crate
//! together: byte-dispatch on the next non-whitespace character, recursion
//! depth tracking, and the `^metadata`/`#_discard` prefix handling that
//! wraps an otherwise-ordinary form.
//!
//! [`Document`] and [`SharedDocument`] are the two ways a finished parse is
//! handed back to the caller. Both own their arena; [`parse_in`] is the
//! lower-level entry point for callers who already have an [`Arena`] of
//! their own (for example, to amortize one arena across many parses) and
//! want true zero-copy against their own input buffer.

use std::ptr::NonNull;

use tracing::instrument;

use crate::arena::Arena;
use crate::charlit::read_character;
use crate::classify::{is_digit, is_sign, is_symbol_lead};
use crate::collection::{ElementBuilder, EntryBuilder};
use crate::error::{Error, ParseError, Result, Span};
use crate::ident::{read_keyword, read_symbol_or_literal, read_symbolic_value};
#[cfg(feature = "metadata")]
use crate::metadata::{can_carry_metadata, merge_metadata, metadata_shape_to_map};
use crate::number::{read_number, NumberDialect};
use crate::options::ParseOptions;
use crate::simd::identifier::scan_identifier;
use crate::simd::whitespace::skip_whitespace_and_comments;
use crate::string::read_string;
#[cfg(feature = "text-blocks")]
use crate::string::read_text_block;
use crate::tagged::resolve_tagged;
use crate::value::Value;
use crate::value::Variant;

/// Bundles the parts of [`ParseOptions`] the driver consults on every
/// recursive call, so as not to re-borrow the options struct's fields one
/// at a time through a long parameter list.
struct Ctx<'o> {
    options: &'o ParseOptions,
}

/// Parses a single EDN value out of `input`, allocating every node from
/// `arena`. Both must share the lifetime `'a`: this is the true zero-copy
/// entry point for callers who manage their own arena, typically to reuse
/// one arena across many parses of related documents.
///
/// Leading and trailing whitespace/comments are skipped; trailing
/// non-whitespace content is only an error under [`ParseOptions::strict`].
#[instrument(level = "trace", skip(input, arena, options))]
pub fn parse_in<'a>(input: &'a [u8], arena: &'a Arena, options: &ParseOptions) -> Result<&'a Value<'a>> {
    let ctx = Ctx { options };
    let start = skip_whitespace_and_comments(input, 0);
    let (value, end) = parse_value(input, start, arena, &ctx, 0, false)?;
    let trailing_start = skip_whitespace_and_comments(input, end);
    if ctx.options.strict() && trailing_start != input.len() {
        return Err(ParseError::new(Error::TrailingContent, Span::new(trailing_start, input.len())));
    }
    Ok(value)
}

/// Parses a single EDN value out of `input` with default [`ParseOptions`],
/// owning a freshly allocated arena and a copy of `input` for the
/// lifetime of the returned [`Document`].
#[instrument(level = "debug", skip(input))]
pub fn parse(input: &[u8]) -> Result<Document> {
    parse_with_options(input, &ParseOptions::default())
}

/// As [`parse`], with caller-supplied [`ParseOptions`].
#[instrument(level = "debug", skip(input, options))]
pub fn parse_with_options(input: &[u8], options: &ParseOptions) -> Result<Document> {
    let arena = Box::new(Arena::new());
    let owned_input: Box<[u8]> = input.to_vec().into_boxed_slice();

    // Safety: both `arena` and `owned_input` are heap allocations reached
    // only through their `Box`; moving the `Box` handle itself (into the
    // `Document` below) never moves the heap data it points at, so a
    // reference taken now through a raw pointer remains valid for as long
    // as the `Document` keeps these two boxes alive. The erasure to
    // `'static` is undone by `Document::root`, which hands back a
    // reference whose lifetime is tied to `&self` instead.
    let input_static: &'static [u8] = unsafe { &*(owned_input.as_ref() as *const [u8]) };
    let arena_static: &'static Arena = unsafe { &*(arena.as_ref() as *const Arena) };

    let root = parse_in(input_static, arena_static, options)?;
    let root_ptr = NonNull::from(root);

    Ok(Document { arena, input: owned_input, root: root_ptr })
}

/// A parsed document owning the arena (and a copy of the input bytes) that
/// every [`Value`] in its tree borrows from.
///
/// Dropping a `Document` drops its arena as a unit, freeing every node it
/// allocated; there is no explicit `free` call to make, since this is what
/// `Drop` already does.
pub struct Document {
    arena: Box<Arena>,
    input: Box<[u8]>,
    root: NonNull<Value<'static>>,
}

impl Document {
    /// The root value of this document, borrowed for as long as the
    /// `Document` itself is.
    pub fn root(&self) -> &Value<'_> {
        // Safety: `root` was produced by parsing `self.input` into
        // `self.arena`, both of which outlive this borrow of `self`.
        unsafe { self.root.as_ref() }
    }

    /// Bytes allocated so far by this document's arena.
    pub fn allocated_bytes(&self) -> usize {
        self.arena.allocated_bytes()
    }
}

// Safety: once constructed, a `Document`'s arena is never mutated again
// except for the lazily-populated hash cache on each `Value` (a pure,
// idempotent function of that value's own structure), so sending the whole
// document to another thread is sound. Concurrent *access* from more than
// one thread at a time is not: see the caveat on `SharedDocument`.
unsafe impl Send for Document {}

#[cfg(feature = "shared")]
mod shared {
    use super::*;
    use bytes::Bytes;
    use std::sync::Arc;

    /// As [`Document`], but backed by a reference-counted [`bytes::Bytes`]
    /// buffer and a reference-counted arena, so cloning a `SharedDocument`
    /// is a pair of atomic increments rather than a deep copy, and the
    /// result may be handed to another thread.
    #[derive(Clone)]
    pub struct SharedDocument {
        arena: Arc<Arena>,
        input: Bytes,
        root: NonNull<Value<'static>>,
    }

    impl SharedDocument {
        pub fn root(&self) -> &Value<'_> {
            // Safety: see `Document::root`; the arena and input live inside
            // `Arc`/`Bytes`, so cloning this handle keeps both alive too.
            unsafe { self.root.as_ref() }
        }

        pub fn allocated_bytes(&self) -> usize {
            self.arena.allocated_bytes()
        }
    }

    // Safety: same reasoning as `Document`'s `Send` impl. `Sync` additionally
    // requires that concurrent readers never race on the lazily-populated
    // hash cache; callers sharing one `SharedDocument` across threads must
    // not call hashing operations (`value_hash`, or anything that hashes,
    // such as inserting values into a `HashMap`) concurrently on the same
    // node from more than one thread, since `Cell<u64>` is not itself
    // synchronized.
    unsafe impl Send for SharedDocument {}
    unsafe impl Sync for SharedDocument {}

    /// Parses a single EDN value out of `input` with default
    /// [`ParseOptions`], taking ownership of a ref-counted `Bytes` buffer
    /// rather than copying it.
    #[instrument(level = "debug", skip(input))]
    pub fn parse_shared(input: Bytes) -> Result<SharedDocument> {
        parse_shared_with_options(input, &ParseOptions::default())
    }

    /// As [`parse_shared`], with caller-supplied [`ParseOptions`].
    #[instrument(level = "debug", skip(input, options))]
    pub fn parse_shared_with_options(input: Bytes, options: &ParseOptions) -> Result<SharedDocument> {
        let arena = Arc::new(Arena::new());

        // Safety: `Bytes` already stores its payload behind a reference
        // count on the heap, and `Arc<Arena>`'s pointee is likewise heap
        // allocated; neither moves when the handles above are moved into
        // the `SharedDocument` below. See `parse_with_options` for the
        // matching `Document` construction this mirrors.
        let input_static: &'static [u8] = unsafe { &*(input.as_ref() as *const [u8]) };
        let arena_static: &'static Arena = unsafe { &*(arena.as_ref() as *const Arena) };

        let root = parse_in(input_static, arena_static, options)?;
        let root_ptr = NonNull::from(root);

        Ok(SharedDocument { arena, input, root: root_ptr })
    }
}

#[cfg(feature = "shared")]
pub use shared::{parse_shared, parse_shared_with_options, SharedDocument};

/// Parses one form starting at `pos`, which must already be past any
/// leading whitespace/comments. Handles the `^metadata` and `#_discard`
/// prefixes (which may chain and interleave) before dispatching to
/// [`parse_bare_form`] for the form itself. `depth` is incremented on every
/// recursive call this function makes (container elements, discarded
/// subtrees, and metadata shapes alike), since each one costs a native
/// stack frame regardless of whether it represents container nesting.
fn parse_value<'a>(
    input: &'a [u8],
    pos: usize,
    arena: &'a Arena,
    ctx: &Ctx<'_>,
    depth: usize,
    in_discard: bool,
) -> Result<(&'a Value<'a>, usize)> {
    if depth > ctx.options.max_depth() {
        return Err(ParseError::new(Error::RecursionTooDeep, Span::point(pos)));
    }
    let pos = skip_whitespace_and_comments(input, pos);

    match input.get(pos) {
        #[cfg(feature = "metadata")]
        Some(b'^') => parse_metadata(input, pos, arena, ctx, depth, in_discard),
        Some(b'#') if input.get(pos + 1) == Some(&b'_') => {
            let after_marker = pos + 2;
            let value_start = skip_whitespace_and_comments(input, after_marker);
            if input.get(value_start).is_none() {
                return Err(ParseError::new(Error::InvalidDiscard, Span::new(pos, value_start)));
            }
            let (_discarded, after_discarded) = parse_value(input, after_marker, arena, ctx, depth + 1, true)?;
            parse_value(input, after_discarded, arena, ctx, depth, in_discard)
        }
        _ => parse_bare_form(input, pos, arena, ctx, depth, in_discard),
    }
}

#[cfg(feature = "metadata")]
fn parse_metadata<'a>(
    input: &'a [u8],
    pos: usize,
    arena: &'a Arena,
    ctx: &Ctx<'_>,
    depth: usize,
    in_discard: bool,
) -> Result<(&'a Value<'a>, usize)> {
    let marker_span_start = pos;
    let after_marker = pos + 1;
    let (meta_shape, after_shape) = parse_value(input, after_marker, arena, ctx, depth + 1, in_discard)?;
    let shape_span = Span::new(marker_span_start, after_shape);
    let outer_map = metadata_shape_to_map(meta_shape, arena, shape_span)?;

    let (target, after_target) = parse_value(input, after_shape, arena, ctx, depth + 1, in_discard)?;
    if !can_carry_metadata(target) {
        return Err(ParseError::new(
            Error::InvalidSyntax("metadata must be followed by a list, vector, set, map, tagged value, or symbol".into()),
            Span::new(marker_span_start, after_target),
        ));
    }

    let combined_map = match target.metadata() {
        Some(inner_map) => merge_metadata(&[outer_map, inner_map], arena)?,
        None => outer_map,
    };

    let mut rebuilt = Value::new(arena, *target.variant()).with_metadata(combined_map);
    if let Some(span) = target.span() {
        rebuilt = rebuilt.with_span(span);
    }
    let final_value = arena.alloc_value(rebuilt)?;
    Ok((final_value, after_target))
}

/// Dispatches on the leading byte of a form with all `^`/`#_` prefixes
/// already stripped.
fn parse_bare_form<'a>(
    input: &'a [u8],
    pos: usize,
    arena: &'a Arena,
    ctx: &Ctx<'_>,
    depth: usize,
    in_discard: bool,
) -> Result<(&'a Value<'a>, usize)> {
    let Some(&lead) = input.get(pos) else {
        return Err(ParseError::new(Error::UnexpectedEof, Span::point(pos)));
    };

    match lead {
        b'(' => parse_sequence(input, pos, arena, ctx, depth, in_discard, b')', SequenceKind::List),
        b'[' => parse_sequence(input, pos, arena, ctx, depth, in_discard, b']', SequenceKind::Vector),
        b'{' => parse_map(input, pos, arena, ctx, depth, in_discard, None),
        b')' | b']' | b'}' => Err(ParseError::new(
            Error::InvalidSyntax(format!("unexpected closing delimiter '{}'", lead as char)),
            Span::point(pos),
        )),
        b'"' => parse_string_form(input, pos, arena),
        b'\\' => {
            let (ch, end) = read_character(input, pos + 1)?;
            leaf(arena, Variant::Character(ch), Span::new(pos, end))
        }
        b':' => {
            let (variant, end) = read_keyword(input, pos + 1)?;
            leaf(arena, variant, Span::new(pos, end))
        }
        b'#' => parse_hash_form(input, pos, arena, ctx, depth, in_discard),
        b'+' | b'-' if input.get(pos + 1).is_some_and(|&b| is_digit(b)) => parse_number_form(input, pos, arena),
        b'.' if input.get(pos + 1).is_some_and(|&b| is_digit(b)) => parse_number_form(input, pos, arena),
        b if is_digit(b) => parse_number_form(input, pos, arena),
        b if is_sign(b) || is_symbol_lead(b) => {
            let (variant, end) = read_symbol_or_literal(input, pos)?;
            leaf(arena, variant, Span::new(pos, end))
        }
        other => Err(ParseError::new(
            Error::InvalidSyntax(format!("unexpected byte {other:#04x}")),
            Span::point(pos),
        )),
    }
}

fn parse_number_form<'a>(input: &'a [u8], pos: usize, arena: &'a Arena) -> Result<(&'a Value<'a>, usize)> {
    let result = read_number(input, pos, arena, NumberDialect::default())?;
    leaf(arena, result.variant, Span::new(pos, result.end))
}

fn parse_string_form<'a>(input: &'a [u8], pos: usize, arena: &'a Arena) -> Result<(&'a Value<'a>, usize)> {
    #[cfg(feature = "text-blocks")]
    {
        if input[pos..].starts_with(b"\"\"\"") {
            let body_start = pos + 3;
            // A text block's opening `"""` must be immediately followed by
            // a newline, which is not itself part of the content.
            let body_start = match input.get(body_start) {
                Some(b'\n') => body_start + 1,
                Some(b'\r') if input.get(body_start + 1) == Some(&b'\n') => body_start + 2,
                _ => {
                    return Err(ParseError::new(
                        Error::InvalidString("text block opening delimiter must be followed by a newline".into()),
                        Span::point(body_start),
                    ));
                }
            };
            let (string_ref, end) = read_text_block(input, body_start, arena)?;
            return leaf(arena, Variant::String(string_ref), Span::new(pos, end));
        }
    }
    let (string_ref, end) = read_string(input, pos + 1, arena)?;
    leaf(arena, Variant::String(string_ref), Span::new(pos, end))
}

enum SequenceKind {
    List,
    Vector,
}

/// Checks whether `cursor` sits on a closing delimiter other than the one
/// this collection expects, and if so builds the dedicated
/// [`Error::UnmatchedDelimiter`] rather than letting it fall through to
/// [`parse_bare_form`]'s generic "unexpected closing delimiter" catch-all.
fn check_unmatched_delimiter(input: &[u8], cursor: usize, expected: u8) -> Result<()> {
    match input.get(cursor) {
        Some(&b @ (b')' | b']' | b'}')) if b != expected => Err(ParseError::new(
            Error::UnmatchedDelimiter { expected: expected as char, found: b as char },
            Span::point(cursor),
        )),
        _ => Ok(()),
    }
}

fn parse_sequence<'a>(
    input: &'a [u8],
    pos: usize,
    arena: &'a Arena,
    ctx: &Ctx<'_>,
    depth: usize,
    in_discard: bool,
    close: u8,
    kind: SequenceKind,
) -> Result<(&'a Value<'a>, usize)> {
    let mut cursor = pos + 1;
    let mut builder = ElementBuilder::new();
    loop {
        cursor = skip_whitespace_and_comments(input, cursor);
        match input.get(cursor) {
            Some(&b) if b == close => {
                cursor += 1;
                break;
            }
            None => return Err(ParseError::new(Error::UnexpectedEof, Span::new(pos, cursor))),
            _ => {
                check_unmatched_delimiter(input, cursor, close)?;
                let (value, next) = parse_value(input, cursor, arena, ctx, depth + 1, in_discard)?;
                builder.push(value);
                cursor = next;
            }
        }
    }
    let span = Span::new(pos, cursor);
    let items = builder.finish_ordered(arena)?;
    let variant = match kind {
        SequenceKind::List => Variant::List(items),
        SequenceKind::Vector => Variant::Vector(items),
    };
    leaf(arena, variant, span)
}

fn parse_set<'a>(
    input: &'a [u8],
    pos: usize,
    arena: &'a Arena,
    ctx: &Ctx<'_>,
    depth: usize,
    in_discard: bool,
) -> Result<(&'a Value<'a>, usize)> {
    let mut cursor = pos + 2; // past `#{`
    let mut builder = ElementBuilder::new();
    loop {
        cursor = skip_whitespace_and_comments(input, cursor);
        match input.get(cursor) {
            Some(b'}') => {
                cursor += 1;
                break;
            }
            None => return Err(ParseError::new(Error::UnexpectedEof, Span::new(pos, cursor))),
            _ => {
                check_unmatched_delimiter(input, cursor, b'}')?;
                let (value, next) = parse_value(input, cursor, arena, ctx, depth + 1, in_discard)?;
                builder.push(value);
                cursor = next;
            }
        }
    }
    let span = Span::new(pos, cursor);
    let items = builder.finish_set(arena, span)?;
    leaf(arena, Variant::Set(items), span)
}

#[cfg_attr(not(feature = "namespaced-maps"), allow(unused_variables))]
fn parse_map<'a>(
    input: &'a [u8],
    pos: usize,
    arena: &'a Arena,
    ctx: &Ctx<'_>,
    depth: usize,
    in_discard: bool,
    namespace: Option<&'a [u8]>,
) -> Result<(&'a Value<'a>, usize)> {
    let mut cursor = pos + 1; // past `{`
    let mut builder = EntryBuilder::new();
    loop {
        cursor = skip_whitespace_and_comments(input, cursor);
        match input.get(cursor) {
            Some(b'}') => {
                cursor += 1;
                break;
            }
            None => return Err(ParseError::new(Error::UnexpectedEof, Span::new(pos, cursor))),
            _ => {
                check_unmatched_delimiter(input, cursor, b'}')?;
                let (key, after_key) = parse_value(input, cursor, arena, ctx, depth + 1, in_discard)?;
                let after_key_ws = skip_whitespace_and_comments(input, after_key);
                if input.get(after_key_ws) == Some(&b'}') || input.get(after_key_ws).is_none() {
                    return Err(ParseError::new(
                        Error::InvalidSyntax("map literal must have an even number of forms".into()),
                        Span::new(pos, after_key_ws),
                    ));
                }
                check_unmatched_delimiter(input, after_key_ws, b'}')?;
                let (value, after_value) = parse_value(input, after_key_ws, arena, ctx, depth + 1, in_discard)?;
                builder.push(key, value);
                cursor = after_value;
            }
        }
    }
    let span = Span::new(pos, cursor);

    #[cfg(feature = "namespaced-maps")]
    if let Some(ns) = namespace {
        builder.namespace_unqualified_keys(ns, arena)?;
    }

    let entries = builder.finish(arena, span)?;
    leaf(arena, Variant::Map(entries), span)
}

fn parse_hash_form<'a>(
    input: &'a [u8],
    pos: usize,
    arena: &'a Arena,
    ctx: &Ctx<'_>,
    depth: usize,
    in_discard: bool,
) -> Result<(&'a Value<'a>, usize)> {
    match input.get(pos + 1) {
        Some(b'{') => parse_set(input, pos, arena, ctx, depth, in_discard),
        Some(b'#') => {
            let after = pos + 2;
            let (variant, end) = read_symbolic_value(input, after)?;
            leaf(arena, variant, Span::new(pos, end))
        }
        #[cfg(feature = "namespaced-maps")]
        Some(b':') => parse_namespaced_map(input, pos, arena, ctx, depth, in_discard),
        Some(_) => parse_tagged(input, pos, arena, ctx, depth, in_discard),
        None => Err(ParseError::new(Error::UnexpectedEof, Span::point(pos))),
    }
}

#[cfg(feature = "namespaced-maps")]
fn parse_namespaced_map<'a>(
    input: &'a [u8],
    pos: usize,
    arena: &'a Arena,
    ctx: &Ctx<'_>,
    depth: usize,
    in_discard: bool,
) -> Result<(&'a Value<'a>, usize)> {
    let ns_start = pos + 2; // past `#:`
    let scan = scan_identifier(input, ns_start);
    if scan.end == ns_start {
        return Err(ParseError::new(Error::InvalidSyntax("expected a namespace after '#:'".into()), Span::point(ns_start)));
    }
    let namespace = &input[ns_start..scan.end];
    let brace = skip_whitespace_and_comments(input, scan.end);
    if input.get(brace) != Some(&b'{') {
        return Err(ParseError::new(
            Error::InvalidSyntax("expected '{' after '#:namespace'".into()),
            Span::point(brace),
        ));
    }
    parse_map(input, brace, arena, ctx, depth, in_discard, Some(namespace))
}

fn parse_tagged<'a>(
    input: &'a [u8],
    pos: usize,
    arena: &'a Arena,
    ctx: &Ctx<'_>,
    depth: usize,
    in_discard: bool,
) -> Result<(&'a Value<'a>, usize)> {
    let tag_start = pos + 1;
    let scan = scan_identifier(input, tag_start);
    if scan.end == tag_start {
        return Err(ParseError::new(Error::InvalidSyntax("expected a tag name after '#'".into()), Span::point(tag_start)));
    }
    let tag = &input[tag_start..scan.end];
    let (wrapped, after_wrapped) = parse_value(input, scan.end, arena, ctx, depth + 1, in_discard)?;
    let span = Span::new(pos, after_wrapped);
    let resolved = resolve_tagged(tag, wrapped, arena, ctx.options.registry(), ctx.options.unknown_tag_mode(), in_discard, span)?;
    Ok((resolved, after_wrapped))
}

fn leaf<'a>(arena: &'a Arena, variant: Variant<'a>, span: Span) -> Result<(&'a Value<'a>, usize)> {
    let end = span.end;
    let value = arena.alloc_value(Value::new(arena, variant).with_span(span))?;
    Ok((value, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Registry, UnknownTagMode};

    fn root_of<'a>(doc: &'a Document) -> &'a Value<'a> {
        doc.root()
    }

    #[test]
    fn parses_nil_true_false() {
        assert!(root_of(&parse(b"nil").unwrap()).is_nil());
        assert_eq!(root_of(&parse(b"true").unwrap()).bool_get(), Some(true));
        assert_eq!(root_of(&parse(b"false").unwrap()).bool_get(), Some(false));
    }

    #[test]
    fn parses_integers_and_floats() {
        assert_eq!(root_of(&parse(b"42").unwrap()).int_get(), Some(42));
        assert_eq!(root_of(&parse(b"-7").unwrap()).int_get(), Some(-7));
        assert_eq!(root_of(&parse(b"1.5").unwrap()).double_get(), Some(1.5));
    }

    #[test]
    fn parses_strings_and_characters() {
        let doc = parse(br#""hello""#).unwrap();
        assert_eq!(root_of(&doc).string_get().unwrap().decode().as_ref(), "hello");
        let doc = parse(br"\newline").unwrap();
        assert_eq!(root_of(&doc).character_get(), Some('\n'));
    }

    #[test]
    fn parses_keywords_and_symbols() {
        let doc = parse(b":foo/bar").unwrap();
        let kw = root_of(&doc).keyword_get().unwrap();
        assert_eq!(kw.namespace, b"foo");
        assert_eq!(kw.name, b"bar");

        let doc = parse(b"foo-bar").unwrap();
        assert_eq!(root_of(&doc).symbol_get().unwrap().name, b"foo-bar");
    }

    #[test]
    fn parses_nested_collections() {
        let doc = parse(b"[1 2 {:a 1 :b [2 3]} #{4 5}]").unwrap();
        let root = root_of(&doc);
        assert_eq!(root.vector_count(), Some(4));
    }

    #[test]
    fn discard_with_no_following_value_is_invalid_discard() {
        let err = parse(b"#_").unwrap_err();
        assert!(matches!(err.kind(), Error::InvalidDiscard));

        let err = parse(b"#_   ").unwrap_err();
        assert!(matches!(err.kind(), Error::InvalidDiscard));
    }

    #[test]
    fn rejects_mismatched_closing_delimiter() {
        let err = parse(b"(1 2]").unwrap_err();
        assert!(matches!(
            err.kind(),
            Error::UnmatchedDelimiter { expected: ')', found: ']' }
        ));
    }

    #[test]
    fn rejects_map_with_odd_number_of_forms() {
        let err = parse(b"{:a 1 :b}").unwrap_err();
        assert!(matches!(err.kind(), Error::InvalidSyntax(_)));
    }

    #[test]
    fn rejects_duplicate_set_elements() {
        let err = parse(b"#{1 1}").unwrap_err();
        assert!(matches!(err.kind(), Error::DuplicateElement));
    }

    #[test]
    fn discard_consumes_exactly_one_form_and_never_runs_readers() {
        let registry = Registry::builder()
            .register("boom", |_v: &Value<'_>, _a: &Arena| -> std::result::Result<&Value<'_>, String> {
                panic!("tagged reader must not run inside a discarded subtree")
            })
            .build();
        let options = ParseOptions::builder().registry(registry).build();
        let doc = parse_with_options(b"[1 #_ #boom 2 3]", &options).unwrap();
        let root = root_of(&doc);
        assert_eq!(root.vector_count(), Some(2));
        assert_eq!(root.vector_get(0).unwrap().int_get(), Some(1));
        assert_eq!(root.vector_get(1).unwrap().int_get(), Some(3));
    }

    #[test]
    #[cfg(feature = "metadata")]
    fn metadata_attaches_to_the_following_form() {
        let doc = parse(b"^:private foo").unwrap();
        let root = root_of(&doc);
        let meta = root.metadata().unwrap();
        assert_eq!(meta.map_count(), Some(1));
    }

    #[test]
    #[cfg(feature = "metadata")]
    fn stacked_metadata_prefixes_let_the_innermost_win() {
        let doc = parse(b"^{:a 1} ^{:a 2 :b 3} foo").unwrap();
        let meta = root_of(&doc).metadata().unwrap();
        let entries = meta.map_entries().unwrap();
        assert_eq!(entries.len(), 2);
        let a = entries.iter().find(|(k, _)| k.keyword_get().unwrap().name == b"a").unwrap();
        assert_eq!(a.1.int_get(), Some(2));
    }

    #[test]
    fn tagged_literal_with_unknown_tag_defaults_to_passthrough() {
        let doc = parse(br#"#inst "2024-01-01""#).unwrap();
        let tagged = root_of(&doc).tagged_get().unwrap();
        assert_eq!(tagged.tag, b"inst");
    }

    #[test]
    fn unknown_tag_mode_error_rejects_unregistered_tags() {
        let options = ParseOptions::builder().unknown_tag_mode(UnknownTagMode::Error).build();
        let err = parse_with_options(b"#inst 5", &options).unwrap_err();
        assert!(matches!(err.kind(), Error::UnknownTag(_)));
    }

    #[test]
    fn strict_mode_rejects_trailing_content() {
        let options = ParseOptions::builder().strict(true).build();
        let err = parse_with_options(b"1 2", &options).unwrap_err();
        assert!(matches!(err.kind(), Error::TrailingContent));
    }

    #[test]
    fn non_strict_mode_ignores_trailing_content() {
        let doc = parse(b"1 2").unwrap();
        assert_eq!(root_of(&doc).int_get(), Some(1));
    }

    #[test]
    fn recursion_depth_cap_is_enforced() {
        let deep: String = "(".repeat(600) + &")".repeat(600);
        let options = ParseOptions::builder().max_depth(32).build();
        let err = parse_with_options(deep.as_bytes(), &options).unwrap_err();
        assert!(matches!(err.kind(), Error::RecursionTooDeep));
    }

    #[test]
    fn symbolic_infinity_and_nan() {
        assert_eq!(root_of(&parse(b"##Inf").unwrap()).double_get(), Some(f64::INFINITY));
        assert!(root_of(&parse(b"##NaN").unwrap()).double_get().unwrap().is_nan());
    }

    #[test]
    fn comments_are_skipped_between_forms() {
        let doc = parse(b"; a leading comment\n42 ; trailing").unwrap();
        assert_eq!(root_of(&doc).int_get(), Some(42));
    }

    #[cfg(feature = "namespaced-maps")]
    #[test]
    fn namespaced_map_prefixes_unqualified_keys() {
        let doc = parse(b"#:foo{:a 1 :bar/b 2}").unwrap();
        let root = root_of(&doc);
        let entries = root.map_entries().unwrap();
        let a = entries.iter().find(|(k, _)| k.keyword_get().unwrap().name == b"a").unwrap();
        assert_eq!(a.0.keyword_get().unwrap().namespace, b"foo");
        let b = entries.iter().find(|(k, _)| k.keyword_get().unwrap().name == b"b").unwrap();
        assert_eq!(b.0.keyword_get().unwrap().namespace, b"bar");
    }

    #[cfg(feature = "text-blocks")]
    #[test]
    fn text_block_strips_common_indent() {
        let doc = parse(b"\"\"\"\n  line one\n  line two\n  \"\"\"").unwrap();
        assert_eq!(root_of(&doc).string_get().unwrap().decode().as_ref(), "line one\nline two\n");
    }

    #[cfg(feature = "shared")]
    #[test]
    fn shared_document_parses_from_bytes_and_clones_cheaply() {
        let bytes = bytes::Bytes::from_static(b"[1 2 3]");
        let doc = parse_shared(bytes).unwrap();
        let clone = doc.clone();
        assert_eq!(clone.root().vector_count(), Some(3));
    }
}
