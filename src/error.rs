//! Error types for EDN parsing.
//!
//! This module contains the [`Error`] type, which represents every failure
//! mode the reader can produce, and [`Span`], the byte-offset range into the
//! original input that each failure is anchored to when one is known.
//!
//! # Error Handling
//!
//! All fallible operations return `Result<T, Error>`. Match on specific
//! variants to recover the offending span or distinguish failure classes:
//!
//! ```
//! use edn_reader::{parse, Error};
//!
//! match parse(b"#{1 2 2}") {
//!     Ok(_) => unreachable!(),
//!     Err(err) => {
//!         assert!(matches!(err.kind(), Error::DuplicateElement));
//!     }
//! }
//! ```

use std::fmt::{self, Display};

/// Alias for a `Result` with the error type [`Error`].
pub type Result<T> = std::result::Result<T, ParseError>;

/// A byte-offset range into the original input.
///
/// `start` and `end` are both inclusive-exclusive (`start..end`) offsets into
/// the byte slice that was handed to [`parse`](crate::parse). A zero-width
/// span (`start == end`) means the failure was detected at a single point
/// rather than over a range (for example, end-of-input).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn point(at: usize) -> Self {
        Self { start: at, end: at }
    }
}

/// The taxonomy of errors the reader can produce.
///
/// Each variant carries whatever data is needed to explain the failure and
/// nothing more, following the same philosophy as the one NBT reader this
/// crate descends from applies to its own `Error` enum: categories are named
/// by what went wrong, not how the internal state machine reached it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Input ran out mid-token or mid-collection.
    UnexpectedEof,
    /// A structural violation not covered by a more specific kind.
    InvalidSyntax(String),
    /// A malformed numeric literal.
    InvalidNumber(String),
    /// An unknown or malformed escape in a string or character literal.
    InvalidEscape(String),
    /// A malformed character literal, or a codepoint beyond U+10FFFF.
    InvalidCharacter(String),
    /// An unterminated string or text block.
    InvalidString(String),
    /// `#_` with no following value.
    InvalidDiscard,
    /// A radix outside 2..=36.
    InvalidRadix(u32),
    /// The wrong closing bracket for the open context.
    UnmatchedDelimiter { expected: char, found: char },
    /// A set contained a structurally-equal duplicate element.
    DuplicateElement,
    /// A map contained a structurally-equal duplicate key.
    DuplicateKey,
    /// A `#tag` with no registered reader, under `UnknownTagMode::Error`.
    UnknownTag(String),
    /// A user reader function signaled failure; the message is passed through.
    ReaderError(String),
    /// The recursion-depth cap was exceeded.
    RecursionTooDeep,
    /// The arena allocator failed to satisfy a request.
    OutOfMemory,
    /// A ratio literal with a zero denominator.
    DivideByZero,
    /// Non-whitespace content remained after the top-level value, under strict mode.
    TrailingContent,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnexpectedEof => f.write_str("unexpected end of input"),
            Error::InvalidSyntax(msg) => write!(f, "invalid syntax: {msg}"),
            Error::InvalidNumber(msg) => write!(f, "invalid number: {msg}"),
            Error::InvalidEscape(msg) => write!(f, "invalid escape: {msg}"),
            Error::InvalidCharacter(msg) => write!(f, "invalid character literal: {msg}"),
            Error::InvalidString(msg) => write!(f, "invalid string: {msg}"),
            Error::InvalidDiscard => f.write_str("#_ with no following value"),
            Error::InvalidRadix(r) => write!(f, "invalid radix: {r} (must be 2..=36)"),
            Error::UnmatchedDelimiter { expected, found } => {
                write!(f, "mismatched delimiter: expected '{expected}', found '{found}'")
            }
            Error::DuplicateElement => f.write_str("set contains a duplicate element"),
            Error::DuplicateKey => f.write_str("map contains a duplicate key"),
            Error::UnknownTag(tag) => write!(f, "no reader registered for tag #{tag}"),
            Error::ReaderError(msg) => write!(f, "reader function failed: {msg}"),
            Error::RecursionTooDeep => f.write_str("recursion depth cap exceeded"),
            Error::OutOfMemory => f.write_str("arena allocation failed"),
            Error::DivideByZero => f.write_str("ratio denominator is zero"),
            Error::TrailingContent => f.write_str("trailing content after top-level value"),
        }
    }
}

impl std::error::Error for Error {}

/// An [`Error`] paired with the source span it was detected at, when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    error: Error,
    span: Option<Span>,
}

impl ParseError {
    pub fn new(error: Error, span: Span) -> Self {
        Self { error, span: Some(span) }
    }

    pub fn without_span(error: Error) -> Self {
        Self { error, span: None }
    }

    pub fn kind(&self) -> &Error {
        &self.error
    }

    pub fn span(&self) -> Option<Span> {
        self.span
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) => write!(f, "{} (at {}..{})", self.error, span.start, span.end),
            None => Display::fmt(&self.error, f),
        }
    }
}

impl std::error::Error for ParseError {}

#[cfg(feature = "serde")]
impl serde::ser::Error for ParseError {
    fn custom<T: Display>(msg: T) -> Self {
        ParseError::without_span(Error::InvalidSyntax(msg.to_string()))
    }
}
