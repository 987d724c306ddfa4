//! # edn_reader
//!
//! A high-performance EDN (Extensible Data Notation) reader with zero-copy,
//! SIMD-accelerated parsing and an arena-backed value tree.
//!
//! ## Quick Start
//!
//! ```rust
//! use edn_reader::parse;
//!
//! let doc = parse(br#"{:name "ferris" :legs 4 :tags #{:crab :rustacean}}"#).unwrap();
//! let root = doc.root();
//! assert_eq!(root.map_count(), Some(3));
//! ```
//!
//! ## Parsing Modes
//!
//! | Mode | Function | Type | Use case |
//! |------|----------|------|----------|
//! | **Owned (default)** | [`parse`] / [`parse_with_options`] | [`Document`] | Convenient, self-contained |
//! | **Zero-copy (caller-owned arena)** | [`parse_in`] | `&Value<'a>` | Reuse one arena across many parses |
//! | **Shared (`shared` feature)** | [`parse_shared`] | [`SharedDocument`] | `Send`/`Sync`/`Clone`, multi-threaded |
//!
//! ### Owned Mode
//!
//! The simplest entry point. A [`Document`] owns a private [`Arena`] and a
//! copy of the input bytes; every [`Value`] in its tree borrows from that
//! `Document`, so the whole tree is freed together when it is dropped.
//!
//! ```rust
//! use edn_reader::parse;
//!
//! let doc = parse(b"[1 2 3]").unwrap();
//! assert_eq!(doc.root().vector_count(), Some(3));
//! ```
//!
//! ### Zero-Copy Mode
//!
//! When many small documents share a lifetime (for example, parsing each
//! line of a log file), creating one [`Arena`] up front and reusing it with
//! [`parse_in`] avoids an allocation per document and a copy of each input.
//!
//! ```rust
//! use edn_reader::{parse_in, Arena, ParseOptions};
//!
//! let arena = Arena::new();
//! let options = ParseOptions::default();
//! let a = parse_in(b"1", &arena, &options).unwrap();
//! let b = parse_in(b"2", &arena, &options).unwrap();
//! assert_eq!(a.int_get(), Some(1));
//! assert_eq!(b.int_get(), Some(2));
//! ```
//!
//! ## Tagged Literals and the Reader Registry
//!
//! An unrecognized `#tag value` defaults to a [`Value::tagged_get`]
//! passthrough. Applications that know particular tags (`#inst`, `#uuid`,
//! or their own) register a reader function that transforms the wrapped
//! value instead:
//!
//! ```rust
//! use edn_reader::{parse_with_options, ParseOptions, Registry, Value, Variant, Arena};
//!
//! let registry = Registry::builder()
//!     .register("double", |v: &Value<'_>, arena: &Arena| {
//!         let n = v.int_get().ok_or("expected an integer")?;
//!         arena.alloc_value(Value::new(arena, Variant::Int(n * 2))).map_err(|e| e.to_string())
//!     })
//!     .build();
//! let options = ParseOptions::builder().registry(registry).build();
//! let doc = parse_with_options(b"#double 21", &options).unwrap();
//! assert_eq!(doc.root().int_get(), Some(42));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Effect |
//! |---------|---------|--------|
//! | `ratios` | on | `N/D` rational literals |
//! | `metadata` | on | `^meta form` reader metadata |
//! | `namespaced-maps` | on | `#:ns{...}` namespaced map literals |
//! | `text-blocks` | on | `"""..."""` multi-line string literals |
//! | `extended-numbers` | on | Radix (`2rNN`), hex/octal, and `_` digit-group literals |
//! | `experimental` | off | `\uXXXXXX` beyond 4 hex digits, `\oNNN` octal character escapes |
//! | `serde` | on | [`serde::Serialize`] for [`Value`] |
//! | `shared` | off | `Arc`/`Bytes`-backed [`SharedDocument`] and [`parse_shared`] |
//!
//! ## Type Overview
//!
//! - [`Value`] — one parsed node, tagged by [`ValueKind`] and carrying a
//!   [`Variant`] payload.
//! - [`Document`] / [`SharedDocument`] — an owned parse result and its
//!   `Arc`-backed, thread-shareable counterpart.
//! - [`Arena`] — the bump allocator backing a parse; only needed directly
//!   by callers of [`parse_in`].
//! - [`ParseOptions`] — registry, unknown-tag policy, strictness, and
//!   recursion depth, built with [`ParseOptions::builder`].
//! - [`Registry`] — tag name to reader function mapping, built with
//!   [`Registry::builder`].
//! - [`Error`] / [`ParseError`] — the failure taxonomy and its source span.

mod arena;
mod charlit;
mod classify;
mod collection;
mod error;
mod ident;
mod identity;
#[cfg(feature = "metadata")]
mod metadata;
mod number;
mod options;
mod parser;
mod registry;
mod simd;
mod string;
mod tagged;
mod value;

pub use arena::Arena;
pub use error::{Error, ParseError, Result, Span};
pub use identity::{value_compare, value_equal, value_hash};
pub use options::{ParseOptions, ParseOptionsBuilder, DEFAULT_MAX_DEPTH};
pub use parser::{parse, parse_in, parse_with_options, Document};
pub use registry::{Registry, RegistryBuilder, UnknownTagMode};
pub use value::{
    BigDecimalRef, BigIntRef, BigRatioRef, StringRef, SymbolRef, TaggedRef, Value, ValueKind, Variant,
};

#[cfg(feature = "shared")]
pub use parser::{parse_shared, parse_shared_with_options, SharedDocument};
