//! Reader registry: maps tag names to user-supplied transform functions,
//! independent of any single parse's arena lifetime.

use std::collections::HashMap;
use std::sync::Arc;

use crate::arena::Arena;
use crate::value::Value;

/// A user reader function: given the wrapped value and the arena that owns
/// it, produces a replacement value (allocated from the same arena) or an
/// error message.
pub type ReaderFn = dyn for<'a> Fn(&'a Value<'a>, &'a Arena) -> Result<&'a Value<'a>, String> + Send + Sync;

/// What to do with a `#tag value` whose tag has no registered reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownTagMode {
    /// Emit a `Tagged` value carrying the tag and the wrapped value.
    #[default]
    Passthrough,
    /// Discard the tag, returning the wrapped value alone.
    Unwrap,
    /// Fail the parse with `Error::UnknownTag`.
    Error,
}

/// A mapping from tag name to reader function. Cloning a `Registry` is
/// cheap (it shares the underlying map via `Arc`); registries may be
/// created once and reused across many independent parses, and may be
/// dropped while values produced through them still live, since readers
/// must allocate their replacements from the parse's own arena rather than
/// retaining registry-owned pointers.
#[derive(Clone, Default)]
pub struct Registry {
    readers: Arc<HashMap<Vec<u8>, Arc<ReaderFn>>>,
}

/// A registry under construction; not `Clone`, to keep the building phase
/// single-owner before it is frozen into the cheaply-shareable `Registry`.
#[derive(Default)]
pub struct RegistryBuilder {
    readers: HashMap<Vec<u8>, Arc<ReaderFn>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `reader` for `tag` (which may contain `/` to name a
    /// namespaced tag, e.g. `b"myapp/point"`).
    pub fn register(
        mut self,
        tag: impl Into<Vec<u8>>,
        reader: impl for<'a> Fn(&'a Value<'a>, &'a Arena) -> Result<&'a Value<'a>, String> + Send + Sync + 'static,
    ) -> Self {
        self.readers.insert(tag.into(), Arc::new(reader));
        self
    }

    pub fn build(self) -> Registry {
        Registry { readers: Arc::new(self.readers) }
    }
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn get(&self, tag: &[u8]) -> Option<&Arc<ReaderFn>> {
        self.readers.get(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.readers.is_empty()
    }
}
