//! Per-parse configuration: the reader registry to consult for tagged
//! literals, what to do with an unrecognized tag, whether trailing
//! non-whitespace content after the top-level value is an error, and the
//! recursion-depth cap.

use crate::registry::{Registry, UnknownTagMode};

/// Recursion-depth cap used when the caller does not override it.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Options consulted by [`crate::parse_with_options`] and
/// [`crate::parse_in_with_options`].
#[derive(Clone)]
pub struct ParseOptions {
    pub(crate) registry: Option<Registry>,
    pub(crate) unknown_tag_mode: UnknownTagMode,
    pub(crate) strict: bool,
    pub(crate) max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            registry: None,
            unknown_tag_mode: UnknownTagMode::default(),
            strict: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    pub fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::new()
    }

    pub fn registry(&self) -> Option<&Registry> {
        self.registry.as_ref()
    }

    pub fn unknown_tag_mode(&self) -> UnknownTagMode {
        self.unknown_tag_mode
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

/// Builder for [`ParseOptions`].
#[derive(Clone, Default)]
pub struct ParseOptionsBuilder {
    opts: ParseOptions,
}

impl ParseOptionsBuilder {
    pub fn new() -> Self {
        Self { opts: ParseOptions::default() }
    }

    /// Sets the reader registry consulted for `#tag value` literals.
    pub fn registry(mut self, registry: Registry) -> Self {
        self.opts.registry = Some(registry);
        self
    }

    /// Sets the policy for tags with no registered reader. Defaults to
    /// [`UnknownTagMode::Passthrough`].
    pub fn unknown_tag_mode(mut self, mode: UnknownTagMode) -> Self {
        self.opts.unknown_tag_mode = mode;
        self
    }

    /// When `true`, any non-whitespace, non-comment content left over after
    /// the single top-level value is a [`crate::Error::TrailingContent`]
    /// error rather than being silently ignored. Defaults to `false`.
    pub fn strict(mut self, strict: bool) -> Self {
        self.opts.strict = strict;
        self
    }

    /// Overrides [`DEFAULT_MAX_DEPTH`].
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.opts.max_depth = max_depth;
        self
    }

    pub fn build(self) -> ParseOptions {
        self.opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_match_documented_defaults() {
        let opts = ParseOptions::default();
        assert!(opts.registry().is_none());
        assert_eq!(opts.unknown_tag_mode(), UnknownTagMode::Passthrough);
        assert!(!opts.strict());
        assert_eq!(opts.max_depth(), DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn builder_overrides_apply() {
        let opts = ParseOptions::builder().strict(true).max_depth(8).unknown_tag_mode(UnknownTagMode::Error).build();
        assert!(opts.strict());
        assert_eq!(opts.max_depth(), 8);
        assert_eq!(opts.unknown_tag_mode(), UnknownTagMode::Error);
    }
}
