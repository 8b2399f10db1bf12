//! Parse configuration.
//!
//! [`ParseConfig`] tunes one parse run: how deeply rule instances may
//! nest, and how loudly the run narrates itself. Parser nesting is
//! bounded by grammar structure rather than input length for flat
//! grammars, but recursive grammars over deeply nested input grow the
//! instance tree with the input, so the depth limit guards the stack the
//! same way `serde_json`'s recursion limit does.

use crate::trace::TraceLevel;

/// Configuration for one parse run.
///
/// # Default Values
///
/// | Setting     | Default | Rationale                     |
/// |-------------|---------|-------------------------------|
/// | `max_depth` | 128     | Matches serde_json's default  |
/// | `trace`     | `Off`   | Narration is opt-in           |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseConfig {
    /// Maximum allowed rule-instance nesting depth.
    ///
    /// Exceeding it fails the run with
    /// [`ParseError::DepthLimitExceeded`](crate::ParseError).
    pub max_depth: usize,

    /// Verbosity of the structured trace context.
    pub trace: TraceLevel,
}

impl Default for ParseConfig {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl ParseConfig {
    /// Default configuration, usable in const contexts.
    pub const DEFAULT: Self = Self {
        max_depth: 128,
        trace: TraceLevel::Off,
    };

    /// Creates a configuration with default values.
    #[inline]
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    /// Sets the maximum nesting depth. Use `usize::MAX` to disable the
    /// limit.
    #[inline]
    pub const fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the trace verbosity.
    #[inline]
    pub const fn with_trace(mut self, level: TraceLevel) -> Self {
        self.trace = level;
        self
    }

    /// Disables the nesting limit.
    ///
    /// # Warning
    ///
    /// Only use this when parsing trusted input; a recursive grammar
    /// over hostile, deeply nested input can overflow the stack.
    #[inline]
    pub const fn disable_depth_limit(self) -> Self {
        self.with_max_depth(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ParseConfig::default();
        assert_eq!(config.max_depth, 128);
        assert_eq!(config.trace, TraceLevel::Off);
    }

    #[test]
    fn test_builder() {
        let config = ParseConfig::new()
            .with_max_depth(256)
            .with_trace(TraceLevel::Debug);
        assert_eq!(config.max_depth, 256);
        assert_eq!(config.trace, TraceLevel::Debug);
    }

    #[test]
    fn test_disable_depth_limit() {
        let config = ParseConfig::new().disable_depth_limit();
        assert_eq!(config.max_depth, usize::MAX);
    }
}
