//! Structured trace context.
//!
//! Every rule instance carries a [`Trace`]: the slash-joined path of
//! rule names entered so far plus a verbosity level. The path doubles as
//! the nesting-depth measure for the depth limit. Narration goes through
//! the [`tracing`] facade; the actual sink (subscriber) is the embedding
//! application's business, and tracing must never affect parse results.

use core::fmt;

/// Verbosity of parse narration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum TraceLevel {
    /// No narration.
    #[default]
    Off,
    /// Narrate rule entry and completion, at `tracing` debug level.
    Rules,
    /// Additionally narrate queue and cache traffic, at `tracing` trace
    /// level.
    Debug,
}

/// The path of rule instances leading to the current one.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    level: TraceLevel,
    path: String,
    depth: usize,
}

impl Trace {
    /// Creates a root trace with the given verbosity.
    #[inline]
    pub fn new(level: TraceLevel) -> Self {
        Self {
            level,
            path: String::new(),
            depth: 0,
        }
    }

    /// Extends the path by one rule name, for a child instance.
    pub fn extend(&self, name: &str) -> Self {
        let path = if self.path.is_empty() {
            name.to_owned()
        } else {
            format!("{}/{}", self.path, name)
        };
        Self {
            level: self.level,
            path,
            depth: self.depth + 1,
        }
    }

    /// Current nesting depth (number of path segments).
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Narrates a rule-level event.
    pub fn out(&self, args: fmt::Arguments<'_>) {
        if self.level >= TraceLevel::Rules {
            tracing::debug!(path = %self.path, "{args}");
        }
    }

    /// Narrates a detail-level event.
    pub fn detail(&self, args: fmt::Arguments<'_>) {
        if self.level >= TraceLevel::Debug {
            tracing::trace!(path = %self.path, "{args}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_builds_path_and_depth() {
        let root = Trace::new(TraceLevel::Off);
        assert_eq!(root.depth(), 0);

        let a = root.extend("expr");
        let b = a.extend("sum");
        assert_eq!(a.depth(), 1);
        assert_eq!(b.depth(), 2);
        assert_eq!(b.path, "expr/sum");
    }

    #[test]
    fn test_levels_are_ordered() {
        assert!(TraceLevel::Off < TraceLevel::Rules);
        assert!(TraceLevel::Rules < TraceLevel::Debug);
    }
}
