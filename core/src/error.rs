//! Error types.
//!
//! Two disjoint classes. [`GrammarError`] covers grammar
//! misconfiguration and is fully surfaced before the first token is
//! read, either by [`GrammarBuilder::build`](crate::GrammarBuilder) or
//! by the driver's root-rule pre-check. [`ParseError`] covers failures
//! of an individual run against actual input.
//!
//! A sub-parse that simply does not match is *neither*: enclosing
//! combinators use it to pick another path, and only the root driver
//! turns an unrecovered mismatch into [`ParseError::UnexpectedToken`].

use thiserror::Error;

/// Grammar construction errors, all detected before parsing begins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// A rule name was registered twice. The registry is append-only.
    #[error("duplicate rule definition: {0}")]
    DuplicateRule(String),

    /// A rule references a name that was never registered.
    #[error("undefined rule: {0}")]
    UndefinedRule(String),

    /// An optional rule wraps a rule that already contains it as a
    /// direct member, so it could recurse into itself without consuming
    /// input.
    #[error("optional rule containing itself: {0}")]
    OptionalSelfReference(String),

    /// A repetition rule whose item already contains it as a direct
    /// member.
    #[error("repetition rule containing itself: {0}")]
    RepeatSelfReference(String),

    /// A group was declared with no items.
    #[error("group without items: {0}")]
    EmptyGroup(String),

    /// Flattening a choice's alternatives revisited a choice already
    /// being expanded.
    #[error("cycle in choice expansion: {0}")]
    ChoiceExpansionCycle(String),

    /// The requested root rule can not start a parse.
    #[error("rule cannot start a parse: {0}")]
    InvalidRoot(String),
}

/// Errors of one parse run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A token that no remaining grammar path could consume.
    #[error("unexpected token {text:?} at {line}:{column}")]
    UnexpectedToken {
        /// Literal text of the offending token.
        text: String,
        /// Source line of the offending token.
        line: u32,
        /// Source column of the offending token.
        column: u32,
    },

    /// The input ended while the grammar still required more tokens.
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,

    /// Parser nesting exceeded [`ParseConfig::max_depth`](crate::ParseConfig).
    #[error("parser nesting too deep: depth {depth} exceeds limit {limit}")]
    DepthLimitExceeded {
        /// Nesting depth that was about to be entered.
        depth: usize,
        /// Configured limit.
        limit: usize,
    },

    /// Grammar misconfiguration detected by the driver's pre-check.
    #[error(transparent)]
    Grammar(#[from] GrammarError),
}

impl ParseError {
    pub(crate) fn unexpected(token: &crate::Token) -> Self {
        ParseError::UnexpectedToken {
            text: token.text.clone(),
            line: token.line,
            column: token.column,
        }
    }
}
