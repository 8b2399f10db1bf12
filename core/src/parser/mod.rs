//! Parser instances and the plumbing they share.
//!
//! A [`RuleParser`] is one single-use attempt to match one rule at one
//! input position. It is driven push-style: the owner feeds tokens one at
//! a time and gets back [`Outcome::Continue`] until the instance settles
//! on [`Outcome::Done`]. Combinator instances own their child instances
//! and relay tokens downward, so the instance tree mirrors the rule
//! nesting at the current position.
//!
//! Collections (repetition, group, choice) buffer look-ahead in a
//! [`Backlog`]: tokens a child handed back as unparsed are requeued at
//! the front and re-fed before any new input, and cached results that
//! cover more tokens than the queue holds turn the surplus into a skip
//! count that silently swallows tokens as they arrive.

pub(crate) mod choice;
pub(crate) mod group;
pub(crate) mod optional;
pub(crate) mod repeat;
pub(crate) mod terminal;

use std::collections::VecDeque;

use crate::cache::ParseCache;
use crate::config::ParseConfig;
use crate::error::ParseError;
use crate::grammar::{Exclusions, Grammar, RuleDef};
use crate::node::Node;
use crate::token::Token;
use crate::trace::Trace;

use choice::ChoiceParser;
use group::GroupParser;
use optional::OptionalParser;
use repeat::RepeatParser;
use terminal::TerminalParser;

/// Everything a parser instance needs besides its own state: the frozen
/// grammar, the per-run cache and the run configuration.
pub(crate) struct ParseContext<'g> {
    pub(crate) grammar: &'g Grammar,
    pub(crate) cache: ParseCache,
    pub(crate) config: ParseConfig,
}

/// Result of feeding one token to a parser instance.
#[derive(Debug)]
pub(crate) enum Outcome {
    /// The token was consumed or queued; feed the next one.
    Continue,
    /// The instance has settled; it must not be fed again.
    Done(Completion),
}

/// Terminal state of one parser instance.
#[derive(Debug)]
pub(crate) struct Completion {
    /// Whether the rule matched. A match with `node: None` is a
    /// zero-width success; `matched: false` is a failure the caller
    /// backtracks over, never an error.
    pub(crate) matched: bool,
    pub(crate) node: Option<Node>,
    /// Tokens fed to (or queued by) this instance that its result does
    /// not cover, in source order.
    pub(crate) unparsed: Vec<Token>,
    /// Tokens covered by `node` beyond those physically fed, i.e. pulled
    /// in through the memoization cache. Seed tokens never count; the
    /// caller already owns them.
    pub(crate) from_cache: usize,
}

impl Completion {
    pub(crate) fn no_match(unparsed: Vec<Token>) -> Self {
        Self {
            matched: false,
            node: None,
            unparsed,
            from_cache: 0,
        }
    }
}

/// Look-ahead buffer of a collection parser.
///
/// `queue` holds tokens already received but not yet relayed to a child;
/// `skip` counts upcoming tokens that a cached result has already
/// covered and that must be swallowed on arrival.
#[derive(Debug, Default)]
pub(crate) struct Backlog {
    queue: VecDeque<Token>,
    skip: usize,
}

impl Backlog {
    /// Puts a child's unparsed tokens back at the front, before any
    /// older queued look-ahead.
    pub(crate) fn requeue(&mut self, unparsed: Vec<Token>) {
        for t in unparsed.into_iter().rev() {
            self.queue.push_front(t);
        }
    }

    /// Accounts for `from_cache` tokens covered by a cached result:
    /// drops them from the queue front (returning them) and converts any
    /// surplus into skips of upcoming tokens.
    pub(crate) fn absorb(&mut self, from_cache: usize) -> Vec<Token> {
        let take = from_cache.min(self.queue.len());
        let dropped = self.queue.drain(..take).collect();
        self.skip += from_cache - take;
        dropped
    }

    /// Swallows one arriving token if a skip is pending.
    pub(crate) fn take_skip(&mut self) -> bool {
        if self.skip > 0 {
            self.skip -= 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn pop(&mut self) -> Option<Token> {
        self.queue.pop_front()
    }

    pub(crate) fn front(&self) -> Option<&Token> {
        self.queue.front()
    }

    /// Takes the whole queue, in source order, for a completion.
    pub(crate) fn drain(&mut self) -> Vec<Token> {
        self.queue.drain(..).collect()
    }

    /// Skips still pending at completion; reported as `from_cache` so
    /// the owner keeps swallowing the covered tokens.
    pub(crate) fn pending_skip(&self) -> usize {
        self.skip
    }
}

pub(crate) fn check_not_done(done: bool, name: &str, token: &Token) {
    if done {
        panic!("parser for rule {name:?} fed after completion: {token}");
    }
}

/// One single-use parser instance for a named rule.
pub(crate) enum RuleParser {
    Terminal(TerminalParser),
    Optional(OptionalParser),
    Repeat(RepeatParser),
    Group(GroupParser),
    Choice(ChoiceParser),
}

impl RuleParser {
    /// Instantiates a parser for `name`, nested under `parent`.
    ///
    /// The caller is expected to have verified `can_create` first; the
    /// only runtime failure here is the nesting guard.
    pub(crate) fn spawn(
        ctx: &ParseContext<'_>,
        name: &str,
        parent: &Trace,
        seed: Option<Node>,
        excluded: &Exclusions,
    ) -> Result<Self, ParseError> {
        let trace = parent.extend(name);
        if trace.depth() > ctx.config.max_depth {
            return Err(ParseError::DepthLimitExceeded {
                depth: trace.depth(),
                limit: ctx.config.max_depth,
            });
        }

        let name = ctx.grammar.interned(name);
        Ok(match ctx.grammar.def(&name) {
            RuleDef::Terminal { token } => {
                Self::Terminal(TerminalParser::new(name, *token, trace, seed))
            }
            RuleDef::Optional { wrapped } => Self::Optional(OptionalParser::new(
                name,
                wrapped.clone(),
                trace,
                seed,
                excluded,
            )),
            RuleDef::Repeat { item } => {
                Self::Repeat(RepeatParser::new(name, item.clone(), trace, seed, excluded))
            }
            RuleDef::Group { items } => {
                Self::Group(GroupParser::new(name, items.clone(), trace, seed, excluded))
            }
            RuleDef::Choice { expanded, .. } => Self::Choice(ChoiceParser::new(
                name,
                expanded.clone(),
                trace,
                seed,
                excluded,
            )),
        })
    }

    /// Feeds one token.
    ///
    /// # Panics
    ///
    /// Panics if the instance has already completed; that is a misuse of
    /// the protocol by the caller, never an input failure.
    pub(crate) fn feed(
        &mut self,
        ctx: &mut ParseContext<'_>,
        token: Token,
    ) -> Result<Outcome, ParseError> {
        match self {
            Self::Terminal(p) => p.feed(token),
            Self::Optional(p) => p.feed(ctx, token),
            Self::Repeat(p) => p.feed(ctx, token),
            Self::Group(p) => p.feed(ctx, token),
            Self::Choice(p) => p.feed(ctx, token),
        }
    }
}
