//! Terminal rule parser: matches exactly one token of a fixed kind.

use std::rc::Rc;

use crate::error::ParseError;
use crate::node::Node;
use crate::token::{Token, TokenKind};
use crate::trace::Trace;

use super::{Completion, Outcome, check_not_done};

/// Settles on the first fed token. Results are cheap enough that they
/// are never cached.
pub(crate) struct TerminalParser {
    name: Rc<str>,
    kind: TokenKind,
    seed: Option<Node>,
    trace: Trace,
    done: bool,
}

impl TerminalParser {
    pub(crate) fn new(name: Rc<str>, kind: TokenKind, trace: Trace, seed: Option<Node>) -> Self {
        Self {
            name,
            kind,
            seed,
            trace,
            done: false,
        }
    }

    pub(crate) fn feed(&mut self, token: Token) -> Result<Outcome, ParseError> {
        check_not_done(self.done, &self.name, &token);
        self.done = true;
        self.trace.out(format_args!("parsing {token}"));

        // A seed of the right name is already the whole match; the fed
        // token stays with the caller.
        if let Some(seed) = self.seed.take() {
            self.trace.out(format_args!("matched from seed"));
            return Ok(Outcome::Done(Completion {
                matched: true,
                node: Some(seed),
                unparsed: vec![token],
                from_cache: 0,
            }));
        }

        if token.kind != self.kind {
            self.trace.out(format_args!("token kind mismatch"));
            return Ok(Outcome::Done(Completion::no_match(vec![token])));
        }

        self.trace.out(format_args!("matched"));
        let node = Node::leaf(Rc::clone(&self.name), token);
        Ok(Outcome::Done(Completion {
            matched: true,
            node: Some(node),
            unparsed: Vec::new(),
            from_cache: 0,
        }))
    }
}
