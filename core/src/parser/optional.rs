//! Optional rule parser: zero-or-one of a wrapped rule.

use std::rc::Rc;

use crate::error::ParseError;
use crate::grammar::Exclusions;
use crate::node::Node;
use crate::token::Token;
use crate::trace::Trace;

use super::{Completion, Outcome, ParseContext, RuleParser, check_not_done};

/// Delegates to the wrapped rule and forces the result to a match: a
/// failed delegate becomes a zero-width success with everything handed
/// back as unparsed.
///
/// Caches under its own name, keyed at the seed's anchor when seeded,
/// else at the result's anchor (the first unparsed token for a
/// zero-width result). The cached value is the delegate's node, so a hit
/// replays the wrapped match without re-running it.
pub(crate) struct OptionalParser {
    name: Rc<str>,
    wrapped: Rc<str>,
    excluded: Exclusions,
    seed: Option<Node>,
    seed_key: Option<(Token, usize)>,
    inner: Option<Box<RuleParser>>,
    first_feed: bool,
    trace: Trace,
    done: bool,
}

impl OptionalParser {
    pub(crate) fn new(
        name: Rc<str>,
        wrapped: Rc<str>,
        trace: Trace,
        seed: Option<Node>,
        excluded: &Exclusions,
    ) -> Self {
        let excluded = excluded.with(&name);
        let seed_key = seed.as_ref().map(|s| (s.token.clone(), s.width()));
        Self {
            name,
            wrapped,
            excluded,
            seed,
            seed_key,
            inner: None,
            first_feed: true,
            trace,
            done: false,
        }
    }

    pub(crate) fn feed(
        &mut self,
        ctx: &mut ParseContext<'_>,
        token: Token,
    ) -> Result<Outcome, ParseError> {
        check_not_done(self.done, &self.name, &token);
        self.trace.out(format_args!("parsing {token}"));

        if self.inner.is_none() {
            if !ctx
                .grammar
                .can_create(&self.wrapped, self.seed.as_ref(), &self.excluded)
            {
                self.trace.out(format_args!("wrapped rule cannot start"));
                self.done = true;
                return Ok(Outcome::Done(Completion::no_match(vec![token])));
            }

            let inner = RuleParser::spawn(
                ctx,
                &self.wrapped,
                &self.trace,
                self.seed.take(),
                &self.excluded,
            )?;
            self.inner = Some(Box::new(inner));
        }

        // The cache is only authoritative for the starting position.
        if self.first_feed {
            self.first_feed = false;
            let key = match &self.seed_key {
                Some((anchor, _)) => anchor.clone(),
                None => token.clone(),
            };

            if ctx.cache.no_match_at(&key, &self.name) {
                self.trace.detail(format_args!("cached no-match"));
                self.done = true;
                return Ok(Outcome::Done(Completion::no_match(vec![token])));
            }

            if let Some(cached) = ctx.cache.match_at(&key, &self.name) {
                self.trace.detail(format_args!("cached match"));
                self.done = true;
                let node = cached.cloned();
                let width = node.as_ref().map_or(0, Node::width);
                let seed_width = self.seed_key.as_ref().map_or(0, |(_, w)| *w);
                return Ok(Outcome::Done(Completion {
                    matched: true,
                    node,
                    unparsed: vec![token],
                    from_cache: width.saturating_sub(seed_width),
                }));
            }
        }

        let inner = self
            .inner
            .as_mut()
            .unwrap_or_else(|| unreachable!("delegate exists past the first feed"));
        match inner.feed(ctx, token)? {
            Outcome::Continue => Ok(Outcome::Continue),
            Outcome::Done(mut completion) => {
                self.done = true;
                self.trace.out(format_args!(
                    "delegate done, matched: {}",
                    completion.matched
                ));

                let key = match (&completion.node, completion.unparsed.first()) {
                    (Some(node), _) => node.token.clone(),
                    (None, Some(next)) => next.clone(),
                    (None, None) => {
                        panic!("optional {:?} completed without a position", self.name)
                    }
                };
                ctx.cache
                    .record_match(key, Rc::clone(&self.name), completion.node.clone());

                completion.matched = true;
                Ok(Outcome::Done(completion))
            }
        }
    }
}
