//! Repetition rule parser: zero or more of an item rule.

use std::mem;
use std::rc::Rc;

use crate::error::ParseError;
use crate::grammar::Exclusions;
use crate::node::Node;
use crate::token::Token;
use crate::trace::Trace;

use super::{Backlog, Completion, Outcome, ParseContext, RuleParser, check_not_done};

/// Greedily parses item after item until one fails, then settles on a
/// branch over everything collected. Zero items is still a match.
///
/// Only the first item attempt sees the external seed and exclusion
/// context; later attempts exclude just the repetition itself, so the
/// item rule is free to start from scratch at each boundary.
pub(crate) struct RepeatParser {
    name: Rc<str>,
    item: Rc<str>,
    excluded: Exclusions,
    rest_excluded: Exclusions,
    seed: Option<Node>,
    seed_key: Option<(Token, usize)>,
    children: Vec<Node>,
    backlog: Backlog,
    current: Option<Box<RuleParser>>,
    started: bool,
    first_feed: bool,
    trace: Trace,
    done: bool,
}

impl RepeatParser {
    pub(crate) fn new(
        name: Rc<str>,
        item: Rc<str>,
        trace: Trace,
        seed: Option<Node>,
        excluded: &Exclusions,
    ) -> Self {
        let excluded = excluded.with(&name);
        let rest_excluded = Exclusions::none().with(&name);
        let seed_key = seed.as_ref().map(|s| (s.token.clone(), s.width()));
        Self {
            name,
            item,
            excluded,
            rest_excluded,
            seed,
            seed_key,
            children: Vec::new(),
            backlog: Backlog::default(),
            current: None,
            started: false,
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

        let mut pending = Some(token);
        loop {
            let t = match pending.take().or_else(|| self.backlog.pop()) {
                Some(t) => t,
                None => return Ok(Outcome::Continue),
            };

            if self.backlog.take_skip() {
                self.trace.detail(format_args!("skipping {t}, covered by cache"));
                continue;
            }

            self.trace.out(format_args!("parsing {t}"));

            if self.current.is_none() {
                let (seed, excluded) = if self.started {
                    (None, &self.rest_excluded)
                } else {
                    (self.seed.clone(), &self.excluded)
                };

                if !ctx.grammar.can_create(&self.item, seed.as_ref(), excluded) {
                    self.trace.out(format_args!("item cannot start"));
                    self.done = true;
                    let mut unparsed = vec![t];
                    unparsed.extend(self.backlog.drain());
                    return Ok(Outcome::Done(Completion::no_match(unparsed)));
                }

                let parser = RuleParser::spawn(ctx, &self.item, &self.trace, seed, excluded)?;
                self.current = Some(Box::new(parser));
            }

            if self.first_feed {
                self.first_feed = false;
                let key = match &self.seed_key {
                    Some((anchor, _)) => anchor.clone(),
                    None => t.clone(),
                };

                if let Some(cached) = ctx.cache.match_at(&key, &self.name) {
                    self.trace.detail(format_args!("cached match"));
                    self.done = true;
                    let node = cached.cloned();
                    let width = node.as_ref().map_or(0, Node::width);
                    let seed_width = self.seed_key.as_ref().map_or(0, |(_, w)| *w);
                    return Ok(Outcome::Done(Completion {
                        matched: true,
                        node,
                        unparsed: vec![t],
                        from_cache: width.saturating_sub(seed_width),
                    }));
                }
            }

            let current = match self.current.as_mut() {
                Some(p) => p,
                None => unreachable!("item parser was created above"),
            };
            let completion = match current.feed(ctx, t)? {
                Outcome::Continue => continue,
                Outcome::Done(c) => c,
            };

            self.current = None;
            let Completion {
                matched,
                node,
                unparsed,
                from_cache,
            } = completion;
            self.backlog.requeue(unparsed);

            match node {
                Some(node) if matched && node.width() > 0 => {
                    self.started = true;
                    self.children.push(node);
                    let _ = self.backlog.absorb(from_cache);
                }
                _ => {
                    // A seed that is itself an item stands in for the
                    // failed first attempt.
                    if !self.started {
                        self.started = true;
                        if let Some(seed) = self.seed.take() {
                            if ctx.grammar.is_member(&self.item, &seed.name) {
                                self.trace.out(format_args!("adopting seed as item"));
                                self.children.push(seed);
                            }
                        }
                    }
                    return Ok(Outcome::Done(self.finalize(ctx)));
                }
            }
        }
    }

    fn finalize(&mut self, ctx: &mut ParseContext<'_>) -> Completion {
        self.done = true;
        self.trace
            .out(format_args!("done, items: {}", self.children.len()));

        let anchor = self
            .children
            .first()
            .map(|c| c.token.clone())
            .or_else(|| self.backlog.front().cloned())
            .unwrap_or_else(Token::end_of_input);
        let node = Node::branch(
            Rc::clone(&self.name),
            anchor.clone(),
            mem::take(&mut self.children),
        );
        ctx.cache
            .record_match(anchor, Rc::clone(&self.name), Some(node.clone()));

        Completion {
            matched: true,
            node: Some(node),
            unparsed: self.backlog.drain(),
            from_cache: self.backlog.pending_skip(),
        }
    }
}
