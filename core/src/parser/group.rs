//! Fixed group parser: every item, in registration order, required.

use std::mem;
use std::rc::Rc;

use crate::error::ParseError;
use crate::grammar::Exclusions;
use crate::node::Node;
use crate::token::Token;
use crate::trace::Trace;

use super::{Backlog, Completion, Outcome, ParseContext, RuleParser, check_not_done};

/// Walks its item list left to right; any item failing fails the whole
/// group. Only the first item sees the external seed and exclusion
/// context; later items start unconstrained.
///
/// Tokens physically consumed by already-matched items are kept so that
/// a late failure can hand every consumed token back to the caller in
/// source order. Seed tokens are never handed back; the caller owns
/// them.
pub(crate) struct GroupParser {
    name: Rc<str>,
    items: Vec<Rc<str>>,
    next_item: usize,
    excluded: Exclusions,
    seed: Option<Node>,
    seed_key: Option<(Token, usize)>,
    children: Vec<Node>,
    consumed: Vec<Token>,
    fed: Vec<Token>,
    backlog: Backlog,
    current: Option<Box<RuleParser>>,
    started: bool,
    first_feed: bool,
    trace: Trace,
    done: bool,
}

impl GroupParser {
    pub(crate) fn new(
        name: Rc<str>,
        items: Vec<Rc<str>>,
        trace: Trace,
        seed: Option<Node>,
        excluded: &Exclusions,
    ) -> Self {
        let excluded = excluded.with(&name);
        let seed_key = seed.as_ref().map(|s| (s.token.clone(), s.width()));
        Self {
            name,
            items,
            next_item: 0,
            excluded,
            seed,
            seed_key,
            children: Vec::new(),
            consumed: Vec::new(),
            fed: Vec::new(),
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
                // Covered by an already-matched item, so a later failure
                // must still hand it back.
                self.consumed.push(t);
                continue;
            }

            self.trace.out(format_args!("parsing {t}"));

            while self.current.is_none() {
                let item = Rc::clone(&self.items[self.next_item]);
                let (seed, excluded) = if self.started {
                    (None, Exclusions::none())
                } else {
                    (self.seed.clone(), self.excluded.clone())
                };

                if ctx.grammar.can_create(&item, seed.as_ref(), &excluded) {
                    let parser = RuleParser::spawn(ctx, &item, &self.trace, seed, &excluded)?;
                    self.current = Some(Box::new(parser));
                    self.next_item += 1;
                    break;
                }

                if !self.started && self.adopt_seed(ctx) {
                    self.started = true;
                    self.next_item += 1;
                    if self.next_item == self.items.len() {
                        self.backlog.requeue(vec![t]);
                        return Ok(Outcome::Done(self.finalize_match(ctx)));
                    }
                    continue;
                }

                self.trace.out(format_args!("item cannot start"));
                self.done = true;
                self.backlog.requeue(vec![t]);
                let mut unparsed = mem::take(&mut self.consumed);
                unparsed.extend(self.backlog.drain());
                return Ok(Outcome::Done(Completion::no_match(unparsed)));
            }

            if self.first_feed {
                self.first_feed = false;
                let key = match &self.seed_key {
                    Some((anchor, _)) => anchor.clone(),
                    None => t.clone(),
                };

                if ctx.cache.no_match_at(&key, &self.name) {
                    self.trace.detail(format_args!("cached no-match"));
                    self.done = true;
                    return Ok(Outcome::Done(Completion::no_match(vec![t])));
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
                        unparsed: vec![t],
                        from_cache: width.saturating_sub(seed_width),
                    }));
                }
            }

            let current = match self.current.as_mut() {
                Some(p) => p,
                None => unreachable!("item parser was created above"),
            };
            self.fed.push(t.clone());
            let completion = match current.feed(ctx, t)? {
                Outcome::Continue => continue,
                Outcome::Done(c) => c,
            };

            self.current = None;
            let used = self.fed.len().saturating_sub(completion.unparsed.len());
            self.consumed.extend(self.fed.drain(..used));
            self.fed.clear();
            self.backlog.requeue(completion.unparsed);

            if completion.matched {
                self.started = true;
                if let Some(node) = completion.node {
                    self.children.push(node);
                    let dropped = self.backlog.absorb(completion.from_cache);
                    self.consumed.extend(dropped);
                }
                if self.next_item == self.items.len() {
                    return Ok(Outcome::Done(self.finalize_match(ctx)));
                }
                continue;
            }

            if !self.started {
                self.started = true;
                if self.adopt_seed(ctx) {
                    if self.next_item == self.items.len() {
                        return Ok(Outcome::Done(self.finalize_match(ctx)));
                    }
                    continue;
                }
            }

            return Ok(Outcome::Done(self.fail(ctx)));
        }
    }

    /// Lets a seed that is itself a valid first item stand in for it.
    fn adopt_seed(&mut self, ctx: &ParseContext<'_>) -> bool {
        match self.seed.take() {
            Some(seed) if ctx.grammar.is_member(&self.items[0], &seed.name) => {
                self.trace.out(format_args!("adopting seed as first item"));
                self.children.push(seed);
                true
            }
            other => {
                self.seed = other;
                false
            }
        }
    }

    fn finalize_match(&mut self, ctx: &mut ParseContext<'_>) -> Completion {
        self.done = true;
        self.trace.out(format_args!("done"));

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

    fn fail(&mut self, ctx: &mut ParseContext<'_>) -> Completion {
        self.done = true;
        self.trace.out(format_args!("item failed"));

        let key = self
            .children
            .first()
            .map(|c| c.token.clone())
            .or_else(|| self.backlog.front().cloned())
            .unwrap_or_else(Token::end_of_input);
        ctx.cache.record_no_match(key, Rc::clone(&self.name));

        let mut unparsed = mem::take(&mut self.consumed);
        unparsed.extend(self.backlog.drain());
        Completion::no_match(unparsed)
    }
}
