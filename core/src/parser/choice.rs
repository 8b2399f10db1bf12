//! Choice (union) parser: longest match among flattened alternatives.

use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::ParseError;
use crate::grammar::Exclusions;
use crate::node::Node;
use crate::token::Token;
use crate::trace::Trace;

use super::{Backlog, Completion, Outcome, ParseContext, RuleParser, check_not_done};

/// Probes its flattened alternatives in registration order. Whenever a
/// probe produces a strictly wider match than the current best, the best
/// is replaced and the whole candidate list is re-probed, each candidate
/// seeded with the best so it can extend it. The choice settles when no
/// remaining candidate can start or improve.
///
/// The chosen node keeps the winning alternative's name; a choice never
/// tags output with its own.
pub(crate) struct ChoiceParser {
    name: Rc<str>,
    alternatives: Vec<Rc<str>>,
    active: VecDeque<Rc<str>>,
    excluded: Exclusions,
    best: Option<Node>,
    matched: bool,
    backlog: Backlog,
    current: Option<Box<RuleParser>>,
    trace: Trace,
    done: bool,
}

impl ChoiceParser {
    pub(crate) fn new(
        name: Rc<str>,
        alternatives: Vec<Rc<str>>,
        trace: Trace,
        seed: Option<Node>,
        excluded: &Exclusions,
    ) -> Self {
        let excluded = excluded.with(&name);
        let active = alternatives.iter().cloned().collect();
        Self {
            name,
            alternatives,
            active,
            excluded,
            best: seed,
            matched: false,
            backlog: Backlog::default(),
            current: None,
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

            while self.current.is_none() {
                let alt = match self.active.pop_front() {
                    Some(alt) => alt,
                    None => {
                        self.backlog.requeue(vec![t]);
                        return Ok(Outcome::Done(self.finalize()));
                    }
                };

                if ctx.grammar.can_create(&alt, self.best.as_ref(), &self.excluded) {
                    self.trace.out(format_args!("probing alternative {alt}"));
                    let parser =
                        RuleParser::spawn(ctx, &alt, &self.trace, self.best.clone(), &self.excluded)?;
                    self.current = Some(Box::new(parser));
                }
            }

            let current = match self.current.as_mut() {
                Some(p) => p,
                None => unreachable!("candidate parser was created above"),
            };
            let completion = match current.feed(ctx, t)? {
                Outcome::Continue => continue,
                Outcome::Done(c) => c,
            };

            self.current = None;
            let width = completion.node.as_ref().map_or(0, Node::width);
            let best_width = self.best.as_ref().map_or(0, Node::width);
            let adopt = completion.matched && (!self.matched || width > best_width);
            self.backlog.requeue(completion.unparsed);

            if adopt {
                self.trace
                    .out(format_args!("new best match, width {width}"));
                self.matched = true;
                self.best = completion.node;
                // Every alternative gets another chance to extend the
                // new best.
                self.active = self.alternatives.iter().cloned().collect();
                let _ = self.backlog.absorb(completion.from_cache);
            }
        }
    }

    fn finalize(&mut self) -> Completion {
        self.done = true;
        self.trace
            .out(format_args!("done, matched: {}", self.matched));

        Completion {
            matched: self.matched,
            node: self.best.take(),
            unparsed: self.backlog.drain(),
            from_cache: self.backlog.pending_skip(),
        }
    }
}
