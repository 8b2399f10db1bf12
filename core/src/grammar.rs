//! Rule registry: building, freezing and querying a grammar.
//!
//! A grammar is assembled once through [`GrammarBuilder`] and frozen by
//! [`GrammarBuilder::build`], which performs every construction-time
//! check: undefined references, duplicate names, illegal immediate
//! self-recursion of optionals and repetitions, empty groups, and cycles
//! in choice expansion. After `build` succeeds the registry is immutable
//! and parsing can never hit a misconfiguration mid-stream.
//!
//! The five rule shapes are a closed enum; everywhere a generic rule
//! must act, a single `match` dispatches on the shape, so the set of
//! grammar forms stays exhaustively checkable.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::GrammarError;
use crate::node::Node;
use crate::token::TokenKind;

/// One grammar rule definition.
#[derive(Debug, Clone)]
pub(crate) enum RuleDef {
    /// Matches exactly one token of the given kind.
    Terminal { token: TokenKind },
    /// Zero-or-one of the wrapped rule.
    Optional { wrapped: Rc<str> },
    /// Zero-or-more of the item rule.
    Repeat { item: Rc<str> },
    /// All items, in order, each required.
    Group { items: Vec<Rc<str>> },
    /// Ordered alternatives; `expanded` is the transitively flattened,
    /// first-occurrence-deduplicated member list computed at build time.
    Choice {
        alternatives: Vec<Rc<str>>,
        expanded: Vec<Rc<str>>,
    },
}

/// Ordered set of rule names currently being attempted by enclosing
/// callers at the same starting token.
///
/// Its only job is to block immediate left recursion; it is deliberately
/// not part of the memoization cache key.
#[derive(Debug, Clone, Default)]
pub(crate) struct Exclusions(Vec<Rc<str>>);

impl Exclusions {
    #[inline]
    pub(crate) fn none() -> Self {
        Self::default()
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| &**n == name)
    }

    /// Returns a copy extended with `name` (no-op copy if present).
    pub(crate) fn with(&self, name: &Rc<str>) -> Self {
        if self.contains(name) {
            return self.clone();
        }
        let mut inner = self.0.clone();
        inner.push(Rc::clone(name));
        Self(inner)
    }
}

/// Append-only collection of rule definitions, not yet validated.
///
/// Registration order is irrelevant; forward references are fine and are
/// resolved by [`GrammarBuilder::build`].
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    rules: HashMap<Rc<str>, RuleDef>,
    order: Vec<Rc<str>>,
}

impl GrammarBuilder {
    /// Creates an empty builder.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, name: &str, def: RuleDef) -> Result<(), GrammarError> {
        if self.rules.contains_key(name) {
            return Err(GrammarError::DuplicateRule(name.to_owned()));
        }
        let name: Rc<str> = Rc::from(name);
        self.order.push(Rc::clone(&name));
        self.rules.insert(name, def);
        Ok(())
    }

    fn intern(&self, name: &str) -> Rc<str> {
        match self.rules.get_key_value(name) {
            Some((key, _)) => Rc::clone(key),
            None => Rc::from(name),
        }
    }

    /// Registers a terminal rule matching one token of kind `token`.
    pub fn terminal(&mut self, name: &str, token: TokenKind) -> Result<(), GrammarError> {
        self.register(name, RuleDef::Terminal { token })
    }

    /// Registers an optional rule wrapping `wrapped`.
    pub fn optional(&mut self, name: &str, wrapped: &str) -> Result<(), GrammarError> {
        let wrapped = self.intern(wrapped);
        self.register(name, RuleDef::Optional { wrapped })
    }

    /// Registers a repetition rule: zero or more of `item`.
    pub fn repeat(&mut self, name: &str, item: &str) -> Result<(), GrammarError> {
        let item = self.intern(item);
        self.register(name, RuleDef::Repeat { item })
    }

    /// Registers a fixed group: every item, in order, required.
    pub fn group(&mut self, name: &str, items: &[&str]) -> Result<(), GrammarError> {
        let items = items.iter().map(|i| self.intern(i)).collect();
        self.register(name, RuleDef::Group { items })
    }

    /// Registers an ordered choice between `alternatives`.
    pub fn choice(&mut self, name: &str, alternatives: &[&str]) -> Result<(), GrammarError> {
        let alternatives = alternatives.iter().map(|a| self.intern(a)).collect();
        self.register(
            name,
            RuleDef::Choice {
                alternatives,
                expanded: Vec::new(),
            },
        )
    }

    /// Freezes the registry, running every construction-time check.
    pub fn build(mut self) -> Result<Grammar, GrammarError> {
        // Interning at registration time can miss forward references;
        // re-point every reference at the registered key.
        for name in &self.order {
            let def = match self.rules.get(name) {
                Some(d) => d.clone(),
                None => continue,
            };
            let rekeyed = match def {
                RuleDef::Optional { wrapped } => RuleDef::Optional {
                    wrapped: self.resolve(&wrapped)?,
                },
                RuleDef::Repeat { item } => RuleDef::Repeat {
                    item: self.resolve(&item)?,
                },
                RuleDef::Group { items } => {
                    if items.is_empty() {
                        return Err(GrammarError::EmptyGroup(name.to_string()));
                    }
                    RuleDef::Group {
                        items: items
                            .iter()
                            .map(|i| self.resolve(i))
                            .collect::<Result<_, _>>()?,
                    }
                }
                RuleDef::Choice { alternatives, .. } => RuleDef::Choice {
                    alternatives: alternatives
                        .iter()
                        .map(|a| self.resolve(a))
                        .collect::<Result<_, _>>()?,
                    expanded: Vec::new(),
                },
                RuleDef::Terminal { .. } => continue,
            };
            self.rules.insert(Rc::clone(name), rekeyed);
        }

        let mut grammar = Grammar {
            rules: self.rules,
            order: self.order,
        };
        grammar.expand_choices()?;
        grammar.check_self_containment()?;
        Ok(grammar)
    }

    fn resolve(&self, name: &Rc<str>) -> Result<Rc<str>, GrammarError> {
        match self.rules.get_key_value(&**name) {
            Some((key, _)) => Ok(Rc::clone(key)),
            None => Err(GrammarError::UndefinedRule(name.to_string())),
        }
    }
}

/// A frozen, validated rule registry.
///
/// Read-only during parsing; one grammar can drive any number of
/// sequential parse runs, each with its own cache.
#[derive(Debug)]
pub struct Grammar {
    rules: HashMap<Rc<str>, RuleDef>,
    order: Vec<Rc<str>>,
}

impl Grammar {
    /// Whether a rule with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Names of all registered rules, in registration order.
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|n| &**n)
    }

    pub(crate) fn def(&self, name: &str) -> &RuleDef {
        match self.rules.get(name) {
            Some(def) => def,
            // Every reference is resolved by build(); a miss here is an
            // engine bug, not a user error.
            None => unreachable!("rule {name:?} was validated at build time"),
        }
    }

    pub(crate) fn interned(&self, name: &str) -> Rc<str> {
        match self.rules.get_key_value(name) {
            Some((key, _)) => Rc::clone(key),
            None => unreachable!("rule {name:?} was validated at build time"),
        }
    }

    /// Whether a node named `candidate` could be produced by (or nested
    /// transparently under) the rule `name`.
    pub(crate) fn is_member(&self, name: &str, candidate: &str) -> bool {
        let mut visited = Vec::new();
        self.member_walk(name, candidate, &mut visited)
    }

    fn member_walk<'g>(
        &'g self,
        name: &'g str,
        candidate: &str,
        visited: &mut Vec<&'g str>,
    ) -> bool {
        if visited.contains(&name) {
            return false;
        }
        visited.push(name);
        match self.def(name) {
            RuleDef::Terminal { .. } | RuleDef::Repeat { .. } | RuleDef::Group { .. } => {
                name == candidate
            }
            RuleDef::Optional { wrapped } => {
                name == candidate || self.member_walk(wrapped, candidate, visited)
            }
            // A choice is transparent: it never tags output with its own
            // name, so membership means membership of an alternative.
            RuleDef::Choice { expanded, .. } => expanded
                .iter()
                .any(|alt| self.member_walk(alt, candidate, visited)),
        }
    }

    /// Whether the rule could possibly begin a successful match given an
    /// optional seed node and the exclusion context.
    pub(crate) fn can_create(
        &self,
        name: &str,
        seed: Option<&Node>,
        excluded: &Exclusions,
    ) -> bool {
        match self.def(name) {
            RuleDef::Terminal { .. } => {
                !excluded.contains(name) && seed.is_none_or(|s| &*s.name == name)
            }
            RuleDef::Optional { wrapped } => {
                !excluded.contains(name)
                    && self.can_create(wrapped, seed, &excluded.with(&self.interned(name)))
            }
            RuleDef::Repeat { item } => {
                if excluded.contains(name) {
                    return false;
                }
                let inner = excluded.with(&self.interned(name));
                if let Some(s) = seed {
                    if self.is_member(item, &s.name) && !inner.contains(&s.name) {
                        return true;
                    }
                }
                self.can_create(item, seed, &inner)
            }
            RuleDef::Group { items } => {
                if excluded.contains(name) {
                    return false;
                }
                let first = &items[0];
                if self.can_create(first, seed, &excluded.with(&self.interned(name))) {
                    return true;
                }
                // A seed that is itself a valid first item lets a group
                // resume mid-way, e.g. when a choice re-probes with its
                // current best as the committed prefix.
                seed.is_some_and(|s| self.is_member(first, &s.name))
            }
            RuleDef::Choice { expanded, .. } => expanded
                .iter()
                .any(|alt| self.can_create(alt, seed, excluded)),
        }
    }

    fn expand_choices(&mut self) -> Result<(), GrammarError> {
        let names: Vec<Rc<str>> = self.order.clone();
        for name in names {
            if !matches!(self.rules.get(&*name), Some(RuleDef::Choice { .. })) {
                continue;
            }
            let mut in_progress = Vec::new();
            let expanded = self.expand_one(&name, &mut in_progress)?;
            if let Some(RuleDef::Choice {
                expanded: slot, ..
            }) = self.rules.get_mut(&*name)
            {
                *slot = expanded;
            }
        }
        Ok(())
    }

    fn expand_one(
        &self,
        name: &Rc<str>,
        in_progress: &mut Vec<Rc<str>>,
    ) -> Result<Vec<Rc<str>>, GrammarError> {
        if in_progress.iter().any(|n| n == name) {
            return Err(GrammarError::ChoiceExpansionCycle(name.to_string()));
        }
        in_progress.push(Rc::clone(name));

        let alternatives = match self.def(name) {
            RuleDef::Choice { alternatives, .. } => alternatives.clone(),
            _ => unreachable!("expand_one is only called for choices"),
        };

        let mut expanded = Vec::new();
        for alt in &alternatives {
            match self.def(alt) {
                RuleDef::Choice { .. } => {
                    for nested in self.expand_one(alt, in_progress)? {
                        if !expanded.contains(&nested) {
                            expanded.push(nested);
                        }
                    }
                }
                _ => {
                    if !expanded.contains(alt) {
                        expanded.push(Rc::clone(alt));
                    }
                }
            }
        }

        in_progress.pop();
        Ok(expanded)
    }

    fn check_self_containment(&self) -> Result<(), GrammarError> {
        for name in &self.order {
            match self.def(name) {
                RuleDef::Optional { wrapped } => {
                    if self.is_member(wrapped, name) {
                        return Err(GrammarError::OptionalSelfReference(name.to_string()));
                    }
                }
                RuleDef::Repeat { item } => {
                    if self.is_member(item, name) {
                        return Err(GrammarError::RepeatSelfReference(name.to_string()));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}
