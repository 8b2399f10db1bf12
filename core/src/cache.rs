//! Token-indexed memoization for one parse run.
//!
//! The same rule is routinely re-attempted at the same starting token:
//! sibling alternatives of a choice probe for a longer match, repetitions
//! retry their item, and backtracking re-enters rules from a different
//! call path. The cache makes those re-attempts O(1) by remembering, per
//! (starting token, rule name), either the definitively matched node or
//! the fact that the rule does not match there.
//!
//! A cache is created fresh for every parse run and discarded afterwards;
//! concurrent or repeated parses never share one.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::node::Node;
use crate::token::Token;

#[derive(Debug, Default)]
struct Slot {
    // A recorded match may be `None`: a zero-width success, e.g. an
    // optional that matched nothing at this position.
    matches: HashMap<Rc<str>, Option<Node>>,
    failures: HashSet<Rc<str>>,
}

/// Packrat table keyed by (starting token, rule name).
///
/// Two deliberate asymmetries: a match, once recorded, is authoritative
/// and is never replaced by a later match or no-match for the same key;
/// a no-match is only a
/// performance hint and is silently dropped when a match already exists.
/// The exclusion context of the recording attempt is not part of the key.
#[derive(Debug, Default)]
pub struct ParseCache {
    slots: HashMap<Token, Slot>,
}

impl ParseCache {
    /// Creates an empty cache.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a recorded match.
    ///
    /// The outer `Option` says whether anything is recorded; the inner
    /// one is the matched node, `None` meaning a recorded zero-width
    /// match.
    pub fn match_at(&self, token: &Token, name: &str) -> Option<Option<&Node>> {
        self.slots
            .get(token)
            .and_then(|slot| slot.matches.get(name))
            .map(Option::as_ref)
    }

    /// Whether the rule is known not to match at this token.
    pub fn no_match_at(&self, token: &Token, name: &str) -> bool {
        self.slots
            .get(token)
            .is_some_and(|slot| slot.failures.contains(name))
    }

    /// Records a match. The first recorded match for a key wins.
    pub fn record_match(&mut self, token: Token, name: Rc<str>, node: Option<Node>) {
        self.slots
            .entry(token)
            .or_default()
            .matches
            .entry(name)
            .or_insert(node);
    }

    /// Records a no-match, unless a match already exists for the key.
    ///
    /// A shorter variant of the rule may already have been parsed here;
    /// the match stays authoritative.
    pub fn record_no_match(&mut self, token: Token, name: Rc<str>) {
        let slot = self.slots.entry(token).or_default();
        if slot.matches.contains_key(&name) {
            return;
        }
        slot.failures.insert(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    fn tok(text: &str) -> Token {
        Token::new(TokenKind(0), text, 1, 1)
    }

    fn name(s: &str) -> Rc<str> {
        Rc::from(s)
    }

    fn leaf(rule: &str, text: &str) -> Node {
        Node::leaf(name(rule), tok(text))
    }

    #[test]
    fn test_record_then_lookup() {
        let mut cache = ParseCache::new();
        let n = leaf("int", "1");
        cache.record_match(tok("1"), name("int"), Some(n.clone()));
        assert_eq!(cache.match_at(&tok("1"), "int"), Some(Some(&n)));
        assert_eq!(cache.match_at(&tok("1"), "str"), None);
        assert_eq!(cache.match_at(&tok("2"), "int"), None);
    }

    #[test]
    fn test_zero_width_match_is_recorded() {
        let mut cache = ParseCache::new();
        cache.record_match(tok("x"), name("maybe"), None);
        assert_eq!(cache.match_at(&tok("x"), "maybe"), Some(None));
        assert!(!cache.no_match_at(&tok("x"), "maybe"));
    }

    #[test]
    fn test_no_match_does_not_override_match() {
        let mut cache = ParseCache::new();
        let n = leaf("int", "1");
        cache.record_match(tok("1"), name("int"), Some(n.clone()));
        cache.record_no_match(tok("1"), name("int"));
        assert_eq!(cache.match_at(&tok("1"), "int"), Some(Some(&n)));
        assert!(!cache.no_match_at(&tok("1"), "int"));
    }

    #[test]
    fn test_first_match_wins() {
        let mut cache = ParseCache::new();
        let first = leaf("int", "1");
        let second = leaf("int", "other");
        cache.record_match(tok("1"), name("int"), Some(first.clone()));
        cache.record_match(tok("1"), name("int"), Some(second));
        assert_eq!(cache.match_at(&tok("1"), "int"), Some(Some(&first)));
    }

    #[test]
    fn test_no_match_is_per_key() {
        let mut cache = ParseCache::new();
        cache.record_no_match(tok("1"), name("grp"));
        assert!(cache.no_match_at(&tok("1"), "grp"));
        assert!(!cache.no_match_at(&tok("2"), "grp"));
        assert!(!cache.no_match_at(&tok("1"), "other"));
    }
}
