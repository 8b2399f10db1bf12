//! Parse-tree nodes.
//!
//! A [`Node`] is the typed output of one rule: the name of the rule that
//! produced it, an anchor token, and its ordered children. Nodes are
//! built bottom-up during parsing and never mutated once the producing
//! rule has finished; ownership moves upward into the parent combinator.
//!
//! There is no sentinel for "no node": the engine passes `Option<Node>`
//! everywhere a result may be absent, so `None` is a zero-width match
//! (or no match, depending on the accompanying flag), never a real tree
//! element.

use std::rc::Rc;

use crate::token::Token;

/// One parse-tree element.
///
/// The anchor token is the token of the node's first descendant leaf; a
/// leaf's anchor is its own token, and an empty branch (for example a
/// repetition that matched zero items) is anchored at the first token
/// that remained unconsumed when it finished.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Name of the rule that produced this node.
    pub name: Rc<str>,
    /// Anchor token.
    pub token: Token,
    /// Ordered child nodes.
    pub children: Vec<Node>,
    leaf: bool,
}

impl Node {
    /// Creates a leaf node holding exactly one consumed token.
    #[inline]
    pub fn leaf(name: Rc<str>, token: Token) -> Self {
        Self {
            name,
            token,
            children: Vec::new(),
            leaf: true,
        }
    }

    /// Creates a branch node over the given children.
    ///
    /// A branch with no children has width zero; its anchor only records
    /// a position.
    #[inline]
    pub fn branch(name: Rc<str>, anchor: Token, children: Vec<Node>) -> Self {
        Self {
            name,
            token: anchor,
            children,
            leaf: false,
        }
    }

    /// Whether this node is a leaf produced by a terminal rule.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.leaf
    }

    /// Number of tokens covered by this node.
    ///
    /// This is the leaf count: a leaf covers one token, a branch covers
    /// the sum of its children, and an empty branch covers none. The
    /// memoization cache relies on this to tell a caller how many tokens
    /// a cached result spans.
    pub fn width(&self) -> usize {
        if self.leaf {
            1
        } else {
            self.children.iter().map(Node::width).sum()
        }
    }

    /// The tokens covered by this node, in source order.
    pub fn tokens(&self) -> Vec<Token> {
        let mut out = Vec::with_capacity(self.width());
        self.collect_tokens(&mut out);
        out
    }

    fn collect_tokens(&self, out: &mut Vec<Token>) {
        if self.leaf {
            out.push(self.token.clone());
        } else {
            for child in &self.children {
                child.collect_tokens(out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    fn name(s: &str) -> Rc<str> {
        Rc::from(s)
    }

    fn tok(text: &str, column: u32) -> Token {
        Token::new(TokenKind(0), text, 1, column)
    }

    #[test]
    fn test_leaf_width_is_one() {
        let n = Node::leaf(name("int"), tok("1", 1));
        assert!(n.is_leaf());
        assert_eq!(n.width(), 1);
        assert_eq!(n.tokens(), vec![tok("1", 1)]);
    }

    #[test]
    fn test_empty_branch_width_is_zero() {
        let n = Node::branch(name("ints"), tok("x", 1), Vec::new());
        assert!(!n.is_leaf());
        assert_eq!(n.width(), 0);
        assert!(n.tokens().is_empty());
    }

    #[test]
    fn test_branch_width_sums_leaves() {
        let a = Node::leaf(name("int"), tok("1", 1));
        let b = Node::leaf(name("int"), tok("2", 3));
        let inner = Node::branch(name("pair"), tok("1", 1), vec![a.clone(), b.clone()]);
        let outer = Node::branch(name("outer"), tok("1", 1), vec![inner]);
        assert_eq!(outer.width(), 2);
        assert_eq!(outer.tokens(), vec![tok("1", 1), tok("2", 3)]);
    }
}
