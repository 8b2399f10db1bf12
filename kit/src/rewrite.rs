//! Post-parse tree rewriting.
//!
//! Grammars routinely produce trees with plumbing in them: separator
//! tokens between list items, single-child wrapper nodes, flat token
//! runs that want regrouping. A [`Rewriter`] cleans that up in one
//! bottom-up pass over the finished tree, outside the engine, so the
//! grammar stays simple and the rewrite rules stay testable on their
//! own.

use std::collections::HashMap;

use rulekit_core::Node;

type RewriteFn = Box<dyn Fn(Node) -> Node>;
type SeparatorFn = Box<dyn Fn(&Node) -> bool>;

/// Bottom-up tree rewriter.
///
/// Separator children are dropped first, then children are rewritten
/// recursively, then the per-rule function registered for the node's
/// name (if any) maps the node itself. Nodes without a registered
/// function pass through unchanged.
///
/// ```
/// use rulekit::{Node, Rewriter, Token, TokenKind};
/// # use std::rc::Rc;
///
/// const COMMA: TokenKind = TokenKind(9);
///
/// let rewriter = Rewriter::new()
///     .separators(|n| n.token.kind == COMMA)
///     .on("list", |mut n| {
///         n.children.reverse();
///         n
///     });
/// # let node = Node::leaf(Rc::from("int"), Token::new(TokenKind(0), "1", 1, 1));
/// # let _ = rewriter.rewrite(node);
/// ```
#[derive(Default)]
pub struct Rewriter {
    rules: HashMap<String, RewriteFn>,
    separator: Option<SeparatorFn>,
}

impl Rewriter {
    /// Creates a rewriter with no rules; it passes trees through as-is.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rewrite function for nodes produced by the named
    /// rule. A later registration for the same name replaces the
    /// earlier one.
    pub fn on<F>(mut self, name: &str, rewrite: F) -> Self
    where
        F: Fn(Node) -> Node + 'static,
    {
        self.rules.insert(name.to_owned(), Box::new(rewrite));
        self
    }

    /// Sets the separator predicate. Children it accepts are removed
    /// from every branch before the branch is rewritten. The predicate
    /// sees every child, leaf or branch.
    pub fn separators<F>(mut self, is_separator: F) -> Self
    where
        F: Fn(&Node) -> bool + 'static,
    {
        self.separator = Some(Box::new(is_separator));
        self
    }

    /// Rewrites a tree bottom-up.
    pub fn rewrite(&self, mut node: Node) -> Node {
        let children = std::mem::take(&mut node.children);
        node.children = children
            .into_iter()
            .filter(|child| !self.is_separator(child))
            .map(|child| self.rewrite(child))
            .collect();

        match self.rules.get(&*node.name) {
            Some(rewrite) => rewrite(node),
            None => node,
        }
    }

    fn is_separator(&self, node: &Node) -> bool {
        self.separator
            .as_ref()
            .is_some_and(|is_separator| is_separator(node))
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use rulekit_core::{Token, TokenKind};

    use super::*;

    const INT: TokenKind = TokenKind(0);
    const COMMA: TokenKind = TokenKind(1);

    fn leaf(rule: &str, kind: TokenKind, text: &str, column: u32) -> Node {
        Node::leaf(Rc::from(rule), Token::new(kind, text, 1, column))
    }

    fn list(children: Vec<Node>) -> Node {
        let anchor = Token::new(INT, "1", 1, 1);
        Node::branch(Rc::from("list"), anchor, children)
    }

    #[test]
    fn test_separators_are_dropped() {
        let tree = list(vec![
            leaf("int", INT, "1", 1),
            leaf("comma", COMMA, ",", 2),
            leaf("int", INT, "2", 3),
        ]);

        let rewriter = Rewriter::new().separators(|n| n.token.kind == COMMA);
        let rewritten = rewriter.rewrite(tree);
        assert_eq!(rewritten.children.len(), 2);
        assert!(rewritten.children.iter().all(|c| c.token.kind == INT));
    }

    #[test]
    fn test_branch_separators_are_dropped() {
        // A grammar may wrap its punctuation in a rule of its own; the
        // resulting branch is still droppable.
        let sep = Node::branch(
            Rc::from("sep"),
            Token::new(COMMA, ",", 1, 2),
            vec![leaf("comma", COMMA, ",", 2)],
        );
        let tree = list(vec![leaf("int", INT, "1", 1), sep, leaf("int", INT, "2", 3)]);

        let rewriter = Rewriter::new().separators(|n| &*n.name == "sep");
        let rewritten = rewriter.rewrite(tree);
        assert_eq!(rewritten.children.len(), 2);
        assert!(rewritten.children.iter().all(|c| &*c.name == "int"));
    }

    #[test]
    fn test_rules_apply_bottom_up() {
        let inner = list(vec![leaf("int", INT, "1", 1), leaf("int", INT, "2", 3)]);
        let outer = Node::branch(Rc::from("outer"), Token::new(INT, "1", 1, 1), vec![inner]);

        let rewriter = Rewriter::new()
            .on("list", |mut n| {
                n.children.reverse();
                n
            })
            .on("outer", |n| {
                // The child list is already rewritten when the outer
                // rule runs.
                assert_eq!(n.children[0].children[0].token.text, "2");
                n
            });

        let rewritten = rewriter.rewrite(outer);
        assert_eq!(rewritten.children[0].children[1].token.text, "1");
    }

    #[test]
    fn test_unregistered_nodes_pass_through() {
        let tree = list(vec![leaf("int", INT, "1", 1)]);
        let rewritten = Rewriter::new().rewrite(tree.clone());
        assert_eq!(rewritten, tree);
    }
}
