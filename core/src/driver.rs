//! Root driver: pulls tokens from a source and pushes them through a
//! root rule instance.

use crate::cache::ParseCache;
use crate::config::ParseConfig;
use crate::error::{GrammarError, ParseError};
use crate::grammar::{Exclusions, Grammar};
use crate::node::Node;
use crate::parser::{Completion, Outcome, ParseContext, RuleParser};
use crate::token::Token;
use crate::trace::{Trace, TraceLevel};

impl Grammar {
    /// Parses a whole token stream as the named root rule, with default
    /// configuration.
    ///
    /// The source is pulled exactly once, one token at a time; it never
    /// needs to rewind. A fresh memoization cache is used for every run.
    ///
    /// A zero-width match yields an empty branch named after the root
    /// rule. That holds even for a choice root, which otherwise keeps
    /// the winning alternative's name: a zero-width choice has no
    /// winner to name.
    pub fn parse<I>(&self, root: &str, tokens: I) -> Result<Node, ParseError>
    where
        I: IntoIterator<Item = Token>,
    {
        self.parse_with_config(root, tokens, ParseConfig::default())
    }

    /// Like [`Grammar::parse`], narrating the run at the given
    /// verbosity through the `tracing` facade.
    pub fn parse_traced<I>(
        &self,
        root: &str,
        tokens: I,
        level: TraceLevel,
    ) -> Result<Node, ParseError>
    where
        I: IntoIterator<Item = Token>,
    {
        self.parse_with_config(root, tokens, ParseConfig::new().with_trace(level))
    }

    /// Parses a whole token stream with explicit configuration.
    pub fn parse_with_config<I>(
        &self,
        root: &str,
        tokens: I,
        config: ParseConfig,
    ) -> Result<Node, ParseError>
    where
        I: IntoIterator<Item = Token>,
    {
        if !self.contains(root) {
            return Err(GrammarError::UndefinedRule(root.to_owned()).into());
        }
        if !self.can_create(root, None, &Exclusions::none()) {
            return Err(GrammarError::InvalidRoot(root.to_owned()).into());
        }

        let mut ctx = ParseContext {
            grammar: self,
            cache: ParseCache::new(),
            config,
        };
        let trace = Trace::new(config.trace);
        let mut parser = RuleParser::spawn(&ctx, root, &trace, None, &Exclusions::none())?;

        // A completion that consumed the whole stream so far; it becomes
        // the result iff the source turns out to be exhausted.
        let mut settled: Option<Completion> = None;

        for token in tokens {
            if settled.is_some() {
                return Err(ParseError::unexpected(&token));
            }

            match parser.feed(&mut ctx, token)? {
                Outcome::Continue => {}
                Outcome::Done(completion) => {
                    if let Some(leftover) = completion.unparsed.first() {
                        return Err(ParseError::unexpected(leftover));
                    }
                    if !completion.matched {
                        return Err(ParseError::UnexpectedEndOfInput);
                    }
                    settled = Some(completion);
                }
            }
        }

        let completion = match settled {
            Some(completion) => completion,
            // The root is still accepting; the sentinel lets in-flight
            // optionals, repetitions, groups and choices finalize.
            None => match parser.feed(&mut ctx, Token::end_of_input())? {
                Outcome::Continue => return Err(ParseError::UnexpectedEndOfInput),
                Outcome::Done(completion) => {
                    if !completion.matched {
                        return Err(ParseError::UnexpectedEndOfInput);
                    }
                    if let Some(leftover) = completion.unparsed.first() {
                        if !leftover.is_end() {
                            return Err(ParseError::unexpected(leftover));
                        }
                    }
                    completion
                }
            },
        };

        Ok(match completion.node {
            Some(node) => node,
            // A matched root without a node is a zero-width match, e.g.
            // an optional root over empty input.
            None => Node::branch(self.interned(root), Token::end_of_input(), Vec::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;
    use crate::token::TokenKind;

    const INT: TokenKind = TokenKind(0);
    const STRING: TokenKind = TokenKind(1);
    const LPAREN: TokenKind = TokenKind(2);
    const RPAREN: TokenKind = TokenKind(3);

    fn tok(kind: TokenKind, text: &str, column: u32) -> Token {
        Token::new(kind, text, 1, column)
    }

    fn ints_grammar() -> Grammar {
        let mut b = GrammarBuilder::new();
        b.terminal("int", INT).unwrap();
        b.repeat("ints", "int").unwrap();
        b.build().unwrap()
    }

    #[test]
    fn test_repetition_collects_items() {
        let g = ints_grammar();
        let tree = g
            .parse(
                "ints",
                [tok(INT, "1", 1), tok(INT, "2", 3), tok(INT, "3", 5)],
            )
            .unwrap();

        assert_eq!(&*tree.name, "ints");
        assert_eq!(tree.width(), 3);
        let texts: Vec<&str> = tree.children.iter().map(|c| c.token.text.as_str()).collect();
        assert_eq!(texts, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_repetition_matches_empty_input() {
        let g = ints_grammar();
        let tree = g.parse("ints", []).unwrap();
        assert_eq!(&*tree.name, "ints");
        assert_eq!(tree.width(), 0);
        assert!(tree.children.is_empty());
    }

    #[test]
    fn test_choice_picks_the_matching_alternative() {
        let mut b = GrammarBuilder::new();
        b.terminal("int", INT).unwrap();
        b.terminal("str", STRING).unwrap();
        b.choice("value", &["int", "str"]).unwrap();
        let g = b.build().unwrap();

        let tree = g.parse("value", [tok(STRING, "hello", 1)]).unwrap();
        // The choice is transparent; the winner keeps its own name.
        assert_eq!(&*tree.name, "str");
        assert!(tree.is_leaf());
    }

    #[test]
    fn test_optional_first_group_item_may_be_absent() {
        let mut b = GrammarBuilder::new();
        b.terminal("int", INT).unwrap();
        b.terminal("str", STRING).unwrap();
        b.optional("maybe_int", "int").unwrap();
        b.group("pair", &["maybe_int", "str"]).unwrap();
        let g = b.build().unwrap();

        let tree = g.parse("pair", [tok(STRING, "hi", 1)]).unwrap();
        assert_eq!(&*tree.name, "pair");
        assert_eq!(tree.width(), 1);
        assert_eq!(&*tree.children[0].name, "str");

        let tree = g
            .parse("pair", [tok(INT, "1", 1), tok(STRING, "hi", 3)])
            .unwrap();
        assert_eq!(tree.width(), 2);
        assert_eq!(&*tree.children[0].name, "int");
    }

    #[test]
    fn test_choice_takes_the_longest_match() {
        let mut b = GrammarBuilder::new();
        b.terminal("a", INT).unwrap();
        b.terminal("b", STRING).unwrap();
        b.group("a_then_b", &["a", "b"]).unwrap();
        b.choice("expr", &["a", "a_then_b"]).unwrap();
        let g = b.build().unwrap();

        let tree = g
            .parse("expr", [tok(INT, "a", 1), tok(STRING, "b", 3)])
            .unwrap();
        assert_eq!(&*tree.name, "a_then_b");
        assert_eq!(tree.width(), 2);
    }

    #[test]
    fn test_empty_repetition_leaves_its_token_for_the_next_item() {
        let mut b = GrammarBuilder::new();
        b.terminal("int", INT).unwrap();
        b.terminal("str", STRING).unwrap();
        b.repeat("ints", "int").unwrap();
        b.group("grp", &["ints", "str"]).unwrap();
        let g = b.build().unwrap();

        let tree = g.parse("grp", [tok(STRING, "x", 1)]).unwrap();
        assert_eq!(tree.children.len(), 2);
        assert_eq!(&*tree.children[0].name, "ints");
        assert_eq!(tree.children[0].width(), 0);
        assert_eq!(&*tree.children[1].name, "str");
    }

    #[test]
    fn test_group_requires_every_item() {
        let mut b = GrammarBuilder::new();
        b.terminal("a", INT).unwrap();
        b.terminal("b", STRING).unwrap();
        b.group("pair", &["a", "b"]).unwrap();
        let g = b.build().unwrap();

        let err = g.parse("pair", [tok(INT, "a", 1)]).unwrap_err();
        assert_eq!(err, ParseError::UnexpectedEndOfInput);
    }

    #[test]
    fn test_leftover_token_is_reported_with_position() {
        let g = ints_grammar();
        let err = g
            .parse("ints", [tok(INT, "1", 1), tok(STRING, "x", 3)])
            .unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedToken {
                text: "x".into(),
                line: 1,
                column: 3,
            }
        );
    }

    #[test]
    fn test_recursive_grammar_parses_nested_input() {
        let mut b = GrammarBuilder::new();
        b.terminal("int", INT).unwrap();
        b.terminal("lparen", LPAREN).unwrap();
        b.terminal("rparen", RPAREN).unwrap();
        b.group("parens", &["lparen", "expr", "rparen"]).unwrap();
        b.choice("expr", &["int", "parens"]).unwrap();
        let g = b.build().unwrap();

        let tree = g
            .parse(
                "expr",
                [
                    tok(LPAREN, "(", 1),
                    tok(LPAREN, "(", 2),
                    tok(INT, "1", 3),
                    tok(RPAREN, ")", 4),
                    tok(RPAREN, ")", 5),
                ],
            )
            .unwrap();

        assert_eq!(&*tree.name, "parens");
        assert_eq!(tree.width(), 5);
        assert_eq!(&*tree.children[1].name, "parens");
        assert_eq!(&*tree.children[1].children[1].name, "int");
    }

    #[test]
    fn test_depth_limit_guards_recursive_grammars() {
        let mut b = GrammarBuilder::new();
        b.terminal("int", INT).unwrap();
        b.terminal("lparen", LPAREN).unwrap();
        b.terminal("rparen", RPAREN).unwrap();
        b.group("parens", &["lparen", "expr", "rparen"]).unwrap();
        b.choice("expr", &["int", "parens"]).unwrap();
        let g = b.build().unwrap();

        let err = g
            .parse_with_config(
                "expr",
                [tok(LPAREN, "(", 1), tok(INT, "1", 2), tok(RPAREN, ")", 3)],
                ParseConfig::new().with_max_depth(2),
            )
            .unwrap_err();
        assert!(matches!(err, ParseError::DepthLimitExceeded { limit: 2, .. }));
    }

    #[test]
    fn test_undefined_root_is_rejected_before_parsing() {
        let g = ints_grammar();
        let err = g.parse("missing", [tok(INT, "1", 1)]).unwrap_err();
        assert_eq!(
            err,
            ParseError::Grammar(GrammarError::UndefinedRule("missing".into()))
        );
    }

    #[test]
    fn test_runs_are_deterministic_and_unaffected_by_tracing() {
        let mut b = GrammarBuilder::new();
        b.terminal("a", INT).unwrap();
        b.terminal("b", STRING).unwrap();
        b.group("a_then_b", &["a", "b"]).unwrap();
        b.choice("expr", &["a", "a_then_b"]).unwrap();
        let g = b.build().unwrap();

        let input = [tok(INT, "a", 1), tok(STRING, "b", 3)];
        let plain = g.parse("expr", input.clone()).unwrap();
        let again = g.parse("expr", input.clone()).unwrap();
        let traced = g.parse_traced("expr", input, TraceLevel::Debug).unwrap();
        assert_eq!(plain, again);
        assert_eq!(plain, traced);
    }

    #[test]
    fn test_choice_recovers_tokens_covered_by_a_cached_item() {
        const A: TokenKind = TokenKind(10);
        const B: TokenKind = TokenKind(11);
        const C: TokenKind = TokenKind(12);
        const D: TokenKind = TokenKind(13);
        const E: TokenKind = TokenKind(14);

        let mut b = GrammarBuilder::new();
        b.terminal("a", A).unwrap();
        b.terminal("b", B).unwrap();
        b.terminal("c", C).unwrap();
        b.terminal("d", D).unwrap();
        b.terminal("e", E).unwrap();
        b.group("ab", &["a", "b"]).unwrap();
        b.group("ab_c", &["ab", "c"]).unwrap();
        b.group("ab_d", &["ab", "d"]).unwrap();
        b.group("ab_e", &["ab", "e"]).unwrap();
        b.choice("stmt", &["ab_c", "ab_d", "ab_e"]).unwrap();
        let g = b.build().unwrap();

        // The first probe caches "ab"; every later probe replays it from
        // the cache and, when it fails in turn, must hand back all the
        // tokens the cached node covers, not just the ones it was fed.
        let tree = g
            .parse("stmt", [tok(A, "a", 1), tok(B, "b", 3), tok(E, "e", 5)])
            .unwrap();
        assert_eq!(&*tree.name, "ab_e");
        assert_eq!(tree.width(), 3);
        let texts: Vec<String> = tree.tokens().into_iter().map(|t| t.text).collect();
        assert_eq!(texts, ["a", "b", "e"]);
    }

    #[test]
    fn test_zero_width_choice_root_is_named_after_the_root() {
        let mut b = GrammarBuilder::new();
        b.terminal("int", INT).unwrap();
        b.optional("maybe_int", "int").unwrap();
        b.choice("item", &["maybe_int"]).unwrap();
        let g = b.build().unwrap();

        // With no winning alternative there is no other name to use.
        let tree = g.parse("item", []).unwrap();
        assert_eq!(&*tree.name, "item");
        assert_eq!(tree.width(), 0);
        assert!(tree.children.is_empty());
    }

    #[test]
    fn test_empty_input_against_group_is_unexpected_eof() {
        let mut b = GrammarBuilder::new();
        b.terminal("a", INT).unwrap();
        b.group("one", &["a"]).unwrap();
        let g = b.build().unwrap();
        assert_eq!(g.parse("one", []).unwrap_err(), ParseError::UnexpectedEndOfInput);
    }
}
