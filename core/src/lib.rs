//! Grammar-driven incremental parsing engine.
//!
//! A grammar is assembled from five rule shapes (terminal, optional,
//! repetition, fixed group, choice), frozen by [`GrammarBuilder::build`],
//! and then driven push-style: the driver feeds lexer tokens to a tree of
//! single-use parser instances one token at a time, so a parse can run
//! over a stream without ever rewinding the source. Rule results are
//! memoized per (starting token, rule) in a per-run [`ParseCache`], and
//! choices resolve to the longest match by re-probing alternatives seeded
//! with the current best.
//!
//! Left recursion is blocked structurally: descending through a rule adds
//! it to an exclusion set that stops it from re-starting at the same
//! token, so grammars may be recursive without special annotations.
//!
//! ```
//! use rulekit_core::{GrammarBuilder, Token, TokenKind};
//!
//! const INT: TokenKind = TokenKind(0);
//!
//! let mut builder = GrammarBuilder::new();
//! builder.terminal("int", INT)?;
//! builder.repeat("ints", "int")?;
//! let grammar = builder.build()?;
//!
//! let tree = grammar.parse(
//!     "ints",
//!     [Token::new(INT, "1", 1, 1), Token::new(INT, "2", 1, 3)],
//! )?;
//! assert_eq!(tree.children.len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod config;
mod driver;
mod error;
mod grammar;
mod node;
mod parser;
mod token;
mod trace;

pub use cache::ParseCache;
pub use config::ParseConfig;
pub use error::{GrammarError, ParseError};
pub use grammar::{Grammar, GrammarBuilder};
pub use node::Node;
pub use token::{Token, TokenKind};
pub use trace::TraceLevel;
