//! Formula tokenizer.
//!
//! Splits formula text into classified tokens. Whitespace only separates
//! tokens and is never returned. Anything that is not part of the formula
//! language is kept as a [`TokenKind::Unrecognized`] token so the validator
//! can reject it instead of silently dropping input.
//!
//! ```ignore
//! let kinds: Vec<_> = tokenize("x1 * (2.5e3)").map(|t| t.kind).collect();
//! assert_eq!(kinds.len(), 6);
//! ```

use regex::{CaptureMatches, Regex};
use std::fmt;
use std::sync::OnceLock;

/// Classification of a scanned token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    LParen,
    RParen,
    Operator,
    Identifier,
    Number,
    Unrecognized,
}

/// A token borrowed from the scanned source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawToken<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

impl fmt::Display for RawToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)
    }
}

// Alternation order is the matching priority.
const GROUPS: [(&str, Option<TokenKind>); 7] = [
    ("lparen", Some(TokenKind::LParen)),
    ("rparen", Some(TokenKind::RParen)),
    ("op", Some(TokenKind::Operator)),
    ("ident", Some(TokenKind::Identifier)),
    ("number", Some(TokenKind::Number)),
    ("space", None),
    ("other", Some(TokenKind::Unrecognized)),
];

fn token_re() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TOKEN_RE.get_or_init(|| {
        Regex::new(
            r"(?x)
              (?P<lparen>\()
            | (?P<rparen>\))
            | (?P<op>[-+*/])
            | (?P<ident>[A-Za-z_][A-Za-z0-9_]*)
            | (?P<number>(?:[0-9]+\.[0-9]*|\.[0-9]+|[0-9]+)(?:[eE][+-]?[0-9]+)?)
            | (?P<space>\s+)
            | (?P<other>[^\s()+\-*/A-Za-z0-9_.]+|\.)
            ",
        )
        .expect("formula token regex must compile")
    })
}

/// Lazily scan `source` into tokens.
///
/// Every call starts a fresh scan, so the same source can be tokenized any
/// number of times.
pub fn tokenize(source: &str) -> Tokens<'_> {
    Tokens {
        matches: token_re().captures_iter(source),
    }
}

/// Iterator returned by [`tokenize`].
pub struct Tokens<'a> {
    matches: CaptureMatches<'static, 'a>,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = RawToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        for caps in self.matches.by_ref() {
            for (group, kind) in GROUPS {
                let Some(m) = caps.name(group) else {
                    continue;
                };
                match kind {
                    Some(kind) => {
                        return Some(RawToken {
                            kind,
                            text: m.as_str(),
                        });
                    }
                    None => break,
                }
            }
        }
        None
    }
}
