//! Regex-driven scanner.
//!
//! A [`Scanner`] holds an ordered list of [`TokenDefinition`]s. At every
//! offset it skips the boundary pattern, then tries the definitions in the
//! order they were declared. The first definition that matches (and that
//! the caller's acceptance callback agrees to) wins: there is no
//! longest-match rule, so keywords must be declared before the generic
//! patterns that would also match them.
//!
//! The `regex` crate has no look-around. A definition may instead carry a
//! *follow guard*, a second pattern that must match the text right after
//! the candidate token (an empty remainder is offered to the guard too).

use std::fmt;

use regex::{Regex, RegexBuilder};
use tracing::trace;

use crate::ast::Token;
use crate::error::SyntaxError;

/// Default boundary: any whitespace, including `\r` and `\n`.
pub const DEFAULT_BOUNDARY: &str = r"\s+";

/// One token pattern, compiled anchored at the scan position.
#[derive(Debug, Clone)]
pub struct TokenDefinition<K> {
    kind: K,
    source: String,
    pattern: Regex,
    follow: Option<Regex>,
}

fn anchored(pattern: &str, case_sensitive: bool) -> Result<Regex, SyntaxError> {
    RegexBuilder::new(&format!("^(?:{})", pattern))
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(|e| SyntaxError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

impl<K: Copy> TokenDefinition<K> {
    pub fn new(kind: K, pattern: &str, case_sensitive: bool) -> Result<Self, SyntaxError> {
        Ok(TokenDefinition {
            kind,
            source: pattern.to_string(),
            pattern: anchored(pattern, case_sensitive)?,
            follow: None,
        })
    }

    /// Adds a guard that must match the input following the token.
    pub fn followed_by(mut self, follow: &str, case_sensitive: bool) -> Result<Self, SyntaxError> {
        self.follow = Some(anchored(follow, case_sensitive)?);
        Ok(self)
    }

    pub fn kind(&self) -> K {
        self.kind
    }

    pub fn pattern(&self) -> &str {
        &self.source
    }

    /// Length of the token this definition recognizes at the start of `rest`.
    fn match_len(&self, rest: &str) -> Option<usize> {
        let found = self.pattern.find(rest)?;
        // an empty token would never advance the scan
        if found.end() == 0 {
            return None;
        }
        if let Some(follow) = &self.follow
            && !follow.is_match(&rest[found.end()..])
        {
            return None;
        }
        Some(found.end())
    }
}

/// Splits text into tokens using an ordered set of definitions.
#[derive(Debug, Clone)]
pub struct Scanner<K> {
    definitions: Vec<TokenDefinition<K>>,
    boundary: Regex,
}

impl<K: Copy + fmt::Debug> Scanner<K> {
    pub fn new(definitions: Vec<TokenDefinition<K>>) -> Result<Self, SyntaxError> {
        Ok(Scanner {
            definitions,
            boundary: anchored(DEFAULT_BOUNDARY, true)?,
        })
    }

    /// Replaces the pattern skipped between tokens.
    pub fn with_boundary(mut self, boundary: &str) -> Result<Self, SyntaxError> {
        self.boundary = anchored(boundary, true)?;
        Ok(self)
    }

    pub fn definitions(&self) -> &[TokenDefinition<K>] {
        &self.definitions
    }

    /// Scans `input` with every match accepted.
    pub fn tokenize<'s>(&self, input: &'s str) -> Result<Vec<Token<'s, K>>, SyntaxError> {
        self.tokenize_with(input, |_, _| true)
    }

    /// Scans `input`, asking `accept` about each candidate match.
    ///
    /// A rejected candidate is treated as if its definition had not matched:
    /// scanning continues with the next definition at the same offset.
    pub fn tokenize_with<'s, F>(
        &self,
        input: &'s str,
        mut accept: F,
    ) -> Result<Vec<Token<'s, K>>, SyntaxError>
    where
        F: FnMut(K, &str) -> bool,
    {
        let mut tokens = Vec::new();
        let mut offset = 0;

        loop {
            if let Some(skip) = self.boundary.find(&input[offset..]) {
                offset += skip.end();
            }
            if offset >= input.len() {
                break;
            }

            let rest = &input[offset..];
            let mut matched = None;
            for definition in &self.definitions {
                let Some(len) = definition.match_len(rest) else {
                    continue;
                };
                let text = &rest[..len];
                if accept(definition.kind, text) {
                    matched = Some(Token::new(definition.kind, &input[offset..offset + len], offset));
                    break;
                }
                trace!(kind = ?definition.kind, text, offset, "candidate rejected");
            }

            match matched {
                Some(token) => {
                    trace!(kind = ?token.kind, text = token.text, offset, "token");
                    offset = token.span.end;
                    tokens.push(token);
                }
                None => {
                    return Err(SyntaxError::UnexpectedInput {
                        offset,
                        remainder: rest.to_string(),
                    });
                }
            }
        }

        Ok(tokens)
    }
}
