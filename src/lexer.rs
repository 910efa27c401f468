use std::fmt;

use tracing::debug;

use crate::ast::Token;
use crate::error::SyntaxError;
use crate::grammar::{self, Cursor, Grammar, StateId};
use crate::scanner::{Scanner, TokenDefinition};

/// A scanner whose matches are filtered by a grammar.
///
/// A candidate token is accepted only when the current grammar state has a
/// transition for its kind. That lets one pattern stand for different
/// categories depending on position: `in` is an operator after an operand
/// and a field name where an operand is expected.
///
/// The lexer holds no scan state. Every call to [`Lexer::tokenize`] starts
/// its own [`Cursor`] at the initial state, so a shared lexer can be used
/// from several threads at once.
#[derive(Debug, Clone)]
pub struct Lexer<K> {
    scanner: Scanner<K>,
    grammar: Grammar<K>,
}

/// Consecutive tokens accepted in the same grammar state.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment<'s, K> {
    pub state: StateId,
    pub tokens: Vec<Token<'s, K>>,
}

impl<K: Copy + PartialEq + fmt::Debug> Lexer<K> {
    pub fn new(scanner: Scanner<K>, grammar: Grammar<K>) -> Self {
        Lexer { scanner, grammar }
    }

    /// Builds both the token patterns and the grammar from one extended
    /// description (`NAME=regex` lines plus states and transitions).
    pub fn from_extended_description<F>(
        text: &str,
        resolve: F,
        case_sensitive: bool,
    ) -> Result<Self, SyntaxError>
    where
        F: Fn(&str) -> Option<K>,
    {
        let (grammar, patterns) = grammar::load(text, resolve, true)?;
        let definitions = patterns
            .iter()
            .map(|(kind, pattern)| TokenDefinition::new(*kind, pattern, case_sensitive))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Lexer::new(Scanner::new(definitions)?, grammar))
    }

    pub fn scanner(&self) -> &Scanner<K> {
        &self.scanner
    }

    pub fn grammar(&self) -> &Grammar<K> {
        &self.grammar
    }

    pub fn tokenize<'s>(&self, input: &'s str) -> Result<Vec<Token<'s, K>>, SyntaxError> {
        let mut cursor = self.grammar.cursor();
        self.tokenize_from(input, &mut cursor)
    }

    /// Continues a scan from an existing cursor, leaving it at the final state.
    pub fn tokenize_from<'s>(
        &self,
        input: &'s str,
        cursor: &mut Cursor,
    ) -> Result<Vec<Token<'s, K>>, SyntaxError> {
        let grammar = &self.grammar;
        let tokens = self
            .scanner
            .tokenize_with(input, |kind, _| grammar.advance(cursor, kind))
            .inspect_err(|e| {
                debug!(
                    state = grammar.state_name(cursor.state()),
                    expected = ?grammar.expected(cursor.state()),
                    error = %e,
                    "scan stopped"
                )
            })?;
        debug!(
            tokens = tokens.len(),
            state = grammar.state_name(cursor.state()),
            "tokenized"
        );
        Ok(tokens)
    }

    /// Groups tokens by the state each was accepted in, replaying the grammar
    /// from its initial state.
    pub fn segments<'s>(&self, tokens: &[Token<'s, K>]) -> Result<Vec<Segment<'s, K>>, SyntaxError> {
        let mut cursor = self.grammar.cursor();
        let mut segments: Vec<Segment<'s, K>> = Vec::new();

        for token in tokens {
            let state = cursor.state();
            if !self.grammar.advance(&mut cursor, token.kind) {
                return Err(SyntaxError::UnexpectedInput {
                    offset: token.span.start,
                    remainder: token.text.to_string(),
                });
            }
            match segments.last_mut() {
                Some(segment) if segment.state == state => segment.tokens.push(*token),
                _ => segments.push(Segment {
                    state,
                    tokens: vec![*token],
                }),
            }
        }

        Ok(segments)
    }
}
