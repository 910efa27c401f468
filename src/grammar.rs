//! Named-state automata that decide which token categories may follow each other.
//!
//! A [`Grammar`] is immutable once built. The position inside it is a
//! separate [`Cursor`] value owned by whoever is scanning, so one grammar
//! can serve any number of concurrent scans.
//!
//! Grammars are assembled with a [`GrammarBuilder`] or loaded from a
//! compact text description:
//!
//! ```text
//! expect_operand:
//! BRACKET_OPEN|UNARY_OPERATOR|SEPARATOR|METHOD:expect_operand
//! OPERAND|NULL:expect_operator
//!
//! expect_operator:
//! BRACKET_CLOSE:expect_operator
//! BINARY_OPERATOR|SEPARATOR:expect_operand
//! ```
//!
//! `name:` opens a state, `A|B:target` adds a transition from the open
//! state, and in the extended form `NAME=regex` declares a token pattern.

use std::fmt;

use tracing::debug;

use crate::ast::Token;
use crate::error::SyntaxError;
use crate::scanner::{Scanner, TokenDefinition};

/// Index of a state inside its grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(usize);

#[derive(Debug, Clone)]
struct State<K> {
    name: String,
    transitions: Vec<(Vec<K>, StateId)>,
}

impl<K: PartialEq> State<K> {
    fn target(&self, kind: &K) -> Option<StateId> {
        self.transitions
            .iter()
            .find(|(kinds, _)| kinds.contains(kind))
            .map(|(_, to)| *to)
    }
}

/// Position of a scan inside a [`Grammar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    state: StateId,
}

impl Cursor {
    pub fn state(&self) -> StateId {
        self.state
    }
}

/// An immutable set of named states with transitions keyed by token kind.
#[derive(Debug, Clone)]
pub struct Grammar<K> {
    states: Vec<State<K>>,
    initial: StateId,
}

impl<K: Copy + PartialEq + fmt::Debug> Grammar<K> {
    pub fn builder() -> GrammarBuilder<K> {
        GrammarBuilder::new()
    }

    /// Loads a grammar from its text description. `resolve` maps the
    /// upper-case token names of the description to token kinds.
    pub fn from_description<F>(text: &str, resolve: F) -> Result<Self, SyntaxError>
    where
        F: Fn(&str) -> Option<K>,
    {
        let (grammar, _) = load(text, resolve, false)?;
        Ok(grammar)
    }

    pub fn initial(&self) -> StateId {
        self.initial
    }

    pub fn state(&self, name: &str) -> Option<StateId> {
        self.states
            .iter()
            .position(|s| s.name == name)
            .map(StateId)
    }

    /// Name of `id`, or `None` for a state of another grammar.
    pub fn state_name(&self, id: StateId) -> Option<&str> {
        self.states.get(id.0).map(|s| s.name.as_str())
    }

    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(|s| s.name.as_str())
    }

    /// The state reached from `from` on `kind`, if that transition exists.
    /// A state of another grammar has no transitions.
    pub fn next(&self, from: StateId, kind: K) -> Option<StateId> {
        self.states.get(from.0)?.target(&kind)
    }

    /// Token kinds that have a transition out of `state`.
    pub fn expected(&self, state: StateId) -> Vec<K> {
        self.states
            .get(state.0)
            .map(|s| {
                s.transitions
                    .iter()
                    .flat_map(|(kinds, _)| kinds.iter().copied())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// A cursor at the initial state.
    pub fn cursor(&self) -> Cursor {
        Cursor {
            state: self.initial,
        }
    }

    /// Moves `cursor` along the transition for `kind`. Returns false, leaving
    /// the cursor untouched, when the current state has no such transition.
    pub fn advance(&self, cursor: &mut Cursor, kind: K) -> bool {
        match self.next(cursor.state, kind) {
            Some(to) => {
                cursor.state = to;
                true
            }
            None => false,
        }
    }
}

/// Assembles a [`Grammar`]. Configuration errors surface here, never during a scan.
#[derive(Debug, Clone)]
pub struct GrammarBuilder<K> {
    states: Vec<State<K>>,
    initial: Option<StateId>,
}

impl<K: Copy + PartialEq + fmt::Debug> Default for GrammarBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + PartialEq + fmt::Debug> GrammarBuilder<K> {
    pub fn new() -> Self {
        GrammarBuilder {
            states: Vec::new(),
            initial: None,
        }
    }

    /// Declares a state, or returns the existing one with that name.
    pub fn add_state(&mut self, name: &str) -> StateId {
        if let Some(i) = self.states.iter().position(|s| s.name == name) {
            return StateId(i);
        }
        self.states.push(State {
            name: name.to_string(),
            transitions: Vec::new(),
        });
        StateId(self.states.len() - 1)
    }

    /// Marks the initial state. Without this call the first declared state is initial.
    pub fn initial(&mut self, name: &str) -> Result<&mut Self, SyntaxError> {
        let id = self.find(name)?;
        self.initial = Some(id);
        Ok(self)
    }

    /// Adds a transition from `from` to `to` on any of `kinds`.
    ///
    /// Fails when either state is undeclared or when one of `kinds` already
    /// leads out of `from`.
    pub fn transition(&mut self, from: &str, to: &str, kinds: &[K]) -> Result<&mut Self, SyntaxError> {
        let from_id = self.find(from)?;
        let to_id = self.find(to)?;
        let state = &mut self.states[from_id.0];

        let mut set: Vec<K> = Vec::with_capacity(kinds.len());
        for kind in kinds {
            if state.target(kind).is_some() {
                return Err(SyntaxError::AmbiguousTransition {
                    state: from.to_string(),
                    token: format!("{:?}", kind),
                });
            }
            if !set.contains(kind) {
                set.push(*kind);
            }
        }
        state.transitions.push((set, to_id));
        Ok(self)
    }

    pub fn build(self) -> Result<Grammar<K>, SyntaxError> {
        if self.states.is_empty() {
            return Err(SyntaxError::NoInitialState);
        }
        Ok(Grammar {
            initial: self.initial.unwrap_or(StateId(0)),
            states: self.states,
        })
    }

    fn find(&self, name: &str) -> Result<StateId, SyntaxError> {
        self.states
            .iter()
            .position(|s| s.name == name)
            .map(StateId)
            .ok_or_else(|| SyntaxError::UnknownState(name.to_string()))
    }
}

/// Token kinds of the description language itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meta {
    State,
    Name,
    Pipe,
    Target,
    Pattern,
    Newline,
}

/// The description language is scanned and validated with the same
/// machinery it configures.
fn meta_scan(text: &str) -> Result<Vec<Token<'_, Meta>>, SyntaxError> {
    let scanner = Scanner::new(vec![
        TokenDefinition::new(Meta::State, "[a-z_][0-9a-z_]*:", true)?,
        TokenDefinition::new(Meta::Name, "[0-9A-Z_]+", true)?,
        TokenDefinition::new(Meta::Pipe, r"\|", true)?,
        TokenDefinition::new(Meta::Target, ":[0-9a-z_]+", true)?,
        TokenDefinition::new(Meta::Pattern, "=[^\n]+", true)?,
        TokenDefinition::new(Meta::Newline, "\n", true)?,
    ])?
    .with_boundary("[ \t\r]+")?;

    let mut builder = GrammarBuilder::new();
    for state in ["line", "names", "chain", "end"] {
        builder.add_state(state);
    }
    builder
        .transition("line", "line", &[Meta::Newline, Meta::State])?
        .transition("line", "names", &[Meta::Name])?
        .transition("names", "chain", &[Meta::Pipe])?
        .transition("names", "end", &[Meta::Target, Meta::Pattern])?
        .transition("chain", "names", &[Meta::Name])?
        .transition("end", "line", &[Meta::Newline])?;
    let meta = builder.build()?;

    let mut cursor = meta.cursor();
    scanner
        .tokenize_with(text, |kind, _| meta.advance(&mut cursor, kind))
        .map_err(|e| match e {
            SyntaxError::UnexpectedInput { offset, remainder } => SyntaxError::InvalidGrammar {
                offset,
                message: format!(
                    "unexpected '{}'",
                    remainder.lines().next().unwrap_or_default()
                ),
            },
            other => other,
        })
}

/// Reads a grammar description. In the extended form `NAME=regex` lines
/// are collected as token patterns, in order of appearance.
pub(crate) fn load<K, F>(
    text: &str,
    resolve: F,
    extended: bool,
) -> Result<(Grammar<K>, Vec<(K, String)>), SyntaxError>
where
    K: Copy + PartialEq + fmt::Debug,
    F: Fn(&str) -> Option<K>,
{
    let mut builder = GrammarBuilder::new();
    let mut patterns = Vec::new();
    let mut current: Option<&str> = None;
    let mut pending: Vec<K> = Vec::new();

    for token in meta_scan(text)? {
        let offset = token.span.start;
        match token.kind {
            Meta::State => {
                let name = token.text.trim_end_matches(':');
                builder.add_state(name);
                current = Some(name);
            }
            Meta::Name => {
                let kind = resolve(token.text).ok_or_else(|| SyntaxError::InvalidGrammar {
                    offset,
                    message: format!("unknown token '{}'", token.text),
                })?;
                pending.push(kind);
            }
            Meta::Pipe | Meta::Newline => {}
            Meta::Target => {
                let from = current.ok_or_else(|| SyntaxError::InvalidGrammar {
                    offset,
                    message: "transition outside of a state".to_string(),
                })?;
                let to = &token.text[1..];
                builder.add_state(to);
                builder.transition(from, to, &pending)?;
                pending.clear();
            }
            Meta::Pattern => {
                if !extended {
                    return Err(SyntaxError::InvalidGrammar {
                        offset,
                        message: "token patterns need the extended form".to_string(),
                    });
                }
                if pending.len() != 1 {
                    return Err(SyntaxError::InvalidGrammar {
                        offset,
                        message: "a pattern belongs to exactly one token".to_string(),
                    });
                }
                patterns.extend(pending.drain(..).map(|kind| (kind, token.text[1..].trim_end().to_string())));
            }
        }
    }

    if !pending.is_empty() {
        return Err(SyntaxError::InvalidGrammar {
            offset: text.len(),
            message: "token list without a target".to_string(),
        });
    }

    let grammar = builder.build()?;
    debug!(
        states = grammar.states.len(),
        patterns = patterns.len(),
        "grammar loaded"
    );
    Ok((grammar, patterns))
}
