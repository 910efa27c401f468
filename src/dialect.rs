//! Dialects: concrete spellings for the shared expression engine.
//!
//! A [`Dialect`] decides what the text looks like: which patterns make up
//! each token category and which spelling names which catalog operator.
//! Grammar, parser, evaluator and compiler are shared by every dialect.
//!
//! Four dialects are built in and initialized on first use:
//!
//! | dialect | example |
//! |---|---|
//! | [`odata`] | `name eq 'x' and not (age lt 18)` |
//! | [`java`] | `name == 'x' && !(age < 18)` |
//! | [`sharp`] | `startsWith(name, 'x') && count(items) > 2` |
//! | [`sql`] | `name = 'x' AND age <> 18` |

use std::fmt;
use std::sync::LazyLock;

use tracing::debug;

use crate::ast::{Notation, Operation, Operator, Token, TokenKind};
use crate::error::SyntaxError;
use crate::grammar::Grammar;
use crate::lexer::Lexer;
use crate::literal::LiteralClassifier;
use crate::scanner::{Scanner, TokenDefinition};
use crate::value::Value;

/// Legal token order for every expression dialect.
pub const EXPRESSION_GRAMMAR: &str = "\
expect_operand:
BRACKET_OPEN|UNARY_OPERATOR|SEPARATOR|METHOD:expect_operand
OPERAND|NULL:expect_operator

expect_operator:
BRACKET_CLOSE:expect_operator
BINARY_OPERATOR|SEPARATOR:expect_operand
";

const WORD_END: &str = r"\W|$";
const CALL_OPEN: &str = r"\s*\(";

const OPERAND_PATTERNS: [(&str, Option<&str>); 8] = [
    ("'(?:[^']|'')*'", None),
    ("(?i:datetime)'[^']*'", None),
    (r"\[[^\]]*\]", None),
    (
        "[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
        Some(WORD_END),
    ),
    (
        r"[0-9]{4}-[0-9]{2}-[0-9]{2}[Tt][0-9]{2}:[0-9]{2}(?::[0-9]{2}(?:\.[0-9]+)?)?",
        Some(WORD_END),
    ),
    ("[0-9]{4}-[0-9]{2}-[0-9]{2}", Some(WORD_END)),
    (
        r"[-+]?(?:[0-9]+\.[0-9]*|\.[0-9]+|[0-9]+)(?:[eE][-+]?[0-9]+)?[lLdDfF]?",
        Some(WORD_END),
    ),
    (r"[A-Za-z_$@][\w$@]*(?:[./\\][\w$@]+)*", None),
];

/// An operator spelling registered with a dialect.
#[derive(Debug, Clone)]
pub struct Spelling {
    pub text: String,
    pub kind: TokenKind,
    pub operator: &'static Operator,
}

/// Token patterns, operator spellings and literal rules of one expression language.
///
/// Dialects are immutable and `Sync`; build one at startup and share it.
pub struct Dialect {
    name: String,
    case_sensitive: bool,
    lexer: Lexer<TokenKind>,
    spellings: Vec<Spelling>,
    literals: LiteralClassifier,
}

impl fmt::Debug for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dialect")
            .field("name", &self.name)
            .field("case_sensitive", &self.case_sensitive)
            .field("operators", &self.spellings.len())
            .finish()
    }
}

impl Dialect {
    pub fn builder(name: &str) -> DialectBuilder {
        DialectBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn lexer(&self) -> &Lexer<TokenKind> {
        &self.lexer
    }

    /// Registered operator spellings, in registration order.
    pub fn spellings(&self) -> &[Spelling] {
        &self.spellings
    }

    /// The operator spelled `text` in token category `kind`.
    pub fn operator(&self, text: &str, kind: TokenKind) -> Option<&'static Operator> {
        self.spellings
            .iter()
            .find(|s| {
                s.kind == kind
                    && if self.case_sensitive {
                        s.text == text
                    } else {
                        s.text.eq_ignore_ascii_case(text)
                    }
            })
            .map(|s| s.operator)
    }

    /// The literal an operand's text denotes, or `None` for a field reference.
    pub fn classify(&self, text: &str) -> Option<Value> {
        self.literals.classify(text)
    }

    /// Scans and validates `input`.
    pub fn tokenize<'s>(&self, input: &'s str) -> Result<Vec<Token<'s>>, SyntaxError> {
        self.lexer.tokenize(input)
    }

    /// Parses `input` into an operation tree.
    pub fn parse(&self, input: &str) -> Result<Operation, SyntaxError> {
        crate::parser::parse(self, input)
    }
}

#[derive(Debug, Clone)]
enum Piece {
    Pattern {
        kind: TokenKind,
        pattern: String,
        follow: Option<String>,
    },
    Operators,
}

/// Assembles a [`Dialect`].
///
/// Token patterns are tried in the order they are added. `operator_tokens`
/// inserts, at that point, patterns generated from the spellings registered
/// with `operator`.
///
/// ```
/// use clause_lang::{Dialect, Operator};
///
/// let dialect = Dialect::builder("tiny")
///     .operator("eq", &Operator::EQUALS)
///     .operator("and", &Operator::AND)
///     .punctuation()
///     .operator_tokens()
///     .operand_tokens()
///     .build()
///     .unwrap();
///
/// let tree = dialect.parse("a eq 1 and b eq 2").unwrap();
/// assert_eq!(tree.to_string(), "((a == 1) && (b == 2))");
/// ```
#[derive(Debug, Clone)]
pub struct DialectBuilder {
    name: String,
    case_sensitive: bool,
    spellings: Vec<Spelling>,
    pieces: Vec<Piece>,
}

impl DialectBuilder {
    pub fn new(name: &str) -> Self {
        DialectBuilder {
            name: name.to_string(),
            case_sensitive: false,
            spellings: Vec::new(),
            pieces: Vec::new(),
        }
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Registers `text` for `operator`, in the token category its notation implies.
    pub fn operator(self, text: &str, operator: &'static Operator) -> Self {
        let kind = match operator.notation {
            Notation::Infix => TokenKind::BinaryOperator,
            Notation::Prefix => TokenKind::UnaryOperator,
            Notation::Method => TokenKind::Method,
        };
        self.operator_as(text, operator, kind)
    }

    /// Registers `text` for `operator` in an explicit token category, for
    /// example a two-argument method spelled infix.
    pub fn operator_as(mut self, text: &str, operator: &'static Operator, kind: TokenKind) -> Self {
        self.spellings.push(Spelling {
            text: text.to_string(),
            kind,
            operator,
        });
        self
    }

    pub fn token(self, kind: TokenKind, pattern: &str) -> Self {
        self.piece(kind, pattern, None)
    }

    /// Adds a pattern that only matches when `follow` matches the text after it.
    pub fn token_with_follow(self, kind: TokenKind, pattern: &str, follow: &str) -> Self {
        self.piece(kind, pattern, Some(follow))
    }

    /// Brackets, the argument separator and `null`.
    pub fn punctuation(self) -> Self {
        self.token(TokenKind::BracketOpen, r"\(")
            .token(TokenKind::BracketClose, r"\)")
            .token(TokenKind::Separator, ",")
            .token_with_follow(TokenKind::Null, "null", WORD_END)
    }

    /// Patterns for every registered operator spelling, generated at build time.
    pub fn operator_tokens(mut self) -> Self {
        self.pieces.push(Piece::Operators);
        self
    }

    /// Strings, lists, GUIDs, dates, numbers and field paths.
    pub fn operand_tokens(self) -> Self {
        OPERAND_PATTERNS
            .iter()
            .fold(self, |builder, (pattern, follow)| match follow {
                Some(follow) => builder.token_with_follow(TokenKind::Operand, pattern, follow),
                None => builder.token(TokenKind::Operand, pattern),
            })
    }

    pub fn build(self) -> Result<Dialect, SyntaxError> {
        let mut definitions = Vec::new();
        for piece in &self.pieces {
            match piece {
                Piece::Pattern {
                    kind,
                    pattern,
                    follow,
                } => definitions.push(self.definition(*kind, pattern, follow.as_deref())?),
                Piece::Operators => {
                    for kind in [
                        TokenKind::Method,
                        TokenKind::UnaryOperator,
                        TokenKind::BinaryOperator,
                    ] {
                        for (pattern, follow) in operator_patterns(&self.spellings, kind) {
                            definitions.push(self.definition(kind, &pattern, follow)?);
                        }
                    }
                }
            }
        }

        let grammar = Grammar::from_description(EXPRESSION_GRAMMAR, TokenKind::from_name)?;
        let lexer = Lexer::new(Scanner::new(definitions)?, grammar);
        debug!(
            dialect = %self.name,
            operators = self.spellings.len(),
            tokens = lexer.scanner().definitions().len(),
            "dialect built"
        );

        Ok(Dialect {
            name: self.name,
            case_sensitive: self.case_sensitive,
            lexer,
            spellings: self.spellings,
            literals: LiteralClassifier::new()?,
        })
    }

    fn piece(mut self, kind: TokenKind, pattern: &str, follow: Option<&str>) -> Self {
        self.pieces.push(Piece::Pattern {
            kind,
            pattern: pattern.to_string(),
            follow: follow.map(str::to_string),
        });
        self
    }

    fn definition(
        &self,
        kind: TokenKind,
        pattern: &str,
        follow: Option<&str>,
    ) -> Result<TokenDefinition<TokenKind>, SyntaxError> {
        let definition = TokenDefinition::new(kind, pattern, self.case_sensitive)?;
        match follow {
            Some(follow) => definition.followed_by(follow, self.case_sensitive),
            None => Ok(definition),
        }
    }
}

/// Alternations over the spellings of one category: word spellings get a
/// word-boundary guard, symbols are ordered longest first so `>=` wins over `>`.
/// Method spellings only match in front of `(`, so a field may share a
/// method's name.
fn operator_patterns(spellings: &[Spelling], kind: TokenKind) -> Vec<(String, Option<&'static str>)> {
    let (mut words, mut symbols): (Vec<&str>, Vec<&str>) = spellings
        .iter()
        .filter(|s| s.kind == kind)
        .map(|s| s.text.as_str())
        .partition(|text| text.chars().all(|c| c.is_alphanumeric() || c == '_'));
    words.sort_by_key(|w| std::cmp::Reverse(w.len()));
    symbols.sort_by_key(|s| std::cmp::Reverse(s.len()));

    let alternation = |texts: &[&str]| {
        texts
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|")
    };

    let (symbol_follow, word_follow) = match kind {
        TokenKind::Method => (Some(CALL_OPEN), Some(CALL_OPEN)),
        _ => (None, Some(WORD_END)),
    };
    let mut patterns = Vec::new();
    if !symbols.is_empty() {
        patterns.push((alternation(&symbols), symbol_follow));
    }
    if !words.is_empty() {
        patterns.push((alternation(&words), word_follow));
    }
    patterns
}

fn build_odata() -> Result<Dialect, SyntaxError> {
    Dialect::builder("odata")
        .operator("eq", &Operator::EQUALS)
        .operator("ne", &Operator::NOT_EQUALS)
        .operator("gt", &Operator::GREATER_THAN)
        .operator("ge", &Operator::GREATER_THAN_OR_EQUALS)
        .operator("lt", &Operator::LESS_THAN)
        .operator("le", &Operator::LESS_THAN_OR_EQUALS)
        .operator("and", &Operator::AND)
        .operator("or", &Operator::OR)
        .operator("in", &Operator::IN)
        .operator("add", &Operator::ADD)
        .operator("sub", &Operator::SUB)
        .operator("mul", &Operator::MUL)
        .operator("div", &Operator::DIV)
        .operator("mod", &Operator::MOD)
        .operator("not", &Operator::NOT)
        .operator("startswith", &Operator::STARTS_WITH)
        .operator("endswith", &Operator::ENDS_WITH)
        .operator("substring", &Operator::SUBSTRING)
        .punctuation()
        .operator_tokens()
        .operand_tokens()
        .build()
}

fn symbolic(name: &str) -> DialectBuilder {
    Dialect::builder(name)
        .operator("==", &Operator::EQUALS)
        .operator("!=", &Operator::NOT_EQUALS)
        .operator(">=", &Operator::GREATER_THAN_OR_EQUALS)
        .operator("<=", &Operator::LESS_THAN_OR_EQUALS)
        .operator(">", &Operator::GREATER_THAN)
        .operator("<", &Operator::LESS_THAN)
        .operator("&&", &Operator::AND)
        .operator("||", &Operator::OR)
        .operator("+", &Operator::ADD)
        .operator("-", &Operator::SUB)
        .operator("*", &Operator::MUL)
        .operator("/", &Operator::DIV)
        .operator("%", &Operator::MOD)
        .operator("!", &Operator::NOT)
}

fn build_java() -> Result<Dialect, SyntaxError> {
    symbolic("java")
        .punctuation()
        .operator_tokens()
        .operand_tokens()
        .build()
}

fn build_sharp() -> Result<Dialect, SyntaxError> {
    symbolic("sharp")
        .operator("in", &Operator::IN)
        .operator("as", &Operator::AS)
        .operator("substring", &Operator::SUBSTRING)
        .operator("startsWith", &Operator::STARTS_WITH)
        .operator("endsWith", &Operator::ENDS_WITH)
        .operator("concat", &Operator::CONCAT)
        .operator("if", &Operator::IF)
        .operator("count", &Operator::COUNT)
        .operator("count_distinct", &Operator::COUNT_DISTINCT)
        .punctuation()
        .operator_tokens()
        .operand_tokens()
        .build()
}

fn build_sql() -> Result<Dialect, SyntaxError> {
    Dialect::builder("sql")
        .operator("=", &Operator::EQUALS)
        .operator("<>", &Operator::NOT_EQUALS)
        .operator(">=", &Operator::GREATER_THAN_OR_EQUALS)
        .operator("<=", &Operator::LESS_THAN_OR_EQUALS)
        .operator(">", &Operator::GREATER_THAN)
        .operator("<", &Operator::LESS_THAN)
        .operator("and", &Operator::AND)
        .operator("or", &Operator::OR)
        .operator("in", &Operator::IN)
        .operator("as", &Operator::AS)
        .operator_as("||", &Operator::CONCAT, TokenKind::BinaryOperator)
        .operator("concat", &Operator::CONCAT)
        .operator("+", &Operator::ADD)
        .operator("-", &Operator::SUB)
        .operator("*", &Operator::MUL)
        .operator("/", &Operator::DIV)
        .operator("%", &Operator::MOD)
        .operator("not", &Operator::NOT)
        .operator("substring", &Operator::SUBSTRING)
        .operator("startsWith", &Operator::STARTS_WITH)
        .operator("endsWith", &Operator::ENDS_WITH)
        .operator("if", &Operator::IF)
        .operator("count", &Operator::COUNT)
        .operator("count_distinct", &Operator::COUNT_DISTINCT)
        .punctuation()
        .operator_tokens()
        .operand_tokens()
        .build()
}

static ODATA: LazyLock<Result<Dialect, SyntaxError>> = LazyLock::new(build_odata);
static JAVA: LazyLock<Result<Dialect, SyntaxError>> = LazyLock::new(build_java);
static SHARP: LazyLock<Result<Dialect, SyntaxError>> = LazyLock::new(build_sharp);
static SQL: LazyLock<Result<Dialect, SyntaxError>> = LazyLock::new(build_sql);

/// Names accepted by [`builtin`].
pub const BUILTIN: [&str; 4] = ["odata", "java", "sharp", "sql"];

/// OData-style keywords: `eq ne gt ge lt le and or not add sub mul div mod in`.
pub fn odata() -> Result<&'static Dialect, SyntaxError> {
    ODATA.as_ref().map_err(Clone::clone)
}

/// C-family symbols: `== != > >= < <= && || ! + - * / %`.
pub fn java() -> Result<&'static Dialect, SyntaxError> {
    JAVA.as_ref().map_err(Clone::clone)
}

/// Every catalog operator under its canonical name. Rendered trees parse back with this dialect.
pub fn sharp() -> Result<&'static Dialect, SyntaxError> {
    SHARP.as_ref().map_err(Clone::clone)
}

/// SQL-like: `= <> and or not`, `||` concatenates.
pub fn sql() -> Result<&'static Dialect, SyntaxError> {
    SQL.as_ref().map_err(Clone::clone)
}

/// Looks a built-in dialect up by name, ignoring case.
pub fn builtin(name: &str) -> Option<Result<&'static Dialect, SyntaxError>> {
    match name.to_ascii_lowercase().as_str() {
        "odata" => Some(odata()),
        "java" => Some(java()),
        "sharp" => Some(sharp()),
        "sql" => Some(sql()),
        _ => None,
    }
}
