use std::fmt;

/// Category of an expression token.
///
/// The scanner decides the category from the dialect's token patterns; the
/// lexer then checks that the category may appear at the current position.
/// Every consumer matches on this enum exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenKind {
    /// Literal or field reference
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 'hello'
    /// customer/name
    /// ```
    Operand,

    /// The `null` keyword
    Null,

    /// Prefix operator
    ///
    /// # Examples
    /// ```text
    /// !active
    /// not active
    /// ```
    UnaryOperator,

    /// Infix operator
    ///
    /// # Examples
    /// ```text
    /// a == b
    /// price gt 100
    /// ```
    BinaryOperator,

    /// Function-call style operator, always followed by `(`
    ///
    /// # Examples
    /// ```text
    /// count(items)
    /// startsWith(name, 'A')
    /// ```
    Method,

    /// `(`
    BracketOpen,

    /// `)`
    BracketClose,

    /// `,` between method arguments
    Separator,
}

impl TokenKind {
    pub const ALL: [TokenKind; 8] = [
        TokenKind::Operand,
        TokenKind::Null,
        TokenKind::UnaryOperator,
        TokenKind::BinaryOperator,
        TokenKind::Method,
        TokenKind::BracketOpen,
        TokenKind::BracketClose,
        TokenKind::Separator,
    ];

    /// Upper-case name used in grammar descriptions (`BRACKET_OPEN`).
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Operand => "OPERAND",
            TokenKind::Null => "NULL",
            TokenKind::UnaryOperator => "UNARY_OPERATOR",
            TokenKind::BinaryOperator => "BINARY_OPERATOR",
            TokenKind::Method => "METHOD",
            TokenKind::BracketOpen => "BRACKET_OPEN",
            TokenKind::BracketClose => "BRACKET_CLOSE",
            TokenKind::Separator => "SEPARATOR",
        }
    }

    pub fn from_name(name: &str) -> Option<TokenKind> {
        TokenKind::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte range of a token in the scanned input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A classified slice of the input.
///
/// `text` borrows from the scanned input; the token never owns a copy.
/// Scanners only emit non-empty tokens, so `span.start < span.end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src, K = TokenKind> {
    pub kind: K,
    pub text: &'src str,
    pub span: Span,
}

impl<'src, K> Token<'src, K> {
    pub fn new(kind: K, text: &'src str, start: usize) -> Self {
        Token {
            kind,
            text,
            span: Span::new(start, start + text.len()),
        }
    }
}

impl<K: fmt::Display> fmt::Display for Token<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{} {} '{}'", self.span.start, self.span.end, self.kind, self.text)
    }
}
