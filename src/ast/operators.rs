use std::fmt;

/// Identity of a catalog operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperatorKind {
    // Logical
    /// Logical AND (`&&`)
    And,
    /// Logical OR (`||`)
    Or,
    /// Logical NOT (`!`)
    Not,

    // Comparison
    /// Equal (`==`)
    Equals,
    /// Not equal (`!=`)
    NotEquals,
    /// Greater than (`>`)
    GreaterThan,
    /// Greater than or equal (`>=`)
    GreaterThanOrEquals,
    /// Less than (`<`)
    LessThan,
    /// Less than or equal (`<=`)
    LessThanOrEquals,
    /// Membership (`in`)
    In,

    // Arithmetic
    /// Addition (`+`)
    Add,
    /// Subtraction (`-`)
    Sub,
    /// Multiplication (`*`)
    Mul,
    /// Division (`/`)
    Div,
    /// Remainder (`%`)
    Mod,

    // Strings
    /// String concatenation (`concat(a, b)`)
    Concat,
    /// Contains (`substring(a, b)`)
    Substring,
    /// Prefix test (`startsWith(a, b)`)
    StartsWith,
    /// Suffix test (`endsWith(a, b)`)
    EndsWith,

    // Other
    /// Conditional (`if(c, a, b)`)
    If,
    /// Element count (`count(a)`)
    Count,
    /// Distinct element count (`count_distinct(a)`)
    CountDistinct,
    /// Alias (`a as b`)
    As,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
}

/// Where an operator's spelling sits relative to its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notation {
    /// `a op b`
    Infix,
    /// `op a`
    Prefix,
    /// `op(a, b, ...)`
    Method,
}

/// A catalog operator. All operators are `'static` constants; operations
/// hold references into the catalog and never own an operator.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Operator {
    pub kind: OperatorKind,
    /// Canonical spelling, used when an operation is displayed
    pub name: &'static str,
    pub precedence: u8,
    pub associativity: Associativity,
    pub arity: usize,
    pub notation: Notation,
}

const fn op(
    kind: OperatorKind,
    name: &'static str,
    precedence: u8,
    associativity: Associativity,
    arity: usize,
    notation: Notation,
) -> Operator {
    Operator {
        kind,
        name,
        precedence,
        associativity,
        arity,
        notation,
    }
}

use Associativity::{Left, Right};
use Notation::{Infix, Method, Prefix};

impl Operator {
    pub const COUNT: Operator = op(OperatorKind::Count, "count", 150, Left, 1, Method);
    pub const COUNT_DISTINCT: Operator =
        op(OperatorKind::CountDistinct, "count_distinct", 150, Left, 1, Method);
    pub const NOT: Operator = op(OperatorKind::Not, "!", 140, Right, 1, Prefix);
    pub const MOD: Operator = op(OperatorKind::Mod, "%", 125, Left, 2, Infix);
    pub const MUL: Operator = op(OperatorKind::Mul, "*", 120, Left, 2, Infix);
    pub const DIV: Operator = op(OperatorKind::Div, "/", 120, Left, 2, Infix);
    pub const ADD: Operator = op(OperatorKind::Add, "+", 110, Left, 2, Infix);
    pub const SUB: Operator = op(OperatorKind::Sub, "-", 110, Left, 2, Infix);
    pub const CONCAT: Operator = op(OperatorKind::Concat, "concat", 90, Left, 2, Method);
    pub const GREATER_THAN: Operator = op(OperatorKind::GreaterThan, ">", 90, Left, 2, Infix);
    pub const GREATER_THAN_OR_EQUALS: Operator =
        op(OperatorKind::GreaterThanOrEquals, ">=", 90, Left, 2, Infix);
    pub const LESS_THAN: Operator = op(OperatorKind::LessThan, "<", 90, Left, 2, Infix);
    pub const LESS_THAN_OR_EQUALS: Operator =
        op(OperatorKind::LessThanOrEquals, "<=", 90, Left, 2, Infix);
    pub const IN: Operator = op(OperatorKind::In, "in", 90, Left, 2, Infix);
    pub const SUBSTRING: Operator = op(OperatorKind::Substring, "substring", 90, Left, 2, Method);
    pub const STARTS_WITH: Operator =
        op(OperatorKind::StartsWith, "startsWith", 90, Left, 2, Method);
    pub const ENDS_WITH: Operator = op(OperatorKind::EndsWith, "endsWith", 90, Left, 2, Method);
    pub const EQUALS: Operator = op(OperatorKind::Equals, "==", 80, Left, 2, Infix);
    pub const NOT_EQUALS: Operator = op(OperatorKind::NotEquals, "!=", 80, Left, 2, Infix);
    pub const AND: Operator = op(OperatorKind::And, "&&", 40, Left, 2, Infix);
    pub const OR: Operator = op(OperatorKind::Or, "||", 30, Left, 2, Infix);
    pub const IF: Operator = op(OperatorKind::If, "if", 20, Left, 3, Method);
    pub const AS: Operator = op(OperatorKind::As, "as", 10, Left, 2, Infix);

    /// Every operator, highest precedence first.
    pub const CATALOG: [&'static Operator; 23] = [
        &Operator::COUNT,
        &Operator::COUNT_DISTINCT,
        &Operator::NOT,
        &Operator::MOD,
        &Operator::MUL,
        &Operator::DIV,
        &Operator::ADD,
        &Operator::SUB,
        &Operator::CONCAT,
        &Operator::GREATER_THAN,
        &Operator::GREATER_THAN_OR_EQUALS,
        &Operator::LESS_THAN,
        &Operator::LESS_THAN_OR_EQUALS,
        &Operator::IN,
        &Operator::SUBSTRING,
        &Operator::STARTS_WITH,
        &Operator::ENDS_WITH,
        &Operator::EQUALS,
        &Operator::NOT_EQUALS,
        &Operator::AND,
        &Operator::OR,
        &Operator::IF,
        &Operator::AS,
    ];

    /// Looks an operator up by its canonical name.
    pub fn by_name(name: &str) -> Option<&'static Operator> {
        Operator::CATALOG.into_iter().find(|op| op.name == name)
    }

    pub fn by_kind(kind: OperatorKind) -> &'static Operator {
        match kind {
            OperatorKind::And => &Operator::AND,
            OperatorKind::Or => &Operator::OR,
            OperatorKind::Not => &Operator::NOT,
            OperatorKind::Equals => &Operator::EQUALS,
            OperatorKind::NotEquals => &Operator::NOT_EQUALS,
            OperatorKind::GreaterThan => &Operator::GREATER_THAN,
            OperatorKind::GreaterThanOrEquals => &Operator::GREATER_THAN_OR_EQUALS,
            OperatorKind::LessThan => &Operator::LESS_THAN,
            OperatorKind::LessThanOrEquals => &Operator::LESS_THAN_OR_EQUALS,
            OperatorKind::In => &Operator::IN,
            OperatorKind::Add => &Operator::ADD,
            OperatorKind::Sub => &Operator::SUB,
            OperatorKind::Mul => &Operator::MUL,
            OperatorKind::Div => &Operator::DIV,
            OperatorKind::Mod => &Operator::MOD,
            OperatorKind::Concat => &Operator::CONCAT,
            OperatorKind::Substring => &Operator::SUBSTRING,
            OperatorKind::StartsWith => &Operator::STARTS_WITH,
            OperatorKind::EndsWith => &Operator::ENDS_WITH,
            OperatorKind::If => &Operator::IF,
            OperatorKind::Count => &Operator::COUNT,
            OperatorKind::CountDistinct => &Operator::COUNT_DISTINCT,
            OperatorKind::As => &Operator::AS,
        }
    }

    /// Whether `self`, arriving at the parser, must wait on the operator
    /// stack above `top` instead of popping it.
    pub fn binds_tighter_than(&self, top: &Operator) -> bool {
        self.precedence > top.precedence
            || (self.precedence == top.precedence && top.associativity == Right)
    }

    /// Comparison operators flag the query as distinct when an operand joins.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self.kind,
            OperatorKind::Equals
                | OperatorKind::NotEquals
                | OperatorKind::GreaterThan
                | OperatorKind::GreaterThanOrEquals
                | OperatorKind::LessThan
                | OperatorKind::LessThanOrEquals
                | OperatorKind::In
                | OperatorKind::Substring
                | OperatorKind::StartsWith
                | OperatorKind::EndsWith
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
