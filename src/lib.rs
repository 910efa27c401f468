//! # clause-lang
//!
//! A dialect-configurable expression engine. Text is scanned by regex
//! patterns, validated by a small state machine, and parsed with the
//! shunting-yard algorithm into an operation tree. The tree can be
//! evaluated directly or compiled against a query backend.
//!
//! ```
//! use clause_lang::{dialect, Value};
//!
//! let odata = dialect::odata().unwrap();
//! let tree = odata.parse("a eq 'x' and (b lt 3 or c)").unwrap();
//! assert_eq!(tree.to_string(), "((a == 'x') && ((b < 3) || c))");
//!
//! let java = dialect::java().unwrap();
//! let sum = java.parse("1 + 2 * 3").unwrap();
//! assert_eq!(sum.evaluate().unwrap(), Value::Integer(7));
//! ```
pub mod ast;
pub mod compiler;
pub mod dialect;
pub mod error;
pub mod evaluator;
pub mod grammar;
pub mod lexer;
pub mod literal;
pub mod parser;
pub mod scanner;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{
    Associativity, FieldPath, Notation, OpaqueHandle, Operand, Operation, Operator, OperatorKind,
    Span, Token, TokenKind,
};
pub use compiler::{Arithmetic, Comparison, Compiler, EdgeKind, EdgeMemo, QueryContext, ResolvedPath};
pub use dialect::{Dialect, DialectBuilder};
pub use error::{CompileError, EvalError, SyntaxError};
pub use evaluator::Evaluator;
pub use grammar::{Cursor, Grammar, GrammarBuilder, StateId};
pub use lexer::{Lexer, Segment};
pub use literal::LiteralClassifier;
pub use parser::{Rpn, evaluate_rpn, to_rpn};
pub use scanner::{Scanner, TokenDefinition};
pub use value::{Value, ValueType};

/// Parses `text` with `dialect` into an operation tree.
pub fn parse(dialect: &Dialect, text: &str) -> Result<Operation, SyntaxError> {
    parser::parse(dialect, text)
}
