//! # Clause expression tree
//!
//! Parsing an expression produces an [`Operation`]: an operator from the
//! fixed catalog applied to [`Operand`]s. Operands are literals, field
//! references, nested operations, or opaque handles supplied by a query
//! backend.
//!
//! - **[tokens]** - token categories and spans produced by the scanner
//! - **[operators]** - the operator catalog (precedence, associativity, arity)
//! - **[operand]** - operands and operations
//! - **[path]** - normalized field paths
//!
//! The tree knows nothing about how it is interpreted. The
//! [`Evaluator`](crate::Evaluator) reduces it to a [`Value`](crate::Value);
//! the [`Compiler`](crate::Compiler) turns it into a backend expression
//! through a [`QueryContext`](crate::QueryContext).
//!
//! ## Rendering
//!
//! `Display` renders a fully parenthesized form using canonical operator
//! names, which the `SHARP` dialect parses back into an equal tree:
//!
//! ```text
//! a eq 'x' and (b lt 3 or c)     (ODATA input)
//! ((a == 'x') && ((b < 3) || c)) (rendering)
//! ```
pub mod operand;
pub mod operators;
pub mod path;
pub mod tokens;

pub use operand::{OpaqueHandle, Operand, Operation};
pub use operators::{Associativity, Notation, Operator, OperatorKind};
pub use path::FieldPath;
pub use tokens::{Span, Token, TokenKind};
