//! Error types shared by every stage of the engine.
//!
//! Failures fall into three families, one per entry point:
//!
//! - [`SyntaxError`] - scanning, grammar construction and parsing
//! - [`EvalError`] - pure evaluation of an operation tree
//! - [`CompileError`] - compilation against a [`QueryContext`](crate::compiler::QueryContext)

/// Errors raised while scanning, validating or parsing an expression, and
/// while assembling a grammar or dialect.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    /// No token definition matched (or was accepted) at the given offset.
    #[error("unexpected input at offset {offset}: '{remainder}'")]
    UnexpectedInput {
        /// Byte offset into the scanned input.
        offset: usize,
        /// The unconsumed input starting at `offset`.
        remainder: String,
    },

    /// A closing bracket without an opening one, or the other way around.
    #[error("unbalanced bracket '{bracket}' at offset {offset}")]
    UnbalancedBracket {
        /// The offending bracket text.
        bracket: String,
        /// Byte offset of the bracket.
        offset: usize,
    },

    /// A method operator that is not immediately followed by an opening bracket.
    #[error("expected opening bracket after method name '{method}' at offset {offset}")]
    MissingMethodBracket {
        /// Method spelling as written.
        method: String,
        /// Byte offset of the method token.
        offset: usize,
    },

    /// A method called with the wrong number of arguments.
    #[error("method '{method}' at offset {offset} takes {expected} argument(s), got {found}")]
    ArgumentCount {
        /// Canonical method name.
        method: &'static str,
        expected: usize,
        found: usize,
        /// Byte offset of the method token.
        offset: usize,
    },

    /// An argument separator outside a method call.
    #[error("argument separator outside a method call at offset {offset}")]
    MisplacedSeparator { offset: usize },

    /// An operator token whose spelling the dialect does not know.
    #[error("unknown operator '{spelling}' at offset {offset}")]
    UnknownOperator {
        /// Operator spelling as written.
        spelling: String,
        /// Byte offset of the operator token.
        offset: usize,
    },

    /// An operator ran out of operands while the operation tree was built.
    #[error("missing operand for operator '{operator}'")]
    MissingOperand {
        /// Canonical operator name.
        operator: &'static str,
    },

    /// The expression reduced to something other than a single operation.
    #[error("no operation produced: {0}")]
    NoOperation(String),

    /// Two transitions of one state share a token kind.
    #[error("ambiguous transition in state '{state}': token {token} already has a target")]
    AmbiguousTransition {
        /// The state that owns both transitions.
        state: String,
        /// Debug rendering of the shared token kind.
        token: String,
    },

    /// A state name that was never declared.
    #[error("unknown state '{0}'")]
    UnknownState(String),

    /// A grammar without states.
    #[error("grammar has no initial state")]
    NoInitialState,

    /// A malformed grammar description.
    #[error("invalid grammar description at offset {offset}: {message}")]
    InvalidGrammar {
        /// Byte offset into the description.
        offset: usize,
        /// What went wrong.
        message: String,
    },

    /// A token or literal pattern that does not compile.
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The pattern source.
        pattern: String,
        /// Message reported by the regex engine.
        message: String,
    },
}

/// Errors raised while evaluating an operation tree.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    /// The exact result does not fit the declared integral type.
    #[error("arithmetic overflow in '{operator}'")]
    Overflow {
        /// Canonical operator name.
        operator: &'static str,
    },

    /// Integral division or remainder by zero.
    #[error("division by zero in '{operator}'")]
    DivisionByZero {
        /// Canonical operator name.
        operator: &'static str,
    },

    /// An operand of the wrong type.
    #[error("type error in '{operator}': {message}")]
    TypeMismatch {
        /// Canonical operator name.
        operator: &'static str,
        /// Explanation.
        message: String,
    },

    /// A field reference evaluated without a document to resolve it against.
    #[error("unbound reference '{0}': no document to resolve it against")]
    UnboundReference(String),

    /// Descent through a value that has no fields.
    #[error("cannot resolve '{segment}' of '{path}' on a {found} value")]
    NotAnObject {
        /// Full reference path.
        path: String,
        /// The segment that failed.
        segment: String,
        /// Type name of the value found instead of an object.
        found: &'static str,
    },

    /// An opaque backend expression has no value outside its backend.
    #[error("opaque expression #{0} cannot be evaluated")]
    Opaque(u64),

    /// An operation whose operand count contradicts its operator.
    #[error("malformed operation '{operator}': expected {expected} operands, got {found}")]
    Malformed {
        /// Canonical operator name.
        operator: &'static str,
        /// Operand count required by the operator.
        expected: usize,
        /// Operand count present.
        found: usize,
    },
}

/// Errors raised while compiling an operation tree against a backend.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// A failure reported by the backend; passed through untouched.
    #[error(transparent)]
    Backend(Box<dyn std::error::Error + Send + Sync>),

    /// An operand that had to be evaluated at compile time (like patterns, aliases) failed.
    #[error("compile-time evaluation failed: {0}")]
    Evaluation(#[from] EvalError),

    /// The backend does not support an operator.
    #[error("operator '{0}' is not supported by this backend")]
    Unsupported(&'static str),
}

impl CompileError {
    /// Wraps any backend error.
    pub fn backend<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        CompileError::Backend(error.into())
    }
}
