//! CLI support for clause-lang
//!
//! The functions here back the `clause` binary and can be called directly
//! by tools that embed the engine.

mod check;
mod convert;
mod dialects;
mod tokens;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use convert::{json_to_value, value_to_json};
pub use dialects::{describe_dialect, dialect_overview};
pub use tokens::execute_tokens;

use std::io;

use crate::dialect::{self, Dialect};

/// Dialect used when none is given.
pub const DEFAULT_DIALECT: &str = "sharp";

/// Errors that can occur during CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Scanning or parsing failed
    #[error("Syntax error: {0}")]
    Syntax(#[from] crate::SyntaxError),

    /// Evaluation failed
    #[error("Evaluation error: {0}")]
    Eval(#[from] crate::EvalError),

    /// Input is not valid JSON
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading input failed
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Dialect name not built in
    #[error("Unknown dialect: '{0}'\nRun 'clause dialects' to see available dialects.")]
    UnknownDialect(String),
}

/// Looks up a built-in dialect, falling back to [`DEFAULT_DIALECT`].
pub fn resolve_dialect(name: Option<&str>) -> Result<&'static Dialect, CliError> {
    let name = name.unwrap_or(DEFAULT_DIALECT);
    match dialect::builtin(name) {
        Some(dialect) => Ok(dialect?),
        None => Err(CliError::UnknownDialect(name.to_string())),
    }
}
