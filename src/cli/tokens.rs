//! Show how a dialect tokenizes an expression

use super::{CliError, resolve_dialect};

/// One line per token: span, category and text.
pub fn execute_tokens(expression: &str, dialect: Option<&str>) -> Result<Vec<String>, CliError> {
    let dialect = resolve_dialect(dialect)?;
    let tokens = dialect.tokenize(expression)?;
    Ok(tokens.iter().map(ToString::to_string).collect())
}
