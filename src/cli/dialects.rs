//! Built-in dialect listing

use super::{CliError, resolve_dialect};
use crate::dialect::BUILTIN;

/// Names of the built-in dialects.
pub fn dialect_overview() -> String {
    let mut out = String::from("Built-in dialects:\n");
    for name in BUILTIN {
        out.push_str("  ");
        out.push_str(name);
        out.push('\n');
    }
    out.push_str("\nRun 'clause dialects <name>' to see a dialect's operators.\n");
    out
}

/// Operator spellings of one dialect with the operator each stands for.
pub fn describe_dialect(name: &str) -> Result<String, CliError> {
    let dialect = resolve_dialect(Some(name))?;
    let mut out = format!("Dialect '{}'\n", dialect.name());
    for spelling in dialect.spellings() {
        out.push_str(&format!(
            "  {:<16} {:<16} {:<8} precedence {}\n",
            spelling.text,
            spelling.kind.name(),
            spelling.operator.name,
            spelling.operator.precedence
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_lists_spellings() {
        let text = describe_dialect("sql").unwrap();
        assert!(text.contains("<>"));
        assert!(text.contains("concat"));
    }

    #[test]
    fn test_unknown_dialect() {
        assert!(matches!(describe_dialect("cobol"), Err(CliError::UnknownDialect(_))));
    }
}
