//! Parse expressions and evaluate them against JSON input

use super::{CliError, json_to_value, resolve_dialect, value_to_json};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The expression to check
    pub expression: String,
    /// Dialect name; `sharp` when absent
    pub dialect: Option<String>,
    /// JSON document references resolve against
    pub input: Option<String>,
    /// Only validate syntax, don't evaluate
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax is valid; carries the canonical rendering
    SyntaxValid(String),
    /// Expression evaluated to a JSON value
    Success(serde_json::Value),
}

/// Execute a check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let dialect = resolve_dialect(options.dialect.as_deref())?;
    let tree = dialect.parse(&options.expression)?;

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid(tree.to_string()));
    }

    let result = match &options.input {
        Some(json) => {
            let document = json_to_value(serde_json::from_str(json)?);
            tree.evaluate_with(&document)?
        }
        None => tree.evaluate()?,
    };

    Ok(CheckResult::Success(value_to_json(result)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(expression: &str, input: Option<&str>) -> CheckOptions {
        CheckOptions {
            expression: expression.to_string(),
            dialect: Some("odata".to_string()),
            input: input.map(str::to_string),
            syntax_only: false,
        }
    }

    #[test]
    fn test_evaluates_against_document() {
        let result = execute_check(&options("age ge 18 and name eq 'Ann'", Some(r#"{"age": 30, "name": "Ann"}"#)));
        assert!(matches!(result, Ok(CheckResult::Success(serde_json::Value::Bool(true)))));
    }

    #[test]
    fn test_syntax_only_renders() {
        let mut opts = options("a eq 1", None);
        opts.syntax_only = true;
        match execute_check(&opts) {
            Ok(CheckResult::SyntaxValid(rendered)) => assert_eq!(rendered, "(a == 1)"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_reference_without_input_fails() {
        assert!(matches!(
            execute_check(&options("a eq 1", None)),
            Err(CliError::Eval(_))
        ));
    }
}
