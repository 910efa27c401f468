use clause_lang::cli::{
    CheckOptions, CheckResult, CliError, describe_dialect, dialect_overview, execute_check,
    execute_tokens, json_to_value,
};
use clause_lang::{Value, dialect};
use serde_json::json;

fn check(expression: &str, dialect: &str, input: Option<serde_json::Value>) -> Result<CheckResult, CliError> {
    execute_check(&CheckOptions {
        expression: expression.to_string(),
        dialect: Some(dialect.to_string()),
        input: input.map(|doc| doc.to_string()),
        syntax_only: false,
    })
}

fn check_value(expression: &str, dialect: &str, input: serde_json::Value) -> serde_json::Value {
    match check(expression, dialect, Some(input)) {
        Ok(CheckResult::Success(value)) => value,
        other => panic!("expected a value, got {:?}", other),
    }
}

fn order() -> serde_json::Value {
    json!({
        "id": 7,
        "status": "shipped",
        "total": 120.5,
        "customer": {"name": "Anna", "country": "SE", "vip": true},
        "lines": [1, 2, 2],
        "note": null
    })
}

// ============================================================================
// One filter, four dialects
// ============================================================================

#[test]
fn test_same_filter_in_every_dialect() {
    let filters = [
        ("odata", "status eq 'shipped' and total gt 100 and customer/country eq 'SE'"),
        ("java", "status == 'shipped' && total > 100 && customer.country == 'SE'"),
        ("sharp", "status == 'shipped' && total > 100 && customer.country == 'SE'"),
        ("sql", "status = 'shipped' AND total > 100 AND customer.country = 'SE'"),
    ];
    for (dialect, filter) in filters {
        assert_eq!(check_value(filter, dialect, order()), json!(true), "{}", dialect);
    }
}

#[test]
fn test_dialects_render_identically() {
    let odata = dialect::odata().unwrap().parse("a eq 1 or not (b lt 2)").unwrap();
    let sql = dialect::sql().unwrap().parse("a = 1 OR NOT (b < 2)").unwrap();
    assert_eq!(odata, sql);
}

// ============================================================================
// Evaluation against documents
// ============================================================================

#[test]
fn test_methods_against_document() {
    assert_eq!(check_value("startsWith(customer.name, 'An')", "sharp", order()), json!(true));
    assert_eq!(check_value("count_distinct(lines)", "sharp", order()), json!(2));
    assert_eq!(
        check_value("if(customer.vip, total * 2, total)", "sharp", order()),
        json!(241.0)
    );
    assert_eq!(
        check_value("status || '/' || customer.country", "sql", order()),
        json!("shipped/SE")
    );
}

#[test]
fn test_nulls_in_documents() {
    assert_eq!(check_value("note == null", "java", order()), json!(true));
    assert_eq!(check_value("missing.deeper == null", "java", order()), json!(true));
    assert!(matches!(
        check("id.deeper == 1", "java", Some(order())),
        Err(CliError::Eval(_))
    ));
}

#[test]
fn test_json_numbers_keep_width() {
    let doc = json_to_value(json!({"small": 5, "big": 5_000_000_000i64}));
    let tree = dialect::sharp().unwrap().parse("big + small").unwrap();
    assert_eq!(tree.evaluate_with(&doc), Ok(Value::Long(5_000_000_005)));
}

#[test]
fn test_literal_only_expression() {
    match check("(1 + 2) * 3", "java", None) {
        Ok(CheckResult::Success(value)) => assert_eq!(value, json!(9)),
        other => panic!("unexpected {:?}", other),
    }
}

// ============================================================================
// Errors and tooling
// ============================================================================

#[test]
fn test_errors_surface_by_kind() {
    assert!(matches!(check("a ==", "java", None), Err(CliError::Syntax(_))));
    assert!(matches!(check("a b", "java", None), Err(CliError::Syntax(_))));
    assert!(matches!(check("1 / 0", "java", None), Err(CliError::Eval(_))));
    assert!(matches!(
        check("a == 1", "java", Some(json!(null))).map(|_| ()),
        Ok(())
    ));
    assert!(matches!(
        check("a == 1", "cobol", None),
        Err(CliError::UnknownDialect(name)) if name == "cobol"
    ));
}

#[test]
fn test_invalid_json_input() {
    let result = execute_check(&CheckOptions {
        expression: "a == 1".to_string(),
        dialect: None,
        input: Some("{not json".to_string()),
        syntax_only: false,
    });
    assert!(matches!(result, Err(CliError::Json(_))));
}

#[test]
fn test_token_listing() {
    let lines = execute_tokens("count(x) > 1", None).unwrap();
    assert_eq!(lines[0], "0..5 METHOD 'count'");
    assert_eq!(lines.len(), 6);
    assert!(execute_tokens("a b", None).is_err());
}

#[test]
fn test_dialect_listing() {
    let overview = dialect_overview();
    for name in dialect::BUILTIN {
        assert!(overview.contains(name));
    }
    let odata = describe_dialect("ODATA").unwrap();
    assert!(odata.contains("startswith"));
}
