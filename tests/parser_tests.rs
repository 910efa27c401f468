// tests/parser_tests.rs

use chrono::NaiveDate;
use clause_lang::dialect;
use clause_lang::{Dialect, Operand, Operation, Operator, SyntaxError, TokenKind, Value};
use uuid::Uuid;

fn sharp(input: &str) -> Result<Operation, SyntaxError> {
    dialect::sharp().unwrap().parse(input)
}

fn render(dialect: &Dialect, input: &str) -> String {
    dialect.parse(input).unwrap().to_string()
}

/// Right-hand literal of a parsed `a == <literal>`.
fn right_literal(input: &str) -> Value {
    let tree = sharp(input).unwrap();
    match &tree.operands()[1] {
        Operand::Literal(value) => value.clone(),
        other => panic!("expected literal, got {:?}", other),
    }
}

// ============================================================================
// Precedence and associativity
// ============================================================================

#[test]
fn test_multiplication_binds_tighter() {
    let tree = sharp("1 + 2 * 3").unwrap();
    let expected = Operation::binary(
        &Operator::ADD,
        Value::from(1),
        Operation::binary(&Operator::MUL, Value::from(2), Value::from(3)),
    );
    assert_eq!(tree, expected);
}

#[test]
fn test_brackets_override_precedence() {
    let sharp = dialect::sharp().unwrap();
    assert_eq!(render(sharp, "(1 + 2) * 3"), "((1 + 2) * 3)");
    assert_eq!(render(sharp, "((a))  ==  1"), "(a == 1)");
}

#[test]
fn test_left_associativity() {
    let sharp = dialect::sharp().unwrap();
    assert_eq!(render(sharp, "8 - 4 - 2"), "((8 - 4) - 2)");
    assert_eq!(render(sharp, "a && b && c"), "((a && b) && c)");
}

#[test]
fn test_logical_precedence() {
    let odata = dialect::odata().unwrap();
    assert_eq!(
        render(odata, "a eq 'x' AND (b lt 3 OR c)"),
        "((a == 'x') && ((b < 3) || c))"
    );
    assert_eq!(
        render(odata, "a eq 1 or b eq 2 and c eq 3"),
        "((a == 1) || ((b == 2) && (c == 3)))"
    );
}

#[test]
fn test_prefix_not() {
    let odata = dialect::odata().unwrap();
    assert_eq!(render(odata, "not (a eq 1)"), "!(a == 1)");

    let java = dialect::java().unwrap();
    assert_eq!(render(java, "!a && b"), "(!a && b)");
    assert_eq!(render(java, "!!a"), "!!a");
}

#[test]
fn test_alias_binds_loosest() {
    let sharp = dialect::sharp().unwrap();
    assert_eq!(render(sharp, "a + 1 as total"), "((a + 1) as total)");
}

// ============================================================================
// Methods
// ============================================================================

#[test]
fn test_method_calls() {
    let sharp = dialect::sharp().unwrap();
    assert_eq!(render(sharp, "count(x) > 2"), "(count(x) > 2)");
    assert_eq!(
        render(sharp, "if(a > 1, 'big', 'small')"),
        "if((a > 1),'big','small')"
    );
    assert_eq!(
        render(sharp, "startsWith(concat(a, b), 'x')"),
        "startsWith(concat(a,b),'x')"
    );
}

#[test]
fn test_method_without_bracket() {
    // a dialect whose method pattern does not insist on the bracket
    let bare = Dialect::builder("bare")
        .operator_as("call", &Operator::COUNT, TokenKind::Method)
        .punctuation()
        .token_with_follow(TokenKind::Method, "call", r"\W|$")
        .operand_tokens()
        .build()
        .unwrap();
    assert!(matches!(
        bare.parse("call x)"),
        Err(SyntaxError::MissingMethodBracket { offset: 0, .. })
    ));
}

#[test]
fn test_method_with_extra_argument() {
    assert_eq!(
        sharp("count(a, b)"),
        Err(SyntaxError::ArgumentCount {
            method: "count",
            expected: 1,
            found: 2,
            offset: 0,
        })
    );
}

#[test]
fn test_nested_method_argument_count() {
    assert!(matches!(
        sharp("if(x, count(a, b))"),
        Err(SyntaxError::ArgumentCount { method: "count", offset: 6, .. })
    ));
    assert!(matches!(
        sharp("if(x, y)"),
        Err(SyntaxError::ArgumentCount { method: "if", expected: 3, found: 2, .. })
    ));
}

#[test]
fn test_separator_outside_method() {
    assert_eq!(
        sharp("x, if(a, b, c)"),
        Err(SyntaxError::MisplacedSeparator { offset: 1 })
    );
    assert_eq!(
        sharp("if((a, b), c, d)"),
        Err(SyntaxError::MisplacedSeparator { offset: 5 })
    );
}

#[test]
fn test_method_name_as_field() {
    // a method spelling is only a method in front of `(`
    let sharp = dialect::sharp().unwrap();
    assert_eq!(render(sharp, "count == 1"), "(count == 1)");
    assert_eq!(render(sharp, "count(count) > 1"), "(count(count) > 1)");
    assert_eq!(render(sharp, "counter == 1"), "(counter == 1)");

    let odata = dialect::odata().unwrap();
    assert_eq!(render(odata, "startswith eq 1"), "(startswith == 1)");
}

#[test]
fn test_method_name_fields_render_back() {
    let sharp = dialect::sharp().unwrap();
    let cases = [
        (dialect::java().unwrap(), "count == 1"),
        (dialect::odata().unwrap(), "if eq 1"),
        (dialect::sql().unwrap(), "concat = substring"),
    ];
    for (dialect, input) in cases {
        let tree = dialect.parse(input).unwrap();
        assert_eq!(sharp.parse(&tree.to_string()), Ok(tree), "{}", input);
    }
}

// ============================================================================
// Structural errors
// ============================================================================

#[test]
fn test_unbalanced_brackets() {
    assert!(matches!(
        sharp("(a + b"),
        Err(SyntaxError::UnbalancedBracket { offset: 0, .. })
    ));
    assert!(matches!(
        sharp("a + b)"),
        Err(SyntaxError::UnbalancedBracket { offset: 5, .. })
    ));
}

#[test]
fn test_not_an_operation() {
    assert!(matches!(sharp("1"), Err(SyntaxError::NoOperation(_))));
    assert!(matches!(sharp("a"), Err(SyntaxError::NoOperation(_))));
    assert!(matches!(sharp(""), Err(SyntaxError::NoOperation(_))));
}

#[test]
fn test_missing_operand() {
    assert_eq!(sharp("a +"), Err(SyntaxError::MissingOperand { operator: "+" }));
}

// ============================================================================
// Operands
// ============================================================================

#[test]
fn test_null_literal() {
    let tree = sharp("a == null").unwrap();
    assert!(tree.operands()[1].is_null_literal());
    assert_eq!(tree.to_string(), "(a == null)");
}

#[test]
fn test_path_separators_normalize() {
    let sharp = dialect::sharp().unwrap();
    assert_eq!(
        render(sharp, "order.customer.name == 'x'"),
        "(order/customer/name == 'x')"
    );
    assert_eq!(render(sharp, r"order\id == 1"), "(order/id == 1)");
}

#[test]
fn test_literal_types() {
    assert_eq!(right_literal("a == 5L"), Value::Long(5));
    assert_eq!(right_literal("a == 5"), Value::Integer(5));
    assert_eq!(right_literal("a == 2.5"), Value::Double(2.5));
    assert_eq!(right_literal("a == -3"), Value::Integer(-3));
    assert_eq!(right_literal("a == 'it''s'"), Value::from("it's"));
    assert_eq!(right_literal("a == TRUE"), Value::Boolean(true));
    assert_eq!(
        right_literal("a == 123e4567-e89b-12d3-a456-426614174000"),
        Value::Guid(Uuid::parse_str("123e4567-e89b-12d3-a456-426614174000").unwrap())
    );
    assert_eq!(
        right_literal("a == 2024-01-31"),
        Value::Date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())
    );
    assert_eq!(
        right_literal("a == datetime'2024-01-31T08:15'"),
        Value::DateTime(
            NaiveDate::from_ymd_opt(2024, 1, 31)
                .unwrap()
                .and_hms_opt(8, 15, 0)
                .unwrap()
        )
    );
}

#[test]
fn test_list_literal() {
    let tree = sharp("a in [1, 'b', 3L]").unwrap();
    assert_eq!(
        tree.operands()[1],
        Operand::Literal(Value::List(vec![
            Value::Integer(1),
            Value::from("b"),
            Value::Long(3),
        ]))
    );
}

#[test]
fn test_operator_word_as_field() {
    assert_eq!(render(dialect::sharp().unwrap(), "in in in"), "(in in in)");
}

// ============================================================================
// Dialects
// ============================================================================

#[test]
fn test_dialects_agree() {
    let expected = "((a == 1) && !(b != 2))";
    assert_eq!(render(dialect::odata().unwrap(), "a eq 1 and not (b ne 2)"), expected);
    assert_eq!(render(dialect::java().unwrap(), "a == 1 && !(b != 2)"), expected);
    assert_eq!(render(dialect::sql().unwrap(), "a = 1 AND NOT (b <> 2)"), expected);
}

#[test]
fn test_sql_concat_operator() {
    assert_eq!(
        render(dialect::sql().unwrap(), "a || 'x' = 'yx'"),
        "(concat(a,'x') == 'yx')"
    );
}

#[test]
fn test_case_sensitive_dialect() {
    let strict = Dialect::builder("strict")
        .case_sensitive(true)
        .operator("AND", &Operator::AND)
        .operator("=", &Operator::EQUALS)
        .punctuation()
        .operator_tokens()
        .operand_tokens()
        .build()
        .unwrap();

    assert_eq!(render(&strict, "a = 1 AND b = 2"), "((a == 1) && (b == 2))");
    assert!(strict.parse("a = 1 and b = 2").is_err());
    assert_eq!(strict.operator("and", TokenKind::BinaryOperator), None);
}

#[test]
fn test_custom_method_spelled_infix() {
    let custom = Dialect::builder("custom")
        .operator("==", &Operator::EQUALS)
        .operator_as("~", &Operator::SUBSTRING, TokenKind::BinaryOperator)
        .punctuation()
        .operator_tokens()
        .operand_tokens()
        .build()
        .unwrap();
    assert_eq!(render(&custom, "name ~ 'an'"), "substring(name,'an')");
}

#[test]
fn test_library_parse_entry_point() {
    let tree = clause_lang::parse(dialect::java().unwrap(), "a > 1").unwrap();
    assert_eq!(tree.operator(), &Operator::GREATER_THAN);
}
