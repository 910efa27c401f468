// tests/compiler_tests.rs

use std::collections::HashMap;

use clause_lang::{
    Arithmetic, Comparison, CompileError, Compiler, EdgeKind, EdgeMemo, EvalError, OpaqueHandle,
    Operand, Operation, Operator, QueryContext, Value, ValueType, dialect,
};

/// A SQL fragment with the type the backend believes it has.
#[derive(Debug, Clone, PartialEq)]
struct Sql {
    text: String,
    ty: Option<ValueType>,
}

fn sql(text: String, ty: Option<ValueType>) -> Sql {
    Sql { text, ty }
}

fn boolean(text: String) -> Result<Sql, CompileError> {
    Ok(sql(text, Some(ValueType::Boolean)))
}

/// Renders trees as SQL text. Table aliases are the joined path, `t` is the root.
struct SqlContext {
    memo: EdgeMemo<String>,
    joins: Vec<String>,
    distinct: bool,
    schema: HashMap<&'static str, ValueType>,
    unknown_relation: Option<&'static str>,
}

impl SqlContext {
    fn new() -> Self {
        let schema = HashMap::from([
            ("x", ValueType::Integer),
            ("b", ValueType::Integer),
            ("c", ValueType::Integer),
            ("id", ValueType::Long),
            ("price", ValueType::Double),
            ("name", ValueType::String),
            ("tags", ValueType::List),
        ]);
        SqlContext {
            memo: EdgeMemo::new(),
            joins: Vec::new(),
            distinct: false,
            schema,
            unknown_relation: None,
        }
    }
}

impl QueryContext for SqlContext {
    type Node = String;
    type Expr = Sql;

    fn root(&self) -> String {
        "t".to_string()
    }

    fn edges(&mut self) -> &mut EdgeMemo<String> {
        &mut self.memo
    }

    fn create_edge(&mut self, from: &String, field: &str, kind: EdgeKind) -> Result<String, CompileError> {
        if self.unknown_relation == Some(field) {
            return Err(CompileError::backend(format!("no relation '{}'", field)));
        }
        let alias = format!("{}_{}", from, field);
        self.joins
            .push(format!("{:?} JOIN {}.{} {}", kind, from, field, alias));
        Ok(alias)
    }

    fn attribute(&mut self, from: &String, field: &str) -> Result<Sql, CompileError> {
        Ok(sql(format!("{}.{}", from, field), self.schema.get(field).copied()))
    }

    fn literal(&mut self, value: &Value, target: Option<ValueType>) -> Result<Sql, CompileError> {
        let text = match target {
            Some(ty) if ty != value.value_type() => format!("{}:{}", value, ty),
            _ => value.to_string(),
        };
        Ok(sql(text, target.or(Some(value.value_type()))))
    }

    fn null_literal(&mut self, target: Option<ValueType>) -> Result<Sql, CompileError> {
        Ok(sql("NULL".to_string(), target))
    }

    fn opaque(&mut self, handle: OpaqueHandle) -> Result<Sql, CompileError> {
        Ok(sql(format!("#{}", handle.0), None))
    }

    fn declared_type(&self, expr: &Sql) -> Option<ValueType> {
        expr.ty
    }

    fn require_distinct(&mut self) {
        self.distinct = true;
    }

    fn and(&mut self, left: Sql, right: Sql) -> Result<Sql, CompileError> {
        boolean(format!("({} AND {})", left.text, right.text))
    }

    fn or(&mut self, left: Sql, right: Sql) -> Result<Sql, CompileError> {
        boolean(format!("({} OR {})", left.text, right.text))
    }

    fn not(&mut self, operand: Sql) -> Result<Sql, CompileError> {
        boolean(format!("NOT {}", operand.text))
    }

    fn equal(&mut self, left: Sql, right: Sql) -> Result<Sql, CompileError> {
        boolean(format!("{} = {}", left.text, right.text))
    }

    fn is_null(&mut self, operand: Sql) -> Result<Sql, CompileError> {
        boolean(format!("{} IS NULL", operand.text))
    }

    fn is_empty(&mut self, operand: Sql) -> Result<Sql, CompileError> {
        boolean(format!("{} IS EMPTY", operand.text))
    }

    fn always_true(&mut self) -> Result<Sql, CompileError> {
        boolean("TRUE".to_string())
    }

    fn compare(&mut self, comparison: Comparison, left: Sql, right: Sql) -> Result<Sql, CompileError> {
        let symbol = match comparison {
            Comparison::GreaterThan => ">",
            Comparison::GreaterThanOrEquals => ">=",
            Comparison::LessThan => "<",
            Comparison::LessThanOrEquals => "<=",
        };
        boolean(format!("{} {} {}", left.text, symbol, right.text))
    }

    fn arithmetic(&mut self, arithmetic: Arithmetic, left: Sql, right: Sql) -> Result<Sql, CompileError> {
        let symbol = match arithmetic {
            Arithmetic::Add => "+",
            Arithmetic::Sub => "-",
            Arithmetic::Mul => "*",
            Arithmetic::Div => "/",
            Arithmetic::Mod => "%",
        };
        Ok(sql(format!("({} {} {})", left.text, symbol, right.text), left.ty))
    }

    fn concat(&mut self, left: Sql, right: Sql) -> Result<Sql, CompileError> {
        Ok(sql(
            format!("{} || {}", left.text, right.text),
            Some(ValueType::String),
        ))
    }

    fn like(&mut self, operand: Sql, pattern: String) -> Result<Sql, CompileError> {
        boolean(format!("{} LIKE '{}'", operand.text, pattern))
    }

    fn in_list(&mut self, operand: Sql, items: Vec<Sql>) -> Result<Sql, CompileError> {
        let items: Vec<_> = items.into_iter().map(|item| item.text).collect();
        boolean(format!("{} IN ({})", operand.text, items.join(", ")))
    }

    fn conditional(&mut self, condition: Sql, then: Sql, otherwise: Sql) -> Result<Sql, CompileError> {
        Ok(sql(
            format!(
                "CASE WHEN {} THEN {} ELSE {} END",
                condition.text, then.text, otherwise.text
            ),
            then.ty,
        ))
    }

    fn count(&mut self, operand: Sql, distinct: bool) -> Result<Sql, CompileError> {
        let text = if distinct {
            format!("COUNT(DISTINCT {})", operand.text)
        } else {
            format!("COUNT({})", operand.text)
        };
        Ok(sql(text, Some(ValueType::Long)))
    }

    fn alias(&mut self, operand: Sql, name: &str) -> Result<Sql, CompileError> {
        Ok(sql(format!("{} AS {}", operand.text, name), operand.ty))
    }
}

fn compile_in(context: &mut SqlContext, input: &str) -> Result<String, CompileError> {
    let tree = dialect::sharp().unwrap().parse(input).unwrap();
    tree.compile(context).map(|expr| expr.text)
}

fn compile(input: &str) -> String {
    compile_in(&mut SqlContext::new(), input).unwrap()
}

// ============================================================================
// Paths and joins
// ============================================================================

#[test]
fn test_plain_attribute() {
    let mut context = SqlContext::new();
    assert_eq!(compile_in(&mut context, "x == 1").unwrap(), "t.x = 1");
    assert!(context.joins.is_empty());
    assert!(!context.distinct);
}

#[test]
fn test_shared_prefix_joins_once() {
    let mut context = SqlContext::new();
    let text = compile_in(&mut context, "a.b == 1 && a.c == 2").unwrap();
    assert_eq!(text, "(t_a.b = 1 AND t_a.c = 2)");
    assert_eq!(context.joins, vec!["Left JOIN t.a t_a"]);
    assert_eq!(context.memo.len(), 1);
    assert!(context.distinct);
}

#[test]
fn test_nested_joins() {
    let mut context = SqlContext::new();
    let text = compile_in(&mut context, "a.d.name == 'x'").unwrap();
    assert_eq!(text, "t_a_d.name = 'x'");
    assert_eq!(context.joins.len(), 2);
}

#[test]
fn test_join_inside_arithmetic_needs_distinct() {
    let mut context = SqlContext::new();
    let text = compile_in(&mut context, "a.b + 1 > 2").unwrap();
    assert_eq!(text, "(t_a.b + 1) > 2");
    assert_eq!(context.joins, vec!["Left JOIN t.a t_a"]);
    assert!(context.distinct);

    let mut context = SqlContext::new();
    compile_in(&mut context, "concat(a.d.name, 'x') == 'yx'").unwrap();
    assert!(context.distinct);
}

#[test]
fn test_join_under_aggregate_in_arithmetic() {
    let mut context = SqlContext::new();
    compile_in(&mut context, "count(orders.id) + 1 > 2").unwrap();
    assert_eq!(context.joins.len(), 1);
    assert!(!context.distinct);
}

#[test]
fn test_compile_single_operand() {
    let mut context = SqlContext::new();
    let path = Operand::reference("a.b").unwrap();
    let expr = Compiler::new(&mut context).compile(&path).unwrap();
    assert_eq!(expr.text, "t_a.b");
    assert_eq!(expr.ty, Some(ValueType::Integer));
}

#[test]
fn test_backend_error_passes_through() {
    let mut context = SqlContext::new();
    context.unknown_relation = Some("secret");
    match compile_in(&mut context, "secret.x == 1") {
        Err(CompileError::Backend(e)) => assert_eq!(e.to_string(), "no relation 'secret'"),
        other => panic!("expected backend error, got {:?}", other),
    }
}

// ============================================================================
// Null handling
// ============================================================================

#[test]
fn test_null_comparisons() {
    assert_eq!(compile("x == null"), "t.x IS NULL");
    assert_eq!(compile("null == x"), "t.x IS NULL");
    assert_eq!(compile("tags == null"), "t.tags IS EMPTY");
    assert_eq!(compile("null == null"), "TRUE");
    assert_eq!(compile("x != null"), "NOT t.x IS NULL");
}

#[test]
fn test_null_test_across_join_needs_distinct() {
    let mut context = SqlContext::new();
    compile_in(&mut context, "a.b == null").unwrap();
    assert!(context.distinct);
}

// ============================================================================
// Literal coercion
// ============================================================================

#[test]
fn test_literal_takes_declared_type() {
    assert_eq!(compile("price > 5"), "t.price > 5:double");
    // the literal waits for the reference even when written first
    assert_eq!(compile("5 < price"), "5:double < t.price");
    assert_eq!(compile("name == 'x'"), "t.name = 'x'");
}

#[test]
fn test_untyped_attribute_leaves_literal_alone() {
    assert_eq!(compile("unknown >= 2"), "t.unknown >= 2");
}

#[test]
fn test_membership_list() {
    assert_eq!(compile("id in [1, 2]"), "t.id IN (1:long, 2:long)");
    assert_eq!(compile("x in [1, null]"), "t.x IN (1, NULL)");
    assert_eq!(compile("x in 3"), "t.x = 3");
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_like_patterns() {
    assert_eq!(compile("startsWith(name, 'an')"), "t.name LIKE 'an%'");
    assert_eq!(compile("endsWith(name, 'an')"), "t.name LIKE '%an'");
    assert_eq!(compile("substring(name, 'an')"), "t.name LIKE '%an%'");
}

#[test]
fn test_like_pattern_must_be_constant() {
    assert!(matches!(
        compile_in(&mut SqlContext::new(), "startsWith(name, other)"),
        Err(CompileError::Evaluation(EvalError::UnboundReference(_)))
    ));
}

#[test]
fn test_arithmetic_and_logic() {
    assert_eq!(compile("(x + b) * 2 > 10"), "((t.x + t.b) * 2) > 10");
    assert_eq!(compile("!(x == 1) || b < 2"), "(NOT t.x = 1 OR t.b < 2)");
}

#[test]
fn test_counts() {
    let mut context = SqlContext::new();
    let text = compile_in(&mut context, "count_distinct(orders.id) > 1").unwrap();
    assert_eq!(text, "COUNT(DISTINCT t_orders.id) > 1:long");
    // an aggregate is not itself a joined operand
    assert!(!context.distinct);
    assert_eq!(compile("count(tags) == 0"), "COUNT(t.tags) = 0:long");
}

#[test]
fn test_conditional() {
    assert_eq!(
        compile("if(x > 1, 'a', 'b') == 'a'"),
        "CASE WHEN t.x > 1 THEN 'a' ELSE 'b' END = 'a'"
    );
}

#[test]
fn test_concat() {
    assert_eq!(compile("concat(name, '!') == 'x!'"), "t.name || '!' = 'x!'");
}

#[test]
fn test_alias() {
    assert_eq!(compile("x + 1 as total"), "(t.x + 1) AS total");
    assert_eq!(compile("x as 'label'"), "t.x AS label");
    assert!(matches!(
        compile_in(&mut SqlContext::new(), "x as null"),
        Err(CompileError::Unsupported("as"))
    ));
}

#[test]
fn test_opaque_operand() {
    let tree = Operation::binary(
        &Operator::EQUALS,
        Operand::Opaque(OpaqueHandle(1)),
        Value::from(1),
    );
    assert_eq!(tree.compile(&mut SqlContext::new()).unwrap().text, "#1 = 1");
}
