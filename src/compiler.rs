//! Compilation of operation trees into backend expressions.
//!
//! The engine never builds backend-native expressions itself. A backend
//! implements [`QueryContext`]: how to join along a field, how to read an
//! attribute, how to express a literal, and one builder per operator
//! family. The [`Compiler`] walks the tree and calls those builders.
//!
//! Path resolution is shared: [`QueryContext::resolve_path`] walks the
//! parent segments through an [`EdgeMemo`] owned by the context, so a path
//! prefix used twice within one compilation joins once.

use std::{collections::HashMap, hash::Hash};

use tracing::{debug, trace};

use crate::{
    ast::{FieldPath, OpaqueHandle, Operand, Operation, Operator, OperatorKind},
    error::CompileError,
    evaluator::Evaluator,
    value::{Value, ValueType},
};

/// How an edge of the path graph is joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Inner,
    Left,
}

/// Edges created during one compilation, keyed by (source node, field, kind).
#[derive(Debug, Clone)]
pub struct EdgeMemo<N> {
    edges: HashMap<(N, String, EdgeKind), N>,
}

impl<N> Default for EdgeMemo<N> {
    fn default() -> Self {
        EdgeMemo {
            edges: HashMap::new(),
        }
    }
}

impl<N: Clone + Eq + Hash> EdgeMemo<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, from: &N, field: &str, kind: EdgeKind) -> Option<&N> {
        self.edges.get(&(from.clone(), field.to_string(), kind))
    }

    pub fn insert(&mut self, from: N, field: &str, kind: EdgeKind, to: N) {
        self.edges.insert((from, field.to_string(), kind), to);
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn clear(&mut self) {
        self.edges.clear();
    }
}

/// A resolved field reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPath<E> {
    pub expr: E,
    /// Whether resolution went through at least one edge
    pub joined: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    GreaterThan,
    GreaterThanOrEquals,
    LessThan,
    LessThanOrEquals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arithmetic {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// The backend an operation tree compiles against.
///
/// `Node` identifies a point of the path graph (the query root, a join);
/// `Expr` is the backend's expression type. Errors a backend returns pass
/// through the compiler untouched.
pub trait QueryContext {
    type Node: Clone + Eq + Hash;
    type Expr: Clone;

    /// The node paths start from.
    fn root(&self) -> Self::Node;

    /// Edge memo for the current compilation.
    fn edges(&mut self) -> &mut EdgeMemo<Self::Node>;

    fn create_edge(
        &mut self,
        from: &Self::Node,
        field: &str,
        kind: EdgeKind,
    ) -> Result<Self::Node, CompileError>;

    fn attribute(&mut self, from: &Self::Node, field: &str) -> Result<Self::Expr, CompileError>;

    /// Joins along the parent segments of `path`, reusing memoized edges,
    /// then reads the last segment as an attribute.
    fn resolve_path(&mut self, path: &FieldPath) -> Result<ResolvedPath<Self::Expr>, CompileError> {
        let mut node = self.root();
        for field in path.parents() {
            node = match self.edges().get(&node, field, EdgeKind::Left).cloned() {
                Some(existing) => {
                    trace!(field = %field, "edge reused");
                    existing
                }
                None => {
                    let created = self.create_edge(&node, field, EdgeKind::Left)?;
                    debug!(field = %field, path = %path, "edge created");
                    self.edges().insert(node, field, EdgeKind::Left, created.clone());
                    created
                }
            };
        }
        Ok(ResolvedPath {
            expr: self.attribute(&node, path.leaf())?,
            joined: !path.parents().is_empty(),
        })
    }

    /// A constant, typed after `target` when the other side's type is known.
    fn literal(&mut self, value: &Value, target: Option<ValueType>) -> Result<Self::Expr, CompileError>;

    fn null_literal(&mut self, target: Option<ValueType>) -> Result<Self::Expr, CompileError>;

    fn opaque(&mut self, handle: OpaqueHandle) -> Result<Self::Expr, CompileError>;

    fn declared_type(&self, expr: &Self::Expr) -> Option<ValueType>;

    /// Marks the query as needing duplicate elimination.
    fn require_distinct(&mut self);

    fn and(&mut self, left: Self::Expr, right: Self::Expr) -> Result<Self::Expr, CompileError>;
    fn or(&mut self, left: Self::Expr, right: Self::Expr) -> Result<Self::Expr, CompileError>;
    fn not(&mut self, operand: Self::Expr) -> Result<Self::Expr, CompileError>;
    fn equal(&mut self, left: Self::Expr, right: Self::Expr) -> Result<Self::Expr, CompileError>;
    fn is_null(&mut self, operand: Self::Expr) -> Result<Self::Expr, CompileError>;
    fn is_empty(&mut self, operand: Self::Expr) -> Result<Self::Expr, CompileError>;
    fn always_true(&mut self) -> Result<Self::Expr, CompileError>;
    fn compare(
        &mut self,
        comparison: Comparison,
        left: Self::Expr,
        right: Self::Expr,
    ) -> Result<Self::Expr, CompileError>;
    fn arithmetic(
        &mut self,
        arithmetic: Arithmetic,
        left: Self::Expr,
        right: Self::Expr,
    ) -> Result<Self::Expr, CompileError>;
    fn concat(&mut self, left: Self::Expr, right: Self::Expr) -> Result<Self::Expr, CompileError>;
    /// SQL-style pattern match; `pattern` uses `%` wildcards.
    fn like(&mut self, operand: Self::Expr, pattern: String) -> Result<Self::Expr, CompileError>;
    fn in_list(&mut self, operand: Self::Expr, items: Vec<Self::Expr>) -> Result<Self::Expr, CompileError>;
    fn conditional(
        &mut self,
        condition: Self::Expr,
        then: Self::Expr,
        otherwise: Self::Expr,
    ) -> Result<Self::Expr, CompileError>;
    fn count(&mut self, operand: Self::Expr, distinct: bool) -> Result<Self::Expr, CompileError>;
    fn alias(&mut self, operand: Self::Expr, name: &str) -> Result<Self::Expr, CompileError>;
}

/// A compiled operand and whether it, or an operand nested inside it, joined.
struct Compiled<E> {
    expr: E,
    joined: bool,
}

/// Walks an operation tree, calling a [`QueryContext`]'s builders.
pub struct Compiler<'c, C: QueryContext> {
    context: &'c mut C,
    // joined references seen so far, not counting those under an aggregate
    joins: usize,
}

impl<'c, C: QueryContext> Compiler<'c, C> {
    pub fn new(context: &'c mut C) -> Self {
        Compiler { context, joins: 0 }
    }

    pub fn compile(&mut self, operand: &Operand) -> Result<C::Expr, CompileError> {
        Ok(self.operand(operand, None)?.expr)
    }

    pub fn compile_operation(&mut self, operation: &Operation) -> Result<C::Expr, CompileError> {
        self.operation(operation)
    }

    fn operand(&mut self, operand: &Operand, target: Option<ValueType>) -> Result<Compiled<C::Expr>, CompileError> {
        let expr = match operand {
            Operand::Literal(Value::Null) => self.context.null_literal(target)?,
            Operand::Literal(value) => self.context.literal(value, target)?,
            Operand::Reference(path) => {
                let resolved = self.context.resolve_path(path)?;
                if resolved.joined {
                    self.joins += 1;
                }
                return Ok(Compiled {
                    expr: resolved.expr,
                    joined: resolved.joined,
                });
            }
            Operand::Operation(op) => {
                let before = self.joins;
                let expr = self.operation(op)?;
                return Ok(Compiled {
                    expr,
                    joined: self.joins > before,
                });
            }
            Operand::Opaque(handle) => self.context.opaque(*handle)?,
        };
        Ok(Compiled { expr, joined: false })
    }

    /// Compiles operands in order, except that literals wait until the
    /// first declared type among the other operands is known.
    fn operands(&mut self, operands: &[Operand]) -> Result<Vec<Compiled<C::Expr>>, CompileError> {
        let mut compiled: Vec<Option<Compiled<C::Expr>>> = Vec::with_capacity(operands.len());
        let mut target = None;
        for operand in operands {
            if matches!(operand, Operand::Literal(_)) {
                compiled.push(None);
                continue;
            }
            let done = self.operand(operand, None)?;
            if target.is_none() {
                target = self.context.declared_type(&done.expr);
            }
            compiled.push(Some(done));
        }

        operands
            .iter()
            .zip(compiled)
            .map(|(operand, done)| match done {
                Some(done) => Ok(done),
                None => self.operand(operand, target),
            })
            .collect()
    }

    fn operation(&mut self, operation: &Operation) -> Result<C::Expr, CompileError> {
        let op = operation.operator();
        let operands = operation.operands();
        if operands.len() != op.arity {
            return Err(crate::error::EvalError::Malformed {
                operator: op.name,
                expected: op.arity,
                found: operands.len(),
            }
            .into());
        }

        let expr = match op.kind {
            OperatorKind::Equals => self.equals(op, operands)?,
            OperatorKind::NotEquals => {
                let equal = self.equals(op, operands)?;
                self.context.not(equal)?
            }
            OperatorKind::And | OperatorKind::Or => {
                let [left, right] = self.two(op, operands)?;
                if op.kind == OperatorKind::And {
                    self.context.and(left, right)?
                } else {
                    self.context.or(left, right)?
                }
            }
            OperatorKind::Not => {
                let operand = self.operand(&operands[0], None)?.expr;
                self.context.not(operand)?
            }
            OperatorKind::GreaterThan
            | OperatorKind::GreaterThanOrEquals
            | OperatorKind::LessThan
            | OperatorKind::LessThanOrEquals => {
                let comparison = match op.kind {
                    OperatorKind::GreaterThan => Comparison::GreaterThan,
                    OperatorKind::GreaterThanOrEquals => Comparison::GreaterThanOrEquals,
                    OperatorKind::LessThan => Comparison::LessThan,
                    _ => Comparison::LessThanOrEquals,
                };
                let [left, right] = self.two(op, operands)?;
                self.context.compare(comparison, left, right)?
            }
            OperatorKind::In => self.membership(op, operands)?,
            OperatorKind::Add
            | OperatorKind::Sub
            | OperatorKind::Mul
            | OperatorKind::Div
            | OperatorKind::Mod => {
                let arithmetic = match op.kind {
                    OperatorKind::Add => Arithmetic::Add,
                    OperatorKind::Sub => Arithmetic::Sub,
                    OperatorKind::Mul => Arithmetic::Mul,
                    OperatorKind::Div => Arithmetic::Div,
                    _ => Arithmetic::Mod,
                };
                let [left, right] = self.two(op, operands)?;
                self.context.arithmetic(arithmetic, left, right)?
            }
            OperatorKind::Concat => {
                let [left, right] = self.two(op, operands)?;
                self.context.concat(left, right)?
            }
            OperatorKind::Substring | OperatorKind::StartsWith | OperatorKind::EndsWith => {
                let subject = self.operand(&operands[0], None)?;
                self.flag_joins(op, [&subject]);
                let text = Evaluator::new().evaluate(&operands[1])?.as_text();
                let pattern = match op.kind {
                    OperatorKind::StartsWith => format!("{}%", text),
                    OperatorKind::EndsWith => format!("%{}", text),
                    _ => format!("%{}%", text),
                };
                self.context.like(subject.expr, pattern)?
            }
            OperatorKind::If => {
                let condition = self.operand(&operands[0], None)?.expr;
                let mut branches = self.operands(&operands[1..])?.into_iter();
                match (branches.next(), branches.next()) {
                    (Some(then), Some(otherwise)) => {
                        self.context.conditional(condition, then.expr, otherwise.expr)?
                    }
                    _ => return Err(CompileError::Unsupported(op.name)),
                }
            }
            OperatorKind::Count | OperatorKind::CountDistinct => {
                let before = self.joins;
                let operand = self.operand(&operands[0], None)?.expr;
                self.joins = before;
                self.context
                    .count(operand, op.kind == OperatorKind::CountDistinct)?
            }
            OperatorKind::As => {
                let operand = self.operand(&operands[0], None)?.expr;
                let name = match &operands[1] {
                    Operand::Reference(path) => path.to_string(),
                    Operand::Literal(value) if !value.is_null() => value.as_text(),
                    _ => return Err(CompileError::Unsupported(op.name)),
                };
                self.context.alias(operand, &name)?
            }
        };
        Ok(expr)
    }

    /// Two operands with literal coercion; comparisons flag joins.
    fn two(&mut self, op: &'static Operator, operands: &[Operand]) -> Result<[C::Expr; 2], CompileError> {
        let mut compiled = self.operands(operands)?.into_iter();
        match (compiled.next(), compiled.next()) {
            (Some(left), Some(right)) => {
                self.flag_joins(op, [&left, &right]);
                Ok([left.expr, right.expr])
            }
            _ => Err(CompileError::Unsupported(op.name)),
        }
    }

    fn flag_joins<const N: usize>(&mut self, op: &'static Operator, compiled: [&Compiled<C::Expr>; N]) {
        if op.is_comparison() && compiled.iter().any(|c| c.joined) {
            debug!(operator = op.name, "comparison across a join, distinct required");
            self.context.require_distinct();
        }
    }

    /// Null-aware equality: `null == null` always holds, `x == null`
    /// tests for null (or for emptiness when `x` is a collection).
    fn equals(&mut self, op: &'static Operator, operands: &[Operand]) -> Result<C::Expr, CompileError> {
        let (left, right) = (&operands[0], &operands[1]);
        match (left.is_null_literal(), right.is_null_literal()) {
            (true, true) => self.context.always_true(),
            (true, false) => self.null_test(op, right),
            (false, true) => self.null_test(op, left),
            (false, false) => {
                let [left, right] = self.two(op, operands)?;
                self.context.equal(left, right)
            }
        }
    }

    fn null_test(&mut self, op: &'static Operator, operand: &Operand) -> Result<C::Expr, CompileError> {
        let compiled = self.operand(operand, None)?;
        self.flag_joins(op, [&compiled]);
        let collection = self
            .context
            .declared_type(&compiled.expr)
            .is_some_and(ValueType::is_collection);
        if collection {
            self.context.is_empty(compiled.expr)
        } else {
            self.context.is_null(compiled.expr)
        }
    }

    /// `x in [a, b]` becomes a list test with each item typed after `x`;
    /// any other right side is plain equality.
    fn membership(&mut self, op: &'static Operator, operands: &[Operand]) -> Result<C::Expr, CompileError> {
        match &operands[1] {
            Operand::Literal(Value::List(items)) => {
                let subject = self.operand(&operands[0], None)?;
                self.flag_joins(op, [&subject]);
                let target = self.context.declared_type(&subject.expr);
                let items = items
                    .iter()
                    .map(|item| match item {
                        Value::Null => self.context.null_literal(target),
                        value => self.context.literal(value, target),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                self.context.in_list(subject.expr, items)
            }
            _ => {
                let [left, right] = self.two(op, operands)?;
                self.context.equal(left, right)
            }
        }
    }
}

impl Operation {
    /// Compiles the tree into a backend expression.
    pub fn compile<C: QueryContext>(&self, context: &mut C) -> Result<C::Expr, CompileError> {
        Compiler::new(context).compile_operation(self)
    }
}
