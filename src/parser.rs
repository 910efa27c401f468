//! Operator-precedence parsing: tokens to reverse Polish notation to a tree.
//!
//! [`to_rpn`] runs the shunting-yard algorithm over a validated token
//! stream; [`evaluate_rpn`] folds the postfix sequence into an
//! [`Operation`]. [`parse`] chains scanning, validation and both steps.

use std::fmt;

use tracing::debug;

use crate::ast::{Operand, Operation, Operator, Token, TokenKind};
use crate::dialect::Dialect;
use crate::error::SyntaxError;

/// One element of a postfix sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rpn<'s> {
    /// An operand or `null` token, in source order
    Value(Token<'s>),
    /// An operator, placed after its operands
    Operator(&'static Operator),
}

impl fmt::Display for Rpn<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rpn::Value(token) => f.write_str(token.text),
            Rpn::Operator(op) => f.write_str(op.name),
        }
    }
}

/// Operator stack entries.
#[derive(Debug, Clone, Copy)]
enum Pending<'s> {
    Bracket(Token<'s>),
    Operator(&'static Operator),
    Method {
        operator: &'static Operator,
        arguments: usize,
        offset: usize,
    },
}

/// Scans, validates and parses `input` with `dialect`.
pub fn parse(dialect: &Dialect, input: &str) -> Result<Operation, SyntaxError> {
    let tokens = dialect.tokenize(input)?;
    let rpn = to_rpn(dialect, &tokens)?;
    debug!(
        dialect = dialect.name(),
        rpn = %rpn.iter().map(ToString::to_string).collect::<Vec<_>>().join(" "),
        "rpn"
    );
    evaluate_rpn(dialect, &rpn)
}

fn lookup(dialect: &Dialect, token: &Token<'_>) -> Result<&'static Operator, SyntaxError> {
    dialect
        .operator(token.text, token.kind)
        .ok_or_else(|| SyntaxError::UnknownOperator {
            spelling: token.text.to_string(),
            offset: token.span.start,
        })
}

/// Reorders tokens into postfix form.
///
/// - operands and `null` go straight to the output
/// - an operator first moves every stacked operator that binds at least as
///   tightly to the output (an equal-precedence right-associative operator
///   stays); a prefix operator moves nothing
/// - a method must be followed by `(`; the bracket and then the method are
///   stacked, and the method leaves the stack only with its closing bracket
/// - a separator flushes operators down to the enclosing method and counts
///   one more argument; outside a method's brackets it is an error
/// - a method's closing bracket checks the argument count against its arity
/// - a closing bracket flushes down to its opening bracket, which is dropped
pub fn to_rpn<'s>(dialect: &Dialect, tokens: &[Token<'s>]) -> Result<Vec<Rpn<'s>>, SyntaxError> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Pending<'s>> = Vec::new();
    let mut iter = tokens.iter();

    while let Some(token) = iter.next() {
        match token.kind {
            TokenKind::Operand | TokenKind::Null => output.push(Rpn::Value(*token)),
            TokenKind::UnaryOperator | TokenKind::BinaryOperator => {
                let op = lookup(dialect, token)?;
                if token.kind == TokenKind::BinaryOperator {
                    while let Some(&Pending::Operator(top)) = stack.last() {
                        if op.binds_tighter_than(top) {
                            break;
                        }
                        output.push(Rpn::Operator(top));
                        stack.pop();
                    }
                }
                stack.push(Pending::Operator(op));
            }
            TokenKind::Method => {
                let op = lookup(dialect, token)?;
                match iter.next() {
                    Some(open) if open.kind == TokenKind::BracketOpen => {
                        stack.push(Pending::Bracket(*open));
                        stack.push(Pending::Method {
                            operator: op,
                            arguments: 1,
                            offset: token.span.start,
                        });
                    }
                    _ => {
                        return Err(SyntaxError::MissingMethodBracket {
                            method: token.text.to_string(),
                            offset: token.span.start,
                        });
                    }
                }
            }
            TokenKind::BracketOpen => stack.push(Pending::Bracket(*token)),
            TokenKind::BracketClose => loop {
                match stack.pop() {
                    Some(Pending::Bracket(_)) => break,
                    Some(Pending::Operator(op)) => output.push(Rpn::Operator(op)),
                    Some(Pending::Method {
                        operator,
                        arguments,
                        offset,
                    }) => {
                        if arguments != operator.arity {
                            return Err(SyntaxError::ArgumentCount {
                                method: operator.name,
                                expected: operator.arity,
                                found: arguments,
                                offset,
                            });
                        }
                        output.push(Rpn::Operator(operator));
                    }
                    None => {
                        return Err(SyntaxError::UnbalancedBracket {
                            bracket: token.text.to_string(),
                            offset: token.span.start,
                        });
                    }
                }
            },
            TokenKind::Separator => {
                while let Some(&Pending::Operator(op)) = stack.last() {
                    output.push(Rpn::Operator(op));
                    stack.pop();
                }
                match stack.last_mut() {
                    Some(Pending::Method { arguments, .. }) => *arguments += 1,
                    _ => {
                        return Err(SyntaxError::MisplacedSeparator {
                            offset: token.span.start,
                        });
                    }
                }
            }
        }
    }

    while let Some(pending) = stack.pop() {
        match pending {
            Pending::Operator(op) | Pending::Method { operator: op, .. } => {
                output.push(Rpn::Operator(op))
            }
            Pending::Bracket(open) => {
                return Err(SyntaxError::UnbalancedBracket {
                    bracket: open.text.to_string(),
                    offset: open.span.start,
                });
            }
        }
    }

    Ok(output)
}

/// Folds a postfix sequence into a single operation.
///
/// Operand text becomes a literal when the dialect classifies it, and a
/// field reference otherwise.
pub fn evaluate_rpn(dialect: &Dialect, rpn: &[Rpn<'_>]) -> Result<Operation, SyntaxError> {
    let mut operands: Vec<Operand> = Vec::new();

    for item in rpn {
        match item {
            Rpn::Value(token) => operands.push(operand(dialect, token)?),
            Rpn::Operator(op) => {
                if operands.len() < op.arity {
                    return Err(SyntaxError::MissingOperand { operator: op.name });
                }
                let args = operands.split_off(operands.len() - op.arity);
                operands.push(Operand::Operation(Operation::new(op, args)?));
            }
        }
    }

    match operands.len() {
        0 => Err(SyntaxError::NoOperation("empty expression".to_string())),
        1 => match operands.pop() {
            Some(Operand::Operation(op)) => Ok(op),
            Some(other) => Err(SyntaxError::NoOperation(format!(
                "'{}' is not an operation",
                other
            ))),
            None => Err(SyntaxError::NoOperation("empty expression".to_string())),
        },
        n => Err(SyntaxError::NoOperation(format!(
            "{} operands left without an operator",
            n
        ))),
    }
}

fn operand(dialect: &Dialect, token: &Token<'_>) -> Result<Operand, SyntaxError> {
    if token.kind == TokenKind::Null {
        return Ok(Operand::null());
    }
    if let Some(value) = dialect.classify(token.text) {
        return Ok(Operand::Literal(value));
    }
    Operand::reference(token.text).ok_or_else(|| SyntaxError::UnexpectedInput {
        offset: token.span.start,
        remainder: token.text.to_string(),
    })
}
