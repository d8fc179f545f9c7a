//! Compile-time boolean evaluation.
//!
//! `$if` and `$assert` conditions are evaluated over the constant subset
//! of the expression grammar: literals, build constants, `defined()`,
//! logical operators, and integer comparison/arithmetic. Anything else is
//! a [`CompileTimeEvaluationError`] at the pass level.
//!
//! [`CompileTimeEvaluationError`]: sable_core::SemaError::CompileTimeEvaluationError

use sable_ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use sable_core::Span;
use sable_registry::Module;

use crate::env::{BuildEnv, ConstValue};

/// Why an expression is not a valid compile-time boolean.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EvalError {
    /// Human-readable reason.
    pub detail: String,
    /// Where the offending (sub-)expression is.
    pub span: Span,
}

impl EvalError {
    fn new(detail: impl Into<String>, span: Span) -> Self {
        Self {
            detail: detail.into(),
            span,
        }
    }
}

/// Evaluate `expr` as a compile-time boolean.
///
/// `module` provides the declaration set `defined()` consults; the pass
/// ordering guarantees it already reflects registration (and, for
/// assertions, conditional expansion).
pub(crate) fn const_bool(env: &BuildEnv, module: &Module, expr: &Expr) -> Result<bool, EvalError> {
    expect_bool(const_value(env, module, expr)?, expr.span)
}

fn const_value(env: &BuildEnv, module: &Module, expr: &Expr) -> Result<ConstValue, EvalError> {
    match &expr.kind {
        ExprKind::Bool(value) => Ok(ConstValue::Bool(*value)),
        ExprKind::Int(value) => Ok(ConstValue::Int(*value)),
        ExprKind::Str(_) => Err(EvalError::new(
            "a string literal has no compile-time boolean value",
            expr.span,
        )),
        ExprKind::Ident(name) => env.const_value(name).cloned().ok_or_else(|| {
            EvalError::new(format!("unknown compile-time constant '{name}'"), expr.span)
        }),
        ExprKind::Defined(name) => Ok(ConstValue::Bool(module.symbols.contains_key(name))),
        ExprKind::Unary { op, operand } => match op {
            UnaryOp::Not => {
                let value = expect_bool(const_value(env, module, operand)?, operand.span)?;
                Ok(ConstValue::Bool(!value))
            }
            UnaryOp::Neg => {
                let value = expect_int(const_value(env, module, operand)?, operand.span)?;
                Ok(ConstValue::Int(-value))
            }
        },
        ExprKind::Binary { op, lhs, rhs } => const_binary(env, module, *op, lhs, rhs, expr.span),
        ExprKind::Call { name, .. } => Err(EvalError::new(
            format!("call to '{name}' cannot be evaluated at compile time"),
            expr.span,
        )),
    }
}

fn const_binary(
    env: &BuildEnv,
    module: &Module,
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
    span: Span,
) -> Result<ConstValue, EvalError> {
    match op {
        // Logical operators short-circuit, so an error in the untaken
        // operand is never surfaced.
        BinaryOp::And => {
            if !const_bool(env, module, lhs)? {
                return Ok(ConstValue::Bool(false));
            }
            Ok(ConstValue::Bool(const_bool(env, module, rhs)?))
        }
        BinaryOp::Or => {
            if const_bool(env, module, lhs)? {
                return Ok(ConstValue::Bool(true));
            }
            Ok(ConstValue::Bool(const_bool(env, module, rhs)?))
        }
        BinaryOp::Eq | BinaryOp::Ne => {
            let left = const_value(env, module, lhs)?;
            let right = const_value(env, module, rhs)?;
            let equal = match (&left, &right) {
                (ConstValue::Bool(a), ConstValue::Bool(b)) => a == b,
                (ConstValue::Int(a), ConstValue::Int(b)) => a == b,
                _ => {
                    return Err(EvalError::new(
                        "cannot compare a boolean with an integer",
                        span,
                    ));
                }
            };
            Ok(ConstValue::Bool(if op == BinaryOp::Eq { equal } else { !equal }))
        }
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let left = expect_int(const_value(env, module, lhs)?, lhs.span)?;
            let right = expect_int(const_value(env, module, rhs)?, rhs.span)?;
            let holds = match op {
                BinaryOp::Lt => left < right,
                BinaryOp::Le => left <= right,
                BinaryOp::Gt => left > right,
                _ => left >= right,
            };
            Ok(ConstValue::Bool(holds))
        }
        BinaryOp::Add | BinaryOp::Sub => {
            let left = expect_int(const_value(env, module, lhs)?, lhs.span)?;
            let right = expect_int(const_value(env, module, rhs)?, rhs.span)?;
            let value = if op == BinaryOp::Add {
                left.wrapping_add(right)
            } else {
                left.wrapping_sub(right)
            };
            Ok(ConstValue::Int(value))
        }
    }
}

fn expect_bool(value: ConstValue, span: Span) -> Result<bool, EvalError> {
    match value {
        ConstValue::Bool(value) => Ok(value),
        ConstValue::Int(_) => Err(EvalError::new(
            "expected a compile-time boolean, found an integer",
            span,
        )),
    }
}

fn expect_int(value: ConstValue, span: Span) -> Result<i64, EvalError> {
    match value {
        ConstValue::Int(value) => Ok(value),
        ConstValue::Bool(_) => Err(EvalError::new(
            "expected a compile-time integer, found a boolean",
            span,
        )),
    }
}
