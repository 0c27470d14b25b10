//! Solving by isolation of a single unknown

use crate::semantic::{ArithmeticOperation, Expression, MathematicalOperator};

/// Attempt to solve `expr = target` algebraically for `unknown`
///
/// Peels the operations wrapped around the unknown one at a time, applying
/// the inverse operation to the target.
///
/// Supports: +, -, *, /, ** (power), unary minus, sqrt, exp, log and the
/// trigonometric functions with their inverses (principal branch only)
///
/// Returns None if:
/// - The unknown appears on both sides of an operation (can't isolate)
/// - Unsupported operations are used (abs)
/// - The unknown does not appear at all
pub fn algebraic_solve(expr: &Expression, unknown: &str, target: &Expression) -> Option<Expression> {
    match expr {
        Expression::Symbol(name) => {
            if name == unknown {
                return Some(target.clone());
            }
            None
        }
        Expression::Negation(inner) => {
            // -u = t  =>  u = -t
            algebraic_solve(inner, unknown, &Expression::negate(target.clone()))
        }
        Expression::MathematicalOperator(op, inner) => {
            use MathematicalOperator as M;
            if !inner.contains_symbol(unknown) {
                return None;
            }

            let new_target = match op {
                // exp(u) = t  =>  u = log(t)
                M::Exp => Expression::apply(M::Log, target.clone()),
                // log(u) = t  =>  u = exp(t)
                M::Log => Expression::apply(M::Exp, target.clone()),
                // sqrt(u) = t  =>  u = t ** 2
                M::Sqrt => Expression::arithmetic(
                    target.clone(),
                    ArithmeticOperation::Power,
                    Expression::number(2),
                ),
                M::Sin => Expression::apply(M::Asin, target.clone()),
                M::Cos => Expression::apply(M::Acos, target.clone()),
                M::Tan => Expression::apply(M::Atan, target.clone()),
                M::Asin => Expression::apply(M::Sin, target.clone()),
                M::Acos => Expression::apply(M::Cos, target.clone()),
                M::Atan => Expression::apply(M::Tan, target.clone()),
                M::Abs => return None,
            };

            algebraic_solve(inner, unknown, &new_target)
        }
        Expression::Arithmetic(l, op, r) => {
            let l_contains = l.contains_symbol(unknown);
            let r_contains = r.contains_symbol(unknown);
            let l = (**l).clone();
            let r = (**r).clone();
            let t = target.clone();

            if l_contains && !r_contains {
                // Unknown on left
                let new_target = match op {
                    ArithmeticOperation::Add => {
                        Expression::arithmetic(t, ArithmeticOperation::Subtract, r)
                    }
                    ArithmeticOperation::Subtract => {
                        Expression::arithmetic(t, ArithmeticOperation::Add, r)
                    }
                    ArithmeticOperation::Multiply => {
                        Expression::arithmetic(t, ArithmeticOperation::Divide, r)
                    }
                    ArithmeticOperation::Divide => {
                        Expression::arithmetic(t, ArithmeticOperation::Multiply, r)
                    }
                    ArithmeticOperation::Power => {
                        // (u ** c) = t  =>  u = t ** (1 / c)
                        let inv_exp =
                            Expression::arithmetic(Expression::one(), ArithmeticOperation::Divide, r);
                        Expression::arithmetic(t, ArithmeticOperation::Power, inv_exp)
                    }
                };
                algebraic_solve(&l, unknown, &new_target)
            } else if r_contains && !l_contains {
                // Unknown on right
                let new_target = match op {
                    ArithmeticOperation::Add => {
                        Expression::arithmetic(t, ArithmeticOperation::Subtract, l)
                    }
                    // left - x = target => x = left - target
                    ArithmeticOperation::Subtract => {
                        Expression::arithmetic(l, ArithmeticOperation::Subtract, t)
                    }
                    ArithmeticOperation::Multiply => {
                        Expression::arithmetic(t, ArithmeticOperation::Divide, l)
                    }
                    // left / x = target => x = left / target
                    ArithmeticOperation::Divide => {
                        Expression::arithmetic(l, ArithmeticOperation::Divide, t)
                    }
                    ArithmeticOperation::Power => {
                        // (c ** u) = t  =>  u = log(t) / log(c)
                        let num = Expression::apply(MathematicalOperator::Log, t);
                        let den = Expression::apply(MathematicalOperator::Log, l);
                        Expression::arithmetic(num, ArithmeticOperation::Divide, den)
                    }
                };
                algebraic_solve(&r, unknown, &new_target)
            } else {
                None
            }
        }
        Expression::Number(_) => None,
    }
}
