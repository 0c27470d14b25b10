//! Polynomial view of an expression in one variable, and its closed-form roots

use crate::semantic::{ArithmeticOperation, Expression, MathematicalOperator};
use crate::simplify::{negate, simplify};
use rust_decimal::prelude::ToPrimitive;

/// Coefficients `[c0, c1, ..., cn]` of `expr` as a polynomial in `var`.
///
/// Returns `None` when `var` appears somewhere other than a non-negative
/// integer power (inside a function, a denominator or an exponent), or the
/// degree would exceed `max_degree`.
pub fn coefficients(expr: &Expression, var: &str, max_degree: usize) -> Option<Vec<Expression>> {
    let mut coeffs = expand(expr, var, max_degree)?;
    for c in coeffs.iter_mut() {
        *c = simplify(c);
    }
    while coeffs.len() > 1 && coeffs.last().is_some_and(|c| c.is_zero()) {
        coeffs.pop();
    }
    Some(coeffs)
}

/// Highest power with a non-zero coefficient
pub fn degree(coeffs: &[Expression]) -> usize {
    coeffs.iter().rposition(|c| !c.is_zero()).unwrap_or(0)
}

fn expand(expr: &Expression, var: &str, max_degree: usize) -> Option<Vec<Expression>> {
    if !expr.contains_symbol(var) {
        return Some(vec![expr.clone()]);
    }
    match expr {
        Expression::Symbol(_) => Some(vec![Expression::zero(), Expression::one()]),
        Expression::Negation(inner) => {
            Some(expand(inner, var, max_degree)?.into_iter().map(negate).collect())
        }
        Expression::Arithmetic(l, op, r) => match op {
            ArithmeticOperation::Add | ArithmeticOperation::Subtract => {
                let left = expand(l, var, max_degree)?;
                let right = expand(r, var, max_degree)?;
                Some(add(left, right, *op))
            }
            ArithmeticOperation::Multiply => {
                let left = expand(l, var, max_degree)?;
                let right = expand(r, var, max_degree)?;
                multiply(&left, &right, max_degree)
            }
            ArithmeticOperation::Divide => {
                if r.contains_symbol(var) {
                    return None;
                }
                let left = expand(l, var, max_degree)?;
                Some(
                    left.into_iter()
                        .map(|c| Expression::arithmetic(c, ArithmeticOperation::Divide, (**r).clone()))
                        .collect(),
                )
            }
            ArithmeticOperation::Power => {
                if r.contains_symbol(var) {
                    return None;
                }
                let n = r.as_number().filter(|n| n.fract().is_zero() && !n.is_sign_negative())?;
                let n = n.to_usize()?;
                if n > max_degree {
                    return None;
                }
                let base = expand(l, var, max_degree)?;
                let mut result = vec![Expression::one()];
                for _ in 0..n {
                    result = multiply(&result, &base, max_degree)?;
                }
                Some(result)
            }
        },
        Expression::Number(_) | Expression::MathematicalOperator(..) => None,
    }
}

fn add(left: Vec<Expression>, right: Vec<Expression>, op: ArithmeticOperation) -> Vec<Expression> {
    let len = left.len().max(right.len());
    let mut left = left.into_iter();
    let mut right = right.into_iter();
    (0..len)
        .map(|_| {
            let a = left.next().unwrap_or_else(Expression::zero);
            let b = right.next().unwrap_or_else(Expression::zero);
            Expression::arithmetic(a, op, b)
        })
        .collect()
}

fn multiply(left: &[Expression], right: &[Expression], max_degree: usize) -> Option<Vec<Expression>> {
    let degree = (left.len() - 1) + (right.len() - 1);
    if degree > max_degree {
        return None;
    }
    let mut result = vec![Expression::zero(); degree + 1];
    for (i, a) in left.iter().enumerate() {
        for (j, b) in right.iter().enumerate() {
            let product = Expression::arithmetic(a.clone(), ArithmeticOperation::Multiply, b.clone());
            let slot = &mut result[i + j];
            *slot = simplify(&Expression::arithmetic(
                slot.clone(),
                ArithmeticOperation::Add,
                product,
            ));
        }
    }
    Some(result)
}

/// `c0 + c1*x = 0`
pub fn linear_root(c0: &Expression, c1: &Expression) -> Expression {
    simplify(&Expression::arithmetic(
        Expression::negate(c0.clone()),
        ArithmeticOperation::Divide,
        c1.clone(),
    ))
}

/// Real roots of `c0 + c1*x + c2*x**2 = 0`.
///
/// A numeric discriminant decides the count: negative gives no roots, zero one.
/// Numeric roots come back ascending; symbolic ones as `(-b - sqrt(d))/(2a)`
/// then `(-b + sqrt(d))/(2a)`.
pub fn quadratic_roots(c0: &Expression, c1: &Expression, c2: &Expression) -> Vec<Expression> {
    let mul = |a: Expression, b: Expression| Expression::arithmetic(a, ArithmeticOperation::Multiply, b);

    let discriminant = simplify(&Expression::arithmetic(
        Expression::arithmetic(c1.clone(), ArithmeticOperation::Power, Expression::number(2)),
        ArithmeticOperation::Subtract,
        mul(Expression::number(4), mul(c2.clone(), c0.clone())),
    ));
    let two_a = mul(Expression::number(2), c2.clone());
    let minus_b = Expression::negate(c1.clone());

    if let Some(d) = discriminant.as_number() {
        if d.is_sign_negative() && !d.is_zero() {
            return Vec::new();
        }
        if d.is_zero() {
            return vec![simplify(&Expression::arithmetic(
                minus_b,
                ArithmeticOperation::Divide,
                two_a,
            ))];
        }
    }

    let root = Expression::apply(MathematicalOperator::Sqrt, discriminant);
    let mut roots: Vec<Expression> = [ArithmeticOperation::Subtract, ArithmeticOperation::Add]
        .into_iter()
        .map(|op| {
            simplify(&Expression::arithmetic(
                Expression::arithmetic(minus_b.clone(), op, root.clone()),
                ArithmeticOperation::Divide,
                two_a.clone(),
            ))
        })
        .collect();

    if let [Some(a), Some(b)] = [roots[0].as_number(), roots[1].as_number()] {
        if a > b {
            roots.swap(0, 1);
        }
        if a == b {
            roots.truncate(1);
        }
    }
    roots
}
