//! Symbolic simplification
//!
//! Brings expressions to a small canonical form: numeric folding, like terms
//! collected in sums, repeated factors collected into integer powers and
//! cancelled across a quotient. Coefficients are kept as exact ratios while a
//! sum or product is being collected, so `x/3*3` folds back to `x`.

use crate::semantic::{ArithmeticOperation, Expression, MathematicalOperator};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

// Integer powers above this are left symbolic rather than multiplied out
const MAX_EXACT_EXPONENT: i64 = 64;

/// Significant digits kept from a value that went through f64
pub(crate) const FLOAT_DIGITS: u32 = 12;

/// Simplify an expression bottom-up
pub fn simplify(expr: &Expression) -> Expression {
    match expr {
        Expression::Number(n) => Expression::Number(n.normalize()),
        Expression::Symbol(_) => expr.clone(),
        Expression::Negation(inner) => negate(simplify(inner)),
        Expression::MathematicalOperator(op, inner) => simplify_function(*op, simplify(inner)),
        Expression::Arithmetic(l, op, r) => {
            let left = simplify(l);
            let right = simplify(r);
            match op {
                ArithmeticOperation::Add | ArithmeticOperation::Subtract => {
                    simplify_sum(left, *op, right)
                }
                ArithmeticOperation::Multiply | ArithmeticOperation::Divide => {
                    simplify_product(left, *op, right)
                }
                ArithmeticOperation::Power => simplify_power(left, right),
            }
        }
    }
}

/// Negate an already simplified expression
pub fn negate(expr: Expression) -> Expression {
    match expr {
        Expression::Number(n) => Expression::Number(-n),
        Expression::Negation(inner) => *inner,
        Expression::Arithmetic(_, ArithmeticOperation::Add | ArithmeticOperation::Subtract, _) => {
            let zero = Expression::zero();
            simplify_sum(zero, ArithmeticOperation::Subtract, expr)
        }
        Expression::Arithmetic(_, ArithmeticOperation::Multiply | ArithmeticOperation::Divide, _) => {
            simplify_product(
                Expression::Number(Decimal::NEGATIVE_ONE),
                ArithmeticOperation::Multiply,
                expr,
            )
        }
        other => Expression::negate(other),
    }
}

/// Exact ratio `num / den` used while collecting coefficients.
///
/// `den` is always positive; when both parts are integers the ratio is kept
/// in lowest terms, otherwise it collapses into `num` with `den == 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Coefficient {
    num: Decimal,
    den: Decimal,
}

impl Coefficient {
    pub(crate) const ONE: Coefficient = Coefficient {
        num: Decimal::ONE,
        den: Decimal::ONE,
    };

    pub(crate) fn from_decimal(value: Decimal) -> Self {
        Self {
            num: value,
            den: Decimal::ONE,
        }
    }

    fn reduced(num: Decimal, den: Decimal) -> Option<Self> {
        if den.is_zero() {
            return None;
        }
        let (num, den) = if den.is_sign_negative() {
            (-num, -den)
        } else {
            (num, den)
        };
        if num.is_zero() {
            return Some(Self::from_decimal(Decimal::ZERO));
        }
        if num.fract().is_zero() && den.fract().is_zero() {
            let g = gcd(num.abs(), den)?;
            return Some(Self {
                num: num.checked_div(g)?.normalize(),
                den: den.checked_div(g)?.normalize(),
            });
        }
        Some(Self::from_decimal(num.checked_div(den)?.normalize()))
    }

    pub(crate) fn mul(self, other: Self) -> Option<Self> {
        Self::reduced(
            self.num.checked_mul(other.num)?,
            self.den.checked_mul(other.den)?,
        )
    }

    pub(crate) fn div(self, other: Self) -> Option<Self> {
        if other.num.is_zero() {
            return None;
        }
        Self::reduced(
            self.num.checked_mul(other.den)?,
            self.den.checked_mul(other.num)?,
        )
    }

    pub(crate) fn add(self, other: Self) -> Option<Self> {
        let left = self.num.checked_mul(other.den)?;
        let right = other.num.checked_mul(self.den)?;
        Self::reduced(left.checked_add(right)?, self.den.checked_mul(other.den)?)
    }

    pub(crate) fn neg(self) -> Self {
        Self {
            num: -self.num,
            den: self.den,
        }
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    fn is_one(&self) -> bool {
        self.num == Decimal::ONE && self.den == Decimal::ONE
    }

    fn is_negative(&self) -> bool {
        self.num.is_sign_negative() && !self.num.is_zero()
    }

    pub(crate) fn to_decimal(self) -> Option<Decimal> {
        self.num.checked_div(self.den).map(|d| d.normalize())
    }

    pub(crate) fn to_expression(self) -> Expression {
        match self.to_decimal() {
            Some(value) => Expression::Number(value),
            None => Expression::arithmetic(
                Expression::Number(self.num),
                ArithmeticOperation::Divide,
                Expression::Number(self.den),
            ),
        }
    }
}

fn gcd(mut a: Decimal, mut b: Decimal) -> Option<Decimal> {
    while !b.is_zero() {
        let r = a.checked_rem(b)?;
        a = b;
        b = r;
    }
    if a.is_zero() {
        Some(Decimal::ONE)
    } else {
        Some(a)
    }
}

/// A product `coef * base1**p1 * base2**p2 ...` with integer powers
#[derive(Debug, Clone)]
struct Product {
    coef: Coefficient,
    factors: Vec<(Expression, i64)>,
}

impl Product {
    fn new() -> Self {
        Self {
            coef: Coefficient::ONE,
            factors: Vec::new(),
        }
    }

    fn of(expr: &Expression) -> Option<Self> {
        let mut product = Self::new();
        product.absorb(expr, 1)?;
        Some(product)
    }

    fn push_factor(&mut self, base: Expression, power: i64) -> Option<()> {
        match self.factors.iter_mut().find(|(b, _)| *b == base) {
            Some((_, p)) => *p = p.checked_add(power)?,
            None => self.factors.push((base, power)),
        }
        Some(())
    }

    /// Multiply (`sign == 1`) or divide (`sign == -1`) the product by `expr`
    fn absorb(&mut self, expr: &Expression, sign: i64) -> Option<()> {
        match expr {
            Expression::Arithmetic(l, ArithmeticOperation::Multiply, r) => {
                self.absorb(l, sign)?;
                self.absorb(r, sign)
            }
            Expression::Arithmetic(l, ArithmeticOperation::Divide, r) => {
                self.absorb(l, sign)?;
                self.absorb(r, -sign)
            }
            Expression::Negation(inner) => {
                self.coef = self.coef.neg();
                self.absorb(inner, sign)
            }
            Expression::Number(n) => {
                let value = Coefficient::from_decimal(*n);
                if sign > 0 {
                    self.coef = self.coef.mul(value)?;
                    Some(())
                } else if n.is_zero() {
                    // x/0 stays symbolic
                    self.push_factor(expr.clone(), sign)
                } else {
                    self.coef = self.coef.div(value)?;
                    Some(())
                }
            }
            Expression::Arithmetic(base, ArithmeticOperation::Power, exp) => {
                match integer_exponent(exp) {
                    Some(p) => self.push_factor((**base).clone(), p.checked_mul(sign)?),
                    None => self.push_factor(expr.clone(), sign),
                }
            }
            other => self.push_factor(other.clone(), sign),
        }
    }

    /// Rebuild into an expression, factors sorted for a stable form
    fn rebuild(mut self) -> Expression {
        if self.coef.is_zero() {
            return Expression::zero();
        }
        self.factors.retain(|(_, p)| *p != 0);
        self.factors
            .sort_by_cached_key(|(base, _)| base.to_string());

        let numerator: Vec<Expression> = self
            .factors
            .iter()
            .filter(|(_, p)| *p > 0)
            .map(|(base, p)| raise(base.clone(), *p))
            .collect();
        let denominator: Vec<Expression> = self
            .factors
            .iter()
            .filter(|(_, p)| *p < 0)
            .map(|(base, p)| raise(base.clone(), -*p))
            .collect();

        if numerator.is_empty() && denominator.is_empty() {
            return self.coef.to_expression();
        }

        // Integer ratios stay visible as a quotient: 3*x/2, x/(2*y)
        let lead = self.coef.num;
        let den = (self.coef.den != Decimal::ONE).then_some(self.coef.den);

        let top = if numerator.is_empty() {
            Expression::Number(lead)
        } else if lead == Decimal::ONE {
            multiply_all(numerator.into_iter()).unwrap_or_else(Expression::one)
        } else if lead == Decimal::NEGATIVE_ONE {
            Expression::negate(multiply_all(numerator.into_iter()).unwrap_or_else(Expression::one))
        } else {
            multiply_all(std::iter::once(Expression::Number(lead)).chain(numerator))
                .unwrap_or_else(Expression::one)
        };

        let bottom = multiply_all(den.map(Expression::Number).into_iter().chain(denominator));
        match bottom {
            Some(bottom) => Expression::arithmetic(top, ArithmeticOperation::Divide, bottom),
            None => top,
        }
    }
}

fn raise(base: Expression, power: i64) -> Expression {
    if power == 1 {
        base
    } else {
        Expression::arithmetic(
            base,
            ArithmeticOperation::Power,
            Expression::Number(Decimal::from(power)),
        )
    }
}

fn multiply_all(factors: impl Iterator<Item = Expression>) -> Option<Expression> {
    factors.reduce(|acc, f| Expression::arithmetic(acc, ArithmeticOperation::Multiply, f))
}

fn integer_exponent(exp: &Expression) -> Option<i64> {
    let value = exp.as_number()?;
    if !value.fract().is_zero() {
        return None;
    }
    value.to_i64()
}

/// Split a term into its numeric coefficient and the remaining body
fn split_coefficient(term: &Expression) -> Option<(Coefficient, Option<Expression>)> {
    let mut product = Product::of(term)?;
    let coef = product.coef;
    product.factors.retain(|(_, p)| *p != 0);
    if product.factors.is_empty() {
        return Some((coef, None));
    }
    product.coef = Coefficient::ONE;
    Some((coef, Some(product.rebuild())))
}

#[derive(Default)]
struct SumCollector {
    terms: Vec<(Expression, Coefficient)>,
    constant: Option<Coefficient>,
}

impl SumCollector {
    fn collect(&mut self, expr: &Expression, sign: Coefficient) -> Option<()> {
        match expr {
            Expression::Arithmetic(l, ArithmeticOperation::Add, r) => {
                self.collect(l, sign)?;
                self.collect(r, sign)
            }
            Expression::Arithmetic(l, ArithmeticOperation::Subtract, r) => {
                self.collect(l, sign)?;
                self.collect(r, sign.neg())
            }
            Expression::Negation(inner) => self.collect(inner, sign.neg()),
            other => {
                let (coef, body) = split_coefficient(other)?;
                let coef = coef.mul(sign)?;
                match body {
                    None => {
                        let current = self.constant.unwrap_or(Coefficient::from_decimal(Decimal::ZERO));
                        self.constant = Some(current.add(coef)?);
                    }
                    Some(body) => match self.terms.iter_mut().find(|(b, _)| *b == body) {
                        Some((_, c)) => *c = c.add(coef)?,
                        None => self.terms.push((body, coef)),
                    },
                }
                Some(())
            }
        }
    }

    fn rebuild(self) -> Expression {
        let mut result: Option<Expression> = None;
        let constant = self
            .constant
            .filter(|c| !c.is_zero())
            .map(|c| (None, c));
        let terms = self
            .terms
            .into_iter()
            .filter(|(_, c)| !c.is_zero())
            .map(|(body, c)| (Some(body), c))
            .chain(constant);

        for (body, coef) in terms {
            let subtract = result.is_some() && coef.is_negative();
            let magnitude = if subtract { coef.neg() } else { coef };
            let term = match body {
                Some(body) => scale(body, magnitude),
                None => magnitude.to_expression(),
            };
            result = Some(match result {
                None => term,
                Some(acc) if subtract => {
                    Expression::arithmetic(acc, ArithmeticOperation::Subtract, term)
                }
                Some(acc) => Expression::arithmetic(acc, ArithmeticOperation::Add, term),
            });
        }
        result.unwrap_or_else(Expression::zero)
    }
}

fn scale(body: Expression, coef: Coefficient) -> Expression {
    if coef.is_one() {
        return body;
    }
    match Product::of(&body) {
        Some(mut product) => match product.coef.mul(coef) {
            Some(c) => {
                product.coef = c;
                product.rebuild()
            }
            None => Expression::arithmetic(
                coef.to_expression(),
                ArithmeticOperation::Multiply,
                body,
            ),
        },
        None => Expression::arithmetic(coef.to_expression(), ArithmeticOperation::Multiply, body),
    }
}

fn simplify_sum(left: Expression, op: ArithmeticOperation, right: Expression) -> Expression {
    let mut collector = SumCollector::default();
    let right_sign = if op == ArithmeticOperation::Subtract {
        Coefficient::ONE.neg()
    } else {
        Coefficient::ONE
    };
    let collected = collector
        .collect(&left, Coefficient::ONE)
        .and_then(|_| collector.collect(&right, right_sign));
    match collected {
        Some(()) => collector.rebuild(),
        None => Expression::arithmetic(left, op, right),
    }
}

fn simplify_product(left: Expression, op: ArithmeticOperation, right: Expression) -> Expression {
    let mut product = Product::new();
    let sign = if op == ArithmeticOperation::Divide { -1 } else { 1 };
    let absorbed = product
        .absorb(&left, 1)
        .and_then(|_| product.absorb(&right, sign));
    match absorbed {
        Some(()) => product.rebuild(),
        None => Expression::arithmetic(left, op, right),
    }
}

fn simplify_power(base: Expression, exp: Expression) -> Expression {
    if exp.is_zero() {
        return Expression::one();
    }
    if exp.is_one() {
        return base;
    }
    if base.is_one() {
        return Expression::one();
    }

    if let (Some(b), Some(e)) = (base.as_number(), exp.as_number()) {
        if let Some(value) = fold_power(b, e) {
            return Expression::Number(value);
        }
    }

    if base.is_zero() && exp.as_number().is_some_and(|e| e.is_sign_positive()) {
        return Expression::zero();
    }

    // (b**m)**n = b**(m*n) for integer n
    if let (Expression::Arithmetic(inner, ArithmeticOperation::Power, m), Some(n)) =
        (&base, integer_exponent(&exp))
    {
        if let Some(m) = m.as_number() {
            if let Some(product) = m.checked_mul(Decimal::from(n)) {
                return simplify_power(
                    (**inner).clone(),
                    Expression::Number(product.normalize()),
                );
            }
        }
    }

    if integer_exponent(&exp).is_some() {
        let power = Expression::arithmetic(base.clone(), ArithmeticOperation::Power, exp.clone());
        if let Some(product) = Product::of(&power) {
            return product.rebuild();
        }
    }

    Expression::arithmetic(base, ArithmeticOperation::Power, exp)
}

/// Numeric `base ** exp`: exact for small integer exponents, through `f64` otherwise
pub(crate) fn fold_power(base: Decimal, exp: Decimal) -> Option<Decimal> {
    if exp.fract().is_zero() {
        let n = exp.to_i64()?;
        if n.abs() <= MAX_EXACT_EXPONENT {
            let mut result = Decimal::ONE;
            for _ in 0..n.unsigned_abs() {
                result = result.checked_mul(base)?;
            }
            return if n < 0 {
                Decimal::ONE.checked_div(result).map(|d| d.normalize())
            } else {
                Some(result.normalize())
            };
        }
    }
    let value = base.to_f64()?.powf(exp.to_f64()?);
    from_float(value)
}

fn from_float(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value).map(|d| d.normalize())
}

fn simplify_function(op: MathematicalOperator, arg: Expression) -> Expression {
    if let Some(value) = arg.as_number() {
        if let Some(folded) = value.to_f64().and_then(|v| from_float(op.apply(v))) {
            return Expression::Number(folded);
        }
    }

    match (op, &arg) {
        (MathematicalOperator::Log, Expression::MathematicalOperator(MathematicalOperator::Exp, inner))
        | (MathematicalOperator::Exp, Expression::MathematicalOperator(MathematicalOperator::Log, inner)) => {
            (**inner).clone()
        }
        (MathematicalOperator::Abs, Expression::Negation(inner)) => {
            Expression::apply(MathematicalOperator::Abs, (**inner).clone())
        }
        _ => Expression::apply(op, arg),
    }
}

/// Does folding `expr` go through `f64` anywhere?
///
/// True for function applications (other than `abs`) and for powers whose
/// exponent is not an integer.
pub(crate) fn is_inexact(expr: &Expression) -> bool {
    match expr {
        Expression::Number(_) | Expression::Symbol(_) => false,
        Expression::Negation(inner) => is_inexact(inner),
        Expression::MathematicalOperator(MathematicalOperator::Abs, inner) => is_inexact(inner),
        Expression::MathematicalOperator(_, _) => true,
        Expression::Arithmetic(l, ArithmeticOperation::Power, r) => {
            integer_exponent(r).is_none() || is_inexact(l)
        }
        Expression::Arithmetic(l, _, r) => is_inexact(l) || is_inexact(r),
    }
}

/// Round a value that went through `f64` to the digits it can be trusted for
pub(crate) fn round_inexact(value: Decimal) -> Decimal {
    value
        .round_sf(FLOAT_DIGITS)
        .map(|d| d.normalize())
        .unwrap_or(value)
}

/// `a == b` to `digits` significant digits, relative to their magnitude
pub(crate) fn approx_eq(a: Decimal, b: Decimal, digits: u32) -> bool {
    let tolerance = Decimal::new(1, digits);
    let scale = a.abs().max(b.abs()).max(Decimal::ONE);
    match (a.checked_sub(b), scale.checked_mul(tolerance)) {
        (Some(diff), Some(bound)) => diff.abs() <= bound,
        _ => false,
    }
}

/// Does a simplified expression divide by a literal zero?
pub(crate) fn divides_by_zero(expr: &Expression) -> bool {
    match expr {
        Expression::Number(_) | Expression::Symbol(_) => false,
        Expression::Negation(inner) | Expression::MathematicalOperator(_, inner) => {
            divides_by_zero(inner)
        }
        Expression::Arithmetic(l, ArithmeticOperation::Divide, r) => {
            has_zero_factor(r) || divides_by_zero(l) || divides_by_zero(r)
        }
        Expression::Arithmetic(l, ArithmeticOperation::Power, r) => {
            let negative = r.as_number().is_some_and(|e| e.is_sign_negative() && !e.is_zero());
            (negative && has_zero_factor(l)) || divides_by_zero(l) || divides_by_zero(r)
        }
        Expression::Arithmetic(l, _, r) => divides_by_zero(l) || divides_by_zero(r),
    }
}

fn has_zero_factor(expr: &Expression) -> bool {
    match expr {
        Expression::Number(n) => n.is_zero(),
        Expression::Negation(inner) => has_zero_factor(inner),
        Expression::Arithmetic(l, ArithmeticOperation::Multiply, r) => {
            has_zero_factor(l) || has_zero_factor(r)
        }
        Expression::Arithmetic(base, ArithmeticOperation::Power, _) => has_zero_factor(base),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn coefficient_keeps_exact_ratios() {
        let third = Coefficient::ONE
            .div(Coefficient::from_decimal(Decimal::from(3)))
            .unwrap();
        let back = third.mul(Coefficient::from_decimal(Decimal::from(3))).unwrap();
        assert!(back.is_one());
    }

    #[test]
    fn fold_power_handles_negative_exponents() {
        assert_eq!(
            fold_power(Decimal::from(2), Decimal::from(-2)),
            Some(Decimal::new(25, 2))
        );
        assert_eq!(fold_power(Decimal::from(-2), Decimal::new(5, 1)), None);
    }

    #[test]
    fn float_noise_is_rounded_away() {
        let noisy = Decimal::from_str("3.000000000000001442695040889").unwrap();
        assert_eq!(round_inexact(noisy), Decimal::from(3));
        assert!(approx_eq(noisy, Decimal::from(3), FLOAT_DIGITS));
        assert!(!approx_eq(Decimal::new(30001, 4), Decimal::from(3), FLOAT_DIGITS));
    }

    #[test]
    fn zero_divisors_are_found() {
        let over_zero = simplify(&Expression::arithmetic(
            Expression::one(),
            ArithmeticOperation::Divide,
            Expression::zero(),
        ));
        assert!(divides_by_zero(&over_zero));
        assert!(!divides_by_zero(&simplify(&Expression::arithmetic(
            Expression::one(),
            ArithmeticOperation::Divide,
            Expression::symbol("x"),
        ))));
    }
}
