//! Single-variable solving
//!
//! The polynomial route runs first (closed form for degree 1 and 2), then
//! isolation for equations where the target appears once under other
//! operations.

pub mod isolation;
pub mod linear_system;
pub mod polynomial;

use crate::resource_limits::ResourceLimits;
use crate::semantic::{Equation, Expression, Symbol};
use crate::simplify::{approx_eq, divides_by_zero, is_inexact, round_inexact, simplify};
use tracing::trace;

// Agreement required between the two sides when a numeric root is substituted back
const ROOT_CHECK_DIGITS: u32 = 9;

/// Solve `equation` for `target`, returning every root found.
///
/// An empty result means the target is absent or no closed form was found.
/// Candidates that divide by zero, are not real numbers, or fail to satisfy
/// the equation when substituted back are dropped.
pub fn solve_for(equation: &Equation, target: &Symbol, limits: &ResourceLimits) -> Vec<Expression> {
    let name = target.name();
    let difference = simplify(&equation.difference());
    if !difference.contains_symbol(name) {
        return Vec::new();
    }

    let inexact = is_inexact(&equation.lhs) || is_inexact(&equation.rhs);
    let mut roots: Vec<Expression> = candidates(equation, &difference, name, limits)
        .into_iter()
        .map(|raw| (is_inexact(&raw), simplify(&raw)))
        .filter(|(_, root)| satisfies(equation, name, root))
        .map(|(raw_inexact, root)| match root.as_number() {
            Some(value) if inexact || raw_inexact => Expression::Number(round_inexact(value)),
            _ => root,
        })
        .collect();
    roots.dedup();
    roots
}

fn candidates(
    equation: &Equation,
    difference: &Expression,
    name: &str,
    limits: &ResourceLimits,
) -> Vec<Expression> {
    if let Some(coeffs) = polynomial::coefficients(difference, name, limits.max_polynomial_degree)
    {
        if coeffs.iter().all(|c| !c.contains_symbol(name)) {
            let degree = polynomial::degree(&coeffs);
            trace!(variable = name, degree, "polynomial route");
            match degree {
                0 => return Vec::new(),
                1 => return vec![polynomial::linear_root(&coeffs[0], &coeffs[1])],
                2 => return polynomial::quadratic_roots(&coeffs[0], &coeffs[1], &coeffs[2]),
                _ => {}
            }
        }
    }

    trace!(variable = name, "isolation route");
    isolate(equation, name)
        .or_else(|| isolation::algebraic_solve(difference, name, &Expression::zero()))
        .into_iter()
        .collect()
}

fn isolate(equation: &Equation, name: &str) -> Option<Expression> {
    let lhs = simplify(&equation.lhs);
    let rhs = simplify(&equation.rhs);
    match (lhs.contains_symbol(name), rhs.contains_symbol(name)) {
        (true, false) => isolation::algebraic_solve(&lhs, name, &rhs),
        (false, true) => isolation::algebraic_solve(&rhs, name, &lhs),
        _ => None,
    }
}

/// Does the simplified `root` hold when put back into the equation?
///
/// Roots that still mention other variables are only checked for division by zero.
fn satisfies(equation: &Equation, name: &str, root: &Expression) -> bool {
    if divides_by_zero(root) {
        trace!(variable = name, %root, "candidate divides by zero");
        return false;
    }
    if root.free_symbols().is_empty() && root.as_number().is_none() {
        trace!(variable = name, %root, "candidate is not a real number");
        return false;
    }

    let lhs = simplify(&equation.lhs.substitute(name, root));
    let rhs = simplify(&equation.rhs.substitute(name, root));
    if divides_by_zero(&lhs) || divides_by_zero(&rhs) {
        return false;
    }
    match (lhs.as_number(), rhs.as_number()) {
        (Some(l), Some(r)) => {
            let holds = approx_eq(l, r, ROOT_CHECK_DIGITS);
            if !holds {
                trace!(variable = name, %root, lhs = %l, rhs = %r, "candidate rejected");
            }
            holds
        }
        _ => true,
    }
}
