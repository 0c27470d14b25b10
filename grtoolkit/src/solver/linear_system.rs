//! Simultaneous linear equations, solved exactly by Gauss-Jordan elimination

use crate::error::ToolkitError;
use crate::parser::parse_equation;
use crate::resource_limits::ResourceLimits;
use crate::semantic::{ArithmeticOperation, Expression};
use crate::simplify::simplify;
use crate::ToolkitResult;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Outcome of solving a system for all of its free variables
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SystemSolution {
    /// Exactly one finite solution
    Unique { values: BTreeMap<String, Decimal> },
    /// Fewer independent equations than variables
    Infinite { rank: usize, variables: Vec<String> },
    /// Contradictory equations
    Inconsistent,
}

struct LinearRow {
    coeffs: Vec<Decimal>,
    constant: Decimal,
}

/// Solve the equations simultaneously for every variable that appears in them.
///
/// Each equation must be linear with numeric coefficients.
pub fn solve_system<S: AsRef<str>>(
    equations: &[S],
    limits: &ResourceLimits,
) -> ToolkitResult<SystemSolution> {
    if equations.len() > limits.max_equations {
        return Err(ToolkitError::ResourceLimitExceeded {
            limit_name: "max_equations".to_string(),
            limit_value: limits.max_equations.to_string(),
            actual_value: equations.len().to_string(),
            suggestion: "Split the system into independent groups".to_string(),
        });
    }

    let mut differences = Vec::with_capacity(equations.len());
    let mut symbols = BTreeSet::new();
    for source in equations {
        let equation = parse_equation(source.as_ref(), limits)?;
        symbols.extend(equation.free_symbols());
        differences.push(simplify(&equation.difference()));
    }
    let variables: Vec<String> = symbols.into_iter().collect();
    let index: BTreeMap<&str, usize> = variables
        .iter()
        .enumerate()
        .map(|(i, v)| (v.as_str(), i))
        .collect();

    let mut rows = Vec::with_capacity(differences.len());
    for (i, difference) in differences.iter().enumerate() {
        let mut row = LinearRow {
            coeffs: vec![Decimal::ZERO; variables.len()],
            constant: Decimal::ZERO,
        };
        let mut residual = Vec::new();
        collect_linear_terms(difference, Decimal::ONE, &mut row, &mut residual, &index)
            .ok_or_else(|| overflow(i))?;
        if !residual.is_empty() {
            let names: BTreeSet<String> =
                residual.iter().flat_map(|e| e.free_symbols()).collect();
            return Err(ToolkitError::NonLinear {
                index: i,
                variables: names.into_iter().collect::<Vec<_>>().join(", "),
            });
        }
        rows.push(row);
    }

    let mut matrix = Matrix::augmented(&rows, variables.len());
    let outcome = rref(&mut matrix, variables.len()).ok_or_else(|| {
        ToolkitError::Engine("Arithmetic overflow during elimination".to_string())
    })?;
    debug!(
        rank = outcome.rank,
        variables = variables.len(),
        inconsistent = outcome.inconsistent,
        "eliminated linear system"
    );

    if outcome.inconsistent {
        return Ok(SystemSolution::Inconsistent);
    }
    if outcome.rank < variables.len() {
        return Ok(SystemSolution::Infinite {
            rank: outcome.rank,
            variables,
        });
    }

    let mut values = BTreeMap::new();
    for (&row, &col) in outcome.pivot_rows.iter().zip(outcome.pivot_columns.iter()) {
        // Drop division residue past 24 places
        let value = matrix.get(row, variables.len()).round_dp(24).normalize();
        values.insert(variables[col].clone(), value);
    }
    Ok(SystemSolution::Unique { values })
}

fn overflow(index: usize) -> ToolkitError {
    ToolkitError::Engine(format!("Coefficient overflow in equation {}", index))
}

fn collect_linear_terms(
    expr: &Expression,
    scale: Decimal,
    row: &mut LinearRow,
    residual: &mut Vec<Expression>,
    index: &BTreeMap<&str, usize>,
) -> Option<()> {
    match expr {
        Expression::Number(c) => {
            row.constant = row.constant.checked_add(scale.checked_mul(*c)?)?;
        }
        Expression::Symbol(name) => match index.get(name.as_str()) {
            Some(&i) => row.coeffs[i] = row.coeffs[i].checked_add(scale)?,
            None => residual.push(expr.clone()),
        },
        Expression::Arithmetic(a, ArithmeticOperation::Add, b) => {
            collect_linear_terms(a, scale, row, residual, index)?;
            collect_linear_terms(b, scale, row, residual, index)?;
        }
        Expression::Arithmetic(a, ArithmeticOperation::Subtract, b) => {
            collect_linear_terms(a, scale, row, residual, index)?;
            collect_linear_terms(b, -scale, row, residual, index)?;
        }
        Expression::Negation(a) => collect_linear_terms(a, -scale, row, residual, index)?,
        Expression::Arithmetic(a, ArithmeticOperation::Multiply, b) => {
            if let Some(c) = constant_of(a) {
                collect_linear_terms(b, scale.checked_mul(c)?, row, residual, index)?;
            } else if let Some(c) = constant_of(b) {
                collect_linear_terms(a, scale.checked_mul(c)?, row, residual, index)?;
            } else {
                residual.push(expr.clone());
            }
        }
        Expression::Arithmetic(a, ArithmeticOperation::Divide, b) => match constant_of(b) {
            Some(c) if !c.is_zero() => {
                collect_linear_terms(a, scale.checked_div(c)?, row, residual, index)?
            }
            _ => residual.push(expr.clone()),
        },
        _ => residual.push(expr.clone()),
    }
    Some(())
}

fn constant_of(expr: &Expression) -> Option<Decimal> {
    match expr {
        Expression::Number(c) => Some(*c),
        Expression::Negation(inner) => constant_of(inner).map(|c| -c),
        _ => None,
    }
}

fn is_negligible(value: Decimal) -> bool {
    value.abs() < Decimal::new(1, 20)
}

struct EliminationOutcome {
    rank: usize,
    pivot_rows: Vec<usize>,
    pivot_columns: Vec<usize>,
    inconsistent: bool,
}

fn rref(matrix: &mut Matrix, n_vars: usize) -> Option<EliminationOutcome> {
    let rows = matrix.rows;
    let cols = matrix.cols;
    let mut outcome = EliminationOutcome {
        rank: 0,
        pivot_rows: Vec::new(),
        pivot_columns: Vec::new(),
        inconsistent: false,
    };

    let mut row = 0;
    for col in 0..n_vars {
        if row >= rows {
            break;
        }

        // Partial pivoting: largest magnitude in the column
        let mut pivot_row = None;
        let mut pivot_abs = Decimal::ZERO;
        for r in row..rows {
            let value = matrix.get(r, col).abs();
            if !is_negligible(value) && value > pivot_abs {
                pivot_abs = value;
                pivot_row = Some(r);
            }
        }
        let Some(pivot_idx) = pivot_row else {
            continue;
        };
        matrix.swap_rows(row, pivot_idx);

        let pivot_value = matrix.get(row, col);
        for c in col..cols {
            let cell = matrix.get_mut(row, c);
            *cell = cell.checked_div(pivot_value)?;
        }

        for r in 0..rows {
            if r == row {
                continue;
            }
            let factor = matrix.get(r, col);
            if factor.is_zero() {
                continue;
            }
            for c in col..cols {
                let delta = factor.checked_mul(matrix.get(row, c))?;
                let cell = matrix.get_mut(r, c);
                *cell = cell.checked_sub(delta)?;
            }
        }

        outcome.pivot_rows.push(row);
        outcome.pivot_columns.push(col);
        row += 1;
    }

    outcome.rank = outcome.pivot_columns.len();
    outcome.inconsistent = (row..rows).any(|r| {
        (0..n_vars).all(|c| is_negligible(matrix.get(r, c)))
            && !is_negligible(matrix.get(r, n_vars))
    });
    Some(outcome)
}

struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Decimal>,
}

impl Matrix {
    fn augmented(rows: &[LinearRow], n_vars: usize) -> Self {
        let cols = n_vars + 1;
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            data.extend(row.coeffs.iter().copied());
            data.push(-row.constant);
        }
        Matrix {
            rows: rows.len(),
            cols,
            data,
        }
    }

    fn get(&self, row: usize, col: usize) -> Decimal {
        self.data[row * self.cols + col]
    }

    fn get_mut(&mut self, row: usize, col: usize) -> &mut Decimal {
        &mut self.data[row * self.cols + col]
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for offset in 0..self.cols {
            self.data.swap(a * self.cols + offset, b * self.cols + offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(equations: &[&str]) -> ToolkitResult<SystemSolution> {
        solve_system(equations, &ResourceLimits::default())
    }

    #[test]
    fn two_by_two_unique() {
        let SystemSolution::Unique { values } = solve(&["x + y = 3", "x - y = 1"]).unwrap() else {
            panic!("expected a unique solution");
        };
        assert_eq!(values["x"], Decimal::from(2));
        assert_eq!(values["y"], Decimal::from(1));
    }

    #[test]
    fn fractional_coefficients() {
        let SystemSolution::Unique { values } =
            solve(&["Eq(x/2 + y, 4)", "Eq(3*x - 2*y, 0)"]).unwrap()
        else {
            panic!("expected a unique solution");
        };
        assert_eq!(values["x"], Decimal::from(2));
        assert_eq!(values["y"], Decimal::from(3));
    }

    #[test]
    fn dependent_rows_leave_a_family() {
        let result = solve(&["x + y = 2", "2*x + 2*y = 4"]).unwrap();
        assert_eq!(
            result,
            SystemSolution::Infinite {
                rank: 1,
                variables: vec!["x".to_string(), "y".to_string()],
            }
        );
    }

    #[test]
    fn contradictory_rows() {
        assert_eq!(
            solve(&["x + y = 2", "x + y = 3"]).unwrap(),
            SystemSolution::Inconsistent
        );
    }

    #[test]
    fn product_of_unknowns_is_rejected() {
        let err = solve(&["x*y = 2", "x + y = 3"]).unwrap_err();
        assert!(matches!(err, ToolkitError::NonLinear { index: 0, .. }));
    }
}
