use crate::bindings::{Bindings, PreparedBindings};
use crate::error::ToolkitError;
use crate::parser::{is_identifier, is_reserved, parse_equation};
use crate::report;
use crate::resource_limits::ResourceLimits;
use crate::semantic::{Equation, Expression, SymbolTable};
use crate::simplify::{approx_eq, is_inexact, simplify, FLOAT_DIGITS};
use crate::solver::solve_for;
use crate::ToolkitResult;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::io;
use tracing::{debug, warn};

/// The equation-set resolver.
///
/// Solves every equation of a set independently for one target variable,
/// after substituting known values.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    limits: ResourceLimits,
    report: bool,
}

/// What became of one equation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Resolution {
    /// The equation reduced to a constant: `true` when it always holds
    Literal(bool),
    /// Roots for the target, possibly empty, possibly symbolic
    Solutions(Vec<Expression>),
    /// This equation could not be processed
    Rejected(ToolkitError),
}

/// Symbols observed in an equation after substitution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquationAnalysis {
    pub free_symbols: BTreeSet<String>,
    /// Free symbols that are neither the target nor bound
    pub unknowns: BTreeSet<String>,
    pub target_present: bool,
}

/// Result for one input equation, at the same position as its input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolutionEntry {
    pub index: usize,
    /// Equation text as supplied, before substitution
    pub equation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<EquationAnalysis>,
    pub resolution: Resolution,
}

impl SolutionEntry {
    pub fn solutions(&self) -> &[Expression] {
        match &self.resolution {
            Resolution::Solutions(solutions) => solutions,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&ToolkitError> {
        match &self.resolution {
            Resolution::Rejected(error) => Some(error),
            _ => None,
        }
    }

    /// At least one solution, and every solution numeric
    pub fn is_resolved(&self) -> bool {
        let solutions = self.solutions();
        !solutions.is_empty() && solutions.iter().all(|s| s.as_number().is_some())
    }

    pub fn unknowns(&self) -> Option<&BTreeSet<String>> {
        self.analysis.as_ref().map(|a| &a.unknowns)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Literal(true) => write!(f, "True"),
            Resolution::Literal(false) => write!(f, "False"),
            Resolution::Solutions(solutions) => {
                write!(f, "[")?;
                for (i, solution) in solutions.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", solution)?;
                }
                write!(f, "]")
            }
            Resolution::Rejected(error) => write!(f, "error: {}", error),
        }
    }
}

impl fmt::Display for SolutionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resolution)
    }
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver with custom resource limits
    pub fn with_limits(limits: ResourceLimits) -> Self {
        Self {
            limits,
            report: false,
        }
    }

    /// Print the OPTION report to stdout after each call
    pub fn with_report(mut self, report: bool) -> Self {
        self.report = report;
        self
    }

    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    /// Solve each equation for `target`.
    ///
    /// A failing equation becomes a [`Resolution::Rejected`] entry and does
    /// not affect the others. Errors are returned only for problems that
    /// concern the whole call: an invalid target or binding, or too many
    /// equations.
    pub fn solve<S: AsRef<str>>(
        &self,
        equations: &[S],
        target: &str,
        known: &Bindings,
    ) -> ToolkitResult<Vec<SolutionEntry>> {
        let entries = self.resolve_all(equations, target, known)?;
        self.emit_report(target, &entries);
        Ok(entries)
    }

    /// Like [`Resolver::solve`], but the first failing equation aborts the call
    pub fn solve_strict<S: AsRef<str>>(
        &self,
        equations: &[S],
        target: &str,
        known: &Bindings,
    ) -> ToolkitResult<Vec<SolutionEntry>> {
        let entries = self.resolve_all(equations, target, known)?;
        if let Some(error) = entries.iter().find_map(|e| e.error()) {
            return Err(error.clone());
        }
        self.emit_report(target, &entries);
        Ok(entries)
    }

    fn resolve_all<S: AsRef<str>>(
        &self,
        equations: &[S],
        target: &str,
        known: &Bindings,
    ) -> ToolkitResult<Vec<SolutionEntry>> {
        if !is_identifier(target) || is_reserved(target) {
            return Err(ToolkitError::InvalidTarget(target.to_string()));
        }
        if equations.len() > self.limits.max_equations {
            return Err(ToolkitError::ResourceLimitExceeded {
                limit_name: "max_equations".to_string(),
                limit_value: self.limits.max_equations.to_string(),
                actual_value: equations.len().to_string(),
                suggestion: "Resolve the equations in smaller batches".to_string(),
            });
        }
        let prepared = known.prepare(&self.limits)?;

        debug!(
            equations = equations.len(),
            find = target,
            bindings = known.len(),
            "resolving equation set"
        );
        Ok(equations
            .iter()
            .enumerate()
            .map(|(index, source)| self.resolve_one(index, source.as_ref(), target, &prepared))
            .collect())
    }

    fn resolve_one(
        &self,
        index: usize,
        source: &str,
        target: &str,
        prepared: &PreparedBindings,
    ) -> SolutionEntry {
        let entry = |analysis, resolution| SolutionEntry {
            index,
            equation: source.to_string(),
            analysis,
            resolution,
        };

        let substituted = prepared.substitute_text(source);
        let parsed = match parse_equation(&substituted, &self.limits) {
            Ok(equation) => equation,
            Err(error) => {
                debug!(index, %error, "equation rejected");
                return entry(None, Resolution::Rejected(error));
            }
        };

        if let Some(holds) = constant_truth(&parsed) {
            debug!(index, holds, "equation reduced to a constant");
            return entry(Some(analyze(&parsed, target, prepared)), Resolution::Literal(holds));
        }

        let table = SymbolTable::from_equation(&parsed);
        let equation = prepared.substitute_symbols(&parsed);
        let analysis = analyze(&equation, target, prepared);

        if let Some(holds) = constant_truth(&equation) {
            debug!(index, holds, "equation reduced to a constant after substitution");
            return entry(Some(analysis), Resolution::Literal(holds));
        }

        let solutions = match table.lookup(target) {
            Some(symbol) => solve_for(&equation, symbol, &self.limits),
            None => Vec::new(),
        };
        debug!(index, solutions = solutions.len(), unknowns = analysis.unknowns.len(), "equation solved");
        entry(Some(analysis), Resolution::Solutions(solutions))
    }

    fn emit_report(&self, target: &str, entries: &[SolutionEntry]) {
        if !self.report {
            return;
        }
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if let Err(error) = report::write_report(&mut out, target, entries) {
            warn!(%error, "failed to write solution report");
        }
    }
}

/// `Some(holds)` when the equation has no variables left
///
/// Sides folded through `f64` are compared within its precision.
fn constant_truth(equation: &Equation) -> Option<bool> {
    let value = simplify(&equation.difference()).as_number()?;
    if value.is_zero() {
        return Some(true);
    }
    if !is_inexact(&equation.lhs) && !is_inexact(&equation.rhs) {
        return Some(false);
    }
    let sides = (
        simplify(&equation.lhs).as_number(),
        simplify(&equation.rhs).as_number(),
    );
    Some(match sides {
        (Some(lhs), Some(rhs)) => approx_eq(lhs, rhs, FLOAT_DIGITS),
        _ => approx_eq(value, Decimal::ZERO, FLOAT_DIGITS),
    })
}

fn analyze(equation: &Equation, target: &str, prepared: &PreparedBindings) -> EquationAnalysis {
    let free_symbols = equation.free_symbols();
    let unknowns = free_symbols
        .iter()
        .filter(|name| name.as_str() != target && !prepared.is_bound(name))
        .cloned()
        .collect();
    EquationAnalysis {
        target_present: free_symbols.contains(target),
        free_symbols,
        unknowns,
    }
}
