use crate::ast::{DepthTracker, Span};
use crate::error::ToolkitError;
use crate::resource_limits::ResourceLimits;
use crate::semantic::*;
use pest::error::{InputLocation, LineColLocation};
use pest::Parser;
use pest_derive::Parser;
use std::sync::Arc;

pub mod expressions;
pub mod literals;

#[derive(Parser)]
#[grammar = "src/parser/equation.pest"]
pub struct EquationParser;

/// Parse one equation in any supported notation.
///
/// `Eq(a, b)` and `a = b` are equalities; a bare expression `e` means `e = 0`.
pub fn parse_equation(source: &str, limits: &ResourceLimits) -> Result<Equation, ToolkitError> {
    check_length(source, limits)?;

    let pairs = EquationParser::parse(Rule::equation_input, source)
        .map_err(|e| pest_error(e, source))?;

    let mut depth = DepthTracker::with_max_depth(limits.max_expression_depth);
    for pair in pairs {
        for inner in pair.into_inner() {
            if inner.as_rule() != Rule::equation {
                continue;
            }
            let span = Span::from_pest_span(inner.as_span());
            let form = inner
                .into_inner()
                .next()
                .ok_or_else(|| ToolkitError::Engine("Empty equation".to_string()))?;

            let equation = match form.as_rule() {
                Rule::eq_call | Rule::relation => {
                    let mut sides = form
                        .into_inner()
                        .filter(|p| p.as_rule() == Rule::expression);
                    let lhs = sides.next().ok_or_else(|| {
                        ToolkitError::Engine("Equation without left-hand side".to_string())
                    })?;
                    let rhs = sides.next().ok_or_else(|| {
                        ToolkitError::Engine("Equation without right-hand side".to_string())
                    })?;
                    Equation::new(
                        expressions::parse_expression(lhs, &mut depth, source)?,
                        expressions::parse_expression(rhs, &mut depth, source)?,
                    )
                }
                Rule::expression => Equation::new(
                    expressions::parse_expression(form, &mut depth, source)?,
                    Expression::zero(),
                ),
                other => {
                    return Err(ToolkitError::Engine(format!(
                        "Unexpected equation form {:?}",
                        other
                    )))
                }
            };
            return Ok(equation.with_span(span));
        }
    }

    Err(ToolkitError::Engine(format!(
        "No parse result for equation '{}'",
        source
    )))
}

/// Parse a standalone expression, such as the value side of a binding
pub fn parse_expression(source: &str, limits: &ResourceLimits) -> Result<Expression, ToolkitError> {
    check_length(source, limits)?;

    let pairs = EquationParser::parse(Rule::expression_input, source)
        .map_err(|e| pest_error(e, source))?;

    let mut depth = DepthTracker::with_max_depth(limits.max_expression_depth);
    for pair in pairs {
        for inner in pair.into_inner() {
            if inner.as_rule() == Rule::expression {
                return expressions::parse_expression(inner, &mut depth, source);
            }
        }
    }

    Err(ToolkitError::Engine(format!(
        "No parse result for expression '{}'",
        source
    )))
}

/// Is `name` usable as a variable name?
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Is `name` taken by the notation itself (`Eq` or a function name)?
///
/// Reserved names never parse as variables.
pub fn is_reserved(name: &str) -> bool {
    name == "Eq" || MathematicalOperator::from_name(name).is_some()
}

fn check_length(source: &str, limits: &ResourceLimits) -> Result<(), ToolkitError> {
    if source.len() > limits.max_equation_bytes {
        return Err(ToolkitError::ResourceLimitExceeded {
            limit_name: "max_equation_bytes".to_string(),
            limit_value: format!("{} bytes", limits.max_equation_bytes),
            actual_value: format!("{} bytes", source.len()),
            suggestion: "Split the equation or bind sub-expressions as known values".to_string(),
        });
    }
    Ok(())
}

fn pest_error(e: pest::error::Error<Rule>, source: &str) -> ToolkitError {
    let (start, end) = match e.location {
        InputLocation::Pos(pos) => (pos, pos),
        InputLocation::Span((start, end)) => (start, end),
    };
    let (line, col) = match e.line_col {
        LineColLocation::Pos((line, col)) => (line, col),
        LineColLocation::Span((line, col), _) => (line, col),
    };
    let span = Span {
        start,
        end,
        line,
        col,
    };

    let message = format!("cannot parse '{}': {}", source, e.variant);
    if unbalanced_parentheses(source) {
        ToolkitError::expression_with_suggestion(
            message,
            span,
            Arc::from(source),
            "Check that every '(' has a matching ')'",
        )
    } else {
        ToolkitError::expression(message, span, Arc::from(source))
    }
}

fn unbalanced_parentheses(source: &str) -> bool {
    let mut open: i64 = 0;
    for c in source.chars() {
        match c {
            '(' => open += 1,
            ')' => {
                open -= 1;
                if open < 0 {
                    return true;
                }
            }
            _ => {}
        }
    }
    open != 0
}
