use crate::ast::{DepthTracker, Span};
use crate::error::ToolkitError;
use crate::parser::literals::parse_number;
use crate::parser::Rule;
use crate::semantic::*;
use pest::iterators::Pair;
use std::sync::Arc;

pub(crate) fn parse_expression(
    pair: Pair<Rule>,
    depth: &mut DepthTracker,
    source: &str,
) -> Result<Expression, ToolkitError> {
    // Check and increment depth
    enter(depth)?;
    let result = parse_expression_impl(pair, depth, source);
    depth.pop_depth();
    result
}

fn enter(depth: &mut DepthTracker) -> Result<(), ToolkitError> {
    depth.push_depth().map_err(|actual| ToolkitError::ResourceLimitExceeded {
        limit_name: "max_expression_depth".to_string(),
        limit_value: depth.max_depth().to_string(),
        actual_value: actual.to_string(),
        suggestion: "Simplify nested expressions to reduce depth".to_string(),
    })
}

fn parse_expression_impl(
    pair: Pair<Rule>,
    depth: &mut DepthTracker,
    source: &str,
) -> Result<Expression, ToolkitError> {
    match pair.as_rule() {
        Rule::expression => parse_chain(pair, depth, source, Rule::add_op),
        Rule::term => parse_chain(pair, depth, source, Rule::mul_op),
        Rule::unary => parse_unary(pair, depth, source),
        Rule::power => parse_power(pair, depth, source),
        Rule::primary => parse_primary(pair, depth, source),
        Rule::function_call => parse_function_call(pair, depth, source),
        Rule::number => parse_number(pair, source),
        Rule::symbol => Ok(Expression::Symbol(pair.as_str().to_string())),
        other => Err(unexpected(other, &pair, source)),
    }
}

/// Left-associative chains: `a + b - c` and `a * b / c`
///
/// Every operator applied nests the tree one level deeper, so each one
/// counts toward the depth limit until the chain is complete.
fn parse_chain(
    pair: Pair<Rule>,
    depth: &mut DepthTracker,
    source: &str,
    op_rule: Rule,
) -> Result<Expression, ToolkitError> {
    let mut links = 0usize;
    let result = parse_links(pair, depth, source, op_rule, &mut links);
    for _ in 0..links {
        depth.pop_depth();
    }
    result
}

fn parse_links(
    pair: Pair<Rule>,
    depth: &mut DepthTracker,
    source: &str,
    op_rule: Rule,
    links: &mut usize,
) -> Result<Expression, ToolkitError> {
    let mut inner = pair.into_inner();
    let first = inner
        .next()
        .ok_or_else(|| ToolkitError::Engine("Empty operand chain".to_string()))?;
    let mut acc = parse_expression(first, depth, source)?;

    while let Some(op_pair) = inner.next() {
        if op_pair.as_rule() != op_rule {
            return Err(unexpected(op_pair.as_rule(), &op_pair, source));
        }
        let op = match op_pair.as_str().trim() {
            "+" => ArithmeticOperation::Add,
            "-" => ArithmeticOperation::Subtract,
            "*" => ArithmeticOperation::Multiply,
            "/" => ArithmeticOperation::Divide,
            other => {
                return Err(ToolkitError::Engine(format!(
                    "Unknown operator '{}'",
                    other
                )))
            }
        };
        enter(depth)?;
        *links += 1;
        let operand = inner.next().ok_or_else(|| {
            ToolkitError::Engine(format!("Operator '{}' without operand", op.symbol()))
        })?;
        let rhs = parse_expression(operand, depth, source)?;
        acc = Expression::arithmetic(acc, op, rhs);
    }

    Ok(acc)
}

fn parse_unary(
    pair: Pair<Rule>,
    depth: &mut DepthTracker,
    source: &str,
) -> Result<Expression, ToolkitError> {
    let mut negations = 0usize;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::neg_op => {
                if inner.as_str() == "-" {
                    negations += 1;
                }
            }
            Rule::power => {
                let operand = parse_expression(inner, depth, source)?;
                return Ok(if negations % 2 == 1 {
                    Expression::negate(operand)
                } else {
                    operand
                });
            }
            other => return Err(unexpected(other, &inner, source)),
        }
    }
    Err(ToolkitError::Engine("Unary operator without operand".to_string()))
}

fn parse_power(
    pair: Pair<Rule>,
    depth: &mut DepthTracker,
    source: &str,
) -> Result<Expression, ToolkitError> {
    let mut base = None;
    let mut exponent = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::primary => base = Some(parse_expression(inner, depth, source)?),
            Rule::pow_op => {}
            Rule::unary => exponent = Some(parse_expression(inner, depth, source)?),
            other => return Err(unexpected(other, &inner, source)),
        }
    }

    let base = base.ok_or_else(|| ToolkitError::Engine("Power without base".to_string()))?;
    Ok(match exponent {
        Some(exp) => Expression::arithmetic(base, ArithmeticOperation::Power, exp),
        None => base,
    })
}

fn parse_primary(
    pair: Pair<Rule>,
    depth: &mut DepthTracker,
    source: &str,
) -> Result<Expression, ToolkitError> {
    // primary = { function_call | number | symbol | "(" ~ expression ~ ")" }
    if let Some(inner) = pair.into_inner().next() {
        return parse_expression(inner, depth, source);
    }
    Err(ToolkitError::Engine("Empty primary expression".to_string()))
}

fn parse_function_call(
    pair: Pair<Rule>,
    depth: &mut DepthTracker,
    source: &str,
) -> Result<Expression, ToolkitError> {
    let mut inner = pair.into_inner();
    let name_pair = inner
        .next()
        .ok_or_else(|| ToolkitError::Engine("Function call without name".to_string()))?;
    let op = MathematicalOperator::from_name(name_pair.as_str()).ok_or_else(|| {
        ToolkitError::expression(
            format!("unknown function '{}'", name_pair.as_str()),
            Span::from_pest_span(name_pair.as_span()),
            Arc::from(source),
        )
    })?;
    let argument = inner
        .next()
        .ok_or_else(|| ToolkitError::Engine(format!("{}() without argument", op.name())))?;
    Ok(Expression::apply(op, parse_expression(argument, depth, source)?))
}

fn unexpected(rule: Rule, pair: &Pair<Rule>, source: &str) -> ToolkitError {
    ToolkitError::expression(
        format!("unexpected {:?} '{}'", rule, pair.as_str()),
        Span::from_pest_span(pair.as_span()),
        Arc::from(source),
    )
}
