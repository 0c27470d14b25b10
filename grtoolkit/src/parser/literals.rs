use crate::ast::Span;
use crate::error::ToolkitError;
use crate::parser::Rule;
use crate::semantic::Expression;
use pest::iterators::Pair;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

// Decimal carries at most 28 fractional digits; larger exponents cannot be represented
const MAX_DECIMAL_EXPONENT: i64 = 28;

pub(crate) fn parse_number(pair: Pair<Rule>, source: &str) -> Result<Expression, ToolkitError> {
    let text = pair.as_str();
    parse_decimal(text).map(Expression::Number).map_err(|message| {
        ToolkitError::expression(
            message,
            Span::from_pest_span(pair.as_span()),
            Arc::from(source),
        )
    })
}

/// Parse a decimal literal, accepting `.5`, `5.` and scientific notation (`1.7e-8`)
pub fn parse_decimal(text: &str) -> Result<Decimal, String> {
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(idx) => (&text[..idx], Some(&text[idx + 1..])),
        None => (text, None),
    };

    let mantissa = mantissa.trim_end_matches('.');
    let mantissa = if mantissa.starts_with('.') {
        format!("0{}", mantissa)
    } else {
        mantissa.to_string()
    };

    let value = Decimal::from_str(&mantissa)
        .map_err(|e| format!("invalid number '{}': {}", text, e))?;

    let Some(exponent) = exponent else {
        return Ok(value);
    };
    let exponent: i64 = exponent
        .parse()
        .map_err(|_| format!("invalid exponent in '{}'", text))?;
    if exponent.abs() > MAX_DECIMAL_EXPONENT {
        return Err(format!(
            "number '{}' is out of range (exponent limit is {})",
            text, MAX_DECIMAL_EXPONENT
        ));
    }

    let ten = Decimal::from(10);
    let mut result = value;
    for _ in 0..exponent.unsigned_abs() {
        result = if exponent > 0 {
            result.checked_mul(ten)
        } else {
            result.checked_div(ten)
        }
        .ok_or_else(|| format!("number '{}' is out of range", text))?;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::parse_decimal;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn plain_and_partial_decimals() {
        assert_eq!(parse_decimal("42").unwrap(), Decimal::from(42));
        assert_eq!(parse_decimal(".5").unwrap(), Decimal::from_str("0.5").unwrap());
        assert_eq!(parse_decimal("5.").unwrap(), Decimal::from(5));
    }

    #[test]
    fn scientific_notation() {
        assert_eq!(
            parse_decimal("1.7e-8").unwrap(),
            Decimal::from_str("0.000000017").unwrap()
        );
        assert_eq!(parse_decimal("2E3").unwrap(), Decimal::from(2000));
        assert_eq!(parse_decimal("4e+1").unwrap(), Decimal::from(40));
    }

    #[test]
    fn exponent_out_of_range() {
        assert!(parse_decimal("1e40").is_err());
    }
}
