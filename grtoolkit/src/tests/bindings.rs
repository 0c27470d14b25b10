use crate::bindings::{parse_binding, Bindings, KnownValue};
use crate::{parse_equation, Expression, ResourceLimits, ToolkitError};
use rust_decimal::Decimal;
use std::str::FromStr;

#[test]
fn test_textual_substitution_is_whole_word() {
    let prepared = Bindings::new()
        .bind("r", 2)
        .prepare(&ResourceLimits::default())
        .unwrap();
    assert_eq!(prepared.substitute_text("r + rr + r_1 + 2*r"), "(2) + rr + r_1 + 2*(2)");
}

#[test]
fn test_textual_substitution_does_not_rescan() {
    let prepared = Bindings::new()
        .bind("a", "b + 1")
        .bind("b", 5)
        .prepare(&ResourceLimits::default())
        .unwrap();
    assert_eq!(prepared.substitute_text("Eq(y, a)"), "Eq(y, (b + 1))");
}

#[test]
fn test_symbolic_pass_resolves_injected_names() {
    let limits = ResourceLimits::default();
    let prepared = Bindings::new()
        .bind("B1", "A1 + A2")
        .bind("A1", 1)
        .bind("A2", 2)
        .prepare(&limits)
        .unwrap();
    let text = prepared.substitute_text("Eq(y, B1)");
    let equation = parse_equation(&text, &limits).unwrap();
    let substituted = prepared.substitute_symbols(&equation);
    assert!(substituted.rhs.free_symbols().is_empty());
    assert_eq!(substituted.lhs, Expression::symbol("y"));
}

#[test]
fn test_negative_values_are_parenthesised() {
    let prepared = Bindings::new()
        .bind("k", -3)
        .prepare(&ResourceLimits::default())
        .unwrap();
    assert_eq!(prepared.substitute_text("x**k"), "x**(-3)");
}

#[test]
fn test_invalid_binding_name() {
    let err = Bindings::new()
        .bind("2x", 1)
        .prepare(&ResourceLimits::default())
        .unwrap_err();
    assert!(matches!(err, ToolkitError::InvalidBinding { ref name, .. } if name == "2x"));
}

#[test]
fn test_function_name_cannot_be_bound() {
    let err = Bindings::new()
        .bind("sin", 1)
        .prepare(&ResourceLimits::default())
        .unwrap_err();
    assert!(matches!(err, ToolkitError::InvalidBinding { .. }));
}

#[test]
fn test_unparseable_binding_value() {
    let err = Bindings::new()
        .bind("k", "3 +")
        .prepare(&ResourceLimits::default())
        .unwrap_err();
    match err {
        ToolkitError::InvalidBinding { name, reason } => {
            assert_eq!(name, "k");
            assert!(reason.contains("Expression error"));
        }
        other => panic!("expected InvalidBinding, got {other:?}"),
    }
}

#[test]
fn test_later_insert_replaces_value() {
    let mut bindings = Bindings::new();
    assert!(bindings.insert("r", 1).is_none());
    assert_eq!(bindings.insert("r", 2), Some(KnownValue::from(1)));
    assert_eq!(bindings.len(), 1);
}

#[test]
fn test_bindings_from_iterator() {
    let bindings: Bindings = [("r", 2), ("alpha", 3)].into_iter().collect();
    assert_eq!(bindings.names().collect::<Vec<_>>(), vec!["alpha", "r"]);
}

#[test]
fn test_parse_binding_numeric_and_expression() {
    assert_eq!(
        parse_binding("p=1.7e-8").unwrap(),
        (
            "p".to_string(),
            KnownValue::Number(Decimal::from_str("0.000000017").unwrap())
        )
    );
    assert_eq!(
        parse_binding(" B1 = A1 + A2 ").unwrap(),
        ("B1".to_string(), KnownValue::Expression("A1 + A2".to_string()))
    );
}

#[test]
fn test_parse_binding_errors() {
    assert!(parse_binding("novalue").is_err());
    assert!(parse_binding("x=").is_err());
    assert!(parse_binding("1x=2").is_err());
}
