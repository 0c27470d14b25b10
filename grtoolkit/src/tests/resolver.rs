use crate::{Bindings, Resolution, Resolver, ResourceLimits, ToolkitError};
use std::collections::BTreeSet;

fn known() -> Bindings {
    Bindings::new().bind("r", 2).bind("alpha", 3)
}

#[test]
fn test_substituted_equation_resolves_to_number() {
    let entries = Resolver::new()
        .solve(&["Eq(a_tan, r*alpha)"], "a_tan", &known())
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].to_string(), "[6]");
    assert!(entries[0].is_resolved());
}

#[test]
fn test_trivially_true_equation_is_literal() {
    let entries = Resolver::new()
        .solve(&["Eq(x, x)"], "x", &Bindings::new())
        .unwrap();
    assert_eq!(entries[0].resolution, Resolution::Literal(true));
    assert_eq!(entries[0].to_string(), "True");
}

#[test]
fn test_contradiction_after_substitution_is_false() {
    let entries = Resolver::new()
        .solve(&["Eq(r, 5)"], "r", &known())
        .unwrap();
    assert_eq!(entries[0].resolution, Resolution::Literal(false));
}

#[test]
fn test_unknown_symbol_left_unresolved() {
    let entries = Resolver::new()
        .solve(&["Eq(a_tan, dv_dt)", "Eq(a_tan, r*alpha)"], "a_tan", &known())
        .unwrap();
    assert_eq!(entries.len(), 2);

    assert_eq!(entries[0].to_string(), "[dv_dt]");
    assert!(!entries[0].is_resolved());
    let unknowns: BTreeSet<String> = ["dv_dt".to_string()].into_iter().collect();
    assert_eq!(entries[0].unknowns(), Some(&unknowns));

    assert_eq!(entries[1].to_string(), "[6]");
    assert!(entries[1].unknowns().unwrap().is_empty());
}

#[test]
fn test_malformed_entry_is_isolated() {
    let entries = Resolver::new()
        .solve(&["Eq(a_tan, r*)", "Eq(a_tan, r*alpha)"], "a_tan", &known())
        .unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].error().unwrap().is_expression_error());
    assert!(entries[0].analysis.is_none());
    assert_eq!(entries[1].to_string(), "[6]");
}

#[test]
fn test_strict_mode_surfaces_first_error() {
    let err = Resolver::new()
        .solve_strict(&["Eq(a_tan, r*alpha)", "Eq(a_tan, r*)"], "a_tan", &known())
        .unwrap_err();
    assert!(err.is_expression_error());
}

#[test]
fn test_strict_mode_passes_clean_sets() {
    let entries = Resolver::new()
        .solve_strict(&["Eq(a_tan, r*alpha)"], "a_tan", &known())
        .unwrap();
    assert_eq!(entries[0].to_string(), "[6]");
}

#[test]
fn test_target_absent_everywhere_is_not_an_error() {
    let entries = Resolver::new()
        .solve(&["Eq(a, b)", "Eq(c, 2)"], "z", &Bindings::new())
        .unwrap();
    assert!(entries.iter().all(|e| e.solutions().is_empty()));
    assert!(entries.iter().all(|e| !e.analysis.as_ref().unwrap().target_present));
}

#[test]
fn test_invalid_target() {
    let err = Resolver::new()
        .solve(&["Eq(x, 1)"], "dv/dt", &Bindings::new())
        .unwrap_err();
    assert_eq!(err, ToolkitError::InvalidTarget("dv/dt".to_string()));
}

#[test]
fn test_invalid_binding_fails_whole_call() {
    let err = Resolver::new()
        .solve(&["Eq(x, 1)"], "x", &Bindings::new().bind("bad name", 1))
        .unwrap_err();
    assert!(matches!(err, ToolkitError::InvalidBinding { .. }));
}

#[test]
fn test_empty_input_gives_empty_output() {
    let equations: [&str; 0] = [];
    let entries = Resolver::new()
        .solve(&equations, "x", &Bindings::new())
        .unwrap();
    assert!(entries.is_empty());
}

#[test]
fn test_entries_keep_input_order_and_text() {
    let equations = ["Eq(x, 1)", "Eq(x, 2)", "Eq(x, 3)"];
    let entries = Resolver::new()
        .solve(&equations, "x", &Bindings::new())
        .unwrap();
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.index, i);
        assert_eq!(entry.equation, equations[i]);
        assert_eq!(entry.to_string(), format!("[{}]", i + 1));
    }
}

#[test]
fn test_repeated_calls_are_identical() {
    let resolver = Resolver::new();
    let equations = ["Eq(a_tan, dv_dt)", "Eq(a_tan, r*alpha)", "Eq(a_tan, r*)"];
    let first = resolver.solve(&equations, "a_tan", &known()).unwrap();
    let second = resolver.solve(&equations, "a_tan", &known()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_compound_binding_chain() {
    let known = Bindings::new()
        .bind("B1", "A1 + A2")
        .bind("A1", 1)
        .bind("A2", 2);
    let entries = Resolver::new()
        .solve(&["Eq(y, 2*B1)"], "y", &known)
        .unwrap();
    assert_eq!(entries[0].to_string(), "[6]");
}

#[test]
fn test_equation_count_limit() {
    let resolver = Resolver::with_limits(ResourceLimits {
        max_equations: 2,
        ..ResourceLimits::default()
    });
    let err = resolver
        .solve(&["x", "x", "x"], "x", &Bindings::new())
        .unwrap_err();
    assert!(matches!(err, ToolkitError::ResourceLimitExceeded { ref limit_name, .. } if limit_name == "max_equations"));
}

#[test]
fn test_quadratic_through_resolver() {
    let entries = Resolver::new()
        .solve(&["x**2 = k"], "x", &Bindings::new().bind("k", 9))
        .unwrap();
    assert_eq!(entries[0].to_string(), "[-3, 3]");
}

#[test]
fn test_tautology_through_square_root_is_true() {
    let entries = Resolver::new()
        .solve(&["Eq(sqrt(2)**2, 2)", "Eq(sqrt(2)**2, 3)"], "x", &Bindings::new())
        .unwrap();
    assert_eq!(entries[0].resolution, Resolution::Literal(true));
    assert_eq!(entries[1].resolution, Resolution::Literal(false));
}

#[test]
fn test_exponential_root_is_exact_after_rounding() {
    let entries = Resolver::new()
        .solve(&["Eq(2**x, y)"], "x", &Bindings::new().bind("y", 8))
        .unwrap();
    assert_eq!(entries[0].to_string(), "[3]");
}

#[test]
fn test_no_false_roots() {
    let entries = Resolver::new()
        .solve(
            &["Eq(1/x, 0)", "Eq(sqrt(x), t)", "Eq(x, 1/0)"],
            "x",
            &Bindings::new().bind("t", -3),
        )
        .unwrap();
    assert!(entries.iter().all(|e| e.solutions().is_empty()));
}

#[test]
fn test_long_chain_is_rejected_not_fatal() {
    let long = format!("Eq(y, 2{})", "*x".repeat(4000));
    let entries = Resolver::new()
        .solve(&[long.as_str(), "Eq(y, 2*x)"], "y", &Bindings::new().bind("x", 3))
        .unwrap();
    assert!(matches!(
        entries[0].error(),
        Some(ToolkitError::ResourceLimitExceeded { limit_name, .. }) if limit_name == "max_expression_depth"
    ));
    assert_eq!(entries[1].to_string(), "[6]");
}

#[test]
fn test_function_name_cannot_be_target() {
    let err = Resolver::new()
        .solve(&["Eq(x, 1)"], "sin", &Bindings::new())
        .unwrap_err();
    assert_eq!(err, ToolkitError::InvalidTarget("sin".to_string()));
}
