use crate::{parse_expression, simplify, Expression, ResourceLimits};

fn simplified(source: &str) -> String {
    let expr = parse_expression(source, &ResourceLimits::default()).unwrap();
    simplify(&expr).to_string()
}

#[test]
fn test_constant_folding() {
    assert_eq!(simplified("2*(3 + 4)"), "14");
    assert_eq!(simplified("2**10"), "1024");
    assert_eq!(simplified("10/4"), "2.5");
    assert_eq!(simplified("sqrt(16)"), "4");
    assert_eq!(simplified("(2)*(3)"), "6");
}

#[test]
fn test_like_terms_collect() {
    assert_eq!(simplified("x + x"), "2*x");
    assert_eq!(simplified("a - a"), "0");
    assert_eq!(simplified("x - (y + x)"), "-y");
    assert_eq!(simplified("a*b - b*a"), "0");
}

#[test]
fn test_repeated_factors_become_powers() {
    assert_eq!(simplified("x*x"), "x**2");
    assert_eq!(simplified("x**2/x"), "x");
    assert_eq!(simplified("x/x"), "1");
}

#[test]
fn test_rational_coefficients_stay_exact() {
    assert_eq!(simplified("x/3*3"), "x");
    assert_eq!(simplified("3*x/2"), "3*x/2");
    assert_eq!(simplified("x/(2*y)"), "x/(2*y)");
}

#[test]
fn test_identities() {
    assert_eq!(simplified("x**0"), "1");
    assert_eq!(simplified("x**1"), "x");
    assert_eq!(simplified("1**y"), "1");
    assert_eq!(simplified("0*y"), "0");
    assert_eq!(simplified("-(-x)"), "x");
    assert_eq!(simplified("log(exp(y))"), "y");
}

#[test]
fn test_division_by_zero_stays_symbolic() {
    assert_eq!(simplified("x/0"), "x/0");
    let expr = parse_expression("1/0", &ResourceLimits::default()).unwrap();
    assert!(simplify(&expr).as_number().is_none());
}

#[test]
fn test_negative_base_fractional_power_stays_symbolic() {
    let expr = parse_expression("(-4)**0.5", &ResourceLimits::default()).unwrap();
    assert!(simplify(&expr).as_number().is_none());
}

#[test]
fn test_simplify_is_stable() {
    for source in ["2*x + 1", "x**2 - 4*x*y + y", "a_tan/alpha", "exp(-2.5*t)*(A2 + A1*t)"] {
        let expr = parse_expression(source, &ResourceLimits::default()).unwrap();
        let once = simplify(&expr);
        let twice = simplify(&once);
        assert_eq!(once, twice, "{source}");
    }
}

#[test]
fn test_symbols_untouched() {
    assert_eq!(
        simplify(&Expression::symbol("dv_dt")),
        Expression::symbol("dv_dt")
    );
}
