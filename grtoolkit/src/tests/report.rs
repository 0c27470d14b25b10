use crate::report::{render, to_json};
use crate::{Bindings, Resolver};

#[test]
fn test_report_layout() {
    let known = Bindings::new().bind("r", 2).bind("alpha", 3);
    let entries = Resolver::new()
        .solve(&["Eq(a_tan, dv_dt)", "Eq(a_tan, r*alpha)"], "a_tan", &known)
        .unwrap();

    let expected = "\n\
                    \nOPTION 0\
                    \nFrom Equation: Eq(a_tan, dv_dt):\
                    \na_tan = [dv_dt]\
                    \n\
                    \nOPTION 1\
                    \nFrom Equation: Eq(a_tan, r*alpha):\
                    \na_tan = [6]\n";
    assert_eq!(render("a_tan", &entries), expected);
}

#[test]
fn test_report_shows_literals_and_errors() {
    let entries = Resolver::new()
        .solve(&["Eq(x, x)", "Eq(x, *)"], "x", &Bindings::new())
        .unwrap();
    let report = render("x", &entries);
    assert!(report.contains("x = True\n"));
    assert!(report.contains("x = error: Expression error:"));
}

#[test]
fn test_report_for_empty_set_is_separator_only() {
    let equations: [&str; 0] = [];
    let entries = Resolver::new()
        .solve(&equations, "x", &Bindings::new())
        .unwrap();
    assert_eq!(render("x", &entries), "\n");
}

#[test]
fn test_json_rendering() {
    let entries = Resolver::new()
        .solve(&["Eq(y, 2*x)", "Eq(x, x)"], "y", &Bindings::new().bind("x", 4))
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&to_json(&entries).unwrap()).unwrap();

    assert_eq!(json[0]["index"], 0);
    assert_eq!(json[0]["equation"], "Eq(y, 2*x)");
    assert_eq!(json[0]["resolution"]["kind"], "solutions");
    assert_eq!(json[0]["resolution"]["value"][0], "8");
    assert_eq!(json[1]["resolution"]["kind"], "literal");
    assert_eq!(json[1]["resolution"]["value"], true);
}

#[test]
fn test_printing_the_report_leaves_results_unchanged() {
    let equations = ["Eq(a_tan, dv_dt)", "Eq(a_tan, r*alpha)", "Eq(a_tan, r*)", "Eq(r, r)"];
    let known = Bindings::new().bind("r", 2).bind("alpha", 3);

    let quiet = Resolver::new().solve(&equations, "a_tan", &known).unwrap();
    let reported = Resolver::new()
        .with_report(true)
        .solve(&equations, "a_tan", &known)
        .unwrap();
    assert_eq!(quiet, reported);

    let strict_quiet = Resolver::new()
        .solve_strict(&equations[..2], "a_tan", &known)
        .unwrap();
    let strict_reported = Resolver::new()
        .with_report(true)
        .solve_strict(&equations[..2], "a_tan", &known)
        .unwrap();
    assert_eq!(strict_quiet, strict_reported);
}
