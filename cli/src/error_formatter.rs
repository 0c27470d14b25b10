use ariadne::{Color, Label, Report, ReportKind, Source};
use grtoolkit::ToolkitError;

const SOURCE_ID: &str = "<equation>";

/// Format a ToolkitError for the terminal, pointing at the offending text when there is one
pub fn format_error(error: &ToolkitError) -> String {
    match error {
        ToolkitError::Expression(details) => {
            let mut output = Vec::new();

            let message = format!(
                "Expression error: {} (at column {})",
                details.message, details.span.col
            );

            let len = details.source_text.len();
            let start = details.span.start.min(len);
            let end = details.span.end.clamp(start, len);
            let mut report = Report::build(ReportKind::Error, SOURCE_ID, start)
                .with_message(message)
                .with_label(
                    Label::new((SOURCE_ID, start..end))
                        .with_message("")
                        .with_color(Color::Red),
                );

            if let Some(suggestion) = &details.suggestion {
                report = report.with_help(suggestion);
            }

            match report.finish().write(
                (SOURCE_ID, Source::from(details.source_text.as_ref())),
                &mut output,
            ) {
                Ok(_) => String::from_utf8_lossy(&output).to_string(),
                Err(_) => format!("{}", error),
            }
        }
        ToolkitError::InvalidBinding { name, reason } => {
            format!("Invalid known value '{}': {}", name, reason)
        }
        ToolkitError::InvalidTarget(name) => format!(
            "Invalid variable '{}'\n  Expected a name such as x, a_tan or dv_dt",
            name
        ),
        ToolkitError::NonLinear { index, variables } => format!(
            "Equation {} is not linear in {}\n  Systems need equations of the form a*x + b*y + c = 0",
            index, variables
        ),
        ToolkitError::ResourceLimitExceeded {
            limit_name,
            limit_value,
            actual_value,
            suggestion,
        } => {
            format!(
                "Resource limit exceeded: {}\n  Limit: {}\n  Actual: {}\n  {}",
                limit_name, limit_value, actual_value, suggestion
            )
        }
        ToolkitError::Engine(msg) => format!("Engine error: {}", msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grtoolkit::{parse_equation, ResourceLimits};

    #[test]
    fn test_expression_error_mentions_message() {
        let err = parse_equation("Eq(x, *)", &ResourceLimits::default()).unwrap_err();
        let text = format_error(&err);
        assert!(text.contains("Expression error"));
    }

    #[test]
    fn test_invalid_target_is_explained() {
        let text = format_error(&ToolkitError::InvalidTarget("dv/dt".to_string()));
        assert!(text.contains("dv/dt"));
        assert!(text.contains("a_tan"));
    }
}
