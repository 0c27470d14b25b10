use crate::ast::Span;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Detailed error information with source location
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDetails {
    pub message: String,
    pub span: Span,
    pub source_text: Arc<str>,
    pub suggestion: Option<String>,
}

/// Error types for the toolkit, with source location tracking for malformed input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolkitError {
    /// Equation or binding text the parser rejects
    #[error("Expression error: {0}")]
    Expression(Box<ErrorDetails>),

    /// A known-value binding with an unusable name or value
    #[error("Invalid binding '{name}': {reason}")]
    InvalidBinding { name: String, reason: String },

    /// The requested target is not a variable name
    #[error("Invalid target '{0}': expected a variable name")]
    InvalidTarget(String),

    /// An equation that cannot take part in a linear system
    #[error("Equation {index} is not linear in {variables}")]
    NonLinear { index: usize, variables: String },

    #[error("Resource limit exceeded: {limit_name} (limit: {limit_value}, actual: {actual_value}). {suggestion}")]
    ResourceLimitExceeded {
        limit_name: String,
        limit_value: String,
        actual_value: String,
        suggestion: String,
    },

    /// Engine error without specific source location
    #[error("Engine error: {0}")]
    Engine(String),
}

impl fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        write!(f, " at {}:{}", self.span.line, self.span.col)
    }
}

impl ToolkitError {
    /// Create an expression error with source information
    pub fn expression(message: impl Into<String>, span: Span, source_text: Arc<str>) -> Self {
        Self::Expression(Box::new(ErrorDetails {
            message: message.into(),
            span,
            source_text,
            suggestion: None,
        }))
    }

    /// Create an expression error with suggestion
    pub fn expression_with_suggestion(
        message: impl Into<String>,
        span: Span,
        source_text: Arc<str>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Expression(Box::new(ErrorDetails {
            message: message.into(),
            span,
            source_text,
            suggestion: Some(suggestion.into()),
        }))
    }

    pub fn invalid_binding(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBinding {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn is_expression_error(&self) -> bool {
        matches!(self, ToolkitError::Expression(_))
    }
}

impl Serialize for ToolkitError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
