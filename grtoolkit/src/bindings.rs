//! Known-value bindings and the two substitution passes

use crate::error::ToolkitError;
use crate::parser::literals::parse_decimal;
use crate::parser::{self, is_identifier, is_reserved};
use crate::resource_limits::ResourceLimits;
use crate::semantic::{Equation, Expression};
use regex::{Captures, Regex};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::trace;

/// Value bound to a variable name
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum KnownValue {
    Number(Decimal),
    /// Compound sub-expression, e.g. `A1 + A2`
    Expression(String),
}

impl KnownValue {
    /// Source text injected by the textual pass
    pub fn to_source(&self) -> String {
        match self {
            KnownValue::Number(n) => n.normalize().to_string(),
            KnownValue::Expression(text) => text.trim().to_string(),
        }
    }
}

impl fmt::Display for KnownValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_source())
    }
}

impl From<Decimal> for KnownValue {
    fn from(value: Decimal) -> Self {
        KnownValue::Number(value)
    }
}

impl From<i32> for KnownValue {
    fn from(value: i32) -> Self {
        KnownValue::Number(Decimal::from(value))
    }
}

impl From<i64> for KnownValue {
    fn from(value: i64) -> Self {
        KnownValue::Number(Decimal::from(value))
    }
}

impl From<u32> for KnownValue {
    fn from(value: u32) -> Self {
        KnownValue::Number(Decimal::from(value))
    }
}

impl From<&str> for KnownValue {
    fn from(value: &str) -> Self {
        KnownValue::Expression(value.to_string())
    }
}

impl From<String> for KnownValue {
    fn from(value: String) -> Self {
        KnownValue::Expression(value)
    }
}

/// Mapping from variable name to known value. Keys are unique; order is irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Bindings {
    values: BTreeMap<String, KnownValue>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Bindings::insert`]
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<KnownValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Bind `name`, returning the value it replaces
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<KnownValue>,
    ) -> Option<KnownValue> {
        self.values.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&KnownValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &KnownValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Validate every binding and prepare both substitution passes.
    ///
    /// Names must be identifiers that do not collide with function names;
    /// values must parse as standalone expressions.
    pub fn prepare(&self, limits: &ResourceLimits) -> Result<PreparedBindings, ToolkitError> {
        let mut symbolic = BTreeMap::new();
        let mut replacements = BTreeMap::new();

        for (name, value) in &self.values {
            if !is_identifier(name) {
                return Err(ToolkitError::invalid_binding(
                    name,
                    "expected a variable name",
                ));
            }
            if is_reserved(name) {
                return Err(ToolkitError::invalid_binding(
                    name,
                    "name is reserved by the equation notation",
                ));
            }
            let source = value.to_source();
            let expression = parser::parse_expression(&source, limits)
                .map_err(|e| ToolkitError::invalid_binding(name, e.to_string()))?;
            replacements.insert(name.clone(), format!("({})", source));
            symbolic.insert(name.clone(), expression);
        }

        let text = if replacements.is_empty() {
            None
        } else {
            Some(TextSubstitution::new(replacements)?)
        };
        Ok(PreparedBindings { text, symbolic })
    }
}

impl<K, V> FromIterator<(K, V)> for Bindings
where
    K: Into<String>,
    V: Into<KnownValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bindings = Bindings::new();
        for (name, value) in iter {
            bindings.insert(name, value);
        }
        bindings
    }
}

/// Whole-word, single-pass text replacement of bound names
#[derive(Debug, Clone)]
pub struct TextSubstitution {
    pattern: Regex,
    replacements: BTreeMap<String, String>,
}

impl TextSubstitution {
    fn new(replacements: BTreeMap<String, String>) -> Result<Self, ToolkitError> {
        // Longest names first so the alternation never stops at a prefix
        let mut names: Vec<&String> = replacements.keys().collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let alternation = names
            .iter()
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"\b(?:{})\b", alternation))
            .map_err(|e| ToolkitError::Engine(format!("Cannot build substitution pattern: {}", e)))?;
        Ok(Self {
            pattern,
            replacements,
        })
    }

    /// Replace every whole-word occurrence of a bound name. Injected text is not re-scanned.
    pub fn apply(&self, source: &str) -> String {
        self.pattern
            .replace_all(source, |caps: &Captures| {
                let name = &caps[0];
                self.replacements
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| name.to_string())
            })
            .into_owned()
    }
}

/// Bindings validated and ready for both substitution passes
#[derive(Debug, Clone, Default)]
pub struct PreparedBindings {
    text: Option<TextSubstitution>,
    symbolic: BTreeMap<String, Expression>,
}

impl PreparedBindings {
    /// First pass: on the equation text, before parsing
    pub fn substitute_text(&self, source: &str) -> String {
        match &self.text {
            Some(text) => {
                let substituted = text.apply(source);
                trace!(source, substituted = %substituted, "textual substitution");
                substituted
            }
            None => source.to_string(),
        }
    }

    /// Second pass: on the parsed equation, for names still free after the first
    pub fn substitute_symbols(&self, equation: &Equation) -> Equation {
        let mut result = equation.clone();
        for name in equation.free_symbols() {
            if let Some(value) = self.symbolic.get(&name) {
                trace!(name = %name, value = %value, "symbolic substitution");
                result = result.substitute(&name, value);
            }
        }
        result
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.symbolic.contains_key(name)
    }
}

/// Parse a `name=value` pair. Numeric values become [`KnownValue::Number`],
/// anything else is kept as an expression.
pub fn parse_binding(text: &str) -> Result<(String, KnownValue), ToolkitError> {
    let Some((name, value)) = text.split_once('=') else {
        return Err(ToolkitError::invalid_binding(
            text.trim(),
            "expected NAME=VALUE",
        ));
    };
    let name = name.trim();
    let value = value.trim();
    if !is_identifier(name) {
        return Err(ToolkitError::invalid_binding(name, "expected a variable name"));
    }
    if value.is_empty() {
        return Err(ToolkitError::invalid_binding(name, "missing value"));
    }
    let known = match parse_decimal(value) {
        Ok(number) => KnownValue::Number(number),
        Err(_) => KnownValue::Expression(value.to_string()),
    };
    Ok((name.to_string(), known))
}
