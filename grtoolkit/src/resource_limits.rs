/// Resource limits to keep resolution predictable on hostile or accidental input
///
/// These limits are generous enough for any hand-written equation set.
#[derive(Debug, Clone)]
pub struct ResourceLimits {
    /// Maximum size of a single equation after substitution, in bytes
    /// Real usage: ~50 bytes, Limit: 16KB
    pub max_equation_bytes: usize,

    /// Maximum expression nesting depth while parsing
    /// Every parenthesised level costs five, every chained operator one
    pub max_expression_depth: usize,

    /// Highest polynomial degree the solver expands before giving up
    pub max_polynomial_degree: usize,

    /// Maximum number of equations in one call
    pub max_equations: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_equation_bytes: 16 * 1024, // 16 KB
            max_expression_depth: 256,
            max_polynomial_degree: 8,
            max_equations: 1024,
        }
    }
}

impl ResourceLimits {
    /// Create a new ResourceLimits with default values
    pub fn new() -> Self {
        Self::default()
    }
}
