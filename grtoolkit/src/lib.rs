//! # grtoolkit
//!
//! **Resolve equation sets for one unknown**
//!
//! Takes a list of equations written as text (`Eq(lhs, rhs)`, `lhs = rhs` or a
//! bare expression meaning `expr = 0`), substitutes known values, and solves
//! every equation independently for a target variable.
//!
//! ## Quick Start
//!
//! ```rust
//! use grtoolkit::{Bindings, Resolver, ToolkitResult};
//!
//! fn main() -> ToolkitResult<()> {
//!     let resolver = Resolver::new();
//!     let known = Bindings::new().bind("r", 2).bind("alpha", 3);
//!
//!     let entries = resolver.solve(&["Eq(a_tan, r*alpha)"], "a_tan", &known)?;
//!     assert_eq!(entries[0].to_string(), "[6]");
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Bindings
//! Known values are substituted twice: once on the raw text, whole words only,
//! and once on the parsed symbols. A binding may itself be an expression that
//! mentions other bound names.
//!
//! ### Resolutions
//! Each equation resolves on its own to a literal boolean (the equation had no
//! variables left), a list of solutions (possibly empty, possibly symbolic), or
//! a rejection carrying the error for that one equation.
//!
//! ### Linear systems
//! [`solve_system`] treats the equations as one simultaneous linear system
//! instead of independent entries.

pub mod ast;
pub mod bindings;
pub mod error;
pub mod formulas;
pub mod parser;
pub mod report;
pub mod resolver;
pub mod resource_limits;
pub mod semantic;
pub mod simplify;
pub mod solver;

pub use ast::Span;
pub use bindings::{parse_binding, Bindings, KnownValue};
pub use error::{ErrorDetails, ToolkitError};
pub use parser::{parse_equation, parse_expression};
pub use report::Report;
pub use resolver::{EquationAnalysis, Resolution, Resolver, SolutionEntry};
pub use resource_limits::ResourceLimits;
pub use semantic::*;
pub use simplify::simplify;
pub use solver::linear_system::{solve_system, SystemSolution};

/// Result type for toolkit operations
pub type ToolkitResult<T> = Result<T, ToolkitError>;

#[cfg(test)]
mod tests;
