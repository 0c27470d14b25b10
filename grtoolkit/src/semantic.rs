use crate::ast::Span;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// An equality between two expressions, as written by the caller
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    pub lhs: Expression,
    pub rhs: Expression,
    pub span: Option<Span>,
}

impl Equation {
    pub fn new(lhs: Expression, rhs: Expression) -> Self {
        Self {
            lhs,
            rhs,
            span: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// The equation moved to one side: `lhs - rhs`
    pub fn difference(&self) -> Expression {
        Expression::arithmetic(
            self.lhs.clone(),
            ArithmeticOperation::Subtract,
            self.rhs.clone(),
        )
    }

    /// Variable names appearing on either side, sorted
    pub fn free_symbols(&self) -> BTreeSet<String> {
        let mut symbols = self.lhs.free_symbols();
        symbols.extend(self.rhs.free_symbols());
        symbols
    }

    pub fn substitute(&self, name: &str, replacement: &Expression) -> Equation {
        Equation {
            lhs: self.lhs.substitute(name, replacement),
            rhs: self.rhs.substitute(name, replacement),
            span: self.span.clone(),
        }
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Eq({}, {})", self.lhs, self.rhs)
    }
}

/// A symbolic expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    Number(Decimal),
    Symbol(String),
    Arithmetic(Box<Expression>, ArithmeticOperation, Box<Expression>),
    Negation(Box<Expression>),
    MathematicalOperator(MathematicalOperator, Box<Expression>),
}

/// Arithmetic operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ArithmeticOperation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl ArithmeticOperation {
    /// Returns a human-readable name for the operation
    pub fn name(&self) -> &'static str {
        match self {
            ArithmeticOperation::Add => "addition",
            ArithmeticOperation::Subtract => "subtraction",
            ArithmeticOperation::Multiply => "multiplication",
            ArithmeticOperation::Divide => "division",
            ArithmeticOperation::Power => "exponentiation",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ArithmeticOperation::Add => "+",
            ArithmeticOperation::Subtract => "-",
            ArithmeticOperation::Multiply => "*",
            ArithmeticOperation::Divide => "/",
            ArithmeticOperation::Power => "**",
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            ArithmeticOperation::Add | ArithmeticOperation::Subtract => 1,
            ArithmeticOperation::Multiply | ArithmeticOperation::Divide => 2,
            ArithmeticOperation::Power => 4,
        }
    }
}

/// Mathematical operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MathematicalOperator {
    Sqrt, // Square root
    Sin,  // Sine
    Cos,  // Cosine
    Tan,  // Tangent
    Asin, // Arc sine
    Acos, // Arc cosine
    Atan, // Arc tangent
    Log,  // Natural logarithm
    Exp,  // Exponential (e^x)
    Abs,  // Absolute value
}

impl MathematicalOperator {
    pub fn from_name(name: &str) -> Option<Self> {
        let op = match name {
            "sqrt" => MathematicalOperator::Sqrt,
            "sin" => MathematicalOperator::Sin,
            "cos" => MathematicalOperator::Cos,
            "tan" => MathematicalOperator::Tan,
            "asin" => MathematicalOperator::Asin,
            "acos" => MathematicalOperator::Acos,
            "atan" => MathematicalOperator::Atan,
            "log" | "ln" => MathematicalOperator::Log,
            "exp" => MathematicalOperator::Exp,
            "abs" => MathematicalOperator::Abs,
            _ => return None,
        };
        Some(op)
    }

    pub fn name(&self) -> &'static str {
        match self {
            MathematicalOperator::Sqrt => "sqrt",
            MathematicalOperator::Sin => "sin",
            MathematicalOperator::Cos => "cos",
            MathematicalOperator::Tan => "tan",
            MathematicalOperator::Asin => "asin",
            MathematicalOperator::Acos => "acos",
            MathematicalOperator::Atan => "atan",
            MathematicalOperator::Log => "log",
            MathematicalOperator::Exp => "exp",
            MathematicalOperator::Abs => "abs",
        }
    }

    /// Apply the operator to a float, as the numeric fold does
    pub fn apply(&self, value: f64) -> f64 {
        match self {
            MathematicalOperator::Sqrt => value.sqrt(),
            MathematicalOperator::Sin => value.sin(),
            MathematicalOperator::Cos => value.cos(),
            MathematicalOperator::Tan => value.tan(),
            MathematicalOperator::Asin => value.asin(),
            MathematicalOperator::Acos => value.acos(),
            MathematicalOperator::Atan => value.atan(),
            MathematicalOperator::Log => value.ln(),
            MathematicalOperator::Exp => value.exp(),
            MathematicalOperator::Abs => value.abs(),
        }
    }
}

impl Expression {
    pub fn number(value: impl Into<Decimal>) -> Self {
        Expression::Number(value.into())
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Expression::Symbol(name.into())
    }

    pub fn zero() -> Self {
        Expression::Number(Decimal::ZERO)
    }

    pub fn one() -> Self {
        Expression::Number(Decimal::ONE)
    }

    pub fn arithmetic(left: Expression, op: ArithmeticOperation, right: Expression) -> Self {
        Expression::Arithmetic(Box::new(left), op, Box::new(right))
    }

    pub fn negate(inner: Expression) -> Self {
        Expression::Negation(Box::new(inner))
    }

    pub fn apply(op: MathematicalOperator, inner: Expression) -> Self {
        Expression::MathematicalOperator(op, Box::new(inner))
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Expression::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Expression::Symbol(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expression::Number(n) if n.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expression::Number(n) if *n == Decimal::ONE)
    }

    /// Variable names appearing in the expression, sorted
    pub fn free_symbols(&self) -> BTreeSet<String> {
        let mut symbols = BTreeSet::new();
        self.collect_symbols(&mut symbols);
        symbols
    }

    fn collect_symbols(&self, symbols: &mut BTreeSet<String>) {
        match self {
            Expression::Number(_) => {}
            Expression::Symbol(name) => {
                symbols.insert(name.clone());
            }
            Expression::Arithmetic(l, _, r) => {
                l.collect_symbols(symbols);
                r.collect_symbols(symbols);
            }
            Expression::Negation(inner) | Expression::MathematicalOperator(_, inner) => {
                inner.collect_symbols(symbols)
            }
        }
    }

    pub fn contains_symbol(&self, name: &str) -> bool {
        self.occurrences(name) > 0
    }

    /// How many times `name` appears in the tree
    pub fn occurrences(&self, name: &str) -> usize {
        match self {
            Expression::Number(_) => 0,
            Expression::Symbol(s) => usize::from(s == name),
            Expression::Arithmetic(l, _, r) => l.occurrences(name) + r.occurrences(name),
            Expression::Negation(inner) | Expression::MathematicalOperator(_, inner) => {
                inner.occurrences(name)
            }
        }
    }

    /// Replace every occurrence of the variable `name` with `replacement`
    pub fn substitute(&self, name: &str, replacement: &Expression) -> Expression {
        match self {
            Expression::Symbol(s) if s == name => replacement.clone(),
            Expression::Number(_) | Expression::Symbol(_) => self.clone(),
            Expression::Arithmetic(l, op, r) => Expression::arithmetic(
                l.substitute(name, replacement),
                *op,
                r.substitute(name, replacement),
            ),
            Expression::Negation(inner) => Expression::negate(inner.substitute(name, replacement)),
            Expression::MathematicalOperator(op, inner) => {
                Expression::apply(*op, inner.substitute(name, replacement))
            }
        }
    }

    /// Number of nodes, used to order candidate solutions
    pub fn size(&self) -> usize {
        match self {
            Expression::Number(_) | Expression::Symbol(_) => 1,
            Expression::Arithmetic(l, _, r) => 1 + l.size() + r.size(),
            Expression::Negation(inner) | Expression::MathematicalOperator(_, inner) => {
                1 + inner.size()
            }
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expression::Number(n) if n.is_sign_negative() => 3,
            Expression::Number(_) | Expression::Symbol(_) | Expression::MathematicalOperator(..) => 5,
            Expression::Arithmetic(_, op, _) => op.precedence(),
            Expression::Negation(_) => 3,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, min_precedence: u8) -> fmt::Result {
        if self.precedence() < min_precedence {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Number(n) => write!(f, "{}", n.normalize()),
            Expression::Symbol(name) => write!(f, "{}", name),
            Expression::Arithmetic(left, op, right) => {
                let prec = op.precedence();
                match op {
                    ArithmeticOperation::Add | ArithmeticOperation::Subtract => {
                        left.fmt_operand(f, prec)?;
                        write!(f, " {} ", op.symbol())?;
                        // a - (b + c) needs the brackets, a + (b + c) does not
                        let right_min = if *op == ArithmeticOperation::Subtract {
                            prec + 1
                        } else {
                            prec
                        };
                        right.fmt_operand(f, right_min)
                    }
                    ArithmeticOperation::Multiply | ArithmeticOperation::Divide => {
                        left.fmt_operand(f, prec)?;
                        write!(f, "{}", op.symbol())?;
                        right.fmt_operand(f, prec + 1)
                    }
                    ArithmeticOperation::Power => {
                        left.fmt_operand(f, prec + 1)?;
                        write!(f, "**")?;
                        right.fmt_operand(f, prec)
                    }
                }
            }
            Expression::Negation(inner) => {
                write!(f, "-")?;
                inner.fmt_operand(f, 2)
            }
            Expression::MathematicalOperator(op, inner) => write!(f, "{}({})", op.name(), inner),
        }
    }
}

impl Serialize for Expression {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<Decimal> for Expression {
    fn from(value: Decimal) -> Self {
        Expression::Number(value)
    }
}

/// Handle for a variable declared from an expression's free-symbol set
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    name: String,
}

impl Symbol {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn to_expression(&self) -> Expression {
        Expression::Symbol(self.name.clone())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Explicit name → symbol mapping, built once per expression
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: BTreeMap<String, Symbol>,
}

impl SymbolTable {
    pub fn from_equation(equation: &Equation) -> Self {
        let symbols = equation
            .free_symbols()
            .into_iter()
            .map(|name| {
                let symbol = Symbol { name: name.clone() };
                (name, symbol)
            })
            .collect();
        Self { symbols }
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.symbols.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
