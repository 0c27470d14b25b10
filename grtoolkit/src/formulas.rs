//! Ready-made equation sets from circuit analysis, resolved through [`Resolver`]

use crate::bindings::Bindings;
use crate::error::ToolkitError;
use crate::resolver::{Resolver, SolutionEntry};
use crate::simplify::fold_power;
use crate::ToolkitResult;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Resistance of a uniform conductor: resistivity `p`, length `l`, cross-section `A`
pub const RESISTANCE: &str = "Eq(R, p*l/A)";

const OVERDAMPED: &str = "Eq(i, A1*exp(s1*t) + A2*exp(s2*t))";
const CRITICALLY_DAMPED: &str = "Eq(i, (A2 + A1*t)*exp(-alpha*t))";
const UNDERDAMPED: &str = "Eq(i, exp(-alpha*t)*(B1*cos(wd*t) + B2*sin(wd*t)))";

// Places compared when deciding critical damping
const DAMPING_PRECISION: u32 = 12;

/// Solve the resistance relation for one of `R`, `p`, `l`, `A`
pub fn resistance(
    resolver: &Resolver,
    find: &str,
    known: &Bindings,
) -> ToolkitResult<Vec<SolutionEntry>> {
    resolver.solve(&[RESISTANCE], find, known)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Damping {
    Overdamped,
    CriticallyDamped,
    Underdamped,
}

impl fmt::Display for Damping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Damping::Overdamped => "overdamped",
            Damping::CriticallyDamped => "critically damped",
            Damping::Underdamped => "underdamped",
        };
        write!(f, "{}", name)
    }
}

/// Characteristic values of a source-free series RLC circuit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRlc {
    /// Neper frequency `R / (2L)`
    pub alpha: Decimal,
    /// Resonant frequency `1 / sqrt(LC)`
    pub w0: Decimal,
    /// Roots of the characteristic equation, when real
    pub s1: Option<Decimal>,
    pub s2: Option<Decimal>,
    pub damping: Damping,
}

impl SeriesRlc {
    pub fn new(resistance: Decimal, capacitance: Decimal, inductance: Decimal) -> ToolkitResult<Self> {
        for (name, value) in [("R", resistance), ("C", capacitance), ("L", inductance)] {
            if value <= Decimal::ZERO {
                return Err(ToolkitError::invalid_binding(name, "must be positive"));
            }
        }

        let alpha = Decimal::TWO
            .checked_mul(inductance)
            .and_then(|two_l| resistance.checked_div(two_l))
            .ok_or_else(|| arithmetic("alpha"))?
            .normalize();
        let lc = capacitance
            .checked_mul(inductance)
            .ok_or_else(|| arithmetic("L*C"))?;
        let root_lc = fold_power(lc, Decimal::new(5, 1)).ok_or_else(|| arithmetic("sqrt(L*C)"))?;
        let w0 = Decimal::ONE
            .checked_div(root_lc)
            .ok_or_else(|| arithmetic("w0"))?
            .normalize();

        let damping = match alpha
            .round_dp(DAMPING_PRECISION)
            .cmp(&w0.round_dp(DAMPING_PRECISION))
        {
            std::cmp::Ordering::Greater => Damping::Overdamped,
            std::cmp::Ordering::Equal => Damping::CriticallyDamped,
            std::cmp::Ordering::Less => Damping::Underdamped,
        };

        let (s1, s2) = if damping == Damping::Underdamped {
            (None, None)
        } else {
            let spread = alpha
                .checked_mul(alpha)
                .zip(w0.checked_mul(w0))
                .and_then(|(a, w)| a.checked_sub(w))
                .map(|d| d.max(Decimal::ZERO))
                .and_then(|d| fold_power(d, Decimal::new(5, 1)))
                .ok_or_else(|| arithmetic("s1, s2"))?;
            (
                Some((-alpha + spread).normalize()),
                Some((-alpha - spread).normalize()),
            )
        };

        Ok(Self {
            alpha,
            w0,
            s1,
            s2,
            damping,
        })
    }

    /// The natural response equation matching the damping
    pub fn equation(&self) -> &'static str {
        match self.damping {
            Damping::Overdamped => OVERDAMPED,
            Damping::CriticallyDamped => CRITICALLY_DAMPED,
            Damping::Underdamped => UNDERDAMPED,
        }
    }

    /// Values substituted into the response equation, on top of `extra`
    pub fn bindings(&self, extra: &Bindings) -> Bindings {
        let mut bindings = extra.clone();
        bindings.insert("wd", "(w0**2 - alpha**2)**(1/2)");
        bindings.insert("alpha", self.alpha);
        bindings.insert("w0", self.w0);
        if let (Some(s1), Some(s2)) = (self.s1, self.s2) {
            bindings.insert("s1", s1);
            bindings.insert("s2", s2);
        }
        bindings.insert("B1", "A1 + A2");
        bindings.insert("B2", "j*(A1 - A2)");
        bindings
    }
}

fn arithmetic(what: &str) -> ToolkitError {
    ToolkitError::Engine(format!("Cannot compute {} for the series RLC circuit", what))
}

/// Natural response `i(t)` of a source-free series RLC circuit
pub fn source_free_series_rlc(
    resolver: &Resolver,
    resistance: Decimal,
    capacitance: Decimal,
    inductance: Decimal,
    extra: &Bindings,
) -> ToolkitResult<(SeriesRlc, Vec<SolutionEntry>)> {
    let circuit = SeriesRlc::new(resistance, capacitance, inductance)?;
    debug!(
        alpha = %circuit.alpha,
        w0 = %circuit.w0,
        damping = %circuit.damping,
        "series RLC parameters"
    );
    let entries = resolver.solve(&[circuit.equation()], "i", &circuit.bindings(extra))?;
    Ok((circuit, entries))
}
