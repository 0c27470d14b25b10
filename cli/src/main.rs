mod error_formatter;
mod formatter;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use formatter::Formatter;
use grtoolkit::formulas;
use grtoolkit::{parse_binding, solve_system, Bindings, Resolver};
use rust_decimal::Decimal;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(name = "grtoolkit")]
#[command(about = "Solve sets of equations for one variable.")]
#[command(
    long_about = "grtoolkit takes a list of candidate equations, substitutes the values you know,\nand solves each one for the variable you are looking for."
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve each equation for one variable
    ///
    /// Every equation is handled on its own. A malformed equation is reported
    /// in its own block and does not stop the others (use --strict to stop).
    ///
    /// Equations may be written as Eq(lhs, rhs), lhs = rhs, or a bare
    /// expression that equals zero.
    Solve {
        /// Equations to solve
        ///
        /// Examples:
        ///   "Eq(a_tan, r*alpha)"
        ///   "v = d/t"
        #[arg(value_name = "EQUATION")]
        equations: Vec<String>,
        /// Variable to solve for
        #[arg(short = 'f', long)]
        find: String,
        /// Known values (format: name=value)
        ///
        /// Examples: r=2, alpha=3, B1="A1 + A2"
        #[arg(short = 'k', long = "known", value_name = "NAME=VALUE")]
        known: Vec<String>,
        /// Read additional equations from a file, one per line
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
        /// Output one result per line (for piping to other tools)
        #[arg(short = 'r', long, conflicts_with = "json")]
        raw: bool,
        /// Output results as JSON
        #[arg(long)]
        json: bool,
        /// Print nothing but errors and the --unknowns table
        #[arg(short = 'q', long, conflicts_with_all = ["raw", "json"])]
        quiet: bool,
        /// Show a table of the variables each equation still depends on
        #[arg(short = 'u', long)]
        unknowns: bool,
        /// Stop at the first equation that fails to parse
        #[arg(long)]
        strict: bool,
    },
    /// Solve a system of linear equations for all of its variables
    System {
        /// Equations of the system
        #[arg(value_name = "EQUATION", required = true)]
        equations: Vec<String>,
        /// Output the solution as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resistance of a conductor: R = p*l/A
    Resistance {
        /// Variable to solve for (R, p, l or A)
        #[arg(short = 'f', long, default_value = "R")]
        find: String,
        /// Known values (format: name=value)
        #[arg(value_name = "NAME=VALUE")]
        known: Vec<String>,
    },
    /// Natural response of a source-free series RLC circuit
    Rlc {
        /// Resistance in ohms
        #[arg(short = 'R', long)]
        resistance: Decimal,
        /// Capacitance in farads
        #[arg(short = 'C', long)]
        capacitance: Decimal,
        /// Inductance in henries
        #[arg(short = 'L', long)]
        inductance: Decimal,
        /// Further known values such as A1, A2 or t (format: name=value)
        #[arg(value_name = "NAME=VALUE")]
        known: Vec<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "grtoolkit=warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Solve {
            equations,
            find,
            known,
            file,
            raw,
            json,
            quiet,
            unknowns,
            strict,
        } => solve_command(
            equations,
            find,
            known,
            file.as_deref(),
            OutputMode::from_flags(*raw, *json, *quiet),
            *unknowns,
            *strict,
        ),
        Commands::System { equations, json } => system_command(equations, *json),
        Commands::Resistance { find, known } => resistance_command(find, known),
        Commands::Rlc {
            resistance,
            capacitance,
            inductance,
            known,
        } => rlc_command(*resistance, *capacitance, *inductance, known),
    };

    if let Err(e) = result {
        if let Some(toolkit_err) = e.downcast_ref::<grtoolkit::ToolkitError>() {
            eprintln!("{}", error_formatter::format_error(toolkit_err));
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Report,
    Raw,
    Json,
    Quiet,
}

impl OutputMode {
    fn from_flags(raw: bool, json: bool, quiet: bool) -> Self {
        if quiet {
            OutputMode::Quiet
        } else if json {
            OutputMode::Json
        } else if raw {
            OutputMode::Raw
        } else {
            OutputMode::Report
        }
    }
}

fn solve_command(
    equations: &[String],
    find: &str,
    known: &[String],
    file: Option<&Path>,
    mode: OutputMode,
    unknowns: bool,
    strict: bool,
) -> Result<()> {
    let mut all_equations = equations.to_vec();
    if let Some(path) = file {
        all_equations.extend(load_equations(path)?);
    }
    if all_equations.is_empty() {
        eprintln!("Error: No equations given\n");
        eprintln!("Usage: grtoolkit solve [EQUATION]... --find <NAME> [OPTIONS]\n");
        eprintln!("Examples:");
        eprintln!("  grtoolkit solve \"Eq(a_tan, r*alpha)\" -f a_tan -k r=2 -k alpha=3");
        eprintln!("  grtoolkit solve --file equations.txt -f v -k d=100 -k t=8\n");
        eprintln!("For more information:");
        eprintln!("  grtoolkit solve --help");
        std::process::exit(1);
    }

    let bindings = parse_known(known)?;
    let resolver = Resolver::new().with_report(mode == OutputMode::Report);
    let entries = if strict {
        resolver.solve_strict(&all_equations, find, &bindings)?
    } else {
        resolver.solve(&all_equations, find, &bindings)?
    };

    let formatter = Formatter::default();
    match mode {
        OutputMode::Report | OutputMode::Quiet => {}
        OutputMode::Raw => print!("{}", formatter.format_raw(&entries)),
        OutputMode::Json => println!("{}", grtoolkit::report::to_json(&entries)?),
    }
    if unknowns {
        println!("{}", formatter.format_unknowns_table(&entries));
    }
    Ok(())
}

fn system_command(equations: &[String], json: bool) -> Result<()> {
    let resolver = Resolver::new();
    let solution = solve_system(equations, resolver.limits())?;
    if json {
        println!("{}", serde_json::to_string_pretty(&solution)?);
    } else {
        print!("{}", Formatter::default().format_system(&solution));
    }
    Ok(())
}

fn resistance_command(find: &str, known: &[String]) -> Result<()> {
    let bindings = parse_known(known)?;
    let resolver = Resolver::new().with_report(true);
    formulas::resistance(&resolver, find, &bindings)?;
    Ok(())
}

fn rlc_command(
    resistance: Decimal,
    capacitance: Decimal,
    inductance: Decimal,
    known: &[String],
) -> Result<()> {
    let bindings = parse_known(known)?;
    let resolver = Resolver::new();
    let (circuit, entries) =
        formulas::source_free_series_rlc(&resolver, resistance, capacitance, inductance, &bindings)?;

    let formatter = Formatter::default();
    println!("{}", formatter.format_circuit(&circuit));
    print!("{}", grtoolkit::report::render("i", &entries));
    Ok(())
}

/// Parse name=value pairs into bindings
fn parse_known(known: &[String]) -> Result<Bindings> {
    let mut bindings = Bindings::new();
    for pair in known {
        let (name, value) = parse_binding(pair)?;
        bindings.insert(name, value);
    }
    Ok(bindings)
}

/// One equation per line; blank lines and lines starting with '#' are skipped
fn load_equations(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read equations from {}", path.display()))?;
    let equations: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();
    debug!(path = %path.display(), count = equations.len(), "loaded equations");
    Ok(equations)
}
