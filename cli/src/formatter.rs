use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Row, Table};
use grtoolkit::formulas::SeriesRlc;
use grtoolkit::{SolutionEntry, SystemSolution};

pub struct Formatter {}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self {}
    }

    /// One line per equation, in input order
    pub fn format_raw(&self, entries: &[SolutionEntry]) -> String {
        let mut output = String::new();
        for entry in entries {
            output.push_str(&format!("{}\n", entry.resolution));
        }
        output
    }

    pub fn format_unknowns_table(&self, entries: &[SolutionEntry]) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(Row::from(vec![
            Cell::new("#").set_alignment(CellAlignment::Right),
            Cell::new("Equation").set_alignment(CellAlignment::Left),
            Cell::new("Unknowns").set_alignment(CellAlignment::Left),
        ]));

        for entry in entries {
            let unknowns = match entry.unknowns() {
                Some(names) if names.is_empty() => "-".to_string(),
                Some(names) => names.iter().cloned().collect::<Vec<_>>().join(", "),
                None => "?".to_string(),
            };
            table.add_row(Row::from(vec![
                Cell::new(entry.index).set_alignment(CellAlignment::Right),
                Cell::new(&entry.equation),
                Cell::new(unknowns),
            ]));
        }

        table.to_string()
    }

    pub fn format_system(&self, solution: &SystemSolution) -> String {
        match solution {
            SystemSolution::Unique { values } => {
                let mut table = Table::new();
                table.load_preset(UTF8_FULL);
                table.set_header(Row::from(vec![
                    Cell::new("Variable").set_alignment(CellAlignment::Left),
                    Cell::new("Value").set_alignment(CellAlignment::Right),
                ]));
                for (name, value) in values {
                    table.add_row(Row::from(vec![
                        Cell::new(name),
                        Cell::new(value).set_alignment(CellAlignment::Right),
                    ]));
                }
                format!("{}\n", table)
            }
            SystemSolution::Infinite { rank, variables } => format!(
                "Infinitely many solutions: rank {} for {} variables ({})\n",
                rank,
                variables.len(),
                variables.join(", ")
            ),
            SystemSolution::Inconsistent => "No solution: the equations contradict each other\n".to_string(),
        }
    }

    pub fn format_circuit(&self, circuit: &SeriesRlc) -> String {
        let optional = |value: Option<rust_decimal::Decimal>| {
            value.map(|v| v.to_string()).unwrap_or_else(|| "complex".to_string())
        };

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(Row::from(vec![
            Cell::new("Quantity").set_alignment(CellAlignment::Left),
            Cell::new("Value").set_alignment(CellAlignment::Left),
        ]));
        table.add_row(Row::from(vec!["alpha".to_string(), circuit.alpha.to_string()]));
        table.add_row(Row::from(vec!["w0".to_string(), circuit.w0.to_string()]));
        table.add_row(Row::from(vec!["s1".to_string(), optional(circuit.s1)]));
        table.add_row(Row::from(vec!["s2".to_string(), optional(circuit.s2)]));
        table.add_row(Row::from(vec!["damping".to_string(), circuit.damping.to_string()]));
        table.add_row(Row::from(vec!["i".to_string(), circuit.equation().to_string()]));

        table.to_string()
    }
}
