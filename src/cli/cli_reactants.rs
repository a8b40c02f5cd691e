//! Parsing of the lines typed into the interactive menu.
//!
//! | prompt | line format | example |
//! |--------|-------------|---------|
//! | fill reactant | `<row> <name> <value> <unit> <kind>` | `0 Acetyl CoA 2 mmol/L cofactor` |
//! | set parameter | `<name> = <value>` | `pH = 7.4` |
//! | remove reactant | `<row>` | `1` |
//!
//! Names may contain spaces; the last three tokens are always value, unit and kind.

use crate::form::FormError;
use crate::form::reaction_input::{ReactantRow, ReactionInput};
use regex::Regex;
use std::sync::OnceLock;

fn reactant_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\d+)\s+(.+?)\s+(\S+)\s+(\S+)\s+(\S+)\s*$")
            .expect("reactant line pattern is valid")
    })
}

fn parameter_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*([^=\s][^=]*?)\s*=\s*(.*?)\s*$").expect("parameter line pattern is valid")
    })
}

/// `"0 Glucose 5 mmol/L substrate"` -> row index and typed reactant
pub fn parse_reactant_line(line: &str) -> Result<(usize, ReactantRow), String> {
    let caps = reactant_pattern().captures(line).ok_or_else(|| {
        format!(
            "expected '<row> <name> <value> <unit> <kind>', got '{}'",
            line.trim()
        )
    })?;
    let index: usize = caps[1]
        .parse()
        .map_err(|e| format!("invalid row number: {}", e))?;
    let unit = caps[4].parse().map_err(|e: FormError| e.to_string())?;
    let kind = caps[5].parse().map_err(|e: FormError| e.to_string())?;
    Ok((index, ReactantRow::new(&caps[2], &caps[3], unit, kind)))
}

/// `"pH = 7.4"` -> `("pH", "7.4")`; the value may be empty
pub fn parse_parameter_line(line: &str) -> Option<(String, String)> {
    let caps = parameter_pattern().captures(line)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

pub fn parse_row_index(line: &str) -> Result<usize, String> {
    line.trim()
        .parse()
        .map_err(|_| format!("'{}' is not a row number", line.trim()))
}

/// One line per reactant, used to echo what was read from the form.
/// Typed rows also show the SBO term of the kind and, for molar units with a numeric
/// value, the concentration in mol/L with its Unit Ontology term.
pub fn describe_reactants(input: &ReactionInput) -> Vec<String> {
    match input.rows() {
        Ok(rows) => rows
            .iter()
            .enumerate()
            .map(|(i, row)| describe_row(i, row))
            .collect(),
        Err(_) => (0..input.reactant_name.len())
            .filter_map(|i| input.reactant_cells(i))
            .enumerate()
            .map(|(i, [name, value, unit, kind])| format!("{}: {} {} {} ({})", i, name, value, unit, kind))
            .collect(),
    }
}

fn describe_row(i: usize, row: &ReactantRow) -> String {
    let mut line = format!(
        "{}: {} {} {} ({}, {})",
        i,
        row.name,
        row.concentration_value,
        row.unit,
        row.kind,
        row.kind.sbo_term()
    );
    if let (Ok(Some(molar)), Some(term)) = (row.concentration_mol_per_l(), row.unit.ontology_id()) {
        line.push_str(&format!(" = {:e} mol/L [{}]", molar, term));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::reaction_input::{ConcentrationUnit, ReactantKind};

    #[test]
    fn test_parse_reactant_line() {
        let (index, row) = parse_reactant_line("2 Glucose 5 mmol/L substrate").unwrap();
        assert_eq!(index, 2);
        assert_eq!(
            row,
            ReactantRow::new("Glucose", "5", ConcentrationUnit::MmolPerL, ReactantKind::Substrate)
        );
    }

    #[test]
    fn test_parse_reactant_line_with_spaces_in_name() {
        let (_, row) = parse_reactant_line("  0 Acetyl CoA 2 umol/l Cofactor ").unwrap();
        assert_eq!(row.name, "Acetyl CoA");
        assert_eq!(row.unit, ConcentrationUnit::UmolPerL);
        assert_eq!(row.kind, ReactantKind::Cofactor);
    }

    #[test]
    fn test_parse_reactant_line_errors() {
        assert!(parse_reactant_line("Glucose 5").is_err());
        let err = parse_reactant_line("0 Glucose 5 spoon substrate").unwrap_err();
        assert!(err.contains("spoon"));
        let err = parse_reactant_line("0 Glucose 5 mol/L catalyst").unwrap_err();
        assert!(err.contains("catalyst"));
    }

    #[test]
    fn test_parse_parameter_line() {
        assert_eq!(
            parse_parameter_line("pH = 7.4"),
            Some(("pH".to_string(), "7.4".to_string()))
        );
        assert_eq!(
            parse_parameter_line("Reaction_vessel=96 well plate"),
            Some(("Reaction_vessel".to_string(), "96 well plate".to_string()))
        );
        assert_eq!(
            parse_parameter_line("AA_sequence ="),
            Some(("AA_sequence".to_string(), String::new()))
        );
        assert_eq!(parse_parameter_line("no separator"), None);
        assert_eq!(parse_parameter_line(" = 3"), None);
    }

    #[test]
    fn test_parse_row_index() {
        assert_eq!(parse_row_index(" 3\n"), Ok(3));
        assert!(parse_row_index("-1").is_err());
    }

    #[test]
    fn test_describe_reactants() {
        let mut input = ReactionInput::new();
        input.push_reactant("ATP", "2", "mmol/L", "cofactor");
        input.push_reactant("Glucose", "", "mol/L", "substrate");
        input.push_reactant("BSA", "50", "µg/L", "additive");
        assert_eq!(
            describe_reactants(&input),
            vec![
                "0: ATP 2 mmol/L (cofactor, SBO:0000336) = 2e-3 mol/L [UO:0000063]",
                "1: Glucose  mol/L (substrate, SBO:0000015)",
                "2: BSA 50 µg/L (additive, SBO:0000336)",
            ]
        );
    }

    #[test]
    fn test_describe_reactants_with_untyped_cells() {
        let mut input = ReactionInput::new();
        input.push_reactant("ATP", "2", "spoon", "cofactor");
        assert_eq!(describe_reactants(&input), vec!["0: ATP 2 spoon (cofactor)"]);
    }
}
