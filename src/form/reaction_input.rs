//! # Reaction Input Module
//!
//! ## Aim
//! Data read from the reaction form: the scalar parameters of the "General information"
//! section and the four index-aligned reactant columns (name, concentration, unit, kind).
//!
//! ## Main Data Structures and Logic
//! - `ConcentrationUnit`, `ReactantKind`: closed enumerations behind the two selectors of a reactant row
//! - `ReactantRow`: typed view of one reactant entry
//! - `Parameters`: string map that keeps the order in which fields were read
//! - `ReactionInput`: what the parameter grabber produces and the table renderer consumes;
//!   its JSON form uses the keys of the page's submission payload
//!   (`Parameters`, `Reactant_name`, `concentration_value`, `unit`, `reactant_kind`)
//! - `ReactionSpecies`: rows grouped into reactants, products and modifiers
//!
//! The only structural invariant is alignment: position `i` of all four reactant columns
//! describes one reactant. `check_alignment` reports a violation as
//! `FormError::MisalignedInput` instead of truncating.

use super::FormError;
use prettytable::{Cell, Row, Table};
use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// units offered by the concentration selector, in selector order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConcentrationUnit {
    #[serde(rename = "mol/L")]
    MolPerL,
    #[serde(rename = "mmol/L")]
    MmolPerL,
    #[serde(rename = "µmol/L")]
    UmolPerL,
    #[serde(rename = "nmol/L")]
    NmolPerL,
    #[serde(rename = "mL/L")]
    MlPerL,
    #[serde(rename = "µg/L")]
    UgPerL,
}

impl ConcentrationUnit {
    pub const ALL: [ConcentrationUnit; 6] = [
        ConcentrationUnit::MolPerL,
        ConcentrationUnit::MmolPerL,
        ConcentrationUnit::UmolPerL,
        ConcentrationUnit::NmolPerL,
        ConcentrationUnit::MlPerL,
        ConcentrationUnit::UgPerL,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ConcentrationUnit::MolPerL => "mol/L",
            ConcentrationUnit::MmolPerL => "mmol/L",
            ConcentrationUnit::UmolPerL => "µmol/L",
            ConcentrationUnit::NmolPerL => "nmol/L",
            ConcentrationUnit::MlPerL => "mL/L",
            ConcentrationUnit::UgPerL => "µg/L",
        }
    }

    /// factor converting a value in this unit to mol/L; `None` for volume and mass fractions
    pub fn molar_factor(&self) -> Option<f64> {
        match self {
            ConcentrationUnit::MolPerL => Some(1.0),
            ConcentrationUnit::MmolPerL => Some(1e-3),
            ConcentrationUnit::UmolPerL => Some(1e-6),
            ConcentrationUnit::NmolPerL => Some(1e-9),
            ConcentrationUnit::MlPerL | ConcentrationUnit::UgPerL => None,
        }
    }

    /// Unit Ontology term of the molar units
    pub fn ontology_id(&self) -> Option<&'static str> {
        match self {
            ConcentrationUnit::MolPerL => Some("UO:0000062"),
            ConcentrationUnit::MmolPerL => Some("UO:0000063"),
            ConcentrationUnit::UmolPerL => Some("UO:0000064"),
            ConcentrationUnit::NmolPerL => Some("UO:0000065"),
            ConcentrationUnit::MlPerL | ConcentrationUnit::UgPerL => None,
        }
    }
}

impl fmt::Display for ConcentrationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn unit_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^\s*([mµμun]?)(mol|g|l)\s*/\s*l\s*$").expect("unit pattern is valid")
    })
}

impl FromStr for ConcentrationUnit {
    type Err = FormError;
    /// accepts the selector labels as well as spellings like "umol/l" or "MMOL/L"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || FormError::UnknownUnit(s.to_string());
        let caps = unit_pattern().captures(s).ok_or_else(unknown)?;
        let prefix = caps[1].to_lowercase();
        let base = caps[2].to_lowercase();
        let unit = match (prefix.as_str(), base.as_str()) {
            ("", "mol") => ConcentrationUnit::MolPerL,
            ("m", "mol") => ConcentrationUnit::MmolPerL,
            ("µ" | "μ" | "u", "mol") => ConcentrationUnit::UmolPerL,
            ("n", "mol") => ConcentrationUnit::NmolPerL,
            ("m", "l") => ConcentrationUnit::MlPerL,
            ("µ" | "μ" | "u", "g") => ConcentrationUnit::UgPerL,
            _ => return Err(unknown()),
        };
        Ok(unit)
    }
}

/// role of a species in the reaction, offered by the kind selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactantKind {
    Substrate,
    Product,
    Cofactor,
    Additive,
}

/// where a species ends up in the reaction record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeciesRole {
    Reactant,
    Product,
    Modifier,
}

impl ReactantKind {
    pub const ALL: [ReactantKind; 4] = [
        ReactantKind::Substrate,
        ReactantKind::Product,
        ReactantKind::Cofactor,
        ReactantKind::Additive,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ReactantKind::Substrate => "substrate",
            ReactantKind::Product => "product",
            ReactantKind::Cofactor => "cofactor",
            ReactantKind::Additive => "additive",
        }
    }

    /// Systems Biology Ontology term; cofactors and additives are both interactors
    pub fn sbo_term(&self) -> &'static str {
        match self {
            ReactantKind::Substrate => "SBO:0000015",
            ReactantKind::Product => "SBO:0000011",
            ReactantKind::Cofactor | ReactantKind::Additive => "SBO:0000336",
        }
    }

    pub fn role(&self) -> SpeciesRole {
        match self {
            ReactantKind::Substrate => SpeciesRole::Reactant,
            ReactantKind::Product => SpeciesRole::Product,
            ReactantKind::Cofactor | ReactantKind::Additive => SpeciesRole::Modifier,
        }
    }
}

impl fmt::Display for ReactantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReactantKind {
    type Err = FormError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ReactantKind::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| FormError::UnknownKind(s.to_string()))
    }
}

/// one reactant entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactantRow {
    pub name: String,
    pub concentration_value: String,
    pub unit: ConcentrationUnit,
    pub kind: ReactantKind,
}

impl ReactantRow {
    pub fn new(name: &str, concentration_value: &str, unit: ConcentrationUnit, kind: ReactantKind) -> Self {
        Self {
            name: name.to_string(),
            concentration_value: concentration_value.to_string(),
            unit,
            kind,
        }
    }

    /// Concentration converted to mol/L. `Ok(None)` when the unit is not molar.
    pub fn concentration_mol_per_l(&self) -> Result<Option<f64>, FormError> {
        let value: f64 = self
            .concentration_value
            .trim()
            .parse()
            .map_err(|_| FormError::InvalidConcentration(self.concentration_value.clone()))?;
        Ok(self.unit.molar_factor().map(|factor| value * factor))
    }
}

/// Scalar form fields. Keeps insertion order; inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters(Vec<(String, String)>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, old)) => Some(std::mem::replace(old, value)),
            None => {
                self.0.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut parameters = Parameters::new();
        for (key, value) in iter {
            parameters.insert(key, value);
        }
        parameters
    }
}

impl Serialize for Parameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for Parameters {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ParametersVisitor;

        impl<'de> Visitor<'de> for ParametersVisitor {
            type Value = Parameters;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of parameter names to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Parameters, A::Error> {
                let mut parameters = Parameters::new();
                while let Some((key, value)) = map.next_entry::<String, String>()? {
                    parameters.insert(key, value);
                }
                Ok(parameters)
            }
        }

        deserializer.deserialize_map(ParametersVisitor)
    }
}

/// everything read from the reaction form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReactionInput {
    #[serde(rename = "Parameters", default)]
    pub parameters: Parameters,
    #[serde(rename = "Reactant_name", default)]
    pub reactant_name: Vec<String>,
    #[serde(default)]
    pub concentration_value: Vec<String>,
    #[serde(default)]
    pub unit: Vec<String>,
    #[serde(rename = "reactant_kind", default)]
    pub kind: Vec<String>,
}

/// reactant rows grouped by their role in the reaction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReactionSpecies {
    pub reactants: Vec<ReactantRow>,
    pub products: Vec<ReactantRow>,
    pub modifiers: Vec<ReactantRow>,
}

impl ReactionInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// appends one reactant to all four columns at once
    pub fn push_reactant(&mut self, name: &str, concentration_value: &str, unit: &str, kind: &str) {
        self.reactant_name.push(name.to_string());
        self.concentration_value.push(concentration_value.to_string());
        self.unit.push(unit.to_string());
        self.kind.push(kind.to_string());
    }

    pub fn push_row(&mut self, row: &ReactantRow) {
        self.push_reactant(&row.name, &row.concentration_value, row.unit.label(), row.kind.label());
    }

    /// Returns the number of reactants if the four columns have the same length.
    pub fn check_alignment(&self) -> Result<usize, FormError> {
        let names = self.reactant_name.len();
        let concentrations = self.concentration_value.len();
        let units = self.unit.len();
        let kinds = self.kind.len();
        if names == concentrations && names == units && names == kinds {
            Ok(names)
        } else {
            Err(FormError::MisalignedInput {
                names,
                concentrations,
                units,
                kinds,
            })
        }
    }

    /// cells of reactant `i`: name, concentration, unit, kind
    pub fn reactant_cells(&self, i: usize) -> Option<[&str; 4]> {
        Some([
            self.reactant_name.get(i)?.as_str(),
            self.concentration_value.get(i)?.as_str(),
            self.unit.get(i)?.as_str(),
            self.kind.get(i)?.as_str(),
        ])
    }

    /// typed rows; fails on misaligned columns or values outside the selector lists
    pub fn rows(&self) -> Result<Vec<ReactantRow>, FormError> {
        let count = self.check_alignment()?;
        (0..count)
            .map(|i| -> Result<ReactantRow, FormError> {
                Ok(ReactantRow {
                    name: self.reactant_name[i].clone(),
                    concentration_value: self.concentration_value[i].clone(),
                    unit: self.unit[i].parse()?,
                    kind: self.kind[i].parse()?,
                })
            })
            .collect()
    }

    pub fn species_by_role(&self) -> Result<ReactionSpecies, FormError> {
        let mut species = ReactionSpecies::default();
        for row in self.rows()? {
            match row.kind.role() {
                SpeciesRole::Reactant => species.reactants.push(row),
                SpeciesRole::Product => species.products.push(row),
                SpeciesRole::Modifier => species.modifiers.push(row),
            }
        }
        Ok(species)
    }

    pub fn to_json(&self) -> Result<String, FormError> {
        self.check_alignment()?;
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// parses a submission payload and checks column alignment
    pub fn from_json(json: &str) -> Result<Self, FormError> {
        let input: ReactionInput = serde_json::from_str(json)?;
        input.check_alignment()?;
        Ok(input)
    }

    /// the two summary tables (parameters, reactants) in terminal form
    pub fn summary_tables(&self) -> Result<(Table, Table), FormError> {
        let count = self.check_alignment()?;
        let mut parameter_table = Table::new();
        parameter_table.set_titles(Row::new(vec![Cell::new("Parameter"), Cell::new("Value")]));
        for (key, value) in self.parameters.iter() {
            parameter_table.add_row(Row::new(vec![Cell::new(key), Cell::new(value)]));
        }

        let mut reactant_table = Table::new();
        reactant_table.set_titles(Row::new(
            super::table_renderer::REACTANT_TABLE_HEADERS
                .iter()
                .map(|header| Cell::new(header))
                .collect(),
        ));
        for i in 0..count {
            if let Some(cells) = self.reactant_cells(i) {
                reactant_table.add_row(Row::new(cells.iter().map(|c| Cell::new(c)).collect()));
            }
        }
        Ok((parameter_table, reactant_table))
    }

    pub fn pretty_print(&self) -> Result<(), FormError> {
        let (parameter_table, reactant_table) = self.summary_tables()?;
        println!("Data to submit");
        parameter_table.printstd();
        println!("Reactands");
        reactant_table.printstd();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unit_parsing_accepts_labels_and_ascii_spellings() {
        for unit in ConcentrationUnit::ALL {
            assert_eq!(unit.label().parse::<ConcentrationUnit>().unwrap(), unit);
        }
        assert_eq!("umol/l".parse::<ConcentrationUnit>().unwrap(), ConcentrationUnit::UmolPerL);
        assert_eq!("MMOL / L".parse::<ConcentrationUnit>().unwrap(), ConcentrationUnit::MmolPerL);
        assert_eq!("ml/l".parse::<ConcentrationUnit>().unwrap(), ConcentrationUnit::MlPerL);
        assert!(matches!(
            "mg/L".parse::<ConcentrationUnit>(),
            Err(FormError::UnknownUnit(u)) if u == "mg/L"
        ));
        assert!("".parse::<ConcentrationUnit>().is_err());
    }

    #[test]
    fn test_kind_parsing_is_case_insensitive() {
        assert_eq!("Substrate".parse::<ReactantKind>().unwrap(), ReactantKind::Substrate);
        assert_eq!(" product ".parse::<ReactantKind>().unwrap(), ReactantKind::Product);
        assert!(matches!("inhibitor".parse::<ReactantKind>(), Err(FormError::UnknownKind(_))));
    }

    #[test]
    fn test_kind_terms_and_roles() {
        assert_eq!(ReactantKind::Substrate.sbo_term(), "SBO:0000015");
        assert_eq!(ReactantKind::Product.sbo_term(), "SBO:0000011");
        assert_eq!(ReactantKind::Additive.sbo_term(), ReactantKind::Cofactor.sbo_term());
        assert_eq!(ReactantKind::Cofactor.role(), SpeciesRole::Modifier);
    }

    #[test]
    fn test_concentration_conversion() {
        let glucose = ReactantRow::new("Glucose", "5", ConcentrationUnit::MmolPerL, ReactantKind::Substrate);
        assert_relative_eq!(glucose.concentration_mol_per_l().unwrap().unwrap(), 5e-3, epsilon = 1e-15);

        let nadh = ReactantRow::new("NADH", " 250 ", ConcentrationUnit::NmolPerL, ReactantKind::Cofactor);
        assert_relative_eq!(nadh.concentration_mol_per_l().unwrap().unwrap(), 2.5e-7, epsilon = 1e-18);

        let dmso = ReactantRow::new("DMSO", "10", ConcentrationUnit::MlPerL, ReactantKind::Additive);
        assert!(dmso.concentration_mol_per_l().unwrap().is_none());

        let broken = ReactantRow::new("X", "five", ConcentrationUnit::MolPerL, ReactantKind::Product);
        assert!(matches!(
            broken.concentration_mol_per_l(),
            Err(FormError::InvalidConcentration(v)) if v == "five"
        ));
    }

    #[test]
    fn test_parameters_keep_insertion_order() {
        let mut parameters: Parameters = [("temperature", "37"), ("pH", "7.4")].into_iter().collect();
        assert_eq!(parameters.insert("temperature", "25"), Some("37".to_string()));
        assert_eq!(parameters.keys().collect::<Vec<_>>(), vec!["temperature", "pH"]);
        assert_eq!(parameters.get("temperature"), Some("25"));
        assert_eq!(parameters.get("Volume"), None);
    }

    #[test]
    fn test_alignment_check_reports_lengths() {
        let mut input = ReactionInput::new();
        input.push_reactant("Glucose", "5", "mmol/L", "substrate");
        assert_eq!(input.check_alignment().unwrap(), 1);
        input.reactant_name.push("ATP".to_string());
        input.reactant_name.push("ADP".to_string());
        match input.check_alignment() {
            Err(FormError::MisalignedInput { names, concentrations, units, kinds }) => {
                assert_eq!((names, concentrations, units, kinds), (3, 1, 1, 1));
            }
            other => panic!("expected misalignment, got {:?}", other),
        }
        assert!(input.rows().is_err());
    }

    #[test]
    fn test_species_by_role_groups_rows() {
        let mut input = ReactionInput::new();
        input.push_reactant("Pyruvate", "1", "mmol/L", "substrate");
        input.push_reactant("Lactate", "0", "mmol/L", "product");
        input.push_reactant("NADH", "200", "µmol/L", "cofactor");
        input.push_reactant("BSA", "50", "µg/L", "additive");
        let species = input.species_by_role().unwrap();
        assert_eq!(species.reactants.len(), 1);
        assert_eq!(species.products[0].name, "Lactate");
        let modifiers: Vec<_> = species.modifiers.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(modifiers, vec!["NADH", "BSA"]);
    }

    #[test]
    fn test_rows_reject_free_text_units() {
        let mut input = ReactionInput::new();
        input.push_reactant("Glucose", "5", "spoonful", "substrate");
        assert!(matches!(input.rows(), Err(FormError::UnknownUnit(_))));
    }

    #[test]
    fn test_json_uses_submission_keys_and_order() {
        let mut input = ReactionInput::new();
        input.parameters.insert("Reaction_name", "LDH");
        input.parameters.insert("pH", "7.4");
        input.push_reactant("Pyruvate", "1", "mmol/L", "substrate");
        let json = input.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["Parameters"]["pH"], "7.4");
        assert_eq!(value["Reactant_name"][0], "Pyruvate");
        assert_eq!(value["reactant_kind"][0], "substrate");

        let back = ReactionInput::from_json(&json).unwrap();
        assert_eq!(back.parameters.keys().collect::<Vec<_>>(), vec!["Reaction_name", "pH"]);
        assert_eq!(back, input);
    }

    #[test]
    fn test_from_json_rejects_misaligned_payload() {
        let json = r#"{"Parameters": {}, "Reactant_name": ["A", "B"], "concentration_value": ["1"],
                       "unit": ["mol/L"], "reactant_kind": ["product"]}"#;
        assert!(matches!(
            ReactionInput::from_json(json),
            Err(FormError::MisalignedInput { names: 2, .. })
        ));
        assert!(matches!(ReactionInput::from_json("[1, 2]"), Err(FormError::Json(_))));
    }

    #[test]
    fn test_summary_tables_row_counts() {
        let mut input = ReactionInput::new();
        input.parameters.insert("pH", "7.4");
        input.parameters.insert("temperature", "37");
        input.push_reactant("Glucose", "5", "mmol/L", "substrate");
        let (parameters, reactants) = input.summary_tables().unwrap();
        assert_eq!(parameters.len(), 2);
        assert_eq!(reactants.len(), 1);
    }
}
