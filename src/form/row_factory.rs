//! # Row Factory
//!
//! Appends reactant entry rows to the reactants container. A row is a `<div>` holding
//! four controls, each wrapped in a column `<div>`, followed by a delete control:
//!
//! | control | element | class |
//! |---------|---------|-------|
//! | reactant name | `<input type="text" name="Substance_<n>">` | `Substrate_name` |
//! | concentration value | `<input type="text">` | `concentration_value` |
//! | concentration unit | `<select>`, 6 units, first selected | `concentration_unit` |
//! | reactant kind | `<select>`, 4 kinds, first selected | `reactant_kind` |
//! | delete control | `<div><h3>-</h3></div>` | `delete_button` |
//!
//! The delete control is only drawn. Removing a row is the separate
//! `remove_reactant_row` operation.

use super::FormError;
use super::reaction_input::{ConcentrationUnit, ReactantKind};
use crate::dom::{Element, Node};
use log::debug;

pub const ROW_CLASS: &str = "reactant_row";
pub const NAME_CLASS: &str = "Substrate_name";
pub const CONCENTRATION_CLASS: &str = "concentration_value";
pub const UNIT_CLASS: &str = "concentration_unit";
pub const KIND_CLASS: &str = "reactant_kind";
pub const DELETE_CLASS: &str = "delete_button";
/// prefix of the `name` attribute of the reactant name input
pub const NAME_PREFIX: &str = "Substance_";

/// Appends one new reactant row to `container`.
pub fn add_reactant_row(container: &mut Element) {
    let index = reactant_row_count(container);
    container.append_child(build_reactant_row(index));
    debug!("reactant row {} appended", index);
}

/// the row `add_reactant_row` appends at position `index`
pub fn build_reactant_row(index: usize) -> Element {
    let name = Element::new("input")
        .with_attr("name", &format!("{}{}", NAME_PREFIX, index))
        .with_attr("type", "text")
        .with_attr("class", NAME_CLASS)
        .with_attr("kind", "Reactant");
    let concentration = Element::new("input")
        .with_attr("name", "concentration_value")
        .with_attr("type", "text")
        .with_attr("class", CONCENTRATION_CLASS);
    let unit = selector(
        "concentration_unit",
        UNIT_CLASS,
        ConcentrationUnit::ALL.iter().map(|unit| unit.label()),
    );
    let kind = selector(
        "reactant_kind",
        KIND_CLASS,
        ReactantKind::ALL.iter().map(|kind| kind.label()),
    );
    let delete = Element::new("div")
        .with_attr("class", DELETE_CLASS)
        .with_child(Element::new("h3").with_text("-"));

    Element::new("div")
        .with_attr("class", &format!("twelve columns {}", ROW_CLASS))
        .with_child(column("three columns", name))
        .with_child(column("three columns", concentration))
        .with_child(column("two columns", unit))
        .with_child(column("two columns", kind))
        .with_child(delete)
}

fn column(class: &str, control: Element) -> Element {
    Element::new("div").with_attr("class", class).with_child(control)
}

/// `<select>` with one option per label; the first option is selected
fn selector<'a>(name: &str, class: &str, labels: impl Iterator<Item = &'a str>) -> Element {
    let mut select = Element::new("select")
        .with_attr("name", name)
        .with_attr("class", class);
    for (i, label) in labels.enumerate() {
        let mut option = Element::new("option").with_attr("value", label);
        if i == 0 {
            option.set_attribute("selected", "");
        }
        select.append_child(option.with_text(label));
    }
    select
}

pub fn reactant_rows(container: &Element) -> Vec<&Element> {
    container
        .child_elements()
        .filter(|child| child.has_class(ROW_CLASS))
        .collect()
}

pub fn reactant_row_count(container: &Element) -> usize {
    reactant_rows(container).len()
}

/// Mutable access to the row at `index`.
pub fn reactant_row_mut(container: &mut Element, index: usize) -> Result<&mut Element, FormError> {
    let len = reactant_row_count(container);
    container
        .child_elements_mut()
        .filter(|child| child.has_class(ROW_CLASS))
        .nth(index)
        .ok_or(FormError::RowOutOfRange { index, len })
}

/// Removes the row at `index` and renumbers the `Substance_<n>` names of the rows after it.
pub fn remove_reactant_row(container: &mut Element, index: usize) -> Result<Element, FormError> {
    let len = reactant_row_count(container);
    let position = container
        .children()
        .iter()
        .enumerate()
        .filter(|(_, node)| matches!(node, Node::Element(el) if el.has_class(ROW_CLASS)))
        .nth(index)
        .map(|(position, _)| position)
        .ok_or(FormError::RowOutOfRange { index, len })?;

    let removed = match container.remove_child(position) {
        Some(Node::Element(row)) => row,
        _ => return Err(FormError::RowOutOfRange { index, len }),
    };

    let rows = container
        .child_elements_mut()
        .filter(|child| child.has_class(ROW_CLASS));
    for (n, row) in rows.enumerate() {
        if let Some(name) = row.find_first_by_class_mut(NAME_CLASS) {
            name.set_attribute("name", &format!("{}{}", NAME_PREFIX, n));
        }
    }
    debug!("reactant row {} removed, {} left", index, len - 1);
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option_labels(select: &Element) -> Vec<String> {
        select
            .find_all_by_tag("option")
            .iter()
            .map(|option| option.text_content())
            .collect()
    }

    #[test]
    fn test_zero_calls_leave_container_empty() {
        let container = Element::new("div").with_attr("id", "Reactants");
        assert_eq!(reactant_row_count(&container), 0);
        assert!(!container.has_child_nodes());
    }

    #[test]
    fn test_n_calls_give_n_rows() {
        for n in [1, 2, 5] {
            let mut container = Element::new("div");
            for _ in 0..n {
                add_reactant_row(&mut container);
            }
            assert_eq!(reactant_row_count(&container), n);
            assert_eq!(container.child_count(), n);
            for (i, row) in reactant_rows(&container).into_iter().enumerate() {
                let name = row.find_first_by_class(NAME_CLASS).unwrap();
                assert_eq!(name.attr("name"), Some(format!("Substance_{}", i).as_str()));
                for (class, count, first) in [(UNIT_CLASS, 6, "mol/L"), (KIND_CLASS, 4, "substrate")] {
                    let select = row.find_first_by_class(class).unwrap();
                    let options = select.find_all_by_tag("option");
                    assert_eq!(options.len(), count);
                    let selected = options.iter().filter(|o| o.has_attribute("selected")).count();
                    assert_eq!(selected, 1);
                    assert!(options[0].has_attribute("selected"));
                    assert_eq!(select.value(), first);
                }
            }
        }
    }

    #[test]
    fn test_row_contents() {
        let row = build_reactant_row(0);
        assert_eq!(row.find_all_by_class(NAME_CLASS).len(), 1);
        assert_eq!(row.find_all_by_class(CONCENTRATION_CLASS).len(), 1);
        assert_eq!(row.find_all_by_class(DELETE_CLASS).len(), 1);

        let unit = row.find_first_by_class(UNIT_CLASS).unwrap();
        assert_eq!(unit.tag(), "select");
        assert_eq!(
            option_labels(unit),
            vec!["mol/L", "mmol/L", "µmol/L", "nmol/L", "mL/L", "µg/L"]
        );
        assert_eq!(unit.value(), "mol/L");

        let kind = row.find_first_by_class(KIND_CLASS).unwrap();
        assert_eq!(
            option_labels(kind),
            vec!["substrate", "product", "cofactor", "additive"]
        );
        assert_eq!(kind.value(), "substrate");
        let selected = kind
            .find_all_by_tag("option")
            .into_iter()
            .filter(|o| o.has_attribute("selected"))
            .count();
        assert_eq!(selected, 1);
    }

    #[test]
    fn test_rows_are_independent() {
        let mut container = Element::new("div");
        add_reactant_row(&mut container);
        add_reactant_row(&mut container);
        reactant_row_mut(&mut container, 1)
            .unwrap()
            .find_first_by_class_mut(NAME_CLASS)
            .unwrap()
            .set_value("ATP");
        let rows = reactant_rows(&container);
        assert_eq!(rows[0].find_first_by_class(NAME_CLASS).unwrap().value(), "");
        assert_eq!(rows[1].find_first_by_class(NAME_CLASS).unwrap().value(), "ATP");
        assert_eq!(
            rows[1].find_first_by_class(NAME_CLASS).unwrap().attr("name"),
            Some("Substance_1")
        );
    }

    #[test]
    fn test_remove_row_renumbers_names() {
        let mut container = Element::new("div").with_child(Element::new("h2").with_text("Reactants"));
        for _ in 0..3 {
            add_reactant_row(&mut container);
        }
        let removed = remove_reactant_row(&mut container, 0).unwrap();
        assert!(removed.has_class(ROW_CLASS));
        assert_eq!(reactant_row_count(&container), 2);
        assert_eq!(container.child_count(), 3);
        let names: Vec<_> = reactant_rows(&container)
            .iter()
            .map(|row| row.find_first_by_class(NAME_CLASS).unwrap().attr("name").unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Substance_0", "Substance_1"]);
    }

    #[test]
    fn test_remove_row_out_of_range() {
        let mut container = Element::new("div");
        add_reactant_row(&mut container);
        assert!(matches!(
            remove_reactant_row(&mut container, 1),
            Err(FormError::RowOutOfRange { index: 1, len: 1 })
        ));
        assert_eq!(reactant_row_count(&container), 1);
    }
}
