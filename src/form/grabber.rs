//! # Parameter Grabber
//!
//! Reads the current form state of a page into a `ReactionInput`.
//! - scalar parameters: every named control of the general information section,
//!   in document order, keyed by its `name` attribute; the reactants container is
//!   skipped even when the template nests it inside that section; radio buttons and
//!   checkboxes count only when `checked`, as in submitted form data
//! - reactants: one entry per reactant row, read from the controls by class;
//!   a row missing a control contributes an empty string so the four columns stay aligned

use super::FormError;
use super::reaction_input::{Parameters, ReactionInput};
use super::row_factory::{self, CONCENTRATION_CLASS, KIND_CLASS, NAME_CLASS, UNIT_CLASS};
use crate::dom::Element;
use crate::page_config::PageConfig;
use log::debug;

/// input types that carry no form data
const NON_DATA_INPUTS: [&str; 4] = ["button", "submit", "reset", "image"];
/// input types that only contribute when checked
const CHECKABLE_INPUTS: [&str; 2] = ["radio", "checkbox"];

pub fn grab_parameters(root: &Element, config: &PageConfig) -> Result<ReactionInput, FormError> {
    let section = root
        .find_by_id(&config.scroll_anchor)
        .ok_or_else(|| FormError::MissingAnchor {
            id: config.scroll_anchor.clone(),
        })?;
    let container = root
        .find_by_id(&config.reactants_container)
        .ok_or_else(|| FormError::MissingAnchor {
            id: config.reactants_container.clone(),
        })?;

    let mut input = ReactionInput::new();
    collect_named_controls(section, &config.reactants_container, &mut input.parameters);

    for row in row_factory::reactant_rows(container) {
        let read = |class: &str| {
            row.find_first_by_class(class)
                .map(Element::value)
                .unwrap_or_default()
        };
        input.push_reactant(
            read(NAME_CLASS).trim(),
            read(CONCENTRATION_CLASS).trim(),
            &read(UNIT_CLASS),
            &read(KIND_CLASS),
        );
    }
    debug!(
        "grabbed {} parameters and {} reactants",
        input.parameters.len(),
        input.reactant_name.len()
    );
    Ok(input)
}

/// `input` (except buttons), `select` and `textarea`
pub fn is_form_control(element: &Element) -> bool {
    match element.tag() {
        "input" => !element
            .attr("type")
            .is_some_and(|kind| NON_DATA_INPUTS.iter().any(|t| t.eq_ignore_ascii_case(kind))),
        "select" | "textarea" => true,
        _ => false,
    }
}

/// Value a control submits; `None` for an unchecked radio button or checkbox.
/// A checked one without a `value` attribute submits `"on"`.
fn submitted_value(control: &Element) -> Option<String> {
    let checkable = control.tag() == "input"
        && control
            .attr("type")
            .is_some_and(|kind| CHECKABLE_INPUTS.iter().any(|t| t.eq_ignore_ascii_case(kind)));
    if !checkable {
        return Some(control.value());
    }
    if !control.has_attribute("checked") {
        return None;
    }
    Some(control.attr("value").unwrap_or("on").to_string())
}

fn collect_named_controls(element: &Element, skip_id: &str, parameters: &mut Parameters) {
    for child in element.child_elements() {
        if child.id() == Some(skip_id) {
            continue;
        }
        if is_form_control(child) {
            if let (Some(name), Some(value)) = (child.attr("name"), submitted_value(child)) {
                parameters.insert(name, value);
            }
        } else {
            collect_named_controls(child, skip_id, parameters);
        }
    }
}
