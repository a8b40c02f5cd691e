//! # Table Renderer
//!
//! Builds the results view shown before the reaction data is sent: the parameter
//! table, the reactant table and the two action buttons. `render_summary` always
//! clears the container first, so repeated rendering never accumulates summaries.
//! `clear_summary` empties the container and asks for a scroll back to the input section.

use super::FormError;
use super::page::ScrollIntoView;
use super::reaction_input::{Parameters, ReactionInput};
use crate::dom::Element;
use log::{debug, info};

pub const RESULTS_CLASS: &str = "eight columns";
pub const PARAMETERS_HEADING: &str = "Data to submit";
pub const REACTANTS_HEADING: &str = "Reactands";
pub const REACTANT_TABLE_ID: &str = "table_substrates";
pub const REACTANT_TABLE_HEADERS: [&str; 4] = [
    "Reactant name",
    "concentration value",
    "concentration unit",
    "reactant kind",
];
pub const CORRECT_BUTTON_ID: &str = "remove_button";
pub const CORRECT_BUTTON_LABEL: &str = "Correct Parameters";
pub const SEND_BUTTON_ID: &str = "submit_parameters";
pub const SEND_BUTTON_LABEL: &str = "Send parameters";

/// Replaces the content of `container` with the summary of `input`.
///
/// Misaligned reactant columns are rejected with `FormError::MisalignedInput`
/// before anything is touched.
pub fn render_summary(container: &mut Element, input: &ReactionInput) -> Result<(), FormError> {
    let reactant_count = input.check_alignment()?;

    container.clear_children();
    container.set_attribute("class", RESULTS_CLASS);

    container.append_child(Element::new("h2").with_text(PARAMETERS_HEADING));
    container.append_child(parameter_table(&input.parameters));
    container.append_child(Element::new("h2").with_text(REACTANTS_HEADING));
    container.append_child(reactant_table(input, reactant_count));
    container.append_child(button(CORRECT_BUTTON_ID, CORRECT_BUTTON_LABEL));
    container.append_child(button(SEND_BUTTON_ID, SEND_BUTTON_LABEL));

    info!(
        "summary rendered: {} parameters, {} reactants",
        input.parameters.len(),
        reactant_count
    );
    Ok(())
}

/// two columns: parameter name, value
fn parameter_table(parameters: &Parameters) -> Element {
    let mut body = Element::new("tbody");
    for (key, value) in parameters.iter() {
        body.append_child(
            Element::new("tr")
                .with_child(Element::new("th").with_text(key))
                .with_child(Element::new("td").with_text(value)),
        );
    }
    Element::new("table").with_child(body)
}

fn reactant_table(input: &ReactionInput, reactant_count: usize) -> Element {
    let mut head_row = Element::new("tr");
    for header in REACTANT_TABLE_HEADERS {
        head_row.append_child(Element::new("th").with_text(header));
    }

    let mut body = Element::new("tbody");
    for i in 0..reactant_count {
        let mut row = Element::new("tr");
        if let Some(cells) = input.reactant_cells(i) {
            for cell in cells {
                row.append_child(Element::new("td").with_text(cell));
            }
        }
        body.append_child(row);
    }

    Element::new("table")
        .with_attr("id", REACTANT_TABLE_ID)
        .with_child(Element::new("thead").with_child(head_row))
        .with_child(body)
}

fn button(id: &str, label: &str) -> Element {
    Element::new("button").with_attr("id", id).with_text(label)
}

/// Removes everything from `container` and returns the smooth scroll to `anchor_id`
/// that should follow. Applying the scroll is up to the caller.
pub fn clear_summary(container: &mut Element, anchor_id: &str) -> ScrollIntoView {
    let removed = container.child_count();
    container.clear_children();
    debug!("summary cleared, {} nodes removed", removed);
    ScrollIntoView::smooth(anchor_id)
}
