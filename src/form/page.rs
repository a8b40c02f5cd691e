//! # Page Module
//!
//! ## Aim
//! Host page of the reaction form. `Page` owns the element tree and the viewport and
//! resolves the three anchors named in `PageConfig`:
//! - the reactants container rows are appended to,
//! - the results container the summary is rendered into,
//! - the "General information" section, which holds the scalar parameters and is the
//!   scroll target after the summary is cleared.
//!
//! ## Main Data Structures and Logic
//! - `Page::standard` builds the default page skeleton, `Page::from_html` wraps a parsed template
//! - the row factory, renderer and grabber are called with the resolved anchor element;
//!   a missing container is `FormError::MissingAnchor`
//! - `ScrollIntoView` is the scroll request produced by clearing; `Viewport` applies it,
//!   and a missing scroll anchor is logged and skipped
//!
//! ## Usage
//! ```rust
//! use reaction_form::form::page::Page;
//! use reaction_form::form::reaction_input::{ConcentrationUnit, ReactantKind, ReactantRow};
//! use reaction_form::page_config::PageConfig;
//!
//! let mut page = Page::standard(PageConfig::default());
//! page.set_parameter("pH", "7.4")?;
//! page.add_reactant_row()?;
//! page.fill_reactant(0, &ReactantRow::new("Glucose", "5", ConcentrationUnit::MmolPerL, ReactantKind::Substrate))?;
//! let input = page.render_summary()?;
//! assert_eq!(input.reactant_name, vec!["Glucose"]);
//! page.clear_summary()?;
//! assert_eq!(page.scroll_position(), Some("General_information"));
//! # Ok::<(), reaction_form::form::FormError>(())
//! ```

use super::FormError;
use super::grabber::grab_parameters;
use super::reaction_input::{ReactantRow, ReactionInput};
use super::row_factory::{self, CONCENTRATION_CLASS, KIND_CLASS, NAME_CLASS, UNIT_CLASS};
use super::table_renderer;
use crate::dom::{self, Element};
use crate::page_config::PageConfig;
use log::{info, warn};

/// Fields of the "General information" section of the standard page:
/// `(name, label, options)`; fields with options are selectors.
pub const GENERAL_FIELDS: [(&str, &str, &[&str]); 13] = [
    ("Reaction_name", "Reaction name", &[]),
    ("last_name", "Last name", &[]),
    ("given_name", "Given name", &[]),
    ("email-address", "E-mail address", &[]),
    ("Instituion", "Institution", &[]),
    ("Reaction_vessel", "Reaction vessel", &[]),
    ("Volume", "Volume", &[]),
    ("volume_unit", "Volume unit", &["mL", "L", "µL"]),
    ("Enzyme_Name", "Enzyme name", &[]),
    ("Enzyme_concentration", "Enzyme concentration", &[]),
    ("AA_sequence", "Amino acid sequence", &[]),
    ("pH", "pH", &[]),
    ("Temperatur", "Temperature (K)", &[]),
];

/// how the view moves to a scroll target; clearing the summary always scrolls smoothly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
}

/// request to bring the element with id `target` into view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollIntoView {
    pub target: String,
    pub behavior: ScrollBehavior,
}

impl ScrollIntoView {
    pub fn smooth(target: &str) -> Self {
        Self {
            target: target.to_string(),
            behavior: ScrollBehavior::Smooth,
        }
    }
}

/// what part of the page is currently in view
#[derive(Debug, Clone, Default)]
pub struct Viewport {
    position: Option<String>,
    history: Vec<ScrollIntoView>,
}

impl Viewport {
    /// Applies `request` if its target exists in `root`. Returns whether the view moved.
    pub fn scroll_into_view(&mut self, root: &Element, request: ScrollIntoView) -> bool {
        if !root.contains_id(&request.target) {
            warn!("scroll anchor '{}' not found, staying in place", request.target);
            return false;
        }
        self.position = Some(request.target.clone());
        self.history.push(request);
        true
    }

    pub fn position(&self) -> Option<&str> {
        self.position.as_deref()
    }

    pub fn history(&self) -> &[ScrollIntoView] {
        &self.history
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    root: Element,
    config: PageConfig,
    viewport: Viewport,
}

impl Page {
    /// Default skeleton: general information section, reactants container, results container.
    pub fn standard(config: PageConfig) -> Self {
        let head = Element::new("head")
            .with_child(Element::new("meta").with_attr("charset", "utf-8"))
            .with_child(Element::new("title").with_text(&config.title));

        let mut general = Element::new("div")
            .with_attr("id", &config.scroll_anchor)
            .with_attr("class", "twelve columns")
            .with_child(Element::new("h2").with_text("General information"));
        for (name, label, options) in GENERAL_FIELDS {
            general.append_child(general_field(name, label, options));
        }

        let reactants = Element::new("div")
            .with_attr("class", "twelve columns")
            .with_child(Element::new("h2").with_text("Reactants"))
            .with_child(Element::new("div").with_attr("id", &config.reactants_container));

        let results = Element::new("div").with_attr("id", &config.results_container);

        let body = Element::new("body")
            .with_child(general)
            .with_child(reactants)
            .with_child(results);
        let root = Element::new("html")
            .with_attr("lang", "en")
            .with_child(head)
            .with_child(body);

        Self::from_root(root, config)
    }

    /// Wraps a parsed HTML template. Anchors are resolved when an operation needs them.
    pub fn from_html(html: &str, config: PageConfig) -> Self {
        Self::from_root(dom::parse_document(html), config)
    }

    pub fn from_root(root: Element, config: PageConfig) -> Self {
        Self {
            root,
            config,
            viewport: Viewport::default(),
        }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn scroll_position(&self) -> Option<&str> {
        self.viewport.position()
    }

    fn anchor(&self, id: &str) -> Result<&Element, FormError> {
        self.root
            .find_by_id(id)
            .ok_or_else(|| FormError::MissingAnchor { id: id.to_string() })
    }

    fn anchor_mut(&mut self, id: &str) -> Result<&mut Element, FormError> {
        self.root
            .find_by_id_mut(id)
            .ok_or_else(|| FormError::MissingAnchor { id: id.to_string() })
    }

    pub fn reactants_container(&self) -> Result<&Element, FormError> {
        self.anchor(&self.config.reactants_container)
    }

    pub fn results_container(&self) -> Result<&Element, FormError> {
        self.anchor(&self.config.results_container)
    }
    ///////////////////////////////REACTANT ROWS////////////////////////////////
    /// Appends a reactant row; returns the number of rows afterwards.
    pub fn add_reactant_row(&mut self) -> Result<usize, FormError> {
        let id = self.config.reactants_container.clone();
        let container = self.anchor_mut(&id)?;
        row_factory::add_reactant_row(container);
        Ok(row_factory::reactant_row_count(container))
    }

    pub fn remove_reactant_row(&mut self, index: usize) -> Result<(), FormError> {
        let id = self.config.reactants_container.clone();
        row_factory::remove_reactant_row(self.anchor_mut(&id)?, index)?;
        Ok(())
    }

    pub fn reactant_row_count(&self) -> Result<usize, FormError> {
        Ok(row_factory::reactant_row_count(self.reactants_container()?))
    }

    /// Types `row` into the controls of reactant row `index`.
    pub fn fill_reactant(&mut self, index: usize, row: &ReactantRow) -> Result<(), FormError> {
        let id = self.config.reactants_container.clone();
        let element = row_factory::reactant_row_mut(self.anchor_mut(&id)?, index)?;
        set_control(element, NAME_CLASS, &row.name)?;
        set_control(element, CONCENTRATION_CLASS, &row.concentration_value)?;
        if !set_control(element, UNIT_CLASS, row.unit.label())? {
            return Err(FormError::UnknownUnit(row.unit.label().to_string()));
        }
        if !set_control(element, KIND_CLASS, row.kind.label())? {
            return Err(FormError::UnknownKind(row.kind.label().to_string()));
        }
        Ok(())
    }
    ///////////////////////////////PARAMETERS///////////////////////////////////
    /// Sets the general-information field `name`. A field the page does not have is
    /// appended to the section as a text input. Controls inside the reactants container
    /// are never matched.
    pub fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), FormError> {
        let id = self.config.scroll_anchor.clone();
        let skip = self.config.reactants_container.clone();
        let section = self.anchor_mut(&id)?;
        if let Some(control) = find_named_control_mut(section, name, &skip) {
            if !control.set_value(value) {
                warn!("'{}' is not an option of '{}'", value, name);
            }
            return Ok(());
        }
        info!("adding parameter field '{}'", name);
        let mut field = general_field(name, name, &[]);
        if let Some(input) = find_named_control_mut(&mut field, name, &skip) {
            input.set_value(value);
        }
        section.append_child(field);
        Ok(())
    }
    ///////////////////////////////SUMMARY//////////////////////////////////////
    /// Reads the current form state.
    pub fn grab(&self) -> Result<ReactionInput, FormError> {
        grab_parameters(&self.root, &self.config)
    }

    /// Reads the form and renders its summary; returns what was rendered.
    pub fn render_summary(&mut self) -> Result<ReactionInput, FormError> {
        let input = self.grab()?;
        self.render_input(&input)?;
        Ok(input)
    }

    /// Renders an already grabbed input into the results container.
    pub fn render_input(&mut self, input: &ReactionInput) -> Result<(), FormError> {
        let id = self.config.results_container.clone();
        table_renderer::render_summary(self.anchor_mut(&id)?, input)
    }

    /// Empties the results container and scrolls back to the general information section.
    /// A missing scroll anchor only skips the scroll.
    pub fn clear_summary(&mut self) -> Result<(), FormError> {
        let id = self.config.results_container.clone();
        let anchor = self.config.scroll_anchor.clone();
        let request = table_renderer::clear_summary(self.anchor_mut(&id)?, &anchor);
        self.viewport.scroll_into_view(&self.root, request);
        Ok(())
    }
    ///////////////////////////////OUTPUT///////////////////////////////////////
    pub fn to_html(&self) -> String {
        format!("<!DOCTYPE html>\n{}\n", self.root.to_html())
    }
}

fn general_field(name: &str, label: &str, options: &[&str]) -> Element {
    let control = if options.is_empty() {
        Element::new("input")
            .with_attr("type", "text")
            .with_attr("name", name)
    } else {
        let mut select = Element::new("select").with_attr("name", name);
        for (i, option) in options.iter().enumerate() {
            let mut element = Element::new("option").with_attr("value", option);
            if i == 0 {
                element.set_attribute("selected", "");
            }
            select.append_child(element.with_text(option));
        }
        select
    };
    Element::new("div")
        .with_attr("class", "row")
        .with_child(Element::new("label").with_attr("for", name).with_text(label))
        .with_child(control)
}

/// first form control named `name` below `root`, not descending into the element with id `skip_id`
fn find_named_control_mut<'a>(
    root: &'a mut Element,
    name: &str,
    skip_id: &str,
) -> Option<&'a mut Element> {
    root.child_elements_mut().find_map(|child| {
        if child.id() == Some(skip_id) {
            None
        } else if child.attr("name") == Some(name) && super::grabber::is_form_control(child) {
            Some(child)
        } else {
            find_named_control_mut(child, name, skip_id)
        }
    })
}

/// Sets the first control with `class` inside `row`. `Ok(false)` when a selector lacks the option.
fn set_control(row: &mut Element, class: &str, value: &str) -> Result<bool, FormError> {
    match row.find_first_by_class_mut(class) {
        Some(control) => Ok(control.set_value(value)),
        None => Err(FormError::MissingAnchor {
            id: class.to_string(),
        }),
    }
}
