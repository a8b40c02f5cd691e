//! # DOM Module
//!
//! ## Aim
//! Owned, in-memory model of the part of an HTML document the reaction form works with.
//! Every operation of the form receives the element it mutates as an explicit `&mut Element`,
//! so the tree is never reached through global lookups.
//!
//! ## Main Data Structures and Logic
//! - `Element`: tag name, ordered attributes (names are stored lowercase) and child nodes
//! - `Node`: either an `Element` or a text node
//! - id/class queries (`find_by_id`, `find_all_by_class`, ...) walk the tree depth first in document order
//! - form control helpers (`value`, `set_value`) follow browser semantics for `input`, `select` and `textarea`
//! - `to_html` serialises with escaping (text of `script` and `style` is written as is), `parse_document` builds a tree from HTML using `scraper`
//!
//! ## Usage
//! ```rust
//! use reaction_form::dom::Element;
//!
//! let mut table = Element::new("table").with_attr("id", "table_substrates");
//! table.append_child(Element::new("tr").with_child(Element::new("td").with_text("Glucose")));
//! assert_eq!(
//!     table.to_html(),
//!     r#"<table id="table_substrates"><tr><td>Glucose</td></tr></table>"#
//! );
//! ```

use scraper::{ElementRef, Html};

/// elements that never have children or a closing tag
const VOID_ELEMENTS: [&str; 8] = ["area", "base", "br", "hr", "img", "input", "link", "meta"];
/// elements whose text is written without escaping
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// child of an element: nested element or text
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }
    ////////////////////////////////BUILDER//////////////////////////////////////
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.append_text(text);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.append_child(child);
        self
    }
    ////////////////////////////////ATTRIBUTES///////////////////////////////////
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.attributes
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Sets an attribute, replacing the previous value in place if it exists.
    /// Attribute names are case-insensitive, as in HTML.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, old)) => *old = value.to_string(),
            None => self.attributes.push((name, value.to_string())),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        let position = self.attributes.iter().position(|(key, _)| *key == name)?;
        Some(self.attributes.remove(position).1)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }
    ////////////////////////////////CHILDREN/////////////////////////////////////
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(Node::as_element_mut)
    }

    pub fn append_child(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn append_text(&mut self, text: &str) {
        self.children.push(Node::Text(text.to_string()));
    }

    /// Removes the child node at `index` (counting text nodes too).
    pub fn remove_child(&mut self, index: usize) -> Option<Node> {
        if index < self.children.len() {
            Some(self.children.remove(index))
        } else {
            None
        }
    }

    pub fn clear_children(&mut self) {
        self.children.clear();
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn has_child_nodes(&self) -> bool {
        !self.children.is_empty()
    }

    /// concatenated text of all descendant text nodes
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }
    ////////////////////////////////QUERIES//////////////////////////////////////
    /// Depth-first search for the element with the given id, `self` included.
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.child_elements().find_map(|child| child.find_by_id(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.child_elements_mut()
            .find_map(|child| child.find_by_id_mut(id))
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.find_by_id(id).is_some()
    }

    /// all descendant elements in document order, `self` excluded
    pub fn descendants(&self) -> Vec<&Element> {
        let mut found = Vec::new();
        for child in self.child_elements() {
            found.push(child);
            found.extend(child.descendants());
        }
        found
    }

    pub fn find_all_by_class(&self, class: &str) -> Vec<&Element> {
        self.descendants()
            .into_iter()
            .filter(|element| element.has_class(class))
            .collect()
    }

    pub fn find_all_by_tag(&self, tag: &str) -> Vec<&Element> {
        let tag = tag.to_ascii_lowercase();
        self.descendants()
            .into_iter()
            .filter(|element| element.tag == tag)
            .collect()
    }

    pub fn find_first_by_class(&self, class: &str) -> Option<&Element> {
        self.child_elements().find_map(|child| {
            if child.has_class(class) {
                Some(child)
            } else {
                child.find_first_by_class(class)
            }
        })
    }

    pub fn find_first_by_class_mut(&mut self, class: &str) -> Option<&mut Element> {
        self.child_elements_mut().find_map(|child| {
            if child.has_class(class) {
                Some(child)
            } else {
                child.find_first_by_class_mut(class)
            }
        })
    }
    ////////////////////////////////FORM CONTROLS////////////////////////////////
    /// Current value of a form control.
    /// - `input`: its `value` attribute (empty when absent)
    /// - `select`: value of the selected option, or of the first option when none is marked
    /// - `textarea` and anything else: text content
    pub fn value(&self) -> String {
        match self.tag.as_str() {
            "input" => self.attr("value").unwrap_or_default().to_string(),
            "select" => {
                let options = self.find_all_by_tag("option");
                options
                    .iter()
                    .find(|option| option.has_attribute("selected"))
                    .or_else(|| options.first())
                    .map(|option| option_value(option))
                    .unwrap_or_default()
            }
            _ => self.text_content(),
        }
    }

    /// Sets the current value of a form control. For a `select` the option with
    /// a matching value becomes the only selected one; returns `false` when there
    /// is no such option and leaves the selection unchanged.
    pub fn set_value(&mut self, value: &str) -> bool {
        match self.tag.as_str() {
            "input" => {
                self.set_attribute("value", value);
                true
            }
            "select" => {
                let exists = self
                    .find_all_by_tag("option")
                    .iter()
                    .any(|option| option_value(option) == value);
                if exists {
                    self.select_option(value);
                }
                exists
            }
            _ => {
                self.clear_children();
                self.append_text(value);
                true
            }
        }
    }

    fn select_option(&mut self, value: &str) {
        for child in self.child_elements_mut() {
            if child.tag == "option" {
                if option_value(child) == value {
                    child.set_attribute("selected", "");
                } else {
                    child.remove_attribute("selected");
                }
            } else {
                // optgroup
                child.select_option(value);
            }
        }
    }
    ////////////////////////////////SERIALISATION////////////////////////////////
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        self.write_html(&mut html);
        html
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            if !value.is_empty() {
                out.push_str("=\"");
                out.push_str(&escape_attribute(value));
                out.push('"');
            }
        }
        out.push('>');
        if VOID_ELEMENTS.contains(&self.tag.as_str()) {
            return;
        }
        let raw_text = RAW_TEXT_ELEMENTS.contains(&self.tag.as_str());
        for child in &self.children {
            match child {
                Node::Text(text) if raw_text => out.push_str(text),
                Node::Text(text) => out.push_str(&escape_text(text)),
                Node::Element(element) => element.write_html(out),
            }
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

fn option_value(option: &Element) -> String {
    match option.attr("value") {
        Some(value) => value.to_string(),
        None => option.text_content().trim().to_string(),
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

/// Parses a whole HTML document and returns its `<html>` element.
/// Comments and whitespace-only text between elements are dropped.
pub fn parse_document(html: &str) -> Element {
    let document = Html::parse_document(html);
    convert(document.root_element())
}

fn convert(element: ElementRef<'_>) -> Element {
    let value = element.value();
    let mut converted = Element::new(value.name());
    for (name, attr_value) in value.attrs() {
        converted.set_attribute(name, attr_value);
    }
    for child in element.children() {
        match child.value() {
            scraper::Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    converted.append_child(convert(child_element));
                }
            }
            scraper::Node::Text(text) => {
                if !text.trim().is_empty() {
                    converted.append_text(text);
                }
            }
            _ => {}
        }
    }
    converted
}
