//! A small typed document model standing in for the browser DOM.
//!
//! Only what the record form needs is modelled: inputs and containers that
//! are addressable by id, plus the headings, labels and line breaks the
//! generator places inside a container. Everything serializes to the same
//! markup a browser would hold after the equivalent `innerHTML` writes.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Text,
    Number,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Input {
    pub id: String,
    pub name: String,
    pub input_type: InputType,
    pub required: bool,
    pub step: Option<String>,
    pub value: Option<String>,
}

impl Input {
    /// Creates an input whose `name` matches its `id`.
    pub fn new(id: impl Into<String>, input_type: InputType) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            input_type,
            required: false,
            step: None,
            value: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.step = Some(step.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// The current value, empty when the input was never filled.
    pub fn value(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push_str(&format!(
            r#"<input type="{}" id="{}" name="{}""#,
            self.input_type.as_str(),
            escape_html(&self.id),
            escape_html(&self.name)
        ));
        if let Some(value) = self.value.as_deref() {
            out.push_str(&format!(r#" value="{}""#, escape_html(value)));
        }
        if self.required {
            out.push_str(" required");
        }
        if let Some(step) = self.step.as_deref() {
            out.push_str(&format!(r#" step="{}""#, escape_html(step)));
        }
        out.push('>');
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Heading { level: u8, text: String },
    Label { for_id: String, text: String },
    Input(Input),
    LineBreak,
}

impl Node {
    fn write_html(&self, out: &mut String) {
        match self {
            Self::Heading { level, text } => {
                out.push_str(&format!("<h{level}>{}</h{level}>", escape_html(text)));
            }
            Self::Label { for_id, text } => {
                out.push_str(&format!(
                    r#"<label for="{}">{}</label>"#,
                    escape_html(for_id),
                    escape_html(text)
                ));
            }
            Self::Input(input) => input.write_html(out),
            Self::LineBreak => out.push_str("<br>"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Container {
    pub id: String,
    children: Vec<Node>,
}

impl Container {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            children: Vec::new(),
        }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    pub fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    pub fn inputs(&self) -> impl Iterator<Item = &Input> {
        self.children.iter().filter_map(|n| match n {
            Node::Input(input) => Some(input),
            _ => None,
        })
    }

    pub fn inputs_mut(&mut self) -> impl Iterator<Item = &mut Input> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Input(input) => Some(input),
            _ => None,
        })
    }

    /// Text of every heading, in document order.
    pub fn headings(&self) -> Vec<&str> {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Heading { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            node.write_html(&mut out);
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Element {
    Input(Input),
    Container(Container),
}

impl Element {
    pub fn id(&self) -> &str {
        match self {
            Self::Input(input) => &input.id,
            Self::Container(container) => &container.id,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("no element with id '{id}'")]
    MissingElement { id: String },

    #[error("an element with id '{id}' already exists")]
    DuplicateId { id: String },

    #[error("element '{id}' is not an input")]
    NotAnInput { id: String },

    #[error("element '{id}' is not a container")]
    NotAContainer { id: String },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// The document the record generator expects: a numeric
    /// `records_count` input and an empty `records` container.
    pub fn records_form() -> Self {
        let mut doc = Self::new();
        doc.elements.push(Element::Input(
            Input::new(crate::form::COUNT_FIELD_ID, InputType::Number)
                .required()
                .with_value("0"),
        ));
        doc.elements
            .push(Element::Container(Container::new(crate::form::CONTAINER_ID)));
        doc
    }

    /// Adds a top-level element. Fails when its id, or the id of any input
    /// it holds, is already taken.
    pub fn insert(&mut self, element: Element) -> Result<(), DomError> {
        let mut taken: HashSet<&str> = self.ids().into_iter().collect();
        let mut incoming = vec![element.id()];
        if let Element::Container(container) = &element {
            incoming.extend(container.inputs().map(|i| i.id.as_str()));
        }
        for id in incoming {
            if !taken.insert(id) {
                return Err(DomError::DuplicateId { id: id.to_string() });
            }
        }
        self.elements.push(element);
        Ok(())
    }

    /// Every id in the document, nested inputs included, in document order.
    pub fn ids(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for element in &self.elements {
            out.push(element.id());
            if let Element::Container(container) = element {
                out.extend(container.inputs().map(|i| i.id.as_str()));
            }
        }
        out
    }

    /// Like [`Document::ids`], minus the inputs nested in `container_id`.
    pub fn ids_outside(&self, container_id: &str) -> Vec<&str> {
        let mut out = Vec::new();
        for element in &self.elements {
            out.push(element.id());
            match element {
                Element::Container(container) if container.id != container_id => {
                    out.extend(container.inputs().map(|i| i.id.as_str()));
                }
                _ => {}
            }
        }
        out
    }

    pub fn input(&self, id: &str) -> Result<&Input, DomError> {
        for element in &self.elements {
            match element {
                Element::Input(input) if input.id == id => return Ok(input),
                Element::Container(container) if container.id == id => {
                    return Err(DomError::NotAnInput { id: id.to_string() })
                }
                Element::Container(container) => {
                    if let Some(input) = container.inputs().find(|i| i.id == id) {
                        return Ok(input);
                    }
                }
                _ => {}
            }
        }
        Err(DomError::MissingElement { id: id.to_string() })
    }

    pub fn input_mut(&mut self, id: &str) -> Result<&mut Input, DomError> {
        for element in self.elements.iter_mut() {
            match element {
                Element::Input(input) if input.id == id => return Ok(input),
                Element::Container(container) if container.id == id => {
                    return Err(DomError::NotAnInput { id: id.to_string() })
                }
                Element::Container(container) => {
                    if let Some(input) = container.inputs_mut().find(|i| i.id == id) {
                        return Ok(input);
                    }
                }
                _ => {}
            }
        }
        Err(DomError::MissingElement { id: id.to_string() })
    }

    pub fn container(&self, id: &str) -> Result<&Container, DomError> {
        match self.elements.iter().find(|e| e.id() == id) {
            Some(Element::Container(container)) => Ok(container),
            Some(Element::Input(_)) => Err(DomError::NotAContainer { id: id.to_string() }),
            None => Err(DomError::MissingElement { id: id.to_string() }),
        }
    }

    pub fn container_mut(&mut self, id: &str) -> Result<&mut Container, DomError> {
        match self.elements.iter_mut().find(|e| e.id() == id) {
            Some(Element::Container(container)) => Ok(container),
            Some(Element::Input(_)) => Err(DomError::NotAContainer { id: id.to_string() }),
            None => Err(DomError::MissingElement { id: id.to_string() }),
        }
    }

    pub fn value(&self, id: &str) -> Result<&str, DomError> {
        Ok(self.input(id)?.value())
    }

    pub fn set_value(&mut self, id: &str, value: impl Into<String>) -> Result<(), DomError> {
        self.input_mut(id)?.value = Some(value.into());
        Ok(())
    }

    pub fn inner_html(&self, container_id: &str) -> Result<String, DomError> {
        Ok(self.container(container_id)?.inner_html())
    }

    /// Name/value pairs of every named input, as a form submission would
    /// carry them. Unfilled inputs submit an empty string.
    pub fn form_data(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for element in &self.elements {
            match element {
                Element::Input(input) => out.push((input.name.clone(), input.value().to_string())),
                Element::Container(container) => out.extend(
                    container
                        .inputs()
                        .map(|i| (i.name.clone(), i.value().to_string())),
                ),
            }
        }
        out
    }
}

pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
