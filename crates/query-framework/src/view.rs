//! # Views
//!
//! A [`View`] is the rendered output of a component: a flat, ordered list of [`Node`]s.
//! The query helpers (`field_value`, `first_image`, `alerts`) answer questions such as
//! "what is in the Brand field?" without walking a tree.

use std::fmt::{self, Display};

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Heading(String),
    Text(String),
    Field { label: String, value: String },
    Image { src: String, alt: String },
    Link { href: String, label: String },
    Button { label: String, enabled: bool },
    Spinner(String),
    Alert(String),
}

impl Node {
    /// The user-visible text of the node.
    pub fn text(&self) -> String {
        match self {
            Self::Heading(s) | Self::Text(s) | Self::Spinner(s) | Self::Alert(s) => s.clone(),
            Self::Field { label, value } => format!("{label}: {value}"),
            Self::Image { alt, .. } => alt.clone(),
            Self::Link { label, .. } | Self::Button { label, .. } => label.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct View {
    nodes: Vec<Node>,
}

impl View {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn push(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    #[must_use]
    pub fn heading(self, text: impl Into<String>) -> Self {
        self.push(Node::Heading(text.into()))
    }

    #[must_use]
    pub fn text(self, text: impl Into<String>) -> Self {
        self.push(Node::Text(text.into()))
    }

    #[must_use]
    pub fn field(self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(Node::Field {
            label: label.into(),
            value: value.into(),
        })
    }

    #[must_use]
    pub fn image(self, src: impl Into<String>, alt: impl Into<String>) -> Self {
        self.push(Node::Image {
            src: src.into(),
            alt: alt.into(),
        })
    }

    #[must_use]
    pub fn link(self, href: impl Into<String>, label: impl Into<String>) -> Self {
        self.push(Node::Link {
            href: href.into(),
            label: label.into(),
        })
    }

    #[must_use]
    pub fn button(self, label: impl Into<String>, enabled: bool) -> Self {
        self.push(Node::Button {
            label: label.into(),
            enabled,
        })
    }

    #[must_use]
    pub fn spinner(self, text: impl Into<String>) -> Self {
        self.push(Node::Spinner(text.into()))
    }

    #[must_use]
    pub fn alert(self, text: impl Into<String>) -> Self {
        self.push(Node::Alert(text.into()))
    }

    /// Appends all nodes of `other`.
    #[must_use]
    pub fn append(mut self, other: View) -> Self {
        self.nodes.extend(other.nodes);
        self
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.nodes.iter().any(|node| node.text().contains(needle))
    }

    /// Value of the first field with the given label.
    pub fn field_value(&self, label: &str) -> Option<&str> {
        self.nodes.iter().find_map(|node| match node {
            Node::Field { label: l, value } if l == label => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn first_image(&self) -> Option<&str> {
        self.nodes.iter().find_map(|node| match node {
            Node::Image { src, .. } => Some(src.as_str()),
            _ => None,
        })
    }

    pub fn has_spinner(&self) -> bool {
        self.nodes.iter().any(|node| matches!(node, Node::Spinner(_)))
    }

    pub fn alerts(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Alert(text) => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            match node {
                Node::Heading(s) => writeln!(f, "# {s}")?,
                Node::Text(s) => writeln!(f, "{s}")?,
                Node::Field { label, value } => writeln!(f, "{label}: {value}")?,
                Node::Image { src, alt } => writeln!(f, "[image {alt}] {src}")?,
                Node::Link { href, label } => writeln!(f, "[{label}]({href})")?,
                Node::Button { label, enabled } => {
                    let state = if *enabled { "" } else { " (disabled)" };
                    writeln!(f, "<{label}>{state}")?
                }
                Node::Spinner(s) => writeln!(f, "... {s}")?,
                Node::Alert(s) => writeln!(f, "! {s}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queries_over_nodes() {
        let view = View::new()
            .heading("Phone")
            .field("Brand", "N/A")
            .image("https://cdn/1.png", "Phone")
            .alert("Error: nope");

        assert!(view.contains_text("Phone"));
        assert_eq!(view.field_value("Brand"), Some("N/A"));
        assert_eq!(view.field_value("Category"), None);
        assert_eq!(view.first_image(), Some("https://cdn/1.png"));
        assert_eq!(view.alerts().collect::<Vec<_>>(), vec!["Error: nope"]);
        assert!(!view.has_spinner());
    }

    #[test]
    fn test_display_renders_one_line_per_node() {
        let view = View::new().heading("Products").spinner("Loading...");
        assert_eq!(view.to_string(), "# Products\n... Loading...\n");
    }
}
