//! Output formats for parsed trees
//!
//! Each format implements the `Formatter` trait and can be registered with
//! `FormatRegistry`. Built-in formats render a tree as an indented text
//! outline, as JSON, or as YAML. The outline is the quickest way to see what
//! a parse produced; the serialized forms are for handing trees to other
//! tooling.

use std::collections::HashMap;
use std::fmt;

use crate::node::Node;

/// Error that can occur while rendering a tree
#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// Format not found in the registry
    FormatNotFound(String),
    /// Error during serialization
    SerializationError(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::FormatNotFound(name) => write!(f, "Format '{name}' not found"),
            FormatError::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
        }
    }
}

impl std::error::Error for FormatError {}

/// Trait for tree formatters
pub trait Formatter: Send + Sync {
    /// The name of this format (e.g. "text", "json")
    fn name(&self) -> &str;

    /// Render a tree to this format
    fn render(&self, node: &Node) -> Result<String, FormatError>;

    /// Optional description of this format
    fn description(&self) -> &str {
        ""
    }
}

/// Registry of tree formatters, retrievable by name
pub struct FormatRegistry {
    formatters: HashMap<String, Box<dyn Formatter>>,
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formatters: HashMap::new(),
        }
    }

    /// Register a formatter, replacing any existing one with the same name
    pub fn register<F: Formatter + 'static>(&mut self, formatter: F) {
        self.formatters
            .insert(formatter.name().to_string(), Box::new(formatter));
    }

    /// Get a formatter by name
    pub fn get(&self, name: &str) -> Option<&dyn Formatter> {
        self.formatters.get(name).map(|f| f.as_ref())
    }

    /// Check if a format exists
    pub fn has(&self, name: &str) -> bool {
        self.formatters.contains_key(name)
    }

    /// Render a tree using the named format
    pub fn render(&self, node: &Node, format: &str) -> Result<String, FormatError> {
        let formatter = self
            .get(format)
            .ok_or_else(|| FormatError::FormatNotFound(format.to_string()))?;
        formatter.render(node)
    }

    /// List all available format names (sorted)
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formatters.keys().cloned().collect();
        names.sort();
        names
    }

    /// Create a registry with the built-in formatters
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(TextFormatter);
        registry.register(JsonFormatter);
        registry.register(YamlFormatter);

        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Indented outline: one line per node, properties in parentheses
pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn render(&self, node: &Node) -> Result<String, FormatError> {
        Ok(to_text(node))
    }

    fn description(&self) -> &str {
        "Indented text outline"
    }
}

/// Pretty-printed JSON of the whole tree
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn render(&self, node: &Node) -> Result<String, FormatError> {
        to_json(node)
    }

    fn description(&self) -> &str {
        "Pretty-printed JSON"
    }
}

/// YAML of the whole tree
pub struct YamlFormatter;

impl Formatter for YamlFormatter {
    fn name(&self) -> &str {
        "yaml"
    }

    fn render(&self, node: &Node) -> Result<String, FormatError> {
        to_yaml(node)
    }

    fn description(&self) -> &str {
        "YAML"
    }
}

/// Render a tree as an indented outline
///
/// Flags appear bare and valued properties as `key=value`, both in
/// declaration order; children are indented two spaces per level.
pub fn to_text(node: &Node) -> String {
    let mut out = String::new();
    outline(node, 0, &mut out);
    out
}

fn outline(node: &Node, depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push_str(&node.name);
    if !node.properties.is_empty() {
        out.push_str(" (");
        for (i, (key, value)) in node.properties.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(key);
            if let Some(value) = value {
                out.push('=');
                out.push_str(value);
            }
        }
        out.push(')');
    }
    out.push('\n');
    for child in &node.children {
        outline(child, depth + 1, out);
    }
}

/// Render a tree as pretty-printed JSON
pub fn to_json(node: &Node) -> Result<String, FormatError> {
    serde_json::to_string_pretty(node)
        .map_err(|e| FormatError::SerializationError(e.to_string()))
}

/// Render a tree as YAML
pub fn to_yaml(node: &Node) -> Result<String, FormatError> {
    serde_yaml::to_string(node).map_err(|e| FormatError::SerializationError(e.to_string()))
}
