//! Node registry
//!
//! Each operation the host can place in a graph is a [`Node`]: a static
//! [`NodeDescriptor`] declaring typed inputs and outputs, plus an async
//! handler. The registry is an explicit lookup table from node name to
//! descriptor and handler, filled once at startup.
//!
//! [`NodeRegistry::invoke`] checks host-provided values against the
//! descriptor before the handler runs: absent inputs take their declared
//! default, required inputs must be present, values must have the declared
//! type, and choice inputs must be one of the listed options.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use jimeng_client::GenerationClient;
use serde::Serialize;
use tracing::debug;

use crate::error::{NodeError, Result};
use crate::image::ImageTensor;

/// Declared type of a node input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputKind {
    String {
        multiline: bool,
        default: Option<&'static str>,
        /// Must be wired from another node's output, never typed in
        force_input: bool,
    },
    Boolean {
        default: bool,
    },
    Choice {
        options: &'static [&'static str],
        default: &'static str,
    },
    Image,
    #[serde(rename = "JIMENG_API_CLIENT")]
    Client,
}

impl InputKind {
    /// Single-line text input with a default
    pub fn text(default: &'static str) -> Self {
        Self::String {
            multiline: false,
            default: Some(default),
            force_input: false,
        }
    }

    fn default_value(&self) -> Option<Value> {
        match self {
            Self::String { default, .. } => default.map(|d| Value::String(d.to_string())),
            Self::Boolean { default } => Some(Value::Boolean(*default)),
            Self::Choice { default, .. } => Some(Value::String(default.to_string())),
            Self::Image | Self::Client => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::String { .. } | Self::Choice { .. } => "string",
            Self::Boolean { .. } => "boolean",
            Self::Image => "image",
            Self::Client => "client",
        }
    }

    fn check(&self, name: &str, value: &Value) -> Result<()> {
        let matches = matches!(
            (self, value),
            (Self::String { .. } | Self::Choice { .. }, Value::String(_))
                | (Self::Boolean { .. }, Value::Boolean(_))
                | (Self::Image, Value::Image(_))
                | (Self::Client, Value::Client(_))
        );
        if !matches {
            return Err(NodeError::TypeMismatch {
                input: name.to_string(),
                expected: self.type_name(),
            });
        }

        if let (Self::Choice { options, .. }, Value::String(s)) = (self, value) {
            if !options.contains(&s.as_str()) {
                return Err(NodeError::invalid_input(
                    name,
                    format!("'{}' is not one of: {}", s, options.join(", ")),
                ));
            }
        }

        Ok(())
    }
}

/// Declared type of a node output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutputKind {
    String,
    #[serde(rename = "JIMENG_API_CLIENT")]
    Client,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputField {
    pub name: &'static str,
    pub kind: InputKind,
}

impl InputField {
    pub fn new(name: &'static str, kind: InputKind) -> Self {
        Self { name, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputField {
    pub name: &'static str,
    pub kind: OutputKind,
}

impl OutputField {
    pub fn new(name: &'static str, kind: OutputKind) -> Self {
        Self { name, kind }
    }
}

/// Interface of a node as presented to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDescriptor {
    pub name: &'static str,
    pub display_name: &'static str,
    pub category: &'static str,
    pub inputs: Vec<InputField>,
    pub outputs: Vec<OutputField>,
    /// Node has side effects or UI output and always runs
    pub output_node: bool,
}

/// A value passed between the host and a node
#[derive(Clone)]
pub enum Value {
    String(String),
    Boolean(bool),
    Image(Arc<ImageTensor>),
    Client(Arc<dyn GenerationClient>),
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Self::Image(img) => f.debug_tuple("Image").field(&img.shape()).finish(),
            Self::Client(_) => f.write_str("Client(..)"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<ImageTensor> for Value {
    fn from(img: ImageTensor) -> Self {
        Self::Image(Arc::new(img))
    }
}

/// Named input values for one node invocation
#[derive(Debug, Clone, Default)]
pub struct NodeInputs {
    values: HashMap<String, Value>,
    /// Set by the registry when the inputs are handed to a node
    node: Option<&'static str>,
}

impl NodeInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    fn require(&self, name: &str) -> Result<&Value> {
        self.values.get(name).ok_or_else(|| NodeError::MissingInput {
            node: self.node.unwrap_or("unregistered").to_string(),
            input: name.to_string(),
        })
    }

    pub fn string(&self, name: &str) -> Result<&str> {
        match self.require(name)? {
            Value::String(s) => Ok(s),
            _ => Err(type_mismatch(name, "string")),
        }
    }

    pub fn boolean(&self, name: &str) -> Result<bool> {
        match self.require(name)? {
            Value::Boolean(b) => Ok(*b),
            _ => Err(type_mismatch(name, "boolean")),
        }
    }

    pub fn image(&self, name: &str) -> Result<Arc<ImageTensor>> {
        match self.require(name)? {
            Value::Image(img) => Ok(Arc::clone(img)),
            _ => Err(type_mismatch(name, "image")),
        }
    }

    pub fn client(&self, name: &str) -> Result<Arc<dyn GenerationClient>> {
        match self.require(name)? {
            Value::Client(client) => Ok(Arc::clone(client)),
            _ => Err(type_mismatch(name, "client")),
        }
    }

    /// Parses a string input, e.g. a choice into its enum
    pub fn parse<T>(&self, name: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.string(name)?
            .parse()
            .map_err(|e| NodeError::invalid_input(name, e))
    }
}

fn type_mismatch(name: &str, expected: &'static str) -> NodeError {
    NodeError::TypeMismatch {
        input: name.to_string(),
        expected,
    }
}

/// Values and UI payload produced by a node
#[derive(Debug, Clone, Default)]
pub struct NodeOutput {
    /// One value per declared output, in order
    pub values: Vec<Value>,
    /// Data for the host to display
    pub ui: Option<serde_json::Value>,
}

impl NodeOutput {
    pub fn values(values: Vec<Value>) -> Self {
        Self { values, ui: None }
    }

    pub fn ui(ui: serde_json::Value) -> Self {
        Self {
            values: Vec::new(),
            ui: Some(ui),
        }
    }

    /// String value at `index`, if that output is a string
    pub fn string(&self, index: usize) -> Option<&str> {
        match self.values.get(index) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        }
    }
}

/// An operation the host can invoke
#[async_trait]
pub trait Node: Send + Sync {
    /// Static interface of this node
    fn descriptor(&self) -> NodeDescriptor;

    /// Runs the node with inputs already checked against its descriptor
    async fn execute(&self, inputs: NodeInputs) -> Result<NodeOutput>;
}

struct Entry {
    descriptor: NodeDescriptor,
    handler: Box<dyn Node>,
}

/// Lookup table from node name to descriptor and handler
#[derive(Default)]
pub struct NodeRegistry {
    nodes: BTreeMap<&'static str, Entry>,
}

impl NodeRegistry {
    /// Creates a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node
    ///
    /// # Panics
    /// Panics if a node with the same name is already registered
    pub fn register<N: Node + 'static>(&mut self, node: N) {
        let descriptor = node.descriptor();
        let name = descriptor.name;
        if self.nodes.contains_key(name) {
            panic!("Node with name '{}' is already registered", name);
        }
        self.nodes.insert(
            name,
            Entry {
                descriptor,
                handler: Box::new(node),
            },
        );
    }

    /// Gets a node's descriptor by name
    pub fn get(&self, name: &str) -> Option<&NodeDescriptor> {
        self.nodes.get(name).map(|entry| &entry.descriptor)
    }

    /// All descriptors, ordered by name
    pub fn descriptors(&self) -> impl Iterator<Item = &NodeDescriptor> {
        self.nodes.values().map(|entry| &entry.descriptor)
    }

    /// Checks `inputs` against the node's descriptor and runs it
    pub async fn invoke(&self, name: &str, mut inputs: NodeInputs) -> Result<NodeOutput> {
        let entry = self
            .nodes
            .get(name)
            .ok_or_else(|| NodeError::UnknownNode(name.to_string()))?;

        for field in &entry.descriptor.inputs {
            match inputs.get(field.name) {
                Some(value) => field.kind.check(field.name, value)?,
                None => match field.kind.default_value() {
                    Some(default) => inputs.insert(field.name, default),
                    None => {
                        return Err(NodeError::MissingInput {
                            node: name.to_string(),
                            input: field.name.to_string(),
                        });
                    }
                },
            }
        }

        inputs.node = Some(entry.descriptor.name);
        debug!("Invoking node {}", name);
        entry.handler.execute(inputs).await
    }
}
