//! Operation registry
//!
//! Holds the declarations of every tool and prompt the server exposes,
//! together with the function that implements each one.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{DispatchError, OperationKind};

/// Type of a declared parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
}

impl ParamType {
    /// JSON Schema type name
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single declared parameter of an operation
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    pub name: String,
    pub param_type: ParamType,
    pub required: bool,
    pub description: String,
}

impl ParameterSpec {
    pub fn string(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type: ParamType::String,
            required: false,
            description: description.to_string(),
        }
    }

    pub fn number(name: &str, description: &str) -> Self {
        Self {
            param_type: ParamType::Number,
            ..Self::string(name, description)
        }
    }

    /// Mark the parameter as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Name, description and parameter list of a tool or prompt
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDeclaration {
    pub name: String,
    pub description: String,
    pub params: Vec<ParameterSpec>,
}

impl OperationDeclaration {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            params: Vec::new(),
        }
    }

    /// Append a parameter (declaration order is validation order)
    pub fn param(mut self, spec: ParameterSpec) -> Self {
        self.params.push(spec);
        self
    }

    /// JSON Schema for the tool's input, as advertised by `tools/list`
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for p in &self.params {
            properties.insert(
                p.name.clone(),
                json!({
                    "type": p.param_type.as_str(),
                    "description": p.description,
                }),
            );
        }

        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// A validated argument value
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    String(String),
    Number(f64),
}

impl ArgValue {
    /// Convert a JSON scalar, `None` for anything else
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(ArgValue::String(s.clone())),
            Value::Number(n) => n.as_f64().map(ArgValue::Number),
            _ => None,
        }
    }

    pub fn param_type(&self) -> ParamType {
        match self {
            ArgValue::String(_) => ParamType::String,
            ArgValue::Number(_) => ParamType::Number,
        }
    }
}

/// Typed argument bag handed to handlers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: HashMap<String, ArgValue>,

    /// Names that were supplied with a value that is neither string nor number
    unsupported: BTreeSet<String>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ArgValue) {
        self.values.insert(name.into(), value);
    }

    /// Builder-style insert, mostly for tests and the CLI
    pub fn with(mut self, name: &str, value: ArgValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ArgValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn get_number(&self, name: &str) -> Option<f64> {
        match self.values.get(name) {
            Some(ArgValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// String argument that has to be there
    pub fn require_str(&self, name: &str) -> Result<&str, DispatchError> {
        self.get_str(name).ok_or_else(|| DispatchError::missing(name))
    }

    /// Numeric argument that has to be there
    pub fn require_number(&self, name: &str) -> Result<f64, DispatchError> {
        self.get_number(name).ok_or_else(|| DispatchError::missing(name))
    }

    /// Record that `name` was supplied with a non-scalar value
    pub fn mark_unsupported(&mut self, name: impl Into<String>) {
        self.unsupported.insert(name.into());
    }

    /// Whether `name` was supplied but could not be typed
    pub fn is_unsupported(&self, name: &str) -> bool {
        self.unsupported.contains(name)
    }

    /// Remove and return an argument
    pub fn take(&mut self, name: &str) -> Option<ArgValue> {
        self.unsupported.remove(name);
        self.values.remove(name)
    }
}

/// Speaker of a rendered prompt message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message produced by a prompt template
#[derive(Debug, Clone, PartialEq)]
pub struct PromptMessage {
    pub role: Role,
    pub text: String,
}

impl PromptMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }
}

/// Tool body: gets read access to the registry for introspection
pub type ToolFn = fn(&Registry, &Arguments) -> Result<String, DispatchError>;

/// Prompt body: renders messages from its arguments
pub type PromptFn = fn(&Arguments) -> Result<Vec<PromptMessage>, DispatchError>;

/// Implementation attached to a declaration
#[derive(Clone, Copy)]
pub enum Handler {
    Tool(ToolFn),
    Prompt(PromptFn),
}

impl Handler {
    pub fn kind(&self) -> OperationKind {
        match self {
            Handler::Tool(_) => OperationKind::Tool,
            Handler::Prompt(_) => OperationKind::Prompt,
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Tool(_) => f.write_str("Handler::Tool"),
            Handler::Prompt(_) => f.write_str("Handler::Prompt"),
        }
    }
}

/// Registered declaration plus its handler
#[derive(Debug, Clone)]
pub struct Entry {
    pub declaration: OperationDeclaration,
    pub handler: Handler,
}

/// Tools and prompts, each kept in registration order
#[derive(Debug, Clone, Default)]
pub struct Registry {
    tools: Vec<Entry>,
    prompts: Vec<Entry>,
}

impl Registry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a declaration under its name; an existing entry with the same
    /// name in the same category is replaced in place.
    pub fn register(&mut self, declaration: OperationDeclaration, handler: Handler) {
        let entries = match handler.kind() {
            OperationKind::Tool => &mut self.tools,
            OperationKind::Prompt => &mut self.prompts,
        };

        let entry = Entry {
            declaration,
            handler,
        };

        match entries
            .iter_mut()
            .find(|e| e.declaration.name == entry.declaration.name)
        {
            Some(existing) => {
                tracing::debug!(name = %entry.declaration.name, "Replacing registered operation");
                *existing = entry;
            }
            None => entries.push(entry),
        }
    }

    pub fn get_tool(&self, name: &str) -> Option<&Entry> {
        self.tools.iter().find(|e| e.declaration.name == name)
    }

    pub fn get_prompt(&self, name: &str) -> Option<&Entry> {
        self.prompts.iter().find(|e| e.declaration.name == name)
    }

    pub fn tools(&self) -> impl Iterator<Item = &OperationDeclaration> {
        self.tools.iter().map(|e| &e.declaration)
    }

    pub fn prompts(&self) -> impl Iterator<Item = &OperationDeclaration> {
        self.prompts.iter().map(|e| &e.declaration)
    }

    pub fn list(&self, kind: OperationKind) -> Vec<&OperationDeclaration> {
        match kind {
            OperationKind::Tool => self.tools().collect(),
            OperationKind::Prompt => self.prompts().collect(),
        }
    }

    pub fn has_prompts(&self) -> bool {
        !self.prompts.is_empty()
    }

    /// Not-found error for `name`, listing everything registered of `kind`
    pub fn unknown(&self, kind: OperationKind, name: &str) -> DispatchError {
        DispatchError::UnknownOperation {
            kind,
            name: name.to_string(),
            available: self
                .list(kind)
                .into_iter()
                .map(|d| (d.name.clone(), d.description.clone()))
                .collect(),
        }
    }
}
