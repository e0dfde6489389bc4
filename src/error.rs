//! Error types for the demo MCP server
//!
//! `DispatchError` covers everything a single tool or prompt call can go
//! through. None of it is fatal: the transport turns it into an error result.
//! `DemoMcpError` is the process-level error returned by startup and the
//! transport loop.

use std::fmt;

use thiserror::Error;

/// Main error type for the demo MCP server
#[derive(Error, Debug)]
pub enum DemoMcpError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Dispatch errors surfaced outside of a protocol response
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which registry category an operation lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Tool,
    Prompt,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Tool => f.write_str("tool"),
            OperationKind::Prompt => f.write_str("prompt"),
        }
    }
}

/// Errors produced while resolving, validating or running an operation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("Unknown {kind}: {name}. {}", describe_available(.kind, .available))]
    UnknownOperation {
        kind: OperationKind,
        name: String,
        /// (name, description) of every registered operation of this kind
        available: Vec<(String, String)>,
    },

    #[error("Missing required argument: {name}")]
    MissingArgument { name: String },

    #[error("Invalid argument '{name}': expected a {expected}")]
    MalformedArgument { name: String, expected: String },

    #[error("{message}")]
    Handler { message: String },

    #[error("Prompt '{name}' produced no content")]
    EmptyResult { name: String },
}

impl DispatchError {
    /// Handler-level failure with a human readable message
    pub fn handler(message: impl Into<String>) -> Self {
        DispatchError::Handler {
            message: message.into(),
        }
    }

    pub fn missing(name: impl Into<String>) -> Self {
        DispatchError::MissingArgument { name: name.into() }
    }
}

fn describe_available(kind: &OperationKind, available: &[(String, String)]) -> String {
    if available.is_empty() {
        return format!("No {kind}s are registered.");
    }

    let mut text = format!("Available {kind}s:");
    for (name, description) in available {
        text.push_str(&format!("\n- {name}: {description}"));
    }
    text
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {message}")]
    InvalidEnvVar { var: String, message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Result type alias for demo MCP server operations
pub type Result<T> = std::result::Result<T, DemoMcpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_operation_lists_available() {
        let err = DispatchError::UnknownOperation {
            kind: OperationKind::Tool,
            name: "nope".to_string(),
            available: vec![
                ("hello-world".to_string(), "Say hello to someone".to_string()),
                ("calculate".to_string(), "Basic arithmetic".to_string()),
            ],
        };

        let text = err.to_string();
        assert!(text.starts_with("Unknown tool: nope."));
        assert!(text.contains("- hello-world: Say hello to someone"));
        assert!(text.contains("- calculate: Basic arithmetic"));
    }

    #[test]
    fn test_unknown_operation_with_empty_registry() {
        let err = DispatchError::UnknownOperation {
            kind: OperationKind::Prompt,
            name: "x".to_string(),
            available: vec![],
        };
        assert!(err.to_string().contains("No prompts are registered."));
    }

    #[test]
    fn test_error_conversion() {
        let err: DemoMcpError = DispatchError::missing("name").into();
        assert!(matches!(err, DemoMcpError::Dispatch(_)));
        assert!(err.to_string().contains("Missing required argument: name"));
    }
}
