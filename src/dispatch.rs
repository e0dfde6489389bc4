//! Dispatcher
//!
//! Resolves an operation name against the registry, checks the raw JSON
//! arguments against the declaration and runs the handler.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{DispatchError, OperationKind};
use crate::registry::{ArgValue, Arguments, Handler, OperationDeclaration, PromptMessage, Registry};

/// A single tool call, already decoded into typed arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub name: String,
    pub arguments: Arguments,
}

impl Invocation {
    pub fn new(name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Routes calls to the handlers of an injected registry
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Registry,
}

impl Dispatcher {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Call a tool with the arguments as they came off the wire
    pub fn call_tool(&self, name: &str, raw: &Value) -> Result<String, DispatchError> {
        let result = self
            .tool_declaration(name)
            .and_then(|decl| validate(decl, raw))
            .and_then(|arguments| self.run_tool(name, &arguments));
        log_outcome(OperationKind::Tool, name, &result);
        result
    }

    /// Call a tool with arguments that were typed elsewhere (CLI, tests)
    pub fn dispatch(&self, invocation: &Invocation) -> Result<String, DispatchError> {
        let result = self
            .tool_declaration(&invocation.name)
            .and_then(|decl| check(decl, &invocation.arguments))
            .and_then(|_| self.run_tool(&invocation.name, &invocation.arguments));
        log_outcome(OperationKind::Tool, &invocation.name, &result);
        result
    }

    /// Render a prompt with the arguments as they came off the wire
    pub fn get_prompt(&self, name: &str, raw: &Value) -> Result<Vec<PromptMessage>, DispatchError> {
        let result = self
            .prompt_declaration(name)
            .and_then(|decl| validate(decl, raw))
            .and_then(|arguments| render(&self.registry, name, &arguments));
        log_outcome(OperationKind::Prompt, name, &result);
        result
    }

    fn tool_declaration(&self, name: &str) -> Result<&OperationDeclaration, DispatchError> {
        self.registry
            .get_tool(name)
            .map(|e| &e.declaration)
            .ok_or_else(|| self.registry.unknown(OperationKind::Tool, name))
    }

    fn prompt_declaration(&self, name: &str) -> Result<&OperationDeclaration, DispatchError> {
        self.registry
            .get_prompt(name)
            .map(|e| &e.declaration)
            .ok_or_else(|| self.registry.unknown(OperationKind::Prompt, name))
    }

    fn run_tool(&self, name: &str, arguments: &Arguments) -> Result<String, DispatchError> {
        match self.registry.get_tool(name).map(|e| e.handler) {
            Some(Handler::Tool(f)) => f(&self.registry, arguments),
            _ => Err(self.registry.unknown(OperationKind::Tool, name)),
        }
    }
}

/// Look up a prompt, check its typed arguments and render it.
///
/// Used by the `prompts/get` path and by tools that render prompts, so the
/// prompt's own required arguments are checked independently of the tool's.
pub fn render_prompt(
    registry: &Registry,
    name: &str,
    arguments: &Arguments,
) -> Result<Vec<PromptMessage>, DispatchError> {
    let entry = registry
        .get_prompt(name)
        .ok_or_else(|| registry.unknown(OperationKind::Prompt, name))?;
    check(&entry.declaration, arguments)?;
    render(registry, name, arguments)
}

fn render(
    registry: &Registry,
    name: &str,
    arguments: &Arguments,
) -> Result<Vec<PromptMessage>, DispatchError> {
    match registry.get_prompt(name).map(|e| e.handler) {
        Some(Handler::Prompt(f)) => f(arguments),
        _ => Err(registry.unknown(OperationKind::Prompt, name)),
    }
}

/// Turn a raw JSON argument object into typed arguments.
///
/// Declared parameters are checked in declaration order and the first
/// failure is returned. `null` counts as absent. Undeclared scalars are
/// kept; undeclared non-scalars are remembered as unsupported so a later
/// [`check`] reports them as malformed rather than missing.
pub fn validate(decl: &OperationDeclaration, raw: &Value) -> Result<Arguments, DispatchError> {
    let empty = serde_json::Map::new();
    let object = match raw {
        Value::Null => &empty,
        Value::Object(map) => map,
        _ => {
            return Err(DispatchError::MalformedArgument {
                name: "arguments".to_string(),
                expected: "object".to_string(),
            })
        }
    };

    let mut arguments = Arguments::new();

    for spec in &decl.params {
        match object.get(&spec.name) {
            None | Some(Value::Null) => {
                if spec.required {
                    return Err(DispatchError::missing(&spec.name));
                }
            }
            Some(value) => match ArgValue::from_json(value) {
                Some(v) if v.param_type() == spec.param_type => arguments.insert(&spec.name, v),
                _ => {
                    return Err(DispatchError::MalformedArgument {
                        name: spec.name.clone(),
                        expected: spec.param_type.to_string(),
                    })
                }
            },
        }
    }

    for (key, value) in object {
        if decl.params.iter().any(|p| &p.name == key) {
            continue;
        }
        match ArgValue::from_json(value) {
            Some(v) => arguments.insert(key.clone(), v),
            None if value.is_null() => {}
            None => arguments.mark_unsupported(key.clone()),
        }
    }

    Ok(arguments)
}

/// Same rules as [`validate`] for arguments that are already typed
pub fn check(decl: &OperationDeclaration, arguments: &Arguments) -> Result<(), DispatchError> {
    for spec in &decl.params {
        match arguments.get(&spec.name) {
            None if arguments.is_unsupported(&spec.name) => {
                return Err(DispatchError::MalformedArgument {
                    name: spec.name.clone(),
                    expected: spec.param_type.to_string(),
                })
            }
            None if spec.required => return Err(DispatchError::missing(&spec.name)),
            Some(v) if v.param_type() != spec.param_type => {
                return Err(DispatchError::MalformedArgument {
                    name: spec.name.clone(),
                    expected: spec.param_type.to_string(),
                })
            }
            _ => {}
        }
    }
    Ok(())
}

fn log_outcome<T>(kind: OperationKind, name: &str, result: &Result<T, DispatchError>) {
    match result {
        Ok(_) => debug!(%kind, name, "Dispatch succeeded"),
        Err(e) => warn!(%kind, name, error = %e, "Dispatch failed"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::registry::ParameterSpec;

    fn echo(_: &Registry, args: &Arguments) -> Result<String, DispatchError> {
        Ok(format!("{} {}", args.require_str("s")?, args.get_number("n").unwrap_or(0.0)))
    }

    fn panicking(_: &Registry, _: &Arguments) -> Result<String, DispatchError> {
        panic!("handler must not run when validation fails");
    }

    fn dispatcher() -> Dispatcher {
        let mut registry = Registry::new();
        registry.register(
            OperationDeclaration::new("echo", "Echo")
                .param(ParameterSpec::string("s", "text").required())
                .param(ParameterSpec::number("n", "number")),
            Handler::Tool(echo),
        );
        registry.register(
            OperationDeclaration::new("guarded", "Never runs on bad input")
                .param(ParameterSpec::string("a", "a").required())
                .param(ParameterSpec::number("b", "b").required()),
            Handler::Tool(panicking),
        );
        Dispatcher::new(registry)
    }

    #[test]
    fn test_unknown_tool_lists_names() {
        let err = dispatcher().call_tool("nope", &json!({})).unwrap_err();
        match &err {
            DispatchError::UnknownOperation { name, available, .. } => {
                assert_eq!(name, "nope");
                let names: Vec<_> = available.iter().map(|(n, _)| n.as_str()).collect();
                assert_eq!(names, vec!["echo", "guarded"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("- echo: Echo"));
    }

    #[test]
    fn test_missing_required_argument_stops_before_handler() {
        let err = dispatcher().call_tool("guarded", &json!({"b": 1})).unwrap_err();
        assert_eq!(err, DispatchError::missing("a"));
    }

    #[test]
    fn test_first_failure_in_declaration_order() {
        let err = dispatcher().call_tool("guarded", &json!({"a": 5})).unwrap_err();
        assert_eq!(
            err,
            DispatchError::MalformedArgument {
                name: "a".to_string(),
                expected: "string".to_string(),
            }
        );
    }

    #[test]
    fn test_optional_argument_type_checked() {
        let err = dispatcher()
            .call_tool("echo", &json!({"s": "x", "n": "not a number"}))
            .unwrap_err();
        assert!(matches!(err, DispatchError::MalformedArgument { ref name, .. } if name == "n"));
    }

    #[test]
    fn test_null_counts_as_absent() {
        let out = dispatcher().call_tool("echo", &json!({"s": "x", "n": null})).unwrap();
        assert_eq!(out, "x 0");

        let err = dispatcher().call_tool("echo", &json!({"s": null})).unwrap_err();
        assert_eq!(err, DispatchError::missing("s"));
    }

    #[test]
    fn test_non_object_arguments() {
        let err = dispatcher().call_tool("echo", &json!([1, 2])).unwrap_err();
        assert!(matches!(err, DispatchError::MalformedArgument { ref name, .. } if name == "arguments"));

        // absent arguments behave like an empty object
        let err = dispatcher().call_tool("echo", &Value::Null).unwrap_err();
        assert_eq!(err, DispatchError::missing("s"));
    }

    #[test]
    fn test_undeclared_scalars_pass_through() {
        let decl = OperationDeclaration::new("t", "t");
        let args = validate(
            &decl,
            &json!({"extra": "v", "num": 3, "nested": {"a": 1}, "gone": null}),
        )
        .unwrap();
        assert_eq!(args.get_str("extra"), Some("v"));
        assert_eq!(args.get_number("num"), Some(3.0));
        assert!(args.get("nested").is_none());
        assert!(args.is_unsupported("nested"));
        assert!(!args.is_unsupported("gone"));
    }

    #[test]
    fn test_forwarded_non_scalar_is_malformed_not_missing() {
        let prompt = OperationDeclaration::new("p", "p")
            .param(ParameterSpec::string("code", "code").required());
        let tool = OperationDeclaration::new("t", "t");

        for value in [json!(true), json!({"a": 1}), json!([1])] {
            let forwarded = validate(&tool, &json!({ "code": value })).unwrap();
            assert_eq!(
                check(&prompt, &forwarded).unwrap_err(),
                DispatchError::MalformedArgument {
                    name: "code".to_string(),
                    expected: "string".to_string(),
                }
            );
        }
    }

    #[test]
    fn test_dispatch_typed_invocation() {
        let d = dispatcher();
        let ok = Invocation::new(
            "echo",
            Arguments::new()
                .with("s", ArgValue::String("hi".to_string()))
                .with("n", ArgValue::Number(2.0)),
        );
        assert_eq!(d.dispatch(&ok).unwrap(), "hi 2");

        let bad = Invocation::new("guarded", Arguments::new());
        assert_eq!(d.dispatch(&bad).unwrap_err(), DispatchError::missing("a"));
    }

    #[test]
    fn test_unknown_prompt() {
        let err = dispatcher().get_prompt("missing", &json!({})).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::UnknownOperation { kind: OperationKind::Prompt, .. }
        ));
    }
}
