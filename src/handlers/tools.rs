//! Tool handlers
//!
//! Every handler is a plain function over already-validated arguments.

use std::str::FromStr;

use crate::dispatch::render_prompt;
use crate::error::DispatchError;
use crate::registry::{Arguments, OperationDeclaration, ParameterSpec, Registry};

pub const HELLO_WORLD: &str = "hello-world";
pub const CALCULATE: &str = "calculate";
pub const EXECUTE_PROMPT: &str = "execute_prompt";
pub const LIST_PROMPTS: &str = "list_prompts";

/// Literal returned by `list_prompts` when nothing is registered
pub const NO_PROMPTS: &str = "No prompts registered";

pub fn hello_world_declaration() -> OperationDeclaration {
    OperationDeclaration::new(HELLO_WORLD, "Say hello to someone")
        .param(ParameterSpec::string("name", "Name of the person to greet").required())
}

pub fn hello_world(_: &Registry, args: &Arguments) -> Result<String, DispatchError> {
    let name = args.require_str("name")?;
    Ok(format!("Hello, {}!", name))
}

/// Supported arithmetic operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticOp {
    pub const ALL: [ArithmeticOp; 4] = [
        ArithmeticOp::Add,
        ArithmeticOp::Subtract,
        ArithmeticOp::Multiply,
        ArithmeticOp::Divide,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Subtract => "subtract",
            ArithmeticOp::Multiply => "multiply",
            ArithmeticOp::Divide => "divide",
        }
    }

    pub fn apply(&self, x: f64, y: f64) -> Result<f64, DispatchError> {
        let answer = match self {
            ArithmeticOp::Add => x + y,
            ArithmeticOp::Subtract => x - y,
            ArithmeticOp::Multiply => x * y,
            ArithmeticOp::Divide if y == 0.0 => {
                return Err(DispatchError::handler("Cannot divide by zero"))
            }
            ArithmeticOp::Divide => x / y,
        };

        if !answer.is_finite() {
            return Err(DispatchError::handler(format!(
                "Result of {} is out of range",
                self.as_str()
            )));
        }
        Ok(answer)
    }
}

impl FromStr for ArithmeticOp {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| {
                let supported: Vec<_> = Self::ALL.iter().map(|op| op.as_str()).collect();
                DispatchError::handler(format!(
                    "Unknown operation: {}. Supported operations: {}",
                    s,
                    supported.join(", ")
                ))
            })
    }
}

pub fn calculate_declaration() -> OperationDeclaration {
    OperationDeclaration::new(CALCULATE, "Perform basic arithmetic operations")
        .param(
            ParameterSpec::string(
                "operation",
                "The operation to perform (add, subtract, multiply, divide)",
            )
            .required(),
        )
        .param(ParameterSpec::number("x", "First number").required())
        .param(ParameterSpec::number("y", "Second number").required())
}

pub fn calculate(_: &Registry, args: &Arguments) -> Result<String, DispatchError> {
    let op: ArithmeticOp = args.require_str("operation")?.parse()?;
    let x = args.require_number("x")?;
    let y = args.require_number("y")?;

    let answer = op.apply(x, y)?;
    Ok(format!("Answer: {:.2}", answer))
}

pub fn execute_prompt_declaration() -> OperationDeclaration {
    OperationDeclaration::new(
        EXECUTE_PROMPT,
        "Render a registered prompt template; extra arguments are passed to the prompt",
    )
    .param(ParameterSpec::string("prompt_name", "Name of the prompt to render").required())
}

/// Renders a prompt and returns the text of its first message
pub fn execute_prompt(registry: &Registry, args: &Arguments) -> Result<String, DispatchError> {
    let mut prompt_args = args.clone();
    let name = args.require_str("prompt_name")?;
    prompt_args.take("prompt_name");

    let messages = render_prompt(registry, name, &prompt_args)?;
    messages
        .into_iter()
        .next()
        .map(|m| m.text)
        .ok_or_else(|| DispatchError::EmptyResult {
            name: name.to_string(),
        })
}

pub fn list_prompts_declaration() -> OperationDeclaration {
    OperationDeclaration::new(
        LIST_PROMPTS,
        "List all registered prompts with their descriptions and arguments",
    )
}

pub fn list_prompts(registry: &Registry, _: &Arguments) -> Result<String, DispatchError> {
    if !registry.has_prompts() {
        return Ok(NO_PROMPTS.to_string());
    }

    let mut text = String::from("Available prompts:\n");
    for prompt in registry.prompts() {
        text.push_str(&format!("- {}: {}\n", prompt.name, prompt.description));
        for arg in &prompt.params {
            let marker = if arg.required { " (required)" } else { "" };
            text.push_str(&format!("    - {}{}: {}\n", arg.name, marker, arg.description));
        }
    }

    Ok(text)
}
