//! Prompt templates

use crate::error::DispatchError;
use crate::registry::{Arguments, OperationDeclaration, ParameterSpec, PromptMessage};

pub const CODE_REVIEW: &str = "code_review";
pub const GREETING: &str = "greeting";

/// What a code review should concentrate on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewFocus {
    Security,
    Performance,
    Readability,
    BestPractices,
    Comprehensive,
}

impl ReviewFocus {
    /// Unrecognised or absent selectors fall back to a comprehensive review
    pub fn from_selector(selector: Option<&str>) -> Self {
        match selector.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("security") => ReviewFocus::Security,
            Some("performance") => ReviewFocus::Performance,
            Some("readability") => ReviewFocus::Readability,
            Some("best-practices") | Some("best_practices") => ReviewFocus::BestPractices,
            _ => ReviewFocus::Comprehensive,
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            ReviewFocus::Security => {
                "Focus on security vulnerabilities: injection risks, unsafe input handling, \
                 authentication and authorization flaws, and leaked secrets."
            }
            ReviewFocus::Performance => {
                "Focus on performance: algorithmic complexity, unnecessary allocations or copies, \
                 and blocking work on hot paths."
            }
            ReviewFocus::Readability => {
                "Focus on readability: naming, structure, function size, and whether the intent \
                 of the code is clear."
            }
            ReviewFocus::BestPractices => {
                "Focus on best practices: idiomatic usage, error handling, testing, and \
                 consistency with common conventions."
            }
            ReviewFocus::Comprehensive => {
                "Provide a comprehensive review covering correctness, security, performance, \
                 readability, and best practices."
            }
        }
    }
}

pub fn code_review_declaration() -> OperationDeclaration {
    OperationDeclaration::new(CODE_REVIEW, "Review code with an optional focus area")
        .param(ParameterSpec::string("code", "The code to review").required())
        .param(ParameterSpec::string(
            "focus",
            "Focus area: security, performance, readability, or best-practices",
        ))
        .param(ParameterSpec::string("language", "Programming language of the code"))
}

pub fn code_review(args: &Arguments) -> Result<Vec<PromptMessage>, DispatchError> {
    let code = args.require_str("code")?;
    let focus = ReviewFocus::from_selector(args.get_str("focus"));
    let language = args.get_str("language").unwrap_or("");

    Ok(vec![PromptMessage::user(format!(
        "Please review the following code.\n\n{}\n\n```{}\n{}\n```",
        focus.instruction(),
        language,
        code
    ))])
}

pub fn greeting_declaration() -> OperationDeclaration {
    OperationDeclaration::new(GREETING, "Compose a greeting message for someone")
        .param(ParameterSpec::string("name", "Name of the person to greet").required())
        .param(ParameterSpec::string("style", "Greeting style: formal or casual"))
}

pub fn greeting(args: &Arguments) -> Result<Vec<PromptMessage>, DispatchError> {
    let name = args.require_str("name")?;

    let text = match args.get_str("style").unwrap_or("casual") {
        "formal" => format!("Write a formal, polite greeting addressed to {}.", name),
        "casual" => format!("Write a short, friendly greeting for {}.", name),
        other => {
            return Err(DispatchError::handler(format!(
                "Unknown greeting style: {}. Supported styles: formal, casual",
                other
            )))
        }
    };

    Ok(vec![PromptMessage::user(text)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ArgValue, Role};

    fn s(v: &str) -> ArgValue {
        ArgValue::String(v.to_string())
    }

    #[test]
    fn test_focus_selector() {
        assert_eq!(ReviewFocus::from_selector(Some("security")), ReviewFocus::Security);
        assert_eq!(ReviewFocus::from_selector(Some("Performance")), ReviewFocus::Performance);
        assert_eq!(ReviewFocus::from_selector(Some("readability")), ReviewFocus::Readability);
        assert_eq!(
            ReviewFocus::from_selector(Some("best-practices")),
            ReviewFocus::BestPractices
        );
        assert_eq!(ReviewFocus::from_selector(Some("vibes")), ReviewFocus::Comprehensive);
        assert_eq!(ReviewFocus::from_selector(None), ReviewFocus::Comprehensive);
    }

    #[test]
    fn test_code_review_renders_instruction_and_code() {
        let args = Arguments::new()
            .with("code", s("fn main() {}"))
            .with("focus", s("security"))
            .with("language", s("rust"));

        let messages = code_review(&args).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert!(messages[0].text.contains(ReviewFocus::Security.instruction()));
        assert!(messages[0].text.contains("```rust\nfn main() {}\n```"));
    }

    #[test]
    fn test_code_review_default_focus() {
        let args = Arguments::new().with("code", s("x = 1"));
        let messages = code_review(&args).unwrap();
        assert!(messages[0].text.contains(ReviewFocus::Comprehensive.instruction()));
    }

    #[test]
    fn test_greeting_styles() {
        let args = Arguments::new().with("name", s("Ada"));
        assert!(greeting(&args).unwrap()[0].text.contains("friendly greeting for Ada"));

        let formal = args.clone().with("style", s("formal"));
        assert!(greeting(&formal).unwrap()[0].text.contains("formal, polite greeting addressed to Ada"));

        let bad = args.with("style", s("pirate"));
        assert!(greeting(&bad).unwrap_err().to_string().contains("Unknown greeting style: pirate"));
    }
}
