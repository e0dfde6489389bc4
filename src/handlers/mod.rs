//! Built-in tools and prompts

pub mod prompts;
pub mod tools;

use crate::registry::{Handler, Registry};

/// Register the demo tools, and the demo prompts when `with_prompts` is set
pub fn register_defaults(registry: &mut Registry, with_prompts: bool) {
    registry.register(tools::hello_world_declaration(), Handler::Tool(tools::hello_world));
    registry.register(tools::calculate_declaration(), Handler::Tool(tools::calculate));
    registry.register(
        tools::execute_prompt_declaration(),
        Handler::Tool(tools::execute_prompt),
    );
    registry.register(tools::list_prompts_declaration(), Handler::Tool(tools::list_prompts));

    if with_prompts {
        registry.register(
            prompts::code_review_declaration(),
            Handler::Prompt(prompts::code_review),
        );
        registry.register(prompts::greeting_declaration(), Handler::Prompt(prompts::greeting));
    }
}

/// Registry populated with every built-in operation
pub fn default_registry(with_prompts: bool) -> Registry {
    let mut registry = Registry::new();
    register_defaults(&mut registry, with_prompts);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_contents() {
        let registry = default_registry(true);
        let tool_names: Vec<_> = registry.tools().map(|d| d.name.as_str()).collect();
        assert_eq!(
            tool_names,
            vec![tools::HELLO_WORLD, tools::CALCULATE, tools::EXECUTE_PROMPT, tools::LIST_PROMPTS]
        );
        let prompt_names: Vec<_> = registry.prompts().map(|d| d.name.as_str()).collect();
        assert_eq!(prompt_names, vec![prompts::CODE_REVIEW, prompts::GREETING]);
    }

    #[test]
    fn test_default_registry_without_prompts() {
        let registry = default_registry(false);
        assert_eq!(registry.tools().count(), 4);
        assert!(!registry.has_prompts());
    }
}
