//! This module provides a service for rendering templates using the minijinja
//! templating engine.

pub mod filters;

use minijinja::Environment;
use thiserror::Error;

/// A service for rendering templates using the minijinja templating engine.
pub struct TemplateService {
    env: Environment<'static>,
}

/// Error type for the TemplateService.
#[derive(Debug, Error)]
pub enum TemplateServiceError {
    /// An error occurred while rendering the template.
    #[error("Failed to render template: {0}")]
    RenderError(#[from] minijinja::Error),
}

impl Default for TemplateService {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateService {
    /// Creates a new instance of `TemplateService`. Undefined variables are
    /// render errors.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);

        env.add_filter("percent", filters::percent);

        Self { env }
    }

    /// Renders a template with the given context.
    pub fn render(
        &self,
        template_str: &str,
        context: &serde_json::Value,
    ) -> Result<String, TemplateServiceError> {
        tracing::trace!(template = template_str, "Rendering template.");

        match self.env.render_str(template_str, context) {
            Ok(rendered) => Ok(rendered),
            Err(e) => {
                tracing::warn!("Failed to render template '{}': {}", template_str, e);
                Err(TemplateServiceError::RenderError(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn renders_template_with_context() {
        let service = TemplateService::new();
        let context = json!({ "count": 3, "records": [{ "permit": "PA1" }] });
        let result = service.render("{{ count }} new, first {{ records[0].permit }}", &context);
        assert_eq!(result.unwrap(), "3 new, first PA1");
    }

    #[test]
    fn undefined_variable_is_an_error() {
        let service = TemplateService::new();
        let result = service.render("Hello {{ missing }}", &json!({}));
        assert!(matches!(result, Err(TemplateServiceError::RenderError(_))));
    }

    #[test]
    fn invalid_template_is_an_error() {
        let service = TemplateService::new();
        let result = service.render("Hello, {{ name }", &json!({ "name": "World" }));
        assert!(result.is_err());
    }
}
