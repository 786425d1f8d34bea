//! Custom filters for the minijinja templating engine

/// Formats an optional percentage with one decimal place, or `N/A` when the
/// value is missing.
pub fn percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.1}%"),
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::mailer::template::TemplateService;

    #[test]
    fn formats_present_and_missing_values() {
        assert_eq!(percent(Some(125.0)), "125.0%");
        assert_eq!(percent(Some(3.14159)), "3.1%");
        assert_eq!(percent(None), "N/A");
    }

    #[test]
    fn filter_accepts_null_and_integers() {
        let service = TemplateService::new();
        let context = json!({ "a": null, "b": 40 });
        let rendered = service.render("{{ a | percent }} / {{ b | percent }}", &context).unwrap();
        assert_eq!(rendered, "N/A / 40.0%");
    }
}
