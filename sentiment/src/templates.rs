use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use once_cell::sync::Lazy;

use crate::error::{SentimentError, SentimentResult};

pub const INDEX_TEMPLATE: &str = "index.html";
pub const CHART_TEMPLATE: &str = "chart.svg";

static ENVIRONMENT: Lazy<Result<Environment<'static>, String>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_auto_escape_callback(|name| {
        if name.ends_with(".html") || name.ends_with(".svg") {
            AutoEscape::Html
        } else {
            AutoEscape::None
        }
    });
    env.add_template(INDEX_TEMPLATE, include_str!("../templates/index.html"))
        .map_err(|e| e.to_string())?;
    env.add_template(CHART_TEMPLATE, include_str!("../templates/chart.svg"))
        .map_err(|e| e.to_string())?;
    Ok(env)
});

/// Environment dùng chung, template được nhúng lúc biên dịch
pub fn environment() -> SentimentResult<&'static Environment<'static>> {
    ENVIRONMENT
        .as_ref()
        .map_err(|e| SentimentError::Render(format!("template không hợp lệ: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_compile() {
        let env = environment().unwrap();
        assert!(env.get_template(INDEX_TEMPLATE).is_ok());
        assert!(env.get_template(CHART_TEMPLATE).is_ok());
    }
}
