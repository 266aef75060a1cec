//! HTML report templates.
//!
//! Templates are Handlebars documents compiled in strict mode, so a reference to
//! a field the context does not have is an error instead of an empty string.
//! Three helpers are registered on every template:
//!
//! - `date`: `{{date start_date}}` or `{{date start_date format="%B %d, %Y"}}`
//!   parses an ISO `YYYY-MM-DD` string and formats it (strftime syntax).
//! - `sum`: `{{sum amounts}}` sums a list of numbers; `{{sum items "amount"}}` or
//!   `{{sum items attribute="amount"}}` sums one attribute of every item.
//! - `formatCurrency`: `{{formatCurrency 1234.5}}` renders `1,234.50`.

mod error;
mod helpers;

pub use error::TemplateError;
pub use helpers::format_currency;

use handlebars::Handlebars;
use log::debug;
use serde_json::Value;
use std::fs;
use std::path::Path;

const TEMPLATE_NAME: &str = "monthly_report";

/// A compiled report template.
pub struct ReportTemplate {
    registry: Handlebars<'static>,
}

impl ReportTemplate {
    /// Compiles `source`, failing on malformed template syntax.
    pub fn compile(source: &str) -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        helpers::register(&mut registry);
        registry
            .register_template_string(TEMPLATE_NAME, source)
            .map_err(|e| TemplateError::Syntax(e.to_string()))?;
        debug!("Compiled report template ({} bytes)", source.len());
        Ok(Self { registry })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::compile(&source)
    }

    /// Renders the template against `context`.
    pub fn render(&self, context: &Value) -> Result<String, TemplateError> {
        self.registry
            .render(TEMPLATE_NAME, context)
            .map_err(TemplateError::from)
    }
}
