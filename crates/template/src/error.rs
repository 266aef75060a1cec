use handlebars::{RenderError, RenderErrorReason};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Failed to read template '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template syntax error: {0}")]
    Syntax(String),

    #[error("Template references undefined field '{path}': {message}")]
    MissingField { path: String, message: String },

    #[error("Template rendering error: {0}")]
    Render(String),
}

impl From<RenderError> for TemplateError {
    fn from(err: RenderError) -> Self {
        match err.reason() {
            RenderErrorReason::MissingVariable(path) => TemplateError::MissingField {
                path: path.clone().unwrap_or_default(),
                message: err.to_string(),
            },
            _ => TemplateError::Render(err.to_string()),
        }
    }
}
