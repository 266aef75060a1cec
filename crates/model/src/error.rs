use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to read data file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing required field `{field}` in {origin}")]
    MissingField { field: String, origin: String },

    #[error("Invalid report data in {origin}: {message}")]
    InvalidData { origin: String, message: String },

    #[error("Roadmap effort '{effort}' has no steps; start and completion dates are undefined")]
    EmptyEffort { effort: String },

    #[error("Date {date} cannot be offset by {days} days")]
    DateOverflow { date: chrono::NaiveDate, days: u64 },
}

impl ModelError {
    /// Classifies a `serde_json` error raised while deserializing into the typed model.
    ///
    /// Syntax and EOF errors mean the document is not JSON at all. Data errors are
    /// split into missing keys and everything else (wrong types, malformed dates).
    pub(crate) fn from_serde(origin: &str, err: serde_json::Error) -> Self {
        use serde_json::error::Category;
        match err.classify() {
            Category::Data => {
                let message = err.to_string();
                match missing_field_name(&message) {
                    Some(field) => ModelError::MissingField {
                        field: field.to_string(),
                        origin: origin.to_string(),
                    },
                    None => ModelError::InvalidData {
                        origin: origin.to_string(),
                        message,
                    },
                }
            }
            _ => ModelError::Json {
                origin: origin.to_string(),
                source: err,
            },
        }
    }
}

/// Extracts `name` from serde's "missing field `name`" message.
fn missing_field_name(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("missing field `")?;
    let end = rest.find('`')?;
    Some(&rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_missing_field_name() {
        assert_eq!(
            missing_field_name("missing field `project_name` at line 1 column 2"),
            Some("project_name")
        );
        assert_eq!(missing_field_name("invalid type: string"), None);
    }
}
