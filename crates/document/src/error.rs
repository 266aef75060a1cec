use crate::chart::ChartError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Invalid chart data: {0}")]
    Chart(#[from] ChartError),

    #[error("Stylesheet is invalid: {0}")]
    Style(#[from] serde_json::Error),

    #[error("Table row has {actual} cells but the table has {expected} columns")]
    TableShape { expected: usize, actual: usize },

    #[error("Failed to load image '{path}': {message}")]
    Image { path: PathBuf, message: String },
}
