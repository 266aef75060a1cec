use monthly_report_document::LayoutError;
use monthly_report_model::ModelError;
use monthly_report_render_lopdf::RenderError;
use monthly_report_template::TemplateError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Any failure while generating a report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Layout failed: {0}")]
    Layout(#[from] LayoutError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// The category a [`ReportError`] falls in, independent of which stage raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The data file is unreadable, not JSON, or holds ill-typed values.
    DataFormat,
    /// A required key is absent from the data, or a template references one
    /// the context does not have.
    MissingField,
    /// The template cannot be read, parsed or rendered.
    Template,
    /// A chart was given data it cannot draw.
    ChartData,
    /// An output could not be written.
    Io,
    Config,
    /// The PDF backend failed.
    Render,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::DataFormat => "DataFormatError",
            ErrorKind::MissingField => "MissingFieldError",
            ErrorKind::Template => "TemplateError",
            ErrorKind::ChartData => "ChartDataError",
            ErrorKind::Io => "IOError",
            ErrorKind::Config => "ConfigError",
            ErrorKind::Render => "RenderError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ReportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReportError::Model(ModelError::MissingField { .. }) => ErrorKind::MissingField,
            ReportError::Model(_) => ErrorKind::DataFormat,
            ReportError::Template(TemplateError::MissingField { .. }) => ErrorKind::MissingField,
            ReportError::Template(_) => ErrorKind::Template,
            ReportError::Layout(LayoutError::Chart(_)) => ErrorKind::ChartData,
            ReportError::Layout(LayoutError::Style(_)) => ErrorKind::Config,
            ReportError::Layout(_) => ErrorKind::Render,
            ReportError::Render(RenderError::Io(_)) => ErrorKind::Io,
            ReportError::Render(_) => ErrorKind::Render,
            ReportError::Io { .. } => ErrorKind::Io,
            ReportError::Config(_) => ErrorKind::Config,
        }
    }
}
