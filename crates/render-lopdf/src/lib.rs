//! PDF backend using lopdf.
//!
//! Turns laid-out [`Page`](monthly_report_document::Page)s into a PDF built on
//! the 14 standard Type1 fonts, so no font files are embedded.

mod chart;
mod encoding;
mod page;
mod renderer;

pub use encoding::to_win_ansi;
pub use renderer::LopdfRenderer;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF generation error: {0}")]
    Pdf(String),
}

impl From<lopdf::Error> for RenderError {
    fn from(err: lopdf::Error) -> Self {
        RenderError::Pdf(err.to_string())
    }
}
