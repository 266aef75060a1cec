//! Report rendering strategies.
//!
//! Both strategies consume the same [`DerivedReport`] and differ only in how
//! the output is produced; the generator picks one from its configuration.

mod document;
mod html_text;
mod template;

pub use document::DocumentRenderer;
pub use template::TemplateRenderer;

use crate::error::ReportError;
use monthly_report_model::DerivedReport;

/// The rendered artifacts of one report. A format that was not requested is `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedReport {
    pub html: Option<String>,
    pub pdf: Option<Vec<u8>>,
}

pub trait ReportRenderer {
    fn render(&self, report: &DerivedReport) -> Result<RenderedReport, ReportError>;
}
