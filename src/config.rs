use monthly_report_document::ReportStyles;
use std::path::PathBuf;

/// File name of the HTML output inside the output directory.
pub const HTML_OUTPUT_FILE: &str = "monthly_report.html";
/// File name of the PDF output inside the output directory.
pub const PDF_OUTPUT_FILE: &str = "monthly_report.pdf";

/// Selects how a report is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RendererKind {
    /// Handlebars template to HTML, plus a text-flow PDF of the same content.
    #[default]
    Template,
    /// A paginated PDF with fixed sections, tables and charts. PDF only.
    Document,
}

/// Which artifacts to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFormats {
    pub html: bool,
    pub pdf: bool,
}

impl OutputFormats {
    pub const HTML: OutputFormats = OutputFormats { html: true, pdf: false };
    pub const PDF: OutputFormats = OutputFormats { html: false, pdf: true };
    pub const BOTH: OutputFormats = OutputFormats { html: true, pdf: true };

    pub fn is_empty(&self) -> bool {
        !self.html && !self.pdf
    }
}

impl Default for OutputFormats {
    fn default() -> Self {
        OutputFormats::BOTH
    }
}

/// Everything one generator run needs besides the clock.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub data_path: PathBuf,
    /// Template for [`RendererKind::Template`]; the built-in template is used
    /// when unset.
    pub template_path: Option<PathBuf>,
    pub renderer: RendererKind,
    pub formats: OutputFormats,
    pub output_dir: PathBuf,
    pub styles: ReportStyles,
}

impl GeneratorConfig {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            template_path: None,
            renderer: RendererKind::default(),
            formats: OutputFormats::default(),
            output_dir: PathBuf::from("."),
            styles: ReportStyles::default(),
        }
    }
}
