//! Monthly project-status report generator.
//!
//! One JSON data file goes through four stages:
//! Load → Derive → Render → Write.
//!
//! Rendering has two strategies. The template renderer fills a Handlebars
//! template and produces HTML (plus a text-flow PDF of the same content). The
//! document renderer builds a paginated PDF with tables, a risk matrix and a
//! spending chart.
//!
//! ```no_run
//! use monthly_report::{MonthlyReportGenerator, OutputFormats, RendererKind};
//!
//! let generator = MonthlyReportGenerator::builder()
//!     .with_data_file("report.json")
//!     .with_renderer(RendererKind::Document)
//!     .with_formats(OutputFormats::PDF)
//!     .with_output_dir("out")
//!     .build()?;
//! let written = generator.generate_monthly_report()?;
//! # Ok::<(), monthly_report::ReportError>(())
//! ```

mod builder;
mod config;
mod error;
mod generator;
pub mod renderer;
mod writer;

pub use builder::GeneratorBuilder;
pub use config::{GeneratorConfig, HTML_OUTPUT_FILE, OutputFormats, PDF_OUTPUT_FILE, RendererKind};
pub use error::{ErrorKind, ReportError};
pub use generator::MonthlyReportGenerator;
pub use renderer::{DocumentRenderer, RenderedReport, ReportRenderer, TemplateRenderer};
pub use writer::ReportWriter;

pub use monthly_report_document as document;
pub use monthly_report_model as model;
pub use monthly_report_template as template;
