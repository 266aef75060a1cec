use super::html_text::html_to_document;
use super::{RenderedReport, ReportRenderer};
use crate::config::OutputFormats;
use crate::error::ReportError;
use log::{debug, info};
use monthly_report_document::{LayoutEngine, ReportStyles};
use monthly_report_model::DerivedReport;
use monthly_report_render_lopdf::LopdfRenderer;
use monthly_report_template::ReportTemplate;
use std::path::Path;

const DEFAULT_TEMPLATE: &str = include_str!("../../templates/monthly_report.html.hbs");

/// Renders the report through a Handlebars template.
///
/// The HTML is the primary output. When PDF is requested as well, the HTML is
/// flattened to headings, paragraphs and list items and laid out as plain
/// text pages.
pub struct TemplateRenderer<'s> {
    template: ReportTemplate,
    styles: &'s ReportStyles,
    formats: OutputFormats,
}

impl<'s> TemplateRenderer<'s> {
    pub fn new(template: ReportTemplate, styles: &'s ReportStyles, formats: OutputFormats) -> Self {
        Self {
            template,
            styles,
            formats,
        }
    }

    /// Compiles the template at `path`, or the built-in template when `path` is `None`.
    pub fn load(
        path: Option<&Path>,
        styles: &'s ReportStyles,
        formats: OutputFormats,
    ) -> Result<Self, ReportError> {
        let template = match path {
            Some(path) => {
                info!("Compiling template {}", path.display());
                ReportTemplate::from_file(path)?
            }
            None => {
                debug!("No template configured; using the built-in template");
                ReportTemplate::compile(DEFAULT_TEMPLATE)?
            }
        };
        Ok(Self::new(template, styles, formats))
    }

    fn render_pdf(&self, html: &str, title: &str) -> Result<Vec<u8>, ReportError> {
        let document = html_to_document(html, title);
        let pages = LayoutEngine::new(self.styles).layout(&document);
        Ok(LopdfRenderer::new(self.styles).render_to_vec(&pages, title)?)
    }
}

impl ReportRenderer for TemplateRenderer<'_> {
    fn render(&self, report: &DerivedReport) -> Result<RenderedReport, ReportError> {
        let context = report.template_context()?;
        let html = self.template.render(&context)?;
        debug!("Template produced {} bytes of HTML", html.len());

        let pdf = if self.formats.pdf {
            Some(self.render_pdf(&html, &report.data.project_name)?)
        } else {
            None
        };
        Ok(RenderedReport {
            html: self.formats.html.then_some(html),
            pdf,
        })
    }
}
