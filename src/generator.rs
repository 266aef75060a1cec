use crate::builder::GeneratorBuilder;
use crate::config::{GeneratorConfig, OutputFormats, RendererKind};
use crate::error::ReportError;
use crate::renderer::{DocumentRenderer, RenderedReport, ReportRenderer, TemplateRenderer};
use crate::writer::ReportWriter;
use log::info;
use monthly_report_model::{Clock, DerivedReport, ReportData, SystemClock, derive};
use std::path::{Path, PathBuf};

/// Runs the Load → Derive → Render → Write pipeline for one data file.
pub struct MonthlyReportGenerator {
    config: GeneratorConfig,
    clock: Box<dyn Clock>,
}

impl MonthlyReportGenerator {
    /// Template renderer, HTML and PDF output, written to the working directory.
    pub fn new<T: AsRef<Path>, D: AsRef<Path>>(template_path: T, data_path: D) -> Self {
        let mut config = GeneratorConfig::new(data_path.as_ref());
        config.template_path = Some(template_path.as_ref().to_path_buf());
        Self::with_config(config, Box::new(SystemClock))
    }

    pub fn builder() -> GeneratorBuilder {
        GeneratorBuilder::new()
    }

    pub fn with_config(config: GeneratorConfig, clock: Box<dyn Clock>) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Loads the data file and computes its derived fields.
    pub fn load(&self) -> Result<DerivedReport, ReportError> {
        info!("Loading report data from {}", self.config.data_path.display());
        let data = ReportData::from_path(&self.config.data_path)?;
        Ok(derive(data, self.clock.as_ref())?)
    }

    /// Renders the configured formats without writing anything.
    pub fn render(&self) -> Result<RenderedReport, ReportError> {
        self.render_formats(self.config.formats)
    }

    /// Renders and writes every configured format. Returns the written paths.
    pub fn generate_monthly_report(&self) -> Result<Vec<PathBuf>, ReportError> {
        let rendered = self.render()?;
        ReportWriter::new(&self.config.output_dir).write(&rendered)
    }

    /// Renders and writes the HTML report only.
    pub fn generate_html_report(&self) -> Result<PathBuf, ReportError> {
        if self.config.renderer == RendererKind::Document {
            return Err(ReportError::Config(
                "The document renderer cannot produce HTML".to_string(),
            ));
        }
        let rendered = self.render_formats(OutputFormats::HTML)?;
        let html = rendered
            .html
            .ok_or_else(|| ReportError::Config("Renderer produced no HTML".to_string()))?;
        ReportWriter::new(&self.config.output_dir).write_html(&html)
    }

    fn render_formats(&self, formats: OutputFormats) -> Result<RenderedReport, ReportError> {
        let report = self.load()?;
        let renderer = self.renderer(formats)?;
        info!(
            "Rendering '{}' with the {:?} renderer",
            report.data.project_name, self.config.renderer
        );
        renderer.render(&report)
    }

    fn renderer(
        &self,
        formats: OutputFormats,
    ) -> Result<Box<dyn ReportRenderer + '_>, ReportError> {
        Ok(match self.config.renderer {
            RendererKind::Template => Box::new(TemplateRenderer::load(
                self.config.template_path.as_deref(),
                &self.config.styles,
                formats,
            )?),
            RendererKind::Document => Box::new(DocumentRenderer::new(&self.config.styles)),
        })
    }
}
