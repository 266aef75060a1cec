use crate::config::{GeneratorConfig, OutputFormats, RendererKind};
use crate::error::ReportError;
use crate::generator::MonthlyReportGenerator;
use chrono::NaiveDate;
use monthly_report_document::ReportStyles;
use monthly_report_model::{Clock, FixedClock, SystemClock};
use std::fs;
use std::path::{Path, PathBuf};

/// A builder for creating a [`MonthlyReportGenerator`].
#[derive(Default)]
pub struct GeneratorBuilder {
    data_path: Option<PathBuf>,
    template_path: Option<PathBuf>,
    renderer: RendererKind,
    formats: OutputFormats,
    output_dir: Option<PathBuf>,
    styles: Option<ReportStyles>,
    clock: Option<Box<dyn Clock>>,
}

impl GeneratorBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// The JSON data file to report on. Required.
    pub fn with_data_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Uses a template file instead of the built-in template.
    pub fn with_template_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.template_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_renderer(mut self, renderer: RendererKind) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_formats(mut self, formats: OutputFormats) -> Self {
        self.formats = formats;
        self
    }

    /// Directory the outputs are written to. Defaults to the working directory.
    pub fn with_output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_styles(mut self, styles: ReportStyles) -> Self {
        self.styles = Some(styles);
        self
    }

    /// Loads styles from a JSON stylesheet. Fields it omits keep their defaults.
    pub fn with_styles_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ReportError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            ReportError::Config(format!("Failed to read stylesheet '{}': {}", path.display(), e))
        })?;
        self.styles = Some(ReportStyles::from_json(&json)?);
        Ok(self)
    }

    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Pins "today" so horizon dates and plan buckets are reproducible.
    pub fn with_today(self, today: NaiveDate) -> Self {
        self.with_clock(FixedClock(today))
    }

    pub fn build(self) -> Result<MonthlyReportGenerator, ReportError> {
        let data_path = self.data_path.ok_or_else(|| {
            ReportError::Config(
                "No data file has been configured. Use `with_data_file`.".to_string(),
            )
        })?;
        if self.formats.is_empty() {
            return Err(ReportError::Config(
                "At least one output format must be selected".to_string(),
            ));
        }
        if self.renderer == RendererKind::Document && !self.formats.pdf {
            return Err(ReportError::Config(
                "The document renderer only produces PDF; select the pdf format".to_string(),
            ));
        }
        if self.renderer == RendererKind::Document && self.template_path.is_some() {
            log::warn!(
                "A template was configured but the document renderer does not use templates"
            );
        }

        let mut config = GeneratorConfig::new(data_path);
        config.template_path = self.template_path;
        config.renderer = self.renderer;
        config.formats = self.formats;
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(styles) = self.styles {
            config.styles = styles;
        }
        let clock = self.clock.unwrap_or_else(|| Box::new(SystemClock));
        Ok(MonthlyReportGenerator::with_config(config, clock))
    }
}
