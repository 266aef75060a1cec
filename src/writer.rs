use crate::config::{HTML_OUTPUT_FILE, PDF_OUTPUT_FILE};
use crate::error::ReportError;
use crate::renderer::RenderedReport;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes rendered artifacts under fixed names into one directory.
///
/// Outputs already written stay in place if a later write fails.
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn html_path(&self) -> PathBuf {
        self.output_dir.join(HTML_OUTPUT_FILE)
    }

    pub fn pdf_path(&self) -> PathBuf {
        self.output_dir.join(PDF_OUTPUT_FILE)
    }

    pub fn write(&self, report: &RenderedReport) -> Result<Vec<PathBuf>, ReportError> {
        let mut written = Vec::new();
        if let Some(html) = &report.html {
            written.push(self.write_html(html)?);
        }
        if let Some(pdf) = &report.pdf {
            written.push(self.write_pdf(pdf)?);
        }
        Ok(written)
    }

    pub fn write_html(&self, html: &str) -> Result<PathBuf, ReportError> {
        self.write_file(self.html_path(), html.as_bytes())
    }

    pub fn write_pdf(&self, pdf: &[u8]) -> Result<PathBuf, ReportError> {
        self.write_file(self.pdf_path(), pdf)
    }

    fn write_file(&self, path: PathBuf, bytes: &[u8]) -> Result<PathBuf, ReportError> {
        let io_error = |source: std::io::Error| ReportError::Io {
            path: path.clone(),
            source,
        };
        fs::create_dir_all(&self.output_dir).map_err(io_error)?;
        fs::write(&path, bytes).map_err(io_error)?;
        info!("Wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}
