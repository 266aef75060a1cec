use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use monthly_report::{MonthlyReportGenerator, OutputFormats, RendererKind, ReportError};
use std::path::PathBuf;
use std::process::ExitCode;

/// Generates a monthly project-status report from a JSON data file.
#[derive(Parser, Debug)]
#[command(name = "monthly-report", version, about)]
struct Cli {
    /// JSON data file for the reporting period.
    #[arg(short, long)]
    data: PathBuf,

    /// Handlebars template. The built-in template is used when omitted.
    #[arg(short, long)]
    template: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Renderer::Template)]
    renderer: Renderer,

    #[arg(short, long, value_enum, default_value_t = Format::Both)]
    format: Format,

    /// Directory to write monthly_report.html / monthly_report.pdf into.
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// JSON stylesheet overriding the default PDF styles.
    #[arg(long)]
    styles: Option<PathBuf>,

    /// Report as if today were this date (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Renderer {
    Template,
    Document,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Html,
    Pdf,
    Both,
}

impl From<Renderer> for RendererKind {
    fn from(renderer: Renderer) -> Self {
        match renderer {
            Renderer::Template => RendererKind::Template,
            Renderer::Document => RendererKind::Document,
        }
    }
}

impl From<Format> for OutputFormats {
    fn from(format: Format) -> Self {
        match format {
            Format::Html => OutputFormats::HTML,
            Format::Pdf => OutputFormats::PDF,
            Format::Both => OutputFormats::BOTH,
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

impl Cli {
    fn generator(&self) -> Result<MonthlyReportGenerator, ReportError> {
        let mut builder = MonthlyReportGenerator::builder()
            .with_data_file(&self.data)
            .with_renderer(self.renderer.into())
            .with_formats(self.format.into())
            .with_output_dir(&self.output_dir);
        if let Some(template) = &self.template {
            builder = builder.with_template_file(template);
        }
        if let Some(styles) = &self.styles {
            builder = builder.with_styles_file(styles)?;
        }
        if let Some(today) = self.today {
            builder = builder.with_today(today);
        }
        builder.build()
    }
}

fn error_line(e: &ReportError) -> String {
    format!("{}: {}", e.kind(), e)
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.generator().and_then(|generator| generator.generate_monthly_report()) {
        Ok(paths) => {
            for path in paths {
                println!("Generated {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", error_line(&e));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monthly_report::ErrorKind;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("monthly-report").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_select_template_renderer_and_both_formats() {
        let generator = parse(&["--data", "report.json"]).generator().unwrap();
        let config = generator.config();
        assert_eq!(config.data_path, PathBuf::from("report.json"));
        assert_eq!(config.renderer, RendererKind::Template);
        assert_eq!(config.formats, OutputFormats::BOTH);
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert!(config.template_path.is_none());
    }

    #[test]
    fn flags_map_onto_the_generator_config() {
        let cli = parse(&[
            "--data",
            "report.json",
            "--template",
            "custom.hbs",
            "--renderer",
            "document",
            "--format",
            "pdf",
            "--output-dir",
            "out",
        ]);
        let generator = cli.generator().unwrap();
        let config = generator.config();
        assert_eq!(config.renderer, RendererKind::Document);
        assert_eq!(config.formats, OutputFormats::PDF);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.template_path, Some(PathBuf::from("custom.hbs")));
    }

    #[test]
    fn today_pins_the_report_date() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("report.json");
        let report = json!({
            "project_name": "Atlas",
            "achievements": [],
            "challenges": [],
            "roadmap": []
        });
        fs::write(&data, report.to_string()).unwrap();

        let cli = parse(&["--data", data.to_str().unwrap(), "--today", "2024-03-15"]);
        let derived = cli.generator().unwrap().load().unwrap();
        assert_eq!(derived.fields.horizon.now, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    }

    #[test]
    fn styles_file_overrides_default_styles() {
        let dir = tempdir().unwrap();
        let styles = dir.path().join("styles.json");
        fs::write(&styles, r##"{ "body": { "color": "#336699" } }"##).unwrap();

        let cli = parse(&["--data", "report.json", "--styles", styles.to_str().unwrap()]);
        let generator = cli.generator().unwrap();
        let body = &generator.config().styles.body;
        assert_eq!(body.color.to_string(), "#336699");
    }

    #[test]
    fn invalid_values_are_rejected_by_the_parser() {
        let args = |extra: &[&'static str]| {
            let mut args = vec!["monthly-report", "--data", "report.json"];
            args.extend_from_slice(extra);
            Cli::try_parse_from(args)
        };
        assert!(args(&["--today", "15/03/2024"]).is_err());
        assert!(args(&["--renderer", "latex"]).is_err());
        assert!(args(&["--format", "docx"]).is_err());
        assert!(Cli::try_parse_from(["monthly-report"]).is_err());
    }

    #[test]
    fn failures_print_the_error_kind_first() {
        let cli = parse(&["--data", "report.json", "--styles", "/nonexistent/styles.json"]);
        let err = cli.generator().err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(error_line(&err).starts_with("ConfigError: "));

        let cli = parse(&["--data", "report.json", "--renderer", "document", "--format", "html"]);
        let err = cli.generator().err().unwrap();
        assert!(error_line(&err).starts_with("ConfigError: "));
    }
}
