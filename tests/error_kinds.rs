mod common;

use common::{sample_report, today, write_fixture};
use monthly_report::{ErrorKind, MonthlyReportGenerator, OutputFormats, RendererKind, ReportError};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn render_with(data: &Path, renderer: RendererKind, formats: OutputFormats) -> ReportError {
    MonthlyReportGenerator::builder()
        .with_data_file(data)
        .with_renderer(renderer)
        .with_formats(formats)
        .with_today(today())
        .build()
        .and_then(|generator| generator.render())
        .err()
        .expect("rendering should fail")
}

fn template_error(template_source: &str) -> ReportError {
    let dir = tempdir().unwrap();
    let data = write_fixture(dir.path(), &sample_report());
    let template = dir.path().join("report.hbs");
    fs::write(&template, template_source).unwrap();
    MonthlyReportGenerator::builder()
        .with_data_file(&data)
        .with_template_file(&template)
        .with_formats(OutputFormats::HTML)
        .with_today(today())
        .build()
        .and_then(|generator| generator.render())
        .err()
        .expect("rendering should fail")
}

#[test]
fn missing_data_file_is_a_data_format_error() {
    let dir = tempdir().unwrap();
    let absent = dir.path().join("absent.json");
    let err = render_with(&absent, RendererKind::Template, OutputFormats::HTML);
    assert_eq!(err.kind(), ErrorKind::DataFormat);
}

#[test]
fn invalid_json_is_a_data_format_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("report.json");
    fs::write(&path, "{\"project_name\": ").unwrap();
    let err = render_with(&path, RendererKind::Template, OutputFormats::HTML);
    assert_eq!(err.kind(), ErrorKind::DataFormat);
}

#[test]
fn absent_required_key_is_a_missing_field_error() {
    let dir = tempdir().unwrap();
    let mut data = sample_report();
    data.as_object_mut().unwrap().remove("roadmap");
    let path = write_fixture(dir.path(), &data);
    let err = render_with(&path, RendererKind::Template, OutputFormats::HTML);
    assert_eq!(err.kind(), ErrorKind::MissingField);
    assert!(err.to_string().contains("roadmap"));
}

#[test]
fn effort_without_steps_is_rejected() {
    let dir = tempdir().unwrap();
    let mut data = sample_report();
    data["roadmap"] = json!([{"description": "Unplanned", "steps": []}]);
    let path = write_fixture(dir.path(), &data);
    let err = render_with(&path, RendererKind::Document, OutputFormats::PDF);
    assert_eq!(err.kind(), ErrorKind::DataFormat);
    assert!(err.to_string().contains("Unplanned"));
}

#[test]
fn malformed_template_is_a_template_error() {
    let err = template_error("{{#each achievements}}<p>{{@key}}</p>");
    assert_eq!(err.kind(), ErrorKind::Template);
}

#[test]
fn undefined_template_field_is_a_missing_field_error() {
    let err = template_error("<h1>{{project_name}}</h1><p>{{sponsor_name}}</p>");
    assert_eq!(err.kind(), ErrorKind::MissingField);
}

#[test]
fn missing_template_file_is_a_template_error() {
    let dir = tempdir().unwrap();
    let data = write_fixture(dir.path(), &sample_report());
    let err = MonthlyReportGenerator::builder()
        .with_data_file(&data)
        .with_template_file(dir.path().join("absent.hbs"))
        .with_today(today())
        .build()
        .and_then(|generator| generator.render())
        .err()
        .expect("rendering should fail");
    assert_eq!(err.kind(), ErrorKind::Template);
}

#[test]
fn document_renderer_needs_risks_for_the_risk_matrix() {
    let dir = tempdir().unwrap();
    let mut data = sample_report();
    data["risks"] = json!([]);
    let path = write_fixture(dir.path(), &data);
    let err = render_with(&path, RendererKind::Document, OutputFormats::PDF);
    assert_eq!(err.kind(), ErrorKind::ChartData);
}

#[test]
fn document_renderer_needs_accounts_for_the_spending_chart() {
    let dir = tempdir().unwrap();
    let mut data = sample_report();
    data["financials"] = json!({"accounts": []});
    let path = write_fixture(dir.path(), &data);
    let err = render_with(&path, RendererKind::Document, OutputFormats::PDF);
    assert_eq!(err.kind(), ErrorKind::ChartData);
}

#[test]
fn template_renderer_does_not_need_chart_data() {
    let dir = tempdir().unwrap();
    let mut data = sample_report();
    data["risks"] = json!([]);
    data["financials"] = json!({"accounts": []});
    let path = write_fixture(dir.path(), &data);
    let rendered = MonthlyReportGenerator::builder()
        .with_data_file(&path)
        .with_formats(OutputFormats::HTML)
        .with_today(today())
        .build()
        .and_then(|generator| generator.render())
        .unwrap();
    let html = rendered.html.unwrap();
    assert!(html.contains("No risks reported."));
    assert!(html.contains("No financial data reported."));
}

#[test]
fn unwritable_output_is_an_io_error() {
    let dir = tempdir().unwrap();
    let data = write_fixture(dir.path(), &sample_report());
    // A regular file where the output directory should be.
    let blocker = dir.path().join("blocked");
    fs::write(&blocker, "not a directory").unwrap();

    let err = MonthlyReportGenerator::builder()
        .with_data_file(&data)
        .with_formats(OutputFormats::HTML)
        .with_output_dir(&blocker)
        .with_today(today())
        .build()
        .and_then(|generator| generator.generate_monthly_report())
        .err()
        .expect("writing should fail");
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.to_string().contains("monthly_report.html"));
}

#[test]
fn cli_error_lines_lead_with_the_kind() {
    assert_eq!(ErrorKind::MissingField.to_string(), "MissingFieldError");
    assert_eq!(ErrorKind::ChartData.to_string(), "ChartDataError");
    assert_eq!(ErrorKind::Io.to_string(), "IOError");
}
