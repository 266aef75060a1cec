use super::{RenderedReport, ReportRenderer};
use crate::error::ReportError;
use itertools::Itertools;
use log::{debug, warn};
use monthly_report_document::{
    BarChart, BarSeries, Column, Document, ImageBlock, ImageData, LayoutEngine, ReportStyles,
    ScatterChart, ScatterPoint, StyleName, Table, TextAlign,
};
use monthly_report_model::{CategoryGroups, DerivedReport, PlanWindow, RiskPoint};
use monthly_report_render_lopdf::LopdfRenderer;
use monthly_report_template::format_currency;
use std::path::Path;
use std::sync::Arc;

/// Both risk matrix axes run from 0 to 5.
const RISK_SCALE: (f64, f64) = (0.0, 5.0);
const LOGO_WIDTH: f32 = 160.0;

/// Builds the paginated PDF report section by section.
///
/// Sections always appear in the same order: title page, summary,
/// achievements, 30/60/90-day plan, challenges, risks with the risk matrix,
/// financials with the spending chart, and recipients.
pub struct DocumentRenderer<'s> {
    styles: &'s ReportStyles,
}

impl<'s> DocumentRenderer<'s> {
    pub fn new(styles: &'s ReportStyles) -> Self {
        Self { styles }
    }

    pub fn build_document(&self, report: &DerivedReport) -> Result<Document, ReportError> {
        let mut doc = Document::new(report.data.project_name.clone());
        self.title_page(&mut doc, report);
        self.summary(&mut doc, report);
        categorized(
            &mut doc,
            "Achievements",
            &report.fields.achievements,
            "No achievements reported.",
        );
        plans(&mut doc, report);
        categorized(
            &mut doc,
            "Challenges",
            &report.fields.challenges,
            "No challenges reported.",
        );
        self.risks(&mut doc, report)?;
        self.financials(&mut doc, report)?;
        recipients(&mut doc, report)?;
        debug!("Built document with {} blocks", doc.blocks.len());
        Ok(doc)
    }

    fn title_page(&self, doc: &mut Document, report: &DerivedReport) {
        let data = &report.data;
        doc.spacer(80.0);
        if let Some(logo) = data.logo_path.as_deref().and_then(load_logo) {
            doc.image(ImageBlock {
                image: logo,
                width: LOGO_WIDTH,
                align: TextAlign::Center,
            });
            doc.spacer(24.0);
        }
        doc.text(StyleName::Title, data.project_name.clone());
        match data.reporting_period() {
            Some(period) => doc.text(StyleName::Subtitle, format!("Monthly Report: {period}")),
            None => doc.text(StyleName::Subtitle, "Monthly Report"),
        };
        if let Some(version) = &data.version {
            doc.text(StyleName::Subtitle, format!("Version {version}"));
        }
        doc.text(
            StyleName::Subtitle,
            format!("Report date: {}", report.fields.horizon.now.format("%B %d, %Y")),
        );
        if !data.authors.is_empty() {
            doc.spacer(36.0);
            doc.text(StyleName::Subtitle, "Prepared by");
            for author in &data.authors {
                let line = [
                    Some(author.name.as_str()),
                    author.title.as_deref(),
                    author.role.as_deref(),
                ]
                .into_iter()
                .flatten()
                .join(", ");
                doc.text(StyleName::Subtitle, line);
            }
        }
        doc.page_break();
    }

    fn summary(&self, doc: &mut Document, report: &DerivedReport) {
        let data = &report.data;
        doc.heading("Summary");
        if let Some(description) = &data.project_description {
            doc.paragraph(description.clone());
        }
        let facts = [
            ("Project start", data.project_start_date.map(|d| d.to_string())),
            ("Project end", data.project_end_date.map(|d| d.to_string())),
            ("Expected duration", data.expected_duration.clone()),
            ("Planned expenditures", data.planned_expenditures.map(format_currency)),
            ("Actual expenditures", data.actual_expenditures.map(format_currency)),
        ];
        for (label, value) in facts {
            if let Some(value) = value {
                doc.bullet(format!("{label}: {value}"));
            }
        }
        let totals = &report.fields.financials;
        if !totals.accounts.is_empty() {
            doc.bullet(format!(
                "Spent {} of {} budgeted across {} accounts",
                format_currency(totals.actual_total),
                format_currency(totals.expected_total),
                totals.accounts.len()
            ));
        }
    }

    fn risks(&self, doc: &mut Document, report: &DerivedReport) -> Result<(), ReportError> {
        doc.heading("Risks");
        let mut table = Table::new(vec![
            Column::new("ID", 0.5),
            Column::new("Description", 3.0),
            Column::new("Likelihood", 1.0).right(),
            Column::new("Impact", 1.0).right(),
            Column::new("Mitigation", 2.5),
            Column::new("Expected effect", 2.0),
        ]);
        for (point, risk) in report.fields.risk_points.iter().zip(&report.data.risks) {
            table.push_row(vec![
                point.label.clone(),
                risk.description.clone(),
                risk.likelihood.to_string(),
                risk.impact.to_string(),
                risk.mitigation_plan.clone().unwrap_or_default(),
                risk.expected_effect.clone().unwrap_or_default(),
            ])?;
        }
        if !table.rows.is_empty() {
            doc.table(table);
        }

        let chart_style = &self.styles.chart;
        let points = report
            .fields
            .risk_points
            .iter()
            .map(|point| ScatterPoint {
                label: point.label.clone(),
                x: point.likelihood,
                y: point.impact,
                color: match severity(point) {
                    Severity::Low => chart_style.low_risk_color,
                    Severity::Medium => chart_style.medium_risk_color,
                    Severity::High => chart_style.high_risk_color,
                },
            })
            .collect();
        let matrix = ScatterChart::new("Risk matrix", "Likelihood", "Impact", RISK_SCALE, points)
            .map_err(monthly_report_document::LayoutError::from)?;
        doc.chart(matrix);
        Ok(())
    }

    fn financials(&self, doc: &mut Document, report: &DerivedReport) -> Result<(), ReportError> {
        let summary = &report.fields.financials;
        doc.heading("Financial Summary");

        let mut table = Table::new(vec![
            Column::new("Account", 3.0),
            Column::new("Expected", 1.5).right(),
            Column::new("Actual", 1.5).right(),
            Column::new("Variance", 1.5).right(),
        ]);
        for account in &summary.accounts {
            table.push_row(vec![
                account.account_name.clone(),
                format_currency(account.expected_total),
                format_currency(account.actual_total),
                format_currency(account.variance),
            ])?;
        }
        if !summary.accounts.is_empty() {
            table.push_row(vec![
                "Total".to_string(),
                format_currency(summary.expected_total),
                format_currency(summary.actual_total),
                format_currency(summary.variance),
            ])?;
            doc.table(table);
        }

        let chart_style = &self.styles.chart;
        let categories = summary.accounts.iter().map(|a| a.account_name.clone()).collect();
        let series = vec![
            BarSeries {
                name: "Expected".to_string(),
                color: chart_style.expected_color,
                values: summary.accounts.iter().map(|a| a.expected_total).collect(),
            },
            BarSeries {
                name: "Actual".to_string(),
                color: chart_style.actual_color,
                values: summary.accounts.iter().map(|a| a.actual_total).collect(),
            },
        ];
        let chart = BarChart::new("Expected vs. actual expenditures", "Amount", categories, series)
            .map_err(monthly_report_document::LayoutError::from)?;
        doc.chart(chart);
        Ok(())
    }
}

impl ReportRenderer for DocumentRenderer<'_> {
    fn render(&self, report: &DerivedReport) -> Result<RenderedReport, ReportError> {
        let document = self.build_document(report)?;
        let pages = LayoutEngine::new(self.styles).layout(&document);
        let pdf = LopdfRenderer::new(self.styles).render_to_vec(&pages, &document.title)?;
        Ok(RenderedReport {
            html: None,
            pdf: Some(pdf),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Low,
    Medium,
    High,
}

/// Bands on the 0..=25 likelihood × impact score.
fn severity(point: &RiskPoint) -> Severity {
    match point.score() {
        s if s >= 13.0 => Severity::High,
        s if s >= 6.0 => Severity::Medium,
        _ => Severity::Low,
    }
}

/// A missing or undecodable logo is skipped, never fatal.
fn load_logo(path: &str) -> Option<Arc<ImageData>> {
    let path = Path::new(path);
    if !path.exists() {
        warn!("Logo {} does not exist; title page has no logo", path.display());
        return None;
    }
    match ImageData::load(path) {
        Ok(image) => Some(Arc::new(image)),
        Err(e) => {
            warn!("{e}; title page has no logo");
            None
        }
    }
}

fn categorized(doc: &mut Document, heading: &str, groups: &CategoryGroups, empty: &str) {
    doc.heading(heading);
    if groups.is_empty() {
        doc.paragraph(empty);
        return;
    }
    for (category, descriptions) in groups.iter() {
        doc.text(StyleName::Heading2, category);
        for description in descriptions {
            doc.bullet(description.clone());
        }
    }
}

fn plans(doc: &mut Document, report: &DerivedReport) {
    let horizon = &report.fields.horizon;
    doc.heading("30/60/90-Day Plan");
    let windows = [
        (PlanWindow::Next30Days, "Next 30 days", horizon.now, horizon.thirty_days),
        (PlanWindow::Days30To60, "30 to 60 days", horizon.thirty_days, horizon.sixty_days),
        (PlanWindow::Days60To90, "60 to 90 days", horizon.sixty_days, horizon.ninety_days),
    ];
    for (window, title, from, until) in windows {
        doc.text(StyleName::Heading2, format!("{title} ({from} to {until})"));
        let efforts = report.fields.plans.bucket(window);
        if efforts.is_empty() {
            doc.paragraph("Nothing scheduled.");
        }
        for effort in efforts {
            doc.bullet(format!(
                "{}: {} to {}",
                effort.description, effort.start_date, effort.planned_completion_date
            ));
        }
    }
}

fn recipients(doc: &mut Document, report: &DerivedReport) -> Result<(), ReportError> {
    doc.heading("Distribution");
    let people = &report.data.recipients;
    if people.is_empty() {
        doc.paragraph("No recipients listed.");
        return Ok(());
    }
    let mut table = Table::new(vec![
        Column::new("Name", 2.0),
        Column::new("Title", 2.0),
        Column::new("Role", 1.5),
        Column::new("Email", 2.5),
        Column::new("Phone", 1.5),
    ]);
    for person in people {
        let contact = person.contact_info.clone().unwrap_or_default();
        table.push_row(vec![
            person.name.clone(),
            person.title.clone().unwrap_or_default(),
            person.role.clone().unwrap_or_default(),
            contact.email.unwrap_or_default(),
            contact.phone.unwrap_or_default(),
        ])?;
    }
    doc.table(table);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use monthly_report_document::Block;
    use monthly_report_model::{FixedClock, ReportData, derive};
    use serde_json::json;

    fn report(data: serde_json::Value) -> DerivedReport {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        derive(ReportData::from_value(data).unwrap(), &FixedClock(today)).unwrap()
    }

    fn sample() -> serde_json::Value {
        json!({
            "project_name": "Atlas",
            "month": "January",
            "year": 2024,
            "authors": [{"name": "Sam Lee", "title": "PM"}],
            "achievements": [{"category": "infra", "description": "Moved to k8s"}],
            "challenges": [],
            "risks": [
                {"description": "Vendor delay", "likelihood": 4, "impact": 4},
                {"description": "Scope creep", "likelihood": 1, "impact": 2}
            ],
            "roadmap": [{
                "description": "Beta",
                "steps": [{"start_date": "2024-01-10", "planned_completion_date": "2024-02-01"}]
            }],
            "financials": {"accounts": [{
                "account_name": "Ops",
                "expected_expenditures": [{"amount": 100}],
                "actual_expenditures": [{"amount": 80}]
            }]}
        })
    }

    fn headings(doc: &Document) -> Vec<String> {
        doc.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Text { style: StyleName::Heading1, text } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn sections_follow_the_fixed_order() {
        let styles = ReportStyles::default();
        let doc = DocumentRenderer::new(&styles).build_document(&report(sample())).unwrap();
        assert_eq!(
            headings(&doc),
            vec![
                "Summary",
                "Achievements",
                "30/60/90-Day Plan",
                "Challenges",
                "Risks",
                "Financial Summary",
                "Distribution"
            ]
        );
        let charts = doc.blocks.iter().filter(|b| matches!(b, Block::Chart(_))).count();
        assert_eq!(charts, 2);
    }

    #[test]
    fn risk_points_are_coloured_by_severity() {
        let styles = ReportStyles::default();
        let doc = DocumentRenderer::new(&styles).build_document(&report(sample())).unwrap();
        let matrix = doc
            .blocks
            .iter()
            .find_map(|b| match b {
                Block::Chart(monthly_report_document::Chart::Scatter(chart)) => Some(chart),
                _ => None,
            })
            .unwrap();
        assert_eq!(matrix.points[0].color, styles.chart.high_risk_color);
        assert_eq!(matrix.points[1].color, styles.chart.low_risk_color);
    }

    #[test]
    fn out_of_range_risk_is_chart_data_error() {
        let mut data = sample();
        data["risks"][0]["likelihood"] = json!(7);
        let styles = ReportStyles::default();
        let err = DocumentRenderer::new(&styles).build_document(&report(data)).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::ChartData);
    }

    #[test]
    fn missing_logo_is_skipped() {
        let mut data = sample();
        data["logo_path"] = json!("/nonexistent/logo.png");
        let styles = ReportStyles::default();
        let doc = DocumentRenderer::new(&styles).build_document(&report(data)).unwrap();
        assert!(!doc.blocks.iter().any(|b| matches!(b, Block::Image(_))));
    }
}
