#![allow(dead_code)]

use chrono::NaiveDate;
use lopdf::Document as LopdfDocument;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// "Today" for every fixture, so plan buckets are stable.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

/// A complete reporting period touching every section.
pub fn sample_report() -> Value {
    json!({
        "month": "March",
        "year": 2024,
        "project_name": "Atlas Migration",
        "project_description": "Moving the billing stack to the new platform.",
        "version": "1.2",
        "project_start_date": "2023-10-01",
        "project_end_date": "2024-12-31",
        "expected_duration": "15 months",
        "authors": [
            {"name": "Sam Lee", "title": "Program Manager", "role": "Author",
             "contact_info": {"email": "sam@example.com", "phone": "555-0100"}}
        ],
        "recipients": [
            {"name": "Dana Ortiz", "title": "VP Engineering", "role": "Sponsor",
             "contact_info": {"email": "dana@example.com"}},
            {"name": "Lee Park", "title": "Finance", "role": "Reviewer"}
        ],
        "achievements": [
            {"category": "Infrastructure", "description": "Provisioned the staging cluster"},
            {"category": "Billing", "description": "Migrated invoice generation"},
            {"category": "Infrastructure", "description": "Enabled nightly backups"}
        ],
        "challenges": [
            {"category": "Staffing", "description": "One backend engineer on leave"}
        ],
        "risks": [
            {"description": "Vendor API deprecation", "likelihood": 4, "impact": 4,
             "mitigation_plan": "Pin the client version", "expected_effect": "Delays cut-over"},
            {"description": "Data loss during cut-over", "likelihood": 1, "impact": 5,
             "mitigation_plan": "Dry-run twice"}
        ],
        "roadmap": [
            {"description": "Payments cut-over", "steps": [
                {"start_date": "2024-03-20", "planned_completion_date": "2024-04-01"},
                {"start_date": "2024-03-25", "planned_completion_date": "2024-04-20"}
            ]},
            {"description": "Reporting rewrite", "steps": [
                {"start_date": "2024-04-20", "planned_completion_date": "2024-05-30"}
            ]},
            {"description": "Decommission legacy", "steps": [
                {"start_date": "2024-05-20", "planned_completion_date": "2024-06-30"}
            ]}
        ],
        "financials": {"accounts": [
            {"account_name": "Cloud",
                "expected_expenditures": [{"amount": 12000}, {"amount": 3000.5}],
             "actual_expenditures": [{"amount": 14250.25}]},
            {"account_name": "Contractors", "expected_expenditures": [{"amount": 20000}],
             "actual_expenditures": [{"amount": 18000}]}
        ]},
        "planned_expenditures": 35000.5,
        "actual_expenditures": 32250.25
    })
}

/// Writes `data` as `report.json` inside `dir`.
pub fn write_fixture(dir: &Path, data: &Value) -> PathBuf {
    let path = dir.join("report.json");
    std::fs::write(&path, serde_json::to_string_pretty(data).unwrap()).unwrap();
    path
}

/// Wrapper around a generated PDF with helper methods
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Self::from_bytes(std::fs::read(path)?)
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Text of every page, one page per line block.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for page_num in 1..=self.page_count() {
            if let Ok(page_text) = self.doc.extract_text(&[page_num as u32]) {
                text.push_str(&page_text);
                text.push('\n');
            }
        }
        text
    }
}
