//! The typed shape of one reporting period, as read from the data file.
//!
//! Every struct that templates commonly extend keeps unknown keys in an `extra`
//! map, so a template can still reference fields this model does not name.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    #[serde(default, deserialize_with = "string_or_number")]
    pub month: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub year: Option<String>,
    pub project_name: String,
    #[serde(default)]
    pub project_description: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub version: Option<String>,
    #[serde(default)]
    pub logo_path: Option<String>,
    #[serde(default)]
    pub project_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub project_end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub expected_duration: Option<String>,
    #[serde(default)]
    pub authors: Vec<Person>,
    #[serde(default)]
    pub recipients: Vec<Person>,
    pub achievements: Vec<CategorizedItem>,
    pub challenges: Vec<CategorizedItem>,
    #[serde(default)]
    pub risks: Vec<Risk>,
    pub roadmap: Vec<Effort>,
    #[serde(default)]
    pub financials: Financials,
    #[serde(default)]
    pub planned_expenditures: Option<f64>,
    #[serde(default)]
    pub actual_expenditures: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReportData {
    /// "March 2024", "March", "2024" or `None`, depending on which parts are present.
    pub fn reporting_period(&self) -> Option<String> {
        match (&self.month, &self.year) {
            (Some(month), Some(year)) => Some(format!("{month} {year}")),
            (Some(part), None) | (None, Some(part)) => Some(part.clone()),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub contact_info: Option<ContactInfo>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// An achievement or a challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedItem {
    pub category: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    pub description: String,
    pub likelihood: f64,
    pub impact: f64,
    #[serde(default)]
    pub mitigation_plan: Option<String>,
    #[serde(default)]
    pub expected_effect: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A roadmap work item; its dates come from its steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effort {
    pub description: String,
    pub steps: Vec<Step>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub planned_completion_date: NaiveDate,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Financials {
    #[serde(default)]
    pub accounts: Vec<Account>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_name: String,
    #[serde(default)]
    pub expected_expenditures: Vec<LineItem>,
    #[serde(default)]
    pub actual_expenditures: Vec<LineItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(Number),
}

/// Accepts `"March"` as well as `3`, and `"2024"` as well as `2024`.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|value| match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }),
    )
}
