//! Derived fields: everything a renderer needs that is not stored in the data file.

use crate::clock::Clock;
use crate::data::{Account, CategorizedItem, Effort, ReportData};
use crate::error::ModelError;
use crate::ISO_DATE_FORMAT;
use chrono::{Days, NaiveDate};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::Serialize;
use serde_json::{Map, Value};

/// A report with its derived fields attached.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedReport {
    pub data: ReportData,
    pub fields: DerivedFields,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedFields {
    pub horizon: Horizon,
    /// One schedule per roadmap effort, in roadmap order.
    pub efforts: Vec<EffortSchedule>,
    pub achievements: CategoryGroups,
    pub challenges: CategoryGroups,
    pub plans: PlanBuckets,
    pub financials: FinancialSummary,
    pub risk_points: Vec<RiskPoint>,
}

/// Computes every derived field for `data`, reading "today" from `clock`.
pub fn derive(data: ReportData, clock: &dyn Clock) -> Result<DerivedReport, ModelError> {
    let horizon = Horizon::from_today(clock.today())?;

    let efforts = data
        .roadmap
        .iter()
        .enumerate()
        .map(|(index, effort)| EffortSchedule::from_effort(index, effort))
        .collect::<Result<Vec<_>, _>>()?;

    let plans = PlanBuckets::from_schedules(&horizon, &efforts);
    for effort in &plans.unscheduled {
        warn!(
            "Roadmap effort '{}' starts on {}, outside the 90-day planning window from {}; \
                it is left out of the plan sections",
            effort.description, effort.first_step_start, horizon.now
        );
    }

    let fields = DerivedFields {
        achievements: CategoryGroups::from_items(&data.achievements),
        challenges: CategoryGroups::from_items(&data.challenges),
        financials: FinancialSummary::from_accounts(&data.financials.accounts),
        risk_points: RiskPoint::from_risks(&data),
        horizon,
        efforts,
        plans,
    };
    debug!(
        "Derived {} efforts, {} achievement categories, {} challenge categories, {} accounts",
        fields.efforts.len(),
        fields.achievements.len(),
        fields.challenges.len(),
        fields.financials.accounts.len()
    );

    Ok(DerivedReport { data, fields })
}

impl DerivedReport {
    /// Builds the JSON object handed to templates.
    ///
    /// It is the full data document with `now`, `thirty_days`, `sixty_days` and
    /// `ninety_days` added, `achievements`/`challenges` replaced by their category
    /// groups, and every roadmap effort carrying its `start_date` and
    /// `planned_completion_date`. `plans`, `financial_totals` and `risk_points`
    /// expose the remaining derived fields.
    pub fn template_context(&self) -> Result<Value, ModelError> {
        let mut context = match to_value(&self.data)? {
            Value::Object(map) => map,
            other => {
                return Err(ModelError::InvalidData {
                    origin: "template context".to_string(),
                    message: format!("report data serialized to a non-object: {other}"),
                });
            }
        };

        let horizon = &self.fields.horizon;
        context.insert("now".into(), iso(horizon.now));
        context.insert("thirty_days".into(), iso(horizon.thirty_days));
        context.insert("sixty_days".into(), iso(horizon.sixty_days));
        context.insert("ninety_days".into(), iso(horizon.ninety_days));

        if let Some(Value::Array(roadmap)) = context.get_mut("roadmap") {
            for (effort, schedule) in roadmap.iter_mut().zip(&self.fields.efforts) {
                if let Value::Object(effort) = effort {
                    effort.insert("start_date".into(), iso(schedule.start_date));
                    effort.insert(
                        "planned_completion_date".into(),
                        iso(schedule.planned_completion_date),
                    );
                }
            }
        }

        context.insert("achievements".into(), to_value(&self.fields.achievements)?);
        context.insert("challenges".into(), to_value(&self.fields.challenges)?);
        context.insert("plans".into(), to_value(&self.fields.plans)?);
        context.insert("financial_totals".into(), to_value(&self.fields.financials)?);
        context.insert("risk_points".into(), to_value(&self.fields.risk_points)?);

        Ok(Value::Object(context))
    }
}

fn iso(date: NaiveDate) -> Value {
    Value::String(date.format(ISO_DATE_FORMAT).to_string())
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, ModelError> {
    serde_json::to_value(value).map_err(|source| ModelError::Json {
        origin: "template context".to_string(),
        source,
    })
}

/// `now` and the three planning horizons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Horizon {
    pub now: NaiveDate,
    pub thirty_days: NaiveDate,
    pub sixty_days: NaiveDate,
    pub ninety_days: NaiveDate,
}

impl Horizon {
    pub fn from_today(today: NaiveDate) -> Result<Self, ModelError> {
        let offset = |days: u64| {
            today
                .checked_add_days(Days::new(days))
                .ok_or(ModelError::DateOverflow { date: today, days })
        };
        Ok(Self {
            now: today,
            thirty_days: offset(30)?,
            sixty_days: offset(60)?,
            ninety_days: offset(90)?,
        })
    }

    /// The half-open planning window `date` falls in, if any.
    pub fn window(&self, date: NaiveDate) -> Option<PlanWindow> {
        if date < self.now || date >= self.ninety_days {
            None
        } else if date < self.thirty_days {
            Some(PlanWindow::Next30Days)
        } else if date < self.sixty_days {
            Some(PlanWindow::Days30To60)
        } else {
            Some(PlanWindow::Days60To90)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanWindow {
    Next30Days,
    Days30To60,
    Days60To90,
}

/// The aggregated dates of one roadmap effort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffortSchedule {
    /// Position of the effort in the roadmap.
    pub index: usize,
    pub description: String,
    /// Earliest step start.
    pub start_date: NaiveDate,
    /// Latest step completion.
    pub planned_completion_date: NaiveDate,
    /// Start of the first listed step; this is what plan bucketing looks at.
    pub first_step_start: NaiveDate,
    pub step_count: usize,
}

impl EffortSchedule {
    pub fn from_effort(index: usize, effort: &Effort) -> Result<Self, ModelError> {
        let empty = || ModelError::EmptyEffort {
            effort: effort.description.clone(),
        };
        let first_step_start = effort.steps.first().ok_or_else(empty)?.start_date;
        let start_date = effort
            .steps
            .iter()
            .map(|step| step.start_date)
            .min()
            .ok_or_else(empty)?;
        let planned_completion_date = effort
            .steps
            .iter()
            .map(|step| step.planned_completion_date)
            .max()
            .ok_or_else(empty)?;

        Ok(Self {
            index,
            description: effort.description.clone(),
            start_date,
            planned_completion_date,
            first_step_start,
            step_count: effort.steps.len(),
        })
    }
}

/// Efforts sorted into the 30/60/90-day plan sections.
///
/// An effort lands in exactly one bucket, chosen by its first step's start date.
/// Efforts starting before today or 90+ days out go to `unscheduled` and are not
/// shown in the plan sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanBuckets {
    pub next_30_days: Vec<EffortSchedule>,
    pub days_30_to_60: Vec<EffortSchedule>,
    pub days_60_to_90: Vec<EffortSchedule>,
    pub unscheduled: Vec<EffortSchedule>,
}

impl PlanBuckets {
    pub fn from_schedules(horizon: &Horizon, schedules: &[EffortSchedule]) -> Self {
        let mut buckets = Self::default();
        for schedule in schedules {
            let bucket = match horizon.window(schedule.first_step_start) {
                Some(PlanWindow::Next30Days) => &mut buckets.next_30_days,
                Some(PlanWindow::Days30To60) => &mut buckets.days_30_to_60,
                Some(PlanWindow::Days60To90) => &mut buckets.days_60_to_90,
                None => &mut buckets.unscheduled,
            };
            bucket.push(schedule.clone());
        }
        buckets
    }

    pub fn bucket(&self, window: PlanWindow) -> &[EffortSchedule] {
        match window {
            PlanWindow::Next30Days => &self.next_30_days,
            PlanWindow::Days30To60 => &self.days_30_to_60,
            PlanWindow::Days60To90 => &self.days_60_to_90,
        }
    }
}

/// Descriptions grouped by category: categories in order of first appearance,
/// descriptions in input order within each category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CategoryGroups(IndexMap<String, Vec<String>>);

impl CategoryGroups {
    pub fn from_items<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a CategorizedItem>,
    {
        let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();
        for item in items {
            groups
                .entry(item.category.clone())
                .or_default()
                .push(item.description.clone());
        }
        Self(groups)
    }

    pub fn get(&self, category: &str) -> Option<&[String]> {
        self.0.get(category).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(category, items)| (category.as_str(), items.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountTotals {
    pub account_name: String,
    pub expected_total: f64,
    pub actual_total: f64,
    /// `expected_total - actual_total`; negative means overspent.
    pub variance: f64,
}

impl AccountTotals {
    pub fn from_account(account: &Account) -> Self {
        let expected_total: f64 = account.expected_expenditures.iter().map(|i| i.amount).sum();
        let actual_total: f64 = account.actual_expenditures.iter().map(|i| i.amount).sum();
        Self {
            account_name: account.account_name.clone(),
            expected_total,
            actual_total,
            variance: expected_total - actual_total,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinancialSummary {
    pub accounts: Vec<AccountTotals>,
    pub expected_total: f64,
    pub actual_total: f64,
    pub variance: f64,
}

impl FinancialSummary {
    pub fn from_accounts(accounts: &[Account]) -> Self {
        let accounts: Vec<AccountTotals> =
            accounts.iter().map(AccountTotals::from_account).collect();
        let expected_total: f64 = accounts.iter().map(|a| a.expected_total).sum();
        let actual_total: f64 = accounts.iter().map(|a| a.actual_total).sum();
        Self {
            accounts,
            expected_total,
            actual_total,
            variance: expected_total - actual_total,
        }
    }
}

/// One risk placed on the likelihood × impact matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskPoint {
    /// `R1`, `R2`, ... in input order.
    pub label: String,
    pub description: String,
    pub likelihood: f64,
    pub impact: f64,
}

impl RiskPoint {
    fn from_risks(data: &ReportData) -> Vec<Self> {
        data.risks
            .iter()
            .enumerate()
            .map(|(i, risk)| Self {
                label: format!("R{}", i + 1),
                description: risk.description.clone(),
                likelihood: risk.likelihood,
                impact: risk.impact,
            })
            .collect()
    }

    /// likelihood × impact.
    pub fn score(&self) -> f64 {
        self.likelihood * self.impact
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::data::{LineItem, Step};
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, ISO_DATE_FORMAT).unwrap()
    }

    fn step(start: &str, end: &str) -> Step {
        Step {
            description: None,
            start_date: date(start),
            planned_completion_date: date(end),
            extra: Map::new(),
        }
    }

    fn effort(description: &str, steps: Vec<Step>) -> Effort {
        Effort {
            description: description.to_string(),
            steps,
            extra: Map::new(),
        }
    }

    fn item(category: &str, description: &str) -> CategorizedItem {
        CategorizedItem {
            category: category.to_string(),
            description: description.to_string(),
        }
    }

    fn report(roadmap: Vec<Effort>) -> ReportData {
        ReportData::from_value(json!({
            "project_name": "Phoenix",
            "achievements": [],
            "challenges": [],
            "roadmap": []
        }))
        .map(|mut data| {
            data.roadmap = roadmap;
            data
        })
        .unwrap()
    }

    fn clock() -> FixedClock {
        FixedClock(date("2024-01-01"))
    }

    #[test]
    fn effort_dates_are_min_start_and_max_completion() {
        let schedule = EffortSchedule::from_effort(
            0,
            &effort(
                "Migrate",
                vec![
                    step("2024-01-01", "2024-02-01"),
                    step("2024-01-15", "2024-03-01"),
                ],
            ),
        )
        .unwrap();
        assert_eq!(schedule.start_date, date("2024-01-01"));
        assert_eq!(schedule.planned_completion_date, date("2024-03-01"));
    }

    #[test]
    fn effort_dates_ignore_step_order() {
        let schedule = EffortSchedule::from_effort(
            0,
            &effort(
                "Migrate",
                vec![
                    step("2024-02-10", "2024-04-01"),
                    step("2024-01-05", "2024-01-20"),
                    step("2024-03-01", "2024-03-15"),
                ],
            ),
        )
        .unwrap();
        assert_eq!(schedule.start_date, date("2024-01-05"));
        assert_eq!(schedule.planned_completion_date, date("2024-04-01"));
        assert_eq!(schedule.first_step_start, date("2024-02-10"));
    }

    #[test]
    fn empty_steps_is_an_error_not_a_default() {
        let result = EffortSchedule::from_effort(0, &effort("Nothing", vec![]));
        assert!(matches!(result, Err(ModelError::EmptyEffort { .. })));

        let result = derive(report(vec![effort("Nothing", vec![])]), &clock());
        assert!(matches!(result, Err(ModelError::EmptyEffort { .. })));
    }

    #[test]
    fn grouping_preserves_input_order() {
        let groups = CategoryGroups::from_items(&[
            item("infra", "A"),
            item("product", "X"),
            item("infra", "B"),
        ]);
        assert_eq!(groups.get("infra"), Some(&["A".to_string(), "B".to_string()][..]));
        let categories: Vec<&str> = groups.iter().map(|(c, _)| c).collect();
        assert_eq!(categories, vec!["infra", "product"]);
        assert_eq!(
            serde_json::to_value(&groups).unwrap(),
            json!({"infra": ["A", "B"], "product": ["X"]})
        );
    }

    #[test]
    fn horizon_dates_are_strictly_increasing() {
        let horizon = Horizon::from_today(date("2024-02-15")).unwrap();
        assert!(horizon.now < horizon.thirty_days);
        assert!(horizon.thirty_days < horizon.sixty_days);
        assert!(horizon.sixty_days < horizon.ninety_days);
        assert_eq!(horizon.thirty_days, date("2024-03-16"));
    }

    #[test]
    fn horizon_overflow_is_reported() {
        assert!(matches!(
            Horizon::from_today(NaiveDate::MAX),
            Err(ModelError::DateOverflow { .. })
        ));
    }

    #[test]
    fn buckets_use_first_step_and_half_open_windows() {
        let data = report(vec![
            effort("today", vec![step("2024-01-01", "2024-01-10")]),
            effort("day 30", vec![step("2024-01-31", "2024-02-10")]),
            effort("day 89", vec![step("2024-03-30", "2024-04-10")]),
            effort("day 90", vec![step("2024-03-31", "2024-04-10")]),
            effort("past", vec![step("2023-12-31", "2024-01-10")]),
            effort(
                "first step decides",
                vec![step("2024-02-15", "2024-03-01"), step("2023-12-01", "2023-12-31")],
            ),
        ]);
        let derived = derive(data, &clock()).unwrap();
        let names = |efforts: &[EffortSchedule]| -> Vec<String> {
            efforts.iter().map(|e| e.description.clone()).collect()
        };
        let plans = &derived.fields.plans;
        assert_eq!(names(&plans.next_30_days), vec!["today"]);
        assert_eq!(names(&plans.days_30_to_60), vec!["day 30", "first step decides"]);
        assert_eq!(names(&plans.days_60_to_90), vec!["day 89"]);
        assert_eq!(names(&plans.unscheduled), vec!["day 90", "past"]);
    }

    #[test]
    fn account_totals_sum_each_side_independently() {
        let line = |amount: f64| LineItem {
            amount,
            description: None,
            extra: Map::new(),
        };
        let account = Account {
            account_name: "Cloud".to_string(),
            expected_expenditures: vec![line(100.0), line(250.5)],
            actual_expenditures: vec![line(300.0)],
        };
        let totals = AccountTotals::from_account(&account);
        assert_eq!(totals.expected_total, 350.5);
        assert_eq!(totals.actual_total, 300.0);
        assert_eq!(totals.variance, 50.5);

        let summary = FinancialSummary::from_accounts(&[account.clone(), account]);
        assert_eq!(summary.expected_total, 701.0);
        assert_eq!(summary.actual_total, 600.0);
    }

    #[test]
    fn template_context_carries_derived_fields() {
        let mut data = report(vec![effort(
            "Migrate",
            vec![
                step("2024-01-01", "2024-02-01"),
                step("2024-01-15", "2024-03-01"),
            ],
        )]);
        data.achievements = vec![item("infra", "A"), item("infra", "B")];
        let context = derive(data, &clock()).unwrap().template_context().unwrap();

        assert_eq!(context["now"], json!("2024-01-01"));
        assert_eq!(context["ninety_days"], json!("2024-03-31"));
        assert_eq!(context["achievements"], json!({"infra": ["A", "B"]}));
        assert_eq!(context["challenges"], json!({}));
        assert_eq!(context["roadmap"][0]["start_date"], json!("2024-01-01"));
        assert_eq!(context["roadmap"][0]["planned_completion_date"], json!("2024-03-01"));
        assert_eq!(context["plans"]["next_30_days"][0]["description"], json!("Migrate"));
        assert_eq!(context["project_name"], json!("Phoenix"));
    }
}
