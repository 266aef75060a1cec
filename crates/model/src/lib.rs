//! Typed data model for monthly project-status reports.
//!
//! The crate covers the first two stages of report generation:
//! - loading a reporting period from JSON into [`ReportData`] with validating
//!   deserialization (see [`loader`])
//! - computing the auxiliary fields every renderer needs (horizon dates, effort
//!   dates, category groups, plan buckets, financial totals) in [`derive`]
//!
//! Nothing here knows about HTML or PDF; renderers consume [`DerivedReport`].

mod clock;
pub mod data;
pub mod derive;
mod error;
pub mod loader;

pub use clock::{Clock, FixedClock, SystemClock};
pub use data::{
    Account, CategorizedItem, ContactInfo, Effort, Financials, LineItem, Person, ReportData,
    Risk, Step,
};
pub use derive::{
    AccountTotals, CategoryGroups, DerivedFields, DerivedReport, EffortSchedule, FinancialSummary,
    Horizon, PlanBuckets, PlanWindow, RiskPoint, derive,
};
pub use error::ModelError;

/// ISO calendar date format used for every date in the data file and the template context.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
