//! Paginated report documents.
//!
//! A renderer-independent description of a report ([`Document`] made of
//! [`Block`]s), the immutable style configuration it is laid out with
//! ([`ReportStyles`]), chart models with their data validation ([`chart`]), and
//! the flow layout that turns blocks into positioned elements on pages
//! ([`LayoutEngine`]). Turning pages into PDF bytes is the job of a backend.

pub mod block;
pub mod chart;
mod engine;
mod error;
pub mod style;
pub mod text;

pub use block::{Block, Column, Document, ImageBlock, ImageData, Table};
pub use chart::{BarChart, BarSeries, Chart, ChartError, ScatterChart, ScatterPoint};
pub use engine::{LayoutElement, LayoutEngine, Page, PositionedElement, Stroke, TextRun};
pub use error::LayoutError;
pub use style::{
    ChartStyle, Color, FontFace, Margins, PageSetup, PageSize, ReportStyles, StyleName,
    TableStyle, TextAlign, TextStyle,
};
