//! `torent-engine`: address resolution and record history for Toronto
//! bylaw investigations and fire-code inspections.
//!
//! Pure engine crate: receives pre-loaded records, returns matched and
//! aggregated views. No CLI or IO dependencies.

pub mod aggregate;
pub mod chart;
pub mod error;
pub mod joiner;
pub mod model;
pub mod report;
pub mod resolver;

pub use chart::ChartSpec;
pub use error::{EngineError, SearchError};
pub use model::{MatchOptions, MatchResult, Record, TimelineView};
pub use report::{build_report, BylawSources, QueryOptions, Report};
