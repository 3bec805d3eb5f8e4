use std::collections::BTreeSet;

use serde::{Serialize, Serializer};

use crate::aggregate::{sort_chronologically, status_counts, timeline};
use crate::chart::ChartSpec;
use crate::error::{EngineError, SearchError};
use crate::joiner::{search_bylaw, search_fire};
use crate::model::{
    AddressRecord, BylawRecords, Deficiency, FireRecords, Inspection, Investigation, MatchOptions,
    MatchResult, StatusCount, Timeline, TimelineView,
};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// The bylaw tables a bylaw lookup needs.
///
/// Addresses and investigations are required. Deficiencies may be missing;
/// the lookup then runs without them and says so.
#[derive(Debug, Clone)]
pub struct BylawSources<'a> {
    pub addresses: &'a [AddressRecord],
    pub investigations: &'a [Investigation],
    pub deficiencies: Result<&'a [Deficiency], SearchError>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub matching: MatchOptions,
    pub view: TimelineView,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A timeline chart, or the reason it could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TimelineOutcome {
    Ready { timeline: Timeline },
    Failed {
        #[serde(serialize_with = "display")]
        error: EngineError,
    },
}

impl From<Result<Timeline, EngineError>> for TimelineOutcome {
    fn from(r: Result<Timeline, EngineError>) -> Self {
        match r {
            Ok(timeline) => Self::Ready { timeline },
            Err(error) => Self::Failed { error },
        }
    }
}

impl TimelineOutcome {
    pub fn chart(&self) -> Option<ChartSpec> {
        match self {
            Self::Ready { timeline } => Some(ChartSpec::timeline(timeline)),
            Self::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BylawSummary {
    pub investigation_status: Vec<StatusCount>,
    pub deficiency_status: Vec<StatusCount>,
    pub timeline: TimelineOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BylawSection {
    pub result: MatchResult<BylawRecords>,
    /// Present when the address was found.
    pub summary: Option<BylawSummary>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "display_opt")]
    pub deficiencies_unavailable: Option<SearchError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FireSummary {
    pub timeline: TimelineOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FireSection {
    /// Inspections are in ascending open-date order.
    pub result: MatchResult<FireRecords>,
    pub summary: Option<FireSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "availability", rename_all = "snake_case")]
pub enum Section<T> {
    Available(T),
    Unavailable {
        #[serde(serialize_with = "display")]
        error: SearchError,
    },
}

impl<T> Section<T> {
    pub fn available(&self) -> Option<&T> {
        match self {
            Self::Available(t) => Some(t),
            Self::Unavailable { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub query: String,
    pub view: TimelineView,
    pub bylaw: Section<BylawSection>,
    pub fire: Section<FireSection>,
}

fn display<T: std::fmt::Display, S: Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(value)
}

fn display_opt<T: std::fmt::Display, S: Serializer>(value: &Option<T>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => s.collect_str(v),
        None => s.serialize_none(),
    }
}

impl Report {
    fn bylaw_result(&self) -> Option<&MatchResult<BylawRecords>> {
        self.bylaw.available().map(|s| &s.result)
    }

    fn fire_result(&self) -> Option<&MatchResult<FireRecords>> {
        self.fire.available().map(|s| &s.result)
    }

    /// Bylaw address if the bylaw lookup found one, else the fire address.
    pub fn resolved_address(&self) -> Option<&str> {
        self.bylaw_result()
            .and_then(MatchResult::address)
            .or_else(|| self.fire_result().and_then(MatchResult::address))
    }

    /// Neither lookup found an address (unavailable sections count as not found).
    pub fn is_no_match(&self) -> bool {
        !self.bylaw_result().is_some_and(MatchResult::is_found)
            && !self.fire_result().is_some_and(MatchResult::is_found)
    }

    /// Deduplicated, sorted union of both sections' suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        let mut pooled: BTreeSet<&str> = BTreeSet::new();
        if let Some(r) = self.bylaw_result() {
            pooled.extend(r.suggestions().iter().map(String::as_str));
        }
        if let Some(r) = self.fire_result() {
            pooled.extend(r.suggestions().iter().map(String::as_str));
        }
        pooled.into_iter().map(str::to_string).collect()
    }

    /// Every chart the report can draw, keyed by a file-friendly slug.
    pub fn charts(&self) -> Vec<(&'static str, ChartSpec)> {
        let mut charts = Vec::new();

        if let Some(summary) = self.bylaw.available().and_then(|s| s.summary.as_ref()) {
            charts.push((
                "investigation-status",
                ChartSpec::status("Investigation Status", &summary.investigation_status),
            ));
            if let Some(chart) = summary.timeline.chart() {
                charts.push(("investigation-timeline", chart));
            }
            if !summary.deficiency_status.is_empty() {
                charts.push((
                    "deficiency-status",
                    ChartSpec::status("Deficiency Status", &summary.deficiency_status),
                ));
            }
        }

        if let Some(summary) = self.fire.available().and_then(|s| s.summary.as_ref()) {
            if let Some(chart) = summary.timeline.chart() {
                charts.push(("inspection-timeline", chart));
            }
        }

        charts
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

fn bylaw_section(query: &str, sources: BylawSources<'_>, options: &QueryOptions) -> BylawSection {
    let (deficiencies, deficiencies_unavailable) = match sources.deficiencies {
        Ok(rows) => (rows, None),
        Err(error) => {
            tracing::warn!(%error, "bylaw lookup without deficiencies");
            (&[][..], Some(error))
        }
    };
    let result = search_bylaw(
        query,
        sources.addresses,
        sources.investigations,
        deficiencies,
        &options.matching,
    );
    let summary = result.records().map(|r| BylawSummary {
        investigation_status: status_counts(&r.investigations),
        deficiency_status: status_counts(&r.deficiencies),
        timeline: timeline(&r.investigations, options.view).into(),
    });
    BylawSection {
        result,
        summary,
        deficiencies_unavailable,
    }
}

fn fire_section(query: &str, inspections: &[Inspection], options: &QueryOptions) -> FireSection {
    let mut result = search_fire(query, inspections, &options.matching);
    if let MatchResult::Found { records, .. } = &mut result {
        sort_chronologically(&mut records.inspections);
    }
    let summary = result.records().map(|r| FireSummary {
        timeline: timeline(&r.inspections, options.view).into(),
    });
    FireSection { result, summary }
}

/// Run both lookups for one query.
///
/// Returns `None` for a blank query: nothing is resolved and nothing renders.
/// The bylaw and fire sections are independent; an unavailable source only
/// marks its own section.
pub fn build_report(
    query: &str,
    bylaw: Result<BylawSources<'_>, SearchError>,
    fire: Result<&[Inspection], SearchError>,
    options: &QueryOptions,
) -> Option<Report> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }

    let bylaw = match bylaw {
        Ok(sources) => Section::Available(bylaw_section(query, sources, options)),
        Err(error) => {
            tracing::warn!(%error, "bylaw lookup skipped");
            Section::Unavailable { error }
        }
    };
    let fire = match fire {
        Ok(inspections) => Section::Available(fire_section(query, inspections, options)),
        Err(error) => {
            tracing::warn!(%error, "fire lookup skipped");
            Section::Unavailable { error }
        }
    };

    let report = Report {
        query: query.to_string(),
        view: options.view,
        bylaw,
        fire,
    };
    tracing::info!(
        query = %report.query,
        address = report.resolved_address().unwrap_or("-"),
        "query complete"
    );
    Some(report)
}
