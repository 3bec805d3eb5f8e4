// Plain-text rendering of reports, charts and dataset listings

use std::io::{self, Write};

use torent_engine::chart::ChartSpec;
use torent_engine::report::{BylawSection, FireSection, Section, TimelineOutcome};
use torent_engine::Report;
use torent_io::DatasetStatus;

use crate::util::{bar, display_width, pad_right};

/// Widest a table column may grow before values are truncated.
const MAX_COLUMN_WIDTH: usize = 40;
/// Cells of the longest chart bar.
const BAR_WIDTH: usize = 40;

fn join_cells(cells: impl Iterator<Item = String>) -> String {
    cells.collect::<Vec<_>>().join("  ")
}

/// Print a table with a dashed separator under the header.
fn table<W: Write>(w: &mut W, headers: &[&str], rows: &[Vec<&str>]) -> io::Result<()> {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(c, h)| {
            rows.iter()
                .map(|r| display_width(r.get(c).copied().unwrap_or("")))
                .chain(std::iter::once(display_width(h)))
                .max()
                .unwrap_or(0)
                .min(MAX_COLUMN_WIDTH)
        })
        .collect();

    let header = join_cells(headers.iter().zip(&widths).map(|(h, &cw)| pad_right(h, cw)));
    writeln!(w, "  {}", header.trim_end())?;
    writeln!(w, "  {}", join_cells(widths.iter().map(|&cw| "-".repeat(cw))))?;
    for row in rows {
        let cells = widths
            .iter()
            .enumerate()
            .map(|(c, &cw)| pad_right(row.get(c).copied().unwrap_or(""), cw));
        writeln!(w, "  {}", join_cells(cells).trim_end())?;
    }
    Ok(())
}

/// Draw a chart as one labelled horizontal bar per point.
pub fn chart<W: Write>(w: &mut W, spec: &ChartSpec) -> io::Result<()> {
    writeln!(w, "{}", spec.title)?;
    if spec.points.is_empty() {
        writeln!(w, "  (no data)")?;
        return Ok(());
    }

    let label_width = spec
        .points
        .iter()
        .map(|(label, _)| display_width(label))
        .max()
        .unwrap_or(0)
        .min(MAX_COLUMN_WIDTH);
    let max = spec.max_value();

    for (label, value) in &spec.points {
        let drawn = bar(*value, max, BAR_WIDTH);
        let gap = if drawn.is_empty() { "" } else { " " };
        writeln!(w, "  {}  {drawn}{gap}{value}", pad_right(label, label_width))?;
    }
    Ok(())
}

fn timeline<W: Write>(w: &mut W, outcome: &TimelineOutcome) -> io::Result<()> {
    if let TimelineOutcome::Failed { error } = outcome {
        return writeln!(w, "Timeline unavailable: {error}");
    }
    match outcome.chart() {
        Some(spec) => chart(w, &spec),
        None => Ok(()),
    }
}

fn bylaw<W: Write>(w: &mut W, section: &Section<BylawSection>) -> io::Result<()> {
    writeln!(w, "== Bylaw Investigations ==")?;
    let section = match section {
        Section::Available(s) => s,
        Section::Unavailable { error } => return writeln!(w, "Unavailable: {error}"),
    };
    let (Some(records), Some(summary)) = (section.result.records(), section.summary.as_ref()) else {
        return writeln!(w, "No bylaw investigations found for this address.");
    };

    writeln!(w)?;
    writeln!(w, "Investigation Summary")?;
    let rows: Vec<Vec<&str>> = records
        .investigations
        .iter()
        .map(|i| vec![i.issue.as_str(), i.in_type.as_str(), i.status.as_str(), i.in_date.as_str()])
        .collect();
    table(w, &["Issue", "InType", "Status", "InDate"], &rows)?;
    writeln!(w)?;
    chart(w, &ChartSpec::status("Investigation Status", &summary.investigation_status))?;
    writeln!(w)?;
    timeline(w, &summary.timeline)?;

    writeln!(w)?;
    writeln!(w, "Deficiencies")?;
    if let Some(error) = &section.deficiencies_unavailable {
        return writeln!(w, "Unavailable: {error}");
    }
    if records.deficiencies.is_empty() {
        return writeln!(w, "No deficiencies found.");
    }
    let rows: Vec<Vec<&str>> = records
        .deficiencies
        .iter()
        .map(|d| vec![d.desc.as_str(), d.location.as_str(), d.status.as_str()])
        .collect();
    table(w, &["Desc", "Location", "Status"], &rows)?;
    writeln!(w)?;
    chart(w, &ChartSpec::status("Deficiency Status", &summary.deficiency_status))
}

fn fire<W: Write>(w: &mut W, section: &Section<FireSection>) -> io::Result<()> {
    writeln!(w, "== Fire Code Violations ==")?;
    let section = match section {
        Section::Available(s) => s,
        Section::Unavailable { error } => return writeln!(w, "Unavailable: {error}"),
    };
    let (Some(records), Some(summary)) = (section.result.records(), section.summary.as_ref()) else {
        return writeln!(w, "No fire code inspections found for this address.");
    };

    writeln!(w)?;
    writeln!(w, "Inspection Summary")?;
    let rows: Vec<Vec<&str>> = records
        .inspections
        .iter()
        .map(|i| vec![i.open_date.as_str(), i.violation_description.as_str()])
        .collect();
    table(w, &["INSPECTIONS_OPENDATE", "VIOLATION_DESCRIPTION"], &rows)?;
    writeln!(w)?;
    writeln!(w, "Violations")?;
    timeline(w, &summary.timeline)
}

/// Numbered "did you mean" list. Nothing is printed for an empty list.
pub fn suggestions<W: Write>(w: &mut W, suggestions: &[String]) -> io::Result<()> {
    if suggestions.is_empty() {
        return Ok(());
    }
    writeln!(w, "Did you mean:")?;
    for (i, s) in suggestions.iter().enumerate() {
        writeln!(w, "  {}. {s}", i + 1)?;
    }
    Ok(())
}

/// Full text report for one query.
pub fn report<W: Write>(w: &mut W, report: &Report) -> io::Result<()> {
    let pooled = report.suggestions();

    let Some(address) = report.resolved_address() else {
        writeln!(w, "No exact matches found.")?;
        for error in [unavailable(&report.bylaw), unavailable(&report.fire)].into_iter().flatten() {
            writeln!(w, "Unavailable: {error}")?;
        }
        return suggestions(w, &pooled);
    };

    writeln!(w, "Results for {address}")?;
    writeln!(w)?;
    bylaw(w, &report.bylaw)?;
    writeln!(w)?;
    fire(w, &report.fire)?;
    if !pooled.is_empty() {
        writeln!(w)?;
        suggestions(w, &pooled)?;
    }
    Ok(())
}

fn unavailable<T>(section: &Section<T>) -> Option<String> {
    match section {
        Section::Available(_) => None,
        Section::Unavailable { error } => Some(error.to_string()),
    }
}

/// Dataset listing for `torent datasets`.
pub fn datasets<W: Write>(w: &mut W, statuses: &[DatasetStatus]) -> io::Result<()> {
    let counts: Vec<String> = statuses
        .iter()
        .map(|s| s.rows.map_or_else(|| "-".to_string(), |n| n.to_string()))
        .collect();
    let paths: Vec<String> = statuses.iter().map(|s| s.path.display().to_string()).collect();

    let rows: Vec<Vec<&str>> = statuses
        .iter()
        .zip(counts.iter().zip(&paths))
        .map(|(s, (count, path))| {
            let state = if s.is_available() { "available" } else { "unavailable" };
            vec![s.dataset, state, count.as_str(), s.error.as_deref().unwrap_or(path.as_str())]
        })
        .collect();
    table(w, &["DATASET", "STATUS", "ROWS", "SOURCE"], &rows)
}
