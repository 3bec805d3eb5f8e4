use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::error::EngineError;
use crate::model::{Dated, MonthCount, StatusCount, Timeline, TimelineView, WithStatus, YearCount};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Parse a date cell in any of the layouts the open-data exports use.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(value, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive())
}

/// Parsed dates of all rows with a non-blank date cell.
///
/// Blank cells are missing values and are skipped; any other unparseable
/// value fails the whole call.
fn collect_dates<R: Dated>(rows: &[R]) -> Result<Vec<NaiveDate>, EngineError> {
    let mut dates = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let raw = row.date();
        if raw.trim().is_empty() {
            continue;
        }
        let date = parse_date(raw).ok_or_else(|| EngineError::DateParse {
            column: R::DATE_COLUMN.to_string(),
            row: i + 1,
            value: raw.to_string(),
        })?;
        dates.push(date);
    }
    Ok(dates)
}

/// Count rows per distinct non-blank status.
///
/// Ordered by descending count; equal counts keep first-seen order.
pub fn status_counts<R: WithStatus>(rows: &[R]) -> Vec<StatusCount> {
    let mut counts: Vec<StatusCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for row in rows {
        let status = row.status().trim();
        if status.is_empty() {
            continue;
        }
        match index.get(status) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(status, counts.len());
                counts.push(StatusCount {
                    status: status.to_string(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Rows per calendar year, ascending. Years between the first and last
/// observed year with no rows appear with count 0.
pub fn yearly_timeline<R: Dated>(rows: &[R]) -> Result<Vec<YearCount>, EngineError> {
    let mut groups: BTreeMap<i32, usize> = BTreeMap::new();
    for date in collect_dates(rows)? {
        *groups.entry(date.year()).or_insert(0) += 1;
    }

    let (Some(&first), Some(&last)) = (groups.keys().next(), groups.keys().next_back()) else {
        return Ok(Vec::new());
    };

    Ok((first..=last)
        .map(|year| YearCount {
            year,
            count: groups.get(&year).copied().unwrap_or(0),
        })
        .collect())
}

/// Rows per (year, month), ascending, gap-filled like [`yearly_timeline`].
pub fn monthly_timeline<R: Dated>(rows: &[R]) -> Result<Vec<MonthCount>, EngineError> {
    let mut groups: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for date in collect_dates(rows)? {
        *groups.entry((date.year(), date.month())).or_insert(0) += 1;
    }

    let (Some(&first), Some(&last)) = (groups.keys().next(), groups.keys().next_back()) else {
        return Ok(Vec::new());
    };

    let mut out = Vec::new();
    let (mut year, mut month) = first;
    loop {
        out.push(MonthCount {
            year,
            month,
            count: groups.get(&(year, month)).copied().unwrap_or(0),
        });
        if (year, month) == last {
            break;
        }
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    Ok(out)
}

pub fn timeline<R: Dated>(rows: &[R], view: TimelineView) -> Result<Timeline, EngineError> {
    match view {
        TimelineView::Yearly => yearly_timeline(rows).map(Timeline::Yearly),
        TimelineView::Monthly => monthly_timeline(rows).map(Timeline::Monthly),
    }
}

/// Stable sort by parsed date; rows whose date is blank or unparseable go first.
pub fn sort_chronologically<R: Dated>(rows: &mut [R]) {
    rows.sort_by_cached_key(|r| parse_date(r.date()));
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        status: &'static str,
        date: &'static str,
    }

    impl WithStatus for Row {
        fn status(&self) -> &str {
            self.status
        }
    }

    impl Dated for Row {
        const DATE_COLUMN: &'static str = "InDate";
        fn date(&self) -> &str {
            self.date
        }
    }

    fn dated(dates: &[&'static str]) -> Vec<Row> {
        dates.iter().map(|&d| Row { status: "Open", date: d }).collect()
    }

    #[test]
    fn parse_date_layouts() {
        let want = NaiveDate::from_ymd_opt(2019, 3, 14).unwrap();
        for raw in [
            "2019-03-14",
            "2019-03-14T08:30:00",
            "2019-03-14T08:30:00.000",
            "2019-03-14 08:30:00",
            "2019-03-14T08:30",
            "2019/03/14",
            "03/14/2019",
            "2019-03-14T08:30:00-04:00",
            " 2019-03-14 ",
        ] {
            assert_eq!(parse_date(raw), Some(want), "layout {raw}");
        }
        assert_eq!(parse_date("14th of March"), None);
    }

    #[test]
    fn status_counts_by_descending_count() {
        let rows = vec![
            Row { status: "Closed", date: "" },
            Row { status: "Open", date: "" },
            Row { status: "Open", date: "" },
            Row { status: "", date: "" },
            Row { status: "Pending", date: "" },
        ];
        let counts = status_counts(&rows);
        assert_eq!(
            counts,
            vec![
                StatusCount { status: "Open".into(), count: 2 },
                StatusCount { status: "Closed".into(), count: 1 },
                StatusCount { status: "Pending".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn status_counts_empty() {
        let rows: Vec<Row> = Vec::new();
        assert!(status_counts(&rows).is_empty());
    }

    #[test]
    fn yearly_timeline_fills_zero_years() {
        let rows = dated(&[
            "2019-01-01", "2019-05-01", "2019-12-31",
            "2020-01-01", "2020-02-01", "2020-03-01", "2020-04-01", "2020-05-01",
            "2022-06-01", "2022-07-01",
        ]);
        let t = yearly_timeline(&rows).unwrap();
        let got: Vec<(i32, usize)> = t.iter().map(|y| (y.year, y.count)).collect();
        assert_eq!(got, vec![(2019, 3), (2020, 5), (2021, 0), (2022, 2)]);
    }

    #[test]
    fn yearly_timeline_sorts_unordered_input() {
        let rows = dated(&["2021-01-01", "2018-01-01", "2021-06-01"]);
        let t = yearly_timeline(&rows).unwrap();
        assert_eq!(t.first().unwrap().year, 2018);
        assert_eq!(t.last().unwrap(), &YearCount { year: 2021, count: 2 });
        assert_eq!(t.len(), 4);
    }

    #[test]
    fn monthly_timeline_crosses_year_boundary() {
        let rows = dated(&["2020-11-03", "2021-01-20", "2021-01-21"]);
        let t = monthly_timeline(&rows).unwrap();
        let labels: Vec<(String, usize)> = t.iter().map(|m| (m.label(), m.count)).collect();
        assert_eq!(
            labels,
            vec![
                ("2020-11".to_string(), 1),
                ("2020-12".to_string(), 0),
                ("2021-01".to_string(), 2),
            ]
        );
    }

    #[test]
    fn blank_dates_are_skipped() {
        let rows = dated(&["", "2020-01-01", "  "]);
        let t = yearly_timeline(&rows).unwrap();
        assert_eq!(t, vec![YearCount { year: 2020, count: 1 }]);
    }

    #[test]
    fn no_dates_yields_empty_timeline() {
        let rows = dated(&["", ""]);
        assert!(yearly_timeline(&rows).unwrap().is_empty());
        assert!(monthly_timeline(&rows).unwrap().is_empty());
    }

    #[test]
    fn malformed_date_fails_whole_aggregation() {
        let rows = dated(&["2020-01-01", "not a date", "2021-01-01"]);
        let err = yearly_timeline(&rows).unwrap_err();
        assert_eq!(
            err,
            EngineError::DateParse {
                column: "InDate".into(),
                row: 2,
                value: "not a date".into(),
            }
        );
        assert!(monthly_timeline(&rows).is_err());
    }

    #[test]
    fn timeline_dispatches_on_view() {
        let rows = dated(&["2020-01-01", "2020-03-01"]);
        let yearly = timeline(&rows, TimelineView::Yearly).unwrap();
        assert_eq!(yearly.points(), vec![("2020".to_string(), 2)]);
        let monthly = timeline(&rows, TimelineView::Monthly).unwrap();
        assert_eq!(monthly.view(), TimelineView::Monthly);
        assert_eq!(monthly.points().len(), 3);
    }

    #[test]
    fn chronological_sort_puts_undated_first() {
        let mut rows = dated(&["2021-05-01", "", "2019-01-01", "garbage"]);
        sort_chronologically(&mut rows);
        let order: Vec<&str> = rows.iter().map(|r| r.date).collect();
        assert_eq!(order, vec!["", "garbage", "2019-01-01", "2021-05-01"]);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let rows = dated(&["2020-01-01", "2022-03-01"]);
        assert_eq!(monthly_timeline(&rows).unwrap(), monthly_timeline(&rows).unwrap());
        assert_eq!(status_counts(&rows), status_counts(&rows));
    }
}
