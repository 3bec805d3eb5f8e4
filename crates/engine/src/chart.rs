//! Chart descriptions for aggregated tables.
//!
//! A [`ChartSpec`] is a deterministic mapping of (table, x field, y field,
//! kind). Front-ends either draw it themselves or hand the Vega-Lite form to
//! a renderer.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::model::{StatusCount, Timeline};

const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    /// Line with a point marker at every bucket.
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Ordinal,
    Quantitative,
}

impl FieldType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Ordinal => "ordinal",
            Self::Quantitative => "quantitative",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Axis {
    pub field: String,
    pub field_type: FieldType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub kind: ChartKind,
    pub x: Axis,
    pub y: Axis,
    /// (x label, y value) in display order.
    pub points: Vec<(String, usize)>,
}

impl ChartSpec {
    fn new(kind: ChartKind, title: &str, x: &str, y: &str, points: Vec<(String, usize)>) -> Self {
        Self {
            title: title.to_string(),
            kind,
            x: Axis {
                field: x.to_string(),
                field_type: FieldType::Ordinal,
            },
            y: Axis {
                field: y.to_string(),
                field_type: FieldType::Quantitative,
            },
            points,
        }
    }

    pub fn bar(title: &str, x: &str, y: &str, points: Vec<(String, usize)>) -> Self {
        Self::new(ChartKind::Bar, title, x, y, points)
    }

    pub fn line(title: &str, x: &str, y: &str, points: Vec<(String, usize)>) -> Self {
        Self::new(ChartKind::Line, title, x, y, points)
    }

    /// Bar chart of a status summary.
    pub fn status(title: &str, counts: &[StatusCount]) -> Self {
        let points = counts.iter().map(|c| (c.status.clone(), c.count)).collect();
        Self::bar(title, "Status", "Count", points)
    }

    /// Yearly timelines are bars; monthly timelines are point-marked lines.
    pub fn timeline(timeline: &Timeline) -> Self {
        match timeline {
            Timeline::Yearly(_) => Self::bar("Yearly Count", "Year", "Count", timeline.points()),
            Timeline::Monthly(_) => Self::line("Monthly Count", "Month", "Count", timeline.points()),
        }
    }

    pub fn max_value(&self) -> usize {
        self.points.iter().map(|(_, v)| *v).max().unwrap_or(0)
    }

    pub fn to_vega_lite(&self) -> Value {
        let values: Vec<Value> = self
            .points
            .iter()
            .map(|(label, count)| {
                let mut row = Map::new();
                row.insert(self.x.field.clone(), json!(label));
                row.insert(self.y.field.clone(), json!(count));
                Value::Object(row)
            })
            .collect();

        let mark = match self.kind {
            ChartKind::Bar => json!("bar"),
            ChartKind::Line => json!({ "type": "line", "point": true }),
        };

        json!({
            "$schema": VEGA_LITE_SCHEMA,
            "title": self.title,
            "data": { "values": values },
            "mark": mark,
            "encoding": {
                "x": { "field": self.x.field, "type": self.x.field_type.as_str() },
                "y": { "field": self.y.field, "type": self.y.field_type.as_str() },
                "tooltip": [
                    { "field": self.x.field, "type": self.x.field_type.as_str() },
                    { "field": self.y.field, "type": self.y.field_type.as_str() },
                ],
            },
            "params": [{ "name": "zoom", "select": "interval", "bind": "scales" }],
        })
    }
}
