use serde::Serialize;

// ---------------------------------------------------------------------------
// Schema contract
// ---------------------------------------------------------------------------

pub const BYLAW_ADDR_COLUMN: &str = "AddrLine";
pub const FIRE_ADDR_COLUMN: &str = "PropertyAddress";
pub const INVESTIGATION_ID_COLUMN: &str = "INVESTIGATION_ID";
pub const INSPECTION_OPEN_DATE_COLUMN: &str = "INSPECTIONS_OPENDATE";
pub const INVESTIGATION_DATE_COLUMN: &str = "InDate";
pub const STATUS_COLUMN: &str = "Status";

/// A row type with a fixed set of required columns.
///
/// The loader resolves `COLUMNS` against the file header once, then hands
/// each row's fields to `from_fields` in `COLUMNS` order.
pub trait Record: Sized {
    /// Dataset key, e.g. `bylaw_addrs`.
    const DATASET: &'static str;
    const COLUMNS: &'static [&'static str];

    fn from_fields(fields: &[&str]) -> Self;
}

/// Rows carrying a free-text address that lookups resolve against.
pub trait Addressed {
    const ADDRESS_COLUMN: &'static str;
    fn address(&self) -> &str;
}

/// Rows carrying a date cell used for timeline buckets.
pub trait Dated {
    const DATE_COLUMN: &'static str;
    fn date(&self) -> &str;
}

/// Rows carrying a status cell used for status summaries.
pub trait WithStatus {
    fn status(&self) -> &str;
}

fn field(fields: &[&str], i: usize) -> String {
    fields.get(i).copied().unwrap_or("").to_string()
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One row of `Addresses.csv`: an address linked to one bylaw investigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressRecord {
    #[serde(rename = "AddrLine")]
    pub addr_line: String,
    #[serde(rename = "INVESTIGATION_ID")]
    pub investigation_id: String,
}

impl Record for AddressRecord {
    const DATASET: &'static str = "bylaw_addrs";
    const COLUMNS: &'static [&'static str] = &[BYLAW_ADDR_COLUMN, INVESTIGATION_ID_COLUMN];

    fn from_fields(fields: &[&str]) -> Self {
        Self {
            addr_line: field(fields, 0),
            investigation_id: field(fields, 1),
        }
    }
}

impl Addressed for AddressRecord {
    const ADDRESS_COLUMN: &'static str = BYLAW_ADDR_COLUMN;

    fn address(&self) -> &str {
        &self.addr_line
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Investigation {
    #[serde(rename = "INVESTIGATION_ID")]
    pub investigation_id: String,
    #[serde(rename = "Issue")]
    pub issue: String,
    #[serde(rename = "InType")]
    pub in_type: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "InDate")]
    pub in_date: String,
}

impl Record for Investigation {
    const DATASET: &'static str = "bylaw_investigations";
    const COLUMNS: &'static [&'static str] = &[
        INVESTIGATION_ID_COLUMN,
        "Issue",
        "InType",
        STATUS_COLUMN,
        INVESTIGATION_DATE_COLUMN,
    ];

    fn from_fields(fields: &[&str]) -> Self {
        Self {
            investigation_id: field(fields, 0),
            issue: field(fields, 1),
            in_type: field(fields, 2),
            status: field(fields, 3),
            in_date: field(fields, 4),
        }
    }
}

impl Dated for Investigation {
    const DATE_COLUMN: &'static str = INVESTIGATION_DATE_COLUMN;

    fn date(&self) -> &str {
        &self.in_date
    }
}

impl WithStatus for Investigation {
    fn status(&self) -> &str {
        &self.status
    }
}

/// A cited violation. Linked to its investigation only through the shared identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deficiency {
    #[serde(rename = "INVESTIGATION_ID")]
    pub investigation_id: String,
    #[serde(rename = "Desc")]
    pub desc: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Status")]
    pub status: String,
}

impl Record for Deficiency {
    const DATASET: &'static str = "bylaw_defs";
    const COLUMNS: &'static [&'static str] =
        &[INVESTIGATION_ID_COLUMN, "Desc", "Location", STATUS_COLUMN];

    fn from_fields(fields: &[&str]) -> Self {
        Self {
            investigation_id: field(fields, 0),
            desc: field(fields, 1),
            location: field(fields, 2),
            status: field(fields, 3),
        }
    }
}

impl WithStatus for Deficiency {
    fn status(&self) -> &str {
        &self.status
    }
}

/// A fire-code inspection row from the highrise inspections dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inspection {
    #[serde(rename = "PropertyAddress")]
    pub property_address: String,
    #[serde(rename = "INSPECTIONS_OPENDATE")]
    pub open_date: String,
    #[serde(rename = "VIOLATION_DESCRIPTION")]
    pub violation_description: String,
}

impl Record for Inspection {
    const DATASET: &'static str = "fire_inspections";
    const COLUMNS: &'static [&'static str] = &[
        FIRE_ADDR_COLUMN,
        INSPECTION_OPEN_DATE_COLUMN,
        "VIOLATION_DESCRIPTION",
    ];

    fn from_fields(fields: &[&str]) -> Self {
        Self {
            property_address: field(fields, 0),
            open_date: field(fields, 1),
            violation_description: field(fields, 2),
        }
    }
}

impl Addressed for Inspection {
    const ADDRESS_COLUMN: &'static str = FIRE_ADDR_COLUMN;

    fn address(&self) -> &str {
        &self.property_address
    }
}

impl Dated for Inspection {
    const DATE_COLUMN: &'static str = INSPECTION_OPEN_DATE_COLUMN;

    fn date(&self) -> &str {
        &self.open_date
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

pub const DEFAULT_THRESHOLD: u8 = 70;
pub const DEFAULT_MAX_CANDIDATES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// Minimum score (0-100) a candidate must reach.
    pub threshold: u8,
    /// Maximum number of ranked candidates kept.
    pub limit: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            limit: DEFAULT_MAX_CANDIDATES,
        }
    }
}

/// A distinct address value and its similarity to the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub address: String,
    pub score: u8,
}

// ---------------------------------------------------------------------------
// Join output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MatchResult<T> {
    NotFound {
        suggestions: Vec<String>,
    },
    Found {
        address: String,
        suggestions: Vec<String>,
        #[serde(flatten)]
        records: T,
    },
}

impl<T> MatchResult<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    pub fn address(&self) -> Option<&str> {
        match self {
            Self::Found { address, .. } => Some(address),
            Self::NotFound { .. } => None,
        }
    }

    pub fn suggestions(&self) -> &[String] {
        match self {
            Self::Found { suggestions, .. } | Self::NotFound { suggestions } => suggestions,
        }
    }

    pub fn records(&self) -> Option<&T> {
        match self {
            Self::Found { records, .. } => Some(records),
            Self::NotFound { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BylawRecords {
    pub investigations: Vec<Investigation>,
    pub deficiencies: Vec<Deficiency>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FireRecords {
    pub inspections: Vec<Inspection>,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub year: i32,
    pub month: u32,
    pub count: usize,
}

impl MonthCount {
    /// `YYYY-MM` bucket label.
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineView {
    #[default]
    Yearly,
    Monthly,
}

impl std::fmt::Display for TimelineView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yearly => write!(f, "yearly"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

impl std::str::FromStr for TimelineView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yearly" | "year" => Ok(Self::Yearly),
            "monthly" | "month" => Ok(Self::Monthly),
            other => Err(format!("unknown timeline view '{other}' (expected yearly or monthly)")),
        }
    }
}

/// One timeline, in whichever bucket granularity was requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", content = "buckets", rename_all = "snake_case")]
pub enum Timeline {
    Yearly(Vec<YearCount>),
    Monthly(Vec<MonthCount>),
}

impl Timeline {
    pub fn view(&self) -> TimelineView {
        match self {
            Self::Yearly(_) => TimelineView::Yearly,
            Self::Monthly(_) => TimelineView::Monthly,
        }
    }

    /// (bucket label, count) pairs in ascending bucket order.
    pub fn points(&self) -> Vec<(String, usize)> {
        match self {
            Self::Yearly(years) => years.iter().map(|y| (y.year.to_string(), y.count)).collect(),
            Self::Monthly(months) => months.iter().map(|m| (m.label(), m.count)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Yearly(v) => v.is_empty(),
            Self::Monthly(v) => v.is_empty(),
        }
    }
}
