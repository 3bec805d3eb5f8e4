// CSV dataset import

use std::io::Read;
use std::path::Path;

use torent_engine::Record;

use crate::error::LoadError;

/// Headers and rows of a file loaded without a schema.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<csv::StringRecord>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Load a typed dataset. Every column in `R::COLUMNS` must be present in the
/// header; extra columns are ignored and short rows yield blank fields.
pub fn load_records<R: Record>(path: &Path) -> Result<Vec<R>, LoadError> {
    let table = load_table(R::DATASET, path, R::COLUMNS)?;

    let indices = R::COLUMNS
        .iter()
        .map(|&column| {
            table.column_index(column).ok_or_else(|| LoadError::MissingColumn {
                dataset: R::DATASET.to_string(),
                column: column.to_string(),
            })
        })
        .collect::<Result<Vec<usize>, LoadError>>()?;

    let mut fields: Vec<&str> = Vec::with_capacity(indices.len());
    let records = table
        .rows
        .iter()
        .map(|row| {
            fields.clear();
            fields.extend(indices.iter().map(|&i| row.get(i).unwrap_or("")));
            R::from_fields(&fields)
        })
        .collect();
    Ok(records)
}

/// Load a file as an untyped table: first row is the header.
/// `expected` names columns the header should contain; it steers delimiter detection.
pub fn load_table(dataset: &str, path: &Path, expected: &[&str]) -> Result<RawTable, LoadError> {
    if !path.exists() {
        return Err(LoadError::MissingFile {
            dataset: dataset.to_string(),
            path: path.to_path_buf(),
        });
    }

    let content = read_file_as_utf8(path).map_err(|e| LoadError::Io {
        dataset: dataset.to_string(),
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_table(dataset, &content, sniff_delimiter(&content, expected))
}

fn parse_table(dataset: &str, content: &str, delimiter: u8) -> Result<RawTable, LoadError> {
    let csv_error = |e: csv::Error| LoadError::Csv {
        dataset: dataset.to_string(),
        message: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let rows = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(csv_error)?;

    Ok(RawTable { headers, rows })
}

const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

fn split_line(line: &str, delimiter: u8) -> Vec<String> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(Result::ok)
        .map(|r| r.iter().map(|f| f.trim().to_string()).collect())
        .unwrap_or_default()
}

/// Choose the field delimiter from the header line.
///
/// A delimiter that splits out every `expected` column wins outright.
/// Otherwise the widest header split whose first data row has the same width
/// is used, comma on ties or when nothing splits.
fn sniff_delimiter(content: &str, expected: &[&str]) -> u8 {
    let mut lines = content.lines();
    let header = lines.next().unwrap_or("");
    let first_row = lines.next();

    if !expected.is_empty() {
        let found = DELIMITERS.iter().copied().find(|&d| {
            let fields = split_line(header, d);
            expected.iter().all(|column| fields.iter().any(|f| f == column))
        });
        if let Some(delimiter) = found {
            return delimiter;
        }
    }

    DELIMITERS
        .iter()
        .rev()
        .map(|&d| (d, split_line(header, d).len()))
        .filter(|&(d, width)| width > 1 && first_row.map_or(true, |row| split_line(row, d).len() == width))
        .max_by_key(|&(_, width)| width)
        .map_or(b',', |(d, _)| d)
}

/// Read a file as UTF-8, falling back to Windows-1252 for non-UTF-8 bytes.
/// A leading byte-order mark is dropped.
pub fn read_file_as_utf8(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}
