//! Booking fixtures from CSV or JSON files
//!
//! Files are read and validated in full before a scenario starts, so a
//! malformed fixture never gets as far as an HTTP call.

use std::path::{Path, PathBuf};

use crate::model::{Booking, BookingDates};

/// Columns a CSV fixture must declare in its header row.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "firstname",
    "lastname",
    "totalprice",
    "depositpaid",
    "checkin",
    "checkout",
];

/// Optional trailing column.
pub const OPTIONAL_COLUMN: &str = "additionalneeds";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureFormat {
    Csv,
    Json,
}

impl FixtureFormat {
    /// Detect the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, FixtureError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(FixtureError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// An ordered, finite set of booking rows. Iterate it as often as needed.
#[derive(Debug, Clone)]
pub struct FixtureSet {
    source: String,
    rows: Vec<Booking>,
}

impl FixtureSet {
    /// Load a fixture file, picking the parser from its extension.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or any row is malformed.
    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let format = FixtureFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| FixtureError::Io(path.to_path_buf(), e.to_string()))?;

        let rows = match format {
            FixtureFormat::Csv => parse_csv(&content)?,
            FixtureFormat::Json => parse_json(&content)?,
        };
        tracing::debug!(path = %path.display(), rows = rows.len(), "loaded fixtures");

        Ok(Self {
            source: path.display().to_string(),
            rows,
        })
    }

    /// Build a set from rows already in memory.
    pub fn from_rows(source: impl Into<String>, rows: Vec<Booking>) -> Self {
        Self {
            source: source.into(),
            rows,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Booking> {
        self.rows.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Where the rows came from (file path or inline label).
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl<'a> IntoIterator for &'a FixtureSet {
    type Item = &'a Booking;
    type IntoIter = std::slice::Iter<'a, Booking>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Parse CSV text with a header row into bookings.
///
/// Column order is free; cells are trimmed. Rows are numbered from 1,
/// not counting the header.
pub fn parse_csv(content: &str) -> Result<Vec<Booking>, FixtureError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| FixtureError::Csv {
            row: 0,
            message: e.to_string(),
        })?
        .clone();

    let index_of = |name: &str| headers.iter().position(|h| h == name);

    let mut columns = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, name) in columns.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = index_of(name).ok_or(FixtureError::MissingColumn(name))?;
    }
    let [first, last, price, deposit, checkin, checkout] = columns;
    let needs = index_of(OPTIONAL_COLUMN);

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let row = idx + 1;
        let record = record.map_err(|e| FixtureError::Csv {
            row,
            message: e.to_string(),
        })?;
        let cell = |i: usize| record.get(i).unwrap_or("");

        let totalprice = cell(price)
            .parse::<i64>()
            .map_err(|_| FixtureError::InvalidInteger {
                row,
                column: "totalprice",
                value: cell(price).to_string(),
            })?;
        let depositpaid = parse_bool(cell(deposit)).ok_or_else(|| FixtureError::InvalidBoolean {
            row,
            column: "depositpaid",
            value: cell(deposit).to_string(),
        })?;
        let additionalneeds = needs
            .map(cell)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        rows.push(Booking {
            firstname: cell(first).to_string(),
            lastname: cell(last).to_string(),
            totalprice,
            depositpaid,
            bookingdates: BookingDates::new(cell(checkin), cell(checkout)),
            additionalneeds,
        });
    }

    Ok(rows)
}

/// Parse a JSON array of booking objects.
pub fn parse_json(content: &str) -> Result<Vec<Booking>, FixtureError> {
    serde_json::from_str(content).map_err(|e| FixtureError::Json(e.to_string()))
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Unsupported fixture format: {0} (expected .csv or .json)")]
    UnsupportedFormat(PathBuf),
    #[error("Missing column '{0}' in CSV header")]
    MissingColumn(&'static str),
    #[error("CSV error at row {row}: {message}")]
    Csv { row: usize, message: String },
    #[error("Row {row}: column '{column}' is not an integer: {value:?}")]
    InvalidInteger {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("Row {row}: column '{column}' is not a boolean: {value:?}")]
    InvalidBoolean {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("JSON fixture error: {0}")]
    Json(String),
}
