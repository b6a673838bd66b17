//! Loader for tab-delimited survey coordinate files.
//!
//! Both input files of a filter run share one shape:
//! - Line 1 is an opaque coordinate reference system (CRS) header, taken
//!   verbatim and never interpreted.
//! - Every following non-empty line is `X\tY\tZ[\textra columns...]` where
//!   X, Y, Z are decimal numbers (fixed or scientific notation).
//!
//! For a GCP data file the extra columns are typically pixel coordinates
//! plus an image filename; for a control-points file a single label such as
//! `gcp1`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::warn;
use thiserror::Error;

/// Errors that can occur during file loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("failed to open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file has no lines at all, not even a CRS header. A file with a
    /// header but zero data rows is valid and does not produce this error.
    #[error("empty file (missing CRS header): {0}")]
    EmptyFile(PathBuf),

    /// A data row failed the numeric parse under [`RowPolicy::Strict`].
    #[error("{path}:{line}: malformed row {text:?}: {reason}")]
    MalformedRow {
        path: PathBuf,
        line: usize,
        text: String,
        reason: String,
    },
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Policy for rows whose first three fields fail the numeric parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowPolicy {
    /// Skip the row with a warning and count it in
    /// [`ParsedFile::skipped_rows`].
    #[default]
    Skip,
    /// Abort the load on the first malformed row.
    Strict,
}

/// One data row: parsed 3D coordinates plus everything needed to reproduce
/// the original line.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateRecord {
    /// X coordinate (easting).
    pub x: f64,
    /// Y coordinate (northing).
    pub y: f64,
    /// Z coordinate (elevation).
    pub z: f64,
    /// Columns 4 onward, verbatim and in original order.
    pub extra: Vec<String>,
    /// The original line text, used to write rows back unchanged.
    pub raw: String,
    /// 1-based line number in the source file (the CRS header is line 1).
    pub line: usize,
}

impl CoordinateRecord {
    /// Reporting label: the first extra column if present and non-empty,
    /// otherwise the coordinates to three decimals.
    pub fn label(&self) -> String {
        match self.extra.first() {
            Some(label) if !label.is_empty() => label.clone(),
            _ => format!("({:.3}, {:.3}, {:.3})", self.x, self.y, self.z),
        }
    }
}

/// Container for one parsed survey file.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    /// Source file path.
    pub path: PathBuf,
    /// Line 1 of the file, verbatim (only surrounding whitespace trimmed).
    pub crs: String,
    /// Data rows in file order. May be empty.
    pub records: Vec<CoordinateRecord>,
    /// Rows dropped under [`RowPolicy::Skip`]. Blank lines do not count.
    pub skipped_rows: usize,
}

impl ParsedFile {
    /// Returns the number of data rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the file carried no data rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parse one coordinate field. Accepts fixed and scientific notation,
/// rejects non-finite values.
fn parse_coord(field: &str, axis: &str) -> std::result::Result<f64, String> {
    let value: f64 = field
        .trim()
        .parse()
        .map_err(|_| format!("{} field {:?} is not a number", axis, field))?;
    if !value.is_finite() {
        return Err(format!("{} field {:?} is not finite", axis, field));
    }
    Ok(value)
}

/// Split one data line into a [`CoordinateRecord`].
fn parse_row(text: &str, line: usize) -> std::result::Result<CoordinateRecord, String> {
    let fields: Vec<&str> = text.split('\t').collect();

    if fields.len() < 3 {
        return Err(format!(
            "expected at least 3 tab-separated columns, found {}",
            fields.len()
        ));
    }

    let x = parse_coord(fields[0], "X")?;
    let y = parse_coord(fields[1], "Y")?;
    let z = parse_coord(fields[2], "Z")?;

    Ok(CoordinateRecord {
        x,
        y,
        z,
        extra: fields[3..].iter().map(|f| f.to_string()).collect(),
        raw: text.to_string(),
        line,
    })
}

/// Load a tab-delimited survey file with a CRS header line.
///
/// Line 1 becomes [`ParsedFile::crs`] regardless of content. Each following
/// non-empty line is split on tabs; the first three fields are parsed as
/// floating-point X, Y, Z and the rest are kept as strings. Blank lines are
/// skipped silently.
///
/// # Arguments
///
/// * `path` - Path to the survey file
/// * `policy` - What to do with rows that fail the numeric parse
///
/// # Errors
///
/// Returns an error if the file is missing or unreadable, has no header
/// line, or (under [`RowPolicy::Strict`]) contains a malformed row.
pub fn load_survey_file<P: AsRef<Path>>(path: P, policy: RowPolicy) -> Result<ParsedFile> {
    let path = path.as_ref();

    let file = File::open(path).map_err(|e| LoaderError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    let crs = match lines.next() {
        Some(Ok(header)) => header.trim().to_string(),
        Some(Err(e)) => {
            return Err(LoaderError::Read {
                path: path.to_path_buf(),
                source: e,
            })
        }
        None => return Err(LoaderError::EmptyFile(path.to_path_buf())),
    };

    let mut records = Vec::new();
    let mut skipped_rows = 0;

    for (idx, line) in lines.enumerate() {
        // The header was line 1, so data lines start at 2.
        let line_no = idx + 2;

        let line = line.map_err(|e| LoaderError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        match parse_row(text, line_no) {
            Ok(record) => records.push(record),
            Err(reason) => match policy {
                RowPolicy::Skip => {
                    warn!(
                        "{}:{}: skipping malformed row {:?}: {}",
                        path.display(),
                        line_no,
                        text,
                        reason
                    );
                    skipped_rows += 1;
                }
                RowPolicy::Strict => {
                    return Err(LoaderError::MalformedRow {
                        path: path.to_path_buf(),
                        line: line_no,
                        text: text.to_string(),
                        reason,
                    })
                }
            },
        }
    }

    Ok(ParsedFile {
        path: path.to_path_buf(),
        crs,
        records,
        skipped_rows,
    })
}
