//! Output writers for filter results.
//!
//! This module provides functions for writing filter results to disk:
//! - The filtered GCP file (CRS header plus matched rows, tab-delimited)
//! - A per-control-point match count CSV for spreadsheet use
//!
//! The filtered file reuses each record's original line text, so every
//! column passes through byte-for-byte unchanged and rewriting the same
//! outcome produces an identical file.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use super::loaders::CoordinateRecord;

/// Errors that can occur during write operations.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Failed to create parent directories.
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or open file for writing.
    #[error("failed to create file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write data to file.
    #[error("failed to write to file '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV writing error.
    #[error("CSV write error for '{path}': {source}")]
    CsvError {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Creates parent directories for a file path if they don't exist.
fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| WriteError::CreateDirectory {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Creates a buffered writer for the given path.
fn create_buffered_writer(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(BufWriter::new(file))
}

/// Write the filtered GCP file.
///
/// The output has the same shape as the GCP input: the CRS header on line 1
/// followed by one tab-delimited line per matched row. Rows are written from
/// their original line text, in the order given, with all columns unchanged.
/// An empty row slice produces a header-only file.
///
/// # Arguments
///
/// * `path` - Output file path (parent directories will be created if needed)
/// * `crs` - CRS header string, passed through verbatim
/// * `rows` - Matched rows, in original GCP file order
///
/// # Errors
///
/// Returns an error if:
/// - Parent directories cannot be created
/// - File cannot be created or written to
///
/// # Example
///
/// ```no_run
/// use gcp_filter::core::writers::write_filtered;
/// use std::path::Path;
///
/// write_filtered(Path::new("filtered.txt"), "EPSG:32633", &[]).unwrap();
/// ```
pub fn write_filtered(path: &Path, crs: &str, rows: &[CoordinateRecord]) -> Result<()> {
    ensure_parent_dirs(path)?;
    let mut writer = create_buffered_writer(path)?;

    let path_str = path.display().to_string();

    writeln!(writer, "{}", crs).map_err(|e| WriteError::WriteFile {
        path: path_str.clone(),
        source: e,
    })?;

    for row in rows {
        writeln!(writer, "{}", row.raw).map_err(|e| WriteError::WriteFile {
            path: path_str.clone(),
            source: e,
        })?;
    }

    writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str,
        source: e,
    })?;

    Ok(())
}

/// Write per-control-point match counts to CSV.
///
/// Creates a CSV file with headers "label,x,y,z,count" and one row per
/// control point, in the order given. Unmatched control points appear with
/// a count of 0. Coordinates are written to three decimals, the usual
/// millimeter precision for projected survey data.
///
/// # Arguments
///
/// * `path` - Output file path (parent directories will be created if needed)
/// * `counts` - Per-control-point match counts, in control-file order
///
/// # Errors
///
/// Returns an error if:
/// - Parent directories cannot be created
/// - File cannot be created or written to
///
/// # Example
///
/// ```no_run
/// use gcp_filter::core::writers::write_counts_csv;
/// use std::path::Path;
///
/// write_counts_csv(Path::new("counts.csv"), &[]).unwrap();
/// ```
pub fn write_counts_csv(path: &Path, counts: &[(CoordinateRecord, usize)]) -> Result<()> {
    ensure_parent_dirs(path)?;

    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path.display().to_string(),
        source: e,
    })?;
    let buf_writer = BufWriter::new(file);
    let mut csv_writer = csv::Writer::from_writer(buf_writer);

    let path_str = path.display().to_string();

    // Write header
    csv_writer
        .write_record(["label", "x", "y", "z", "count"])
        .map_err(|e| WriteError::CsvError {
            path: path_str.clone(),
            source: e,
        })?;

    // Write data rows
    for (cp, count) in counts {
        csv_writer
            .write_record(&[
                cp.label(),
                format!("{:.3}", cp.x),
                format!("{:.3}", cp.y),
                format!("{:.3}", cp.z),
                count.to_string(),
            ])
            .map_err(|e| WriteError::CsvError {
                path: path_str.clone(),
                source: e,
            })?;
    }

    csv_writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str,
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn rec(x: f64, y: f64, z: f64, extra: &[&str], line: usize) -> CoordinateRecord {
        let mut fields = vec![x.to_string(), y.to_string(), z.to_string()];
        fields.extend(extra.iter().map(|f| f.to_string()));
        CoordinateRecord {
            x,
            y,
            z,
            extra: extra.iter().map(|f| f.to_string()).collect(),
            raw: fields.join("\t"),
            line,
        }
    }

    #[test]
    fn test_write_filtered_basic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("filtered.txt");
        let rows = vec![
            rec(100.5, 200.25, 50.0, &["1024", "768", "IMG_0001.JPG"], 2),
            rec(101.5, 201.25, 51.0, &["512", "384", "IMG_0002.JPG"], 3),
        ];

        write_filtered(&path, "EPSG:32633", &rows).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines[0], "EPSG:32633");
        assert_eq!(lines[1], "100.5\t200.25\t50\t1024\t768\tIMG_0001.JPG");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_write_filtered_empty_rows_gives_header_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("filtered.txt");

        write_filtered(&path, "+proj=utm +zone=33 +datum=WGS84", &[]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "+proj=utm +zone=33 +datum=WGS84\n");
    }

    #[test]
    fn test_write_filtered_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("subdir").join("nested").join("filtered.txt");

        write_filtered(&path, "EPSG:32633", &[]).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_write_filtered_preserves_original_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("filtered.txt");

        // Number formatting and free-form extras must survive untouched.
        let row = CoordinateRecord {
            x: 1.5,
            y: 20.0,
            z: 3.0,
            extra: vec!["with space.JPG".to_string()],
            raw: "1.50\t2.0e1\t3.000\twith space.JPG".to_string(),
            line: 2,
        };

        write_filtered(&path, "EPSG:32633", &[row]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().nth(1), Some("1.50\t2.0e1\t3.000\twith space.JPG"));
    }

    #[test]
    fn test_write_filtered_rewrite_is_byte_identical() {
        let dir = tempdir().unwrap();
        let first_path = dir.path().join("first.txt");
        let second_path = dir.path().join("second.txt");
        let rows = vec![rec(1.0, 2.0, 3.0, &["gcp1"], 2)];

        write_filtered(&first_path, "EPSG:32633", &rows).unwrap();
        write_filtered(&second_path, "EPSG:32633", &rows).unwrap();

        let first = fs::read(&first_path).unwrap();
        let second = fs::read(&second_path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_write_counts_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("counts.csv");
        let counts = vec![
            (rec(100.0, 200.0, 50.0, &["gcp1"], 2), 12),
            (rec(300.0, 400.0, 60.0, &["gcp2"], 3), 0),
        ];

        write_counts_csv(&path, &counts).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines[0], "label,x,y,z,count");
        assert_eq!(lines[1], "gcp1,100.000,200.000,50.000,12");
        assert_eq!(lines[2], "gcp2,300.000,400.000,60.000,0");
    }

    #[test]
    fn test_write_counts_csv_unlabeled_point() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("counts.csv");
        let counts = vec![(rec(1.0, 2.0, 3.0, &[], 2), 4)];

        write_counts_csv(&path, &counts).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        // The coordinate fallback label contains commas, so it gets quoted.
        assert!(content.lines().nth(1).unwrap().starts_with("\"(1.000, 2.000, 3.000)\""));
    }
}
