//! Tolerance-based matching of control points against GCP data rows.

use log::debug;
use thiserror::Error;

use crate::core::loaders::{CoordinateRecord, ParsedFile};

/// Errors that can occur during matching.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Invalid tolerance {0}: must be a finite, non-negative number")]
    InvalidTolerance(f64),
}

/// Result type for matching operations.
pub type Result<T> = std::result::Result<T, MatchError>;

/// Outcome of one filter run.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    /// CRS header carried over from the GCP data file.
    pub crs: String,
    /// GCP rows that matched at least one control point, in original file
    /// order, each row at most once.
    pub matched: Vec<CoordinateRecord>,
    /// Per-control-point match counts in control-file order. Unmatched
    /// points are present with a count of 0.
    pub counts: Vec<(CoordinateRecord, usize)>,
    /// Total data rows parsed from the GCP file.
    pub total_gcp_rows: usize,
    /// Rows dropped while parsing the GCP file.
    pub gcp_skipped_rows: usize,
    /// Rows dropped while parsing the control-points file.
    pub control_skipped_rows: usize,
}

impl FilterOutcome {
    /// Number of control points with at least one match.
    pub fn matched_control_points(&self) -> usize {
        self.counts.iter().filter(|(_, n)| *n > 0).count()
    }

    /// Total number of control points, matched or not.
    pub fn total_control_points(&self) -> usize {
        self.counts.len()
    }
}

/// Check that a tolerance is usable for matching.
///
/// # Errors
///
/// Returns [`MatchError::InvalidTolerance`] if the value is negative, NaN,
/// or infinite.
pub fn validate_tolerance(tolerance: f64) -> Result<()> {
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(MatchError::InvalidTolerance(tolerance));
    }
    Ok(())
}

/// Componentwise coordinate comparison.
///
/// Two points match when the absolute difference on each of the three axes
/// is at most `tolerance`. A difference exactly equal to the tolerance
/// matches; tolerance 0 requires exact equality.
#[inline]
pub fn coordinates_match(a: &CoordinateRecord, b: &CoordinateRecord, tolerance: f64) -> bool {
    (a.x - b.x).abs() <= tolerance
        && (a.y - b.y).abs() <= tolerance
        && (a.z - b.z).abs() <= tolerance
}

/// Match control points against GCP data rows.
///
/// Every (control point, GCP row) pair within the tolerance increments that
/// control point's count, so one row can count toward several nearby
/// control points. The matched row list keeps each GCP row at most once,
/// in original file order.
///
/// # Arguments
///
/// * `gcp` - Parsed GCP data file
/// * `control` - Parsed control-points file
/// * `tolerance` - Maximum per-axis coordinate difference
///
/// # Errors
///
/// Returns [`MatchError::InvalidTolerance`] if the tolerance is negative or
/// non-finite. Empty inputs are valid and produce an outcome with zero
/// matches.
pub fn match_points(
    gcp: &ParsedFile,
    control: &ParsedFile,
    tolerance: f64,
) -> Result<FilterOutcome> {
    validate_tolerance(tolerance)?;

    let mut counts: Vec<(CoordinateRecord, usize)> =
        control.records.iter().map(|cp| (cp.clone(), 0)).collect();
    let mut matched = Vec::new();

    for row in &gcp.records {
        let mut row_matched = false;

        for (cp, count) in counts.iter_mut() {
            if coordinates_match(row, cp, tolerance) {
                debug!(
                    "{}:{} ({:.3}, {:.3}, {:.3}) matches control point {}",
                    gcp.path.display(),
                    row.line,
                    row.x,
                    row.y,
                    row.z,
                    cp.label()
                );
                *count += 1;
                row_matched = true;
            }
        }

        if row_matched {
            matched.push(row.clone());
        }
    }

    Ok(FilterOutcome {
        crs: gcp.crs.clone(),
        matched,
        counts,
        total_gcp_rows: gcp.records.len(),
        gcp_skipped_rows: gcp.skipped_rows,
        control_skipped_rows: control.skipped_rows,
    })
}
