//! Visualization tools for match results.
//!
//! This module renders a 2D scatter overview of a filter run using the
//! plotters library: every GCP row in plan view (x vs y), with matched rows
//! and control points highlighted.

use std::collections::HashSet;
use std::path::Path;

use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use thiserror::Error;

use crate::core::loaders::ParsedFile;
use crate::processors::matching::FilterOutcome;

/// Errors that can occur during visualization.
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Plotting error: {0}")]
    PlottingError(String),

    #[error("Nothing to plot: no GCP rows and no control points")]
    NothingToPlot,
}

/// Result type for visualization operations.
pub type Result<T> = std::result::Result<T, VisualizationError>;

/// Default plot width in pixels.
const DEFAULT_WIDTH: u32 = 1920;

/// Default plot height in pixels.
const DEFAULT_HEIGHT: u32 = 1080;

/// Color for GCP rows that matched a control point (blue).
const MATCHED_ROW_COLOR: (u8, u8, u8) = (55, 126, 184);

/// Color for GCP rows without a match (gray).
const UNMATCHED_ROW_COLOR: (u8, u8, u8) = (128, 128, 128);

/// Color for control points with at least one match (green).
const MATCHED_CP_COLOR: (u8, u8, u8) = (77, 175, 74);

/// Color for unmatched control points (red).
const UNMATCHED_CP_COLOR: (u8, u8, u8) = (228, 26, 28);

/// Plot a 2D overview of a filter run (x vs y) and save as PNG.
///
/// GCP rows are drawn as small markers, blue when they matched a control
/// point and gray otherwise; control points are drawn on top as larger
/// markers, green when matched and red when not. Rows are subsampled when
/// the file exceeds `max_points`; control points are always drawn in full.
///
/// # Arguments
///
/// * `output_path` - Path to save the PNG image
/// * `gcp` - The parsed GCP file the outcome was computed from
/// * `outcome` - The filter outcome to visualize
/// * `max_points` - Maximum number of GCP rows to plot (subsamples if exceeded)
/// * `alpha` - Alpha/transparency value for row markers (0.0 to 1.0)
pub fn plot_match_overview(
    output_path: &Path,
    gcp: &ParsedFile,
    outcome: &FilterOutcome,
    max_points: usize,
    alpha: f32,
) -> Result<()> {
    if gcp.is_empty() && outcome.counts.is_empty() {
        return Err(VisualizationError::NothingToPlot);
    }

    // Row identity is the source line number, so a line-number set is enough
    // to tell matched rows apart.
    let matched_lines: HashSet<usize> = outcome.matched.iter().map(|r| r.line).collect();

    let n = gcp.len();
    let step = subsample_step(n, max_points);
    let num_points_to_plot = n.div_ceil(step);

    let alpha_f64 = (alpha.clamp(0.0, 1.0)) as f64;

    // Collect GCP rows to plot with optional subsampling
    let mut rows: Vec<(f64, f64, RGBAColor)> = Vec::with_capacity(num_points_to_plot);

    for i in (0..n).step_by(step) {
        let record = &gcp.records[i];
        let c = if matched_lines.contains(&record.line) {
            MATCHED_ROW_COLOR
        } else {
            UNMATCHED_ROW_COLOR
        };
        rows.push((record.x, record.y, RGBAColor(c.0, c.1, c.2, alpha_f64)));
    }

    // Control points are few; draw all of them at full opacity.
    let control_points: Vec<(f64, f64, RGBAColor)> = outcome
        .counts
        .iter()
        .map(|(cp, count)| {
            let c = if *count > 0 {
                MATCHED_CP_COLOR
            } else {
                UNMATCHED_CP_COLOR
            };
            (cp.x, cp.y, RGBAColor(c.0, c.1, c.2, 1.0))
        })
        .collect();

    // Compute bounds with padding over everything drawn
    let mut all_points: Vec<(f64, f64)> = rows.iter().map(|(x, y, _)| (*x, *y)).collect();
    all_points.extend(control_points.iter().map(|(x, y, _)| (*x, *y)));

    let (x_min, x_max, y_min, y_max) = compute_bounds(&all_points);
    let x_padding = (x_max - x_min) * 0.05;
    let y_padding = (y_max - y_min) * 0.05;

    // Create the plot
    let root = BitMapBackend::new(output_path, (DEFAULT_WIDTH, DEFAULT_HEIGHT))
        .into_drawing_area();

    root.fill(&WHITE).map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(
            (x_min - x_padding)..(x_max + x_padding),
            (y_min - y_padding)..(y_max + y_padding),
        )
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .draw()
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    // Draw GCP rows first, control points on top
    chart
        .draw_series(rows.iter().map(|(x, y, color)| {
            Circle::new((*x, *y), 2, color.filled())
        }))
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    chart
        .draw_series(control_points.iter().map(|(x, y, color)| {
            Circle::new((*x, *y), 5, color.filled())
        }))
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    root.present().map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    Ok(())
}

/// Compute the subsampling step so at most `max_points` rows are plotted;
/// `max_points` = 0 disables subsampling.
fn subsample_step(n: usize, max_points: usize) -> usize {
    if max_points > 0 && n > max_points {
        n.div_ceil(max_points)
    } else {
        1
    }
}

/// Compute the bounds (min/max) for x and y coordinates.
fn compute_bounds(points: &[(f64, f64)]) -> (f64, f64, f64, f64) {
    let mut x_min = f64::MAX;
    let mut x_max = f64::MIN;
    let mut y_min = f64::MAX;
    let mut y_max = f64::MIN;

    for (x, y) in points {
        if *x < x_min { x_min = *x; }
        if *x > x_max { x_max = *x; }
        if *y < y_min { y_min = *y; }
        if *y > y_max { y_max = *y; }
    }

    if (x_max - x_min).abs() < f64::EPSILON {
        x_min -= 1.0;
        x_max += 1.0;
    }
    if (y_max - y_min).abs() < f64::EPSILON {
        y_min -= 1.0;
        y_max += 1.0;
    }

    (x_min, x_max, y_min, y_max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsample_step_caps_plotted_rows() {
        // Rounding down here would plot 199 rows for a 100-row cap.
        assert_eq!(subsample_step(199, 100), 2);
        assert_eq!(subsample_step(1000, 100), 10);
        assert_eq!(subsample_step(1001, 100), 11);

        for (n, max) in [(199usize, 100usize), (1000, 100), (1001, 100), (5, 2)] {
            let step = subsample_step(n, max);
            assert!(n.div_ceil(step) <= max, "n={} max={} step={}", n, max, step);
        }
    }

    #[test]
    fn test_subsample_step_disabled_below_cap_or_zero() {
        assert_eq!(subsample_step(50, 100), 1);
        assert_eq!(subsample_step(100, 100), 1);
        assert_eq!(subsample_step(1000, 0), 1);
    }
}
