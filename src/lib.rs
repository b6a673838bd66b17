//! Tolerance-based filtering of drone-survey ground control point data.
//!
//! This crate provides tools for:
//! - Parsing tab-delimited survey files (CRS header line + X/Y/Z data rows)
//! - Componentwise tolerance matching of control points against GCP rows
//! - Match statistics: per-control-point picture counts and min/max/average
//! - Writing the matched subset with all original columns preserved
//!
//! # Example
//!
//! ```no_run
//! use gcp_filter::core::loaders::{load_survey_file, RowPolicy};
//! use gcp_filter::processors::matching::match_points;
//!
//! let gcp = load_survey_file("gcp_list.txt", RowPolicy::Skip).unwrap();
//! let control = load_survey_file("control_points.txt", RowPolicy::Skip).unwrap();
//! let outcome = match_points(&gcp, &control, 0.001).unwrap();
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;
pub mod visualization;

pub use config::{AppConfig, FilterConfig, PlotConfig};
pub use core::loaders::{CoordinateRecord, ParsedFile};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
