//! Data processing modules.

pub mod matching;
pub mod stats;

// Re-export key types for convenience
pub use matching::{
    coordinates_match, match_points, validate_tolerance, FilterOutcome, MatchError,
};
pub use stats::{render_summary, MatchStats};
