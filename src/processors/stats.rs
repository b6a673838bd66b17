//! Match statistics and summary rendering.

use crate::processors::matching::FilterOutcome;

/// Aggregate figures derived from a [`FilterOutcome`].
///
/// The per-point minimum, maximum, and mean are computed over matched
/// control points only; they are `None` when nothing matched.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchStats {
    /// GCP rows that matched at least one control point.
    pub matched_rows: usize,
    /// Total data rows in the GCP file.
    pub total_gcp_rows: usize,
    /// Control points with at least one match.
    pub matched_control_points: usize,
    /// Total control points, matched or not.
    pub total_control_points: usize,
    /// Fewest pictures among matched control points.
    pub min_pictures: Option<usize>,
    /// Most pictures among matched control points.
    pub max_pictures: Option<usize>,
    /// Mean pictures among matched control points.
    pub mean_pictures: Option<f64>,
}

impl MatchStats {
    /// Derive statistics from a filter outcome.
    pub fn from_outcome(outcome: &FilterOutcome) -> Self {
        let matched_counts: Vec<usize> = outcome
            .counts
            .iter()
            .filter(|(_, n)| *n > 0)
            .map(|(_, n)| *n)
            .collect();

        let (min_pictures, max_pictures, mean_pictures) = if matched_counts.is_empty() {
            (None, None, None)
        } else {
            let sum: usize = matched_counts.iter().sum();
            (
                matched_counts.iter().min().copied(),
                matched_counts.iter().max().copied(),
                Some(sum as f64 / matched_counts.len() as f64),
            )
        };

        MatchStats {
            matched_rows: outcome.matched.len(),
            total_gcp_rows: outcome.total_gcp_rows,
            matched_control_points: matched_counts.len(),
            total_control_points: outcome.counts.len(),
            min_pictures,
            max_pictures,
            mean_pictures,
        }
    }
}

fn row_word(count: usize) -> &'static str {
    if count == 1 {
        "row"
    } else {
        "rows"
    }
}

/// Render the human-readable statistics report for a filter outcome.
///
/// The report states the matched-points-only policy for the per-point
/// figures instead of applying it silently, and lists every control point
/// in the breakdown, unmatched ones included.
pub fn render_summary(outcome: &FilterOutcome) -> String {
    let stats = MatchStats::from_outcome(outcome);
    let mut out = String::new();

    out.push_str(&format!(
        "Matched {} rows from {} total GCP data rows\n",
        stats.matched_rows, stats.total_gcp_rows
    ));

    if outcome.gcp_skipped_rows > 0 || outcome.control_skipped_rows > 0 {
        out.push_str(&format!(
            "Skipped during parsing: {} GCP {}, {} control {}\n",
            outcome.gcp_skipped_rows,
            row_word(outcome.gcp_skipped_rows),
            outcome.control_skipped_rows,
            row_word(outcome.control_skipped_rows),
        ));
    }

    out.push_str("\n--- STATISTICS ---\n");
    out.push_str(&format!(
        "Control Points matched: {}/{}\n",
        stats.matched_control_points, stats.total_control_points
    ));

    if stats.matched_control_points == 0 {
        out.push_str("No control points were matched!\n");
        return out;
    }

    if let (Some(min), Some(max), Some(mean)) =
        (stats.min_pictures, stats.max_pictures, stats.mean_pictures)
    {
        out.push_str("Pictures per control point (matched points only):\n");
        out.push_str(&format!("  Minimum: {}\n", min));
        out.push_str(&format!("  Maximum: {}\n", max));
        out.push_str(&format!("  Average: {:.1}\n", mean));
    }

    out.push_str("\nDetailed breakdown:\n");
    for (cp, count) in &outcome.counts {
        if *count > 0 {
            out.push_str(&format!("  {}: {} pictures\n", cp.label(), count));
        } else {
            out.push_str(&format!("  {}: unmatched\n", cp.label()));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loaders::CoordinateRecord;

    fn cp(label: &str, count: usize) -> (CoordinateRecord, usize) {
        let record = CoordinateRecord {
            x: 100.0,
            y: 200.0,
            z: 50.0,
            extra: vec![label.to_string()],
            raw: format!("100.0\t200.0\t50.0\t{}", label),
            line: 2,
        };
        (record, count)
    }

    fn outcome(counts: Vec<(CoordinateRecord, usize)>, matched_rows: usize) -> FilterOutcome {
        let matched = (0..matched_rows)
            .map(|i| CoordinateRecord {
                x: i as f64,
                y: i as f64,
                z: i as f64,
                extra: Vec::new(),
                raw: format!("{0}\t{0}\t{0}", i),
                line: i + 2,
            })
            .collect();

        FilterOutcome {
            crs: "EPSG:32633".to_string(),
            matched,
            counts,
            total_gcp_rows: matched_rows + 2,
            gcp_skipped_rows: 0,
            control_skipped_rows: 0,
        }
    }

    #[test]
    fn test_stats_cover_matched_points_only() {
        let outcome = outcome(vec![cp("gcp1", 3), cp("gcp2", 0), cp("gcp3", 1)], 4);

        let stats = MatchStats::from_outcome(&outcome);

        assert_eq!(stats.matched_control_points, 2);
        assert_eq!(stats.total_control_points, 3);
        // The zero does not drag the minimum down.
        assert_eq!(stats.min_pictures, Some(1));
        assert_eq!(stats.max_pictures, Some(3));
        assert_eq!(stats.mean_pictures, Some(2.0));
    }

    #[test]
    fn test_stats_when_nothing_matched() {
        let outcome = outcome(vec![cp("gcp1", 0)], 0);

        let stats = MatchStats::from_outcome(&outcome);

        assert_eq!(stats.matched_control_points, 0);
        assert_eq!(stats.min_pictures, None);
        assert_eq!(stats.max_pictures, None);
        assert_eq!(stats.mean_pictures, None);
    }

    #[test]
    fn test_summary_shows_match_rate() {
        let outcome = outcome(vec![cp("gcp1", 2), cp("gcp2", 0)], 2);

        let summary = render_summary(&outcome);

        assert!(summary.contains("Control Points matched: 1/2"));
        assert!(summary.contains("Matched 2 rows from 4 total GCP data rows"));
    }

    #[test]
    fn test_summary_states_matched_only_policy() {
        let outcome = outcome(vec![cp("gcp1", 2)], 2);

        let summary = render_summary(&outcome);

        assert!(summary.contains("(matched points only)"));
    }

    #[test]
    fn test_summary_mean_to_one_decimal() {
        let outcome = outcome(vec![cp("gcp1", 1), cp("gcp2", 2)], 3);

        let summary = render_summary(&outcome);

        assert!(summary.contains("Average: 1.5"));
        assert!(summary.contains("Minimum: 1"));
        assert!(summary.contains("Maximum: 2"));
    }

    #[test]
    fn test_summary_lists_unmatched_points() {
        let outcome = outcome(vec![cp("gcp1", 2), cp("gcp2", 0)], 2);

        let summary = render_summary(&outcome);

        assert!(summary.contains("gcp1: 2 pictures"));
        assert!(summary.contains("gcp2: unmatched"));
    }

    #[test]
    fn test_summary_with_no_control_points_reports_zero_of_zero() {
        let outcome = outcome(Vec::new(), 0);

        let summary = render_summary(&outcome);

        assert!(summary.contains("Control Points matched: 0/0"));
        assert!(summary.contains("No control points were matched!"));
    }

    #[test]
    fn test_summary_reports_skipped_rows() {
        let mut out = outcome(vec![cp("gcp1", 1)], 1);
        out.gcp_skipped_rows = 2;
        out.control_skipped_rows = 3;

        let summary = render_summary(&out);

        assert!(summary.contains("Skipped during parsing: 2 GCP rows, 3 control rows"));
    }

    #[test]
    fn test_summary_skip_line_singular_counts() {
        let mut out = outcome(vec![cp("gcp1", 1)], 1);
        out.gcp_skipped_rows = 1;
        out.control_skipped_rows = 1;

        let summary = render_summary(&out);

        assert!(summary.contains("Skipped during parsing: 1 GCP row, 1 control row"));
    }

    #[test]
    fn test_summary_omits_skip_line_when_clean() {
        let out = outcome(vec![cp("gcp1", 1)], 1);

        let summary = render_summary(&out);

        assert!(!summary.contains("Skipped during parsing"));
    }
}
