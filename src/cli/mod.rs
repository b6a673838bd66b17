//! Command-line interface for the GCP filter.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::AppConfig;
use crate::core::loaders::{self, ParsedFile, RowPolicy};
use crate::core::writers;
use crate::processors::matching::{self, FilterOutcome};
use crate::processors::stats;
use crate::visualization;

#[derive(Parser)]
#[command(name = "gcp-filter")]
#[command(about = "Filter drone-survey GCP data by control point coordinates", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter GCP data rows matching control points within tolerance
    Filter {
        /// Tab-delimited GCP data file (CRS header + X/Y/Z rows)
        gcp_file: PathBuf,
        /// Tab-delimited control points file
        control_file: PathBuf,
        /// Output file for the matched rows
        output: PathBuf,
        /// Maximum per-axis coordinate difference for a match
        #[arg(short, long)]
        tolerance: Option<f64>,
        /// Abort on the first malformed row instead of skipping it
        #[arg(long)]
        strict: bool,
        /// Also write per-control-point match counts to this CSV
        #[arg(long)]
        counts_csv: Option<PathBuf>,
    },

    /// Parse a survey file and report its CRS header and row counts
    Inspect {
        /// Tab-delimited survey file to inspect
        file: PathBuf,
    },

    /// Render a PNG overview of a match run
    Plot {
        /// Tab-delimited GCP data file
        gcp_file: PathBuf,
        /// Tab-delimited control points file
        control_file: PathBuf,
        /// Output PNG file path (defaults to the GCP file name with .png extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Maximum per-axis coordinate difference for a match
        #[arg(short, long)]
        tolerance: Option<f64>,
        /// Maximum number of GCP rows to plot (subsamples if exceeded)
        #[arg(long)]
        max_points: Option<usize>,
        /// Alpha/transparency value for row markers (0.0 to 1.0)
        #[arg(long)]
        alpha: Option<f32>,
    },
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Shorten a value for the summary box. Counts characters rather than
/// bytes, since file paths and CRS headers can hold multibyte text.
fn truncate_for_display(value: &str, max_chars: usize) -> String {
    if value.chars().count() > max_chars {
        let kept: String = value.chars().take(max_chars - 3).collect();
        format!("{}...", kept)
    } else {
        value.to_string()
    }
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<62} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        println!("║ {:<20}: {:<39} ║", key, truncate_for_display(value, 39));
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    // Load config
    let config = match &cli.config {
        Some(path) => {
            match AppConfig::from_yaml(path) {
                Ok(cfg) => {
                    info!("Loaded config from: {}", path.display());
                    cfg
                }
                Err(e) => {
                    warn!("Failed to load config from {}: {}, using defaults", path.display(), e);
                    AppConfig::default()
                }
            }
        }
        None => AppConfig::default(),
    };

    // Dispatch to subcommands
    let result = match cli.command {
        Commands::Filter { gcp_file, control_file, output, tolerance, strict, counts_csv } => {
            cmd_filter(&gcp_file, &control_file, &output, tolerance, strict, counts_csv, &config)
        }
        Commands::Inspect { file } => {
            cmd_inspect(&file)
        }
        Commands::Plot { gcp_file, control_file, output, tolerance, max_points, alpha } => {
            cmd_plot(&gcp_file, &control_file, output, tolerance, max_points, alpha, &config)
        }
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

/// Load one survey file, labeling errors with the file's role so a fatal
/// message names which of the two inputs aborted the run.
fn load_survey(path: &Path, role: &str, policy: RowPolicy) -> Result<ParsedFile> {
    let parsed = loaders::load_survey_file(path, policy)
        .with_context(|| format!("could not read {} file", role))?;
    info!(
        "Loaded {} rows from {} file {} ({} skipped)",
        parsed.len(),
        role,
        path.display(),
        parsed.skipped_rows
    );
    Ok(parsed)
}

fn cmd_filter(
    gcp_file: &Path,
    control_file: &Path,
    output: &Path,
    tolerance: Option<f64>,
    strict: bool,
    counts_csv: Option<PathBuf>,
    config: &AppConfig,
) -> Result<()> {
    let start = Instant::now();

    // CLI flags override config values
    let effective_tolerance = tolerance.unwrap_or(config.filter.tolerance);
    let policy = if strict || config.filter.strict {
        RowPolicy::Strict
    } else {
        RowPolicy::Skip
    };

    // Reject a bad tolerance before touching either file
    matching::validate_tolerance(effective_tolerance)?;

    println!("Filtering GCP data by control points...");
    println!("GCP data file: {}", gcp_file.display());
    println!("Control points file: {}", control_file.display());
    println!("Output: {}", output.display());
    println!("Tolerance: {} (per axis)", effective_tolerance);

    let spinner = create_spinner("Reading GCP data file...");
    let result = run_filter(
        gcp_file,
        control_file,
        output,
        effective_tolerance,
        policy,
        counts_csv.as_deref(),
        &spinner,
    );
    spinner.finish_and_clear();
    let outcome = result?;

    // The statistics always accompany the output file, even when nothing
    // matched, so an empty result is never silent.
    println!("{}", stats::render_summary(&outcome));

    let mut items = vec![
        ("GCP data file", gcp_file.display().to_string()),
        ("Control points", control_file.display().to_string()),
        ("Output", output.display().to_string()),
        ("Tolerance", effective_tolerance.to_string()),
        ("GCP rows", outcome.total_gcp_rows.to_string()),
        ("Matched rows", outcome.matched.len().to_string()),
        (
            "Points matched",
            format!(
                "{}/{}",
                outcome.matched_control_points(),
                outcome.total_control_points()
            ),
        ),
        (
            "Skipped rows",
            (outcome.gcp_skipped_rows + outcome.control_skipped_rows).to_string(),
        ),
    ];
    if let Some(csv_path) = &counts_csv {
        items.push(("Counts CSV", csv_path.display().to_string()));
    }
    items.push(("Duration", format!("{:.2?}", start.elapsed())));

    print_summary("Filter Complete", &items);

    Ok(())
}

/// The filter pipeline: parse both inputs, match, write outputs.
fn run_filter(
    gcp_file: &Path,
    control_file: &Path,
    output: &Path,
    tolerance: f64,
    policy: RowPolicy,
    counts_csv: Option<&Path>,
    spinner: &ProgressBar,
) -> Result<FilterOutcome> {
    let gcp = load_survey(gcp_file, "GCP data", policy)?;

    spinner.set_message("Reading control points file...");
    let control = load_survey(control_file, "control points", policy)?;

    if gcp.crs != control.crs {
        info!(
            "CRS headers differ: {:?} (GCP) vs {:?} (control points); the GCP header is written to the output",
            gcp.crs, control.crs
        );
    }

    spinner.set_message("Matching control points...");
    let outcome = matching::match_points(&gcp, &control, tolerance)?;

    spinner.set_message("Writing output file...");
    writers::write_filtered(output, &outcome.crs, &outcome.matched)
        .context("could not write filtered output")?;

    if let Some(csv_path) = counts_csv {
        writers::write_counts_csv(csv_path, &outcome.counts)
            .context("could not write counts CSV")?;
    }

    Ok(outcome)
}

fn cmd_inspect(file: &Path) -> Result<()> {
    let start = Instant::now();

    let spinner = create_spinner("Parsing survey file...");
    let result = load_survey(file, "survey", RowPolicy::Skip);
    spinner.finish_and_clear();
    let parsed = result?;

    print_summary(
        "Inspect Complete",
        &[
            ("File", file.display().to_string()),
            ("CRS header", parsed.crs.clone()),
            ("Data rows", parsed.len().to_string()),
            ("Skipped rows", parsed.skipped_rows.to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );

    Ok(())
}

fn cmd_plot(
    gcp_file: &Path,
    control_file: &Path,
    output: Option<PathBuf>,
    tolerance: Option<f64>,
    max_points: Option<usize>,
    alpha: Option<f32>,
    config: &AppConfig,
) -> Result<()> {
    let start = Instant::now();

    let effective_tolerance = tolerance.unwrap_or(config.filter.tolerance);
    let effective_max_points = max_points.unwrap_or(config.plot.max_points);
    let effective_alpha = alpha.unwrap_or(config.plot.alpha);

    matching::validate_tolerance(effective_tolerance)?;

    // Determine output path (default to the GCP file name with .png extension)
    let output_path = output.unwrap_or_else(|| {
        let mut path = gcp_file.to_path_buf();
        path.set_extension("png");
        path
    });

    println!("Plotting match overview...");
    println!("GCP data file: {}", gcp_file.display());
    println!("Control points file: {}", control_file.display());
    println!("Output: {}", output_path.display());
    println!("Tolerance: {} (per axis)", effective_tolerance);

    let spinner = create_spinner("Reading GCP data file...");
    let result = run_plot(
        gcp_file,
        control_file,
        &output_path,
        effective_tolerance,
        effective_max_points,
        effective_alpha,
        &spinner,
    );
    spinner.finish_and_clear();
    let (gcp_rows, outcome) = result?;

    print_summary(
        "Plot Complete",
        &[
            ("GCP data file", gcp_file.display().to_string()),
            ("Control points", control_file.display().to_string()),
            ("Output PNG", output_path.display().to_string()),
            ("Tolerance", effective_tolerance.to_string()),
            ("GCP rows", gcp_rows.to_string()),
            ("Matched rows", outcome.matched.len().to_string()),
            (
                "Points matched",
                format!(
                    "{}/{}",
                    outcome.matched_control_points(),
                    outcome.total_control_points()
                ),
            ),
            ("Alpha", effective_alpha.to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );

    Ok(())
}

/// The plot pipeline: parse both inputs, match, render the overview PNG.
fn run_plot(
    gcp_file: &Path,
    control_file: &Path,
    output_path: &Path,
    tolerance: f64,
    max_points: usize,
    alpha: f32,
    spinner: &ProgressBar,
) -> Result<(usize, FilterOutcome)> {
    let gcp = load_survey(gcp_file, "GCP data", RowPolicy::Skip)?;

    spinner.set_message("Reading control points file...");
    let control = load_survey(control_file, "control points", RowPolicy::Skip)?;

    spinner.set_message("Matching control points...");
    let outcome = matching::match_points(&gcp, &control, tolerance)?;

    spinner.set_message("Generating plot...");
    visualization::plot_match_overview(output_path, &gcp, &outcome, max_points, alpha)
        .context("could not render match overview")?;

    Ok((gcp.len(), outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_value_unchanged() {
        assert_eq!(truncate_for_display("EPSG:32633", 39), "EPSG:32633");
    }

    #[test]
    fn test_truncate_long_value_keeps_prefix() {
        let value = "a".repeat(50);
        let display = truncate_for_display(&value, 39);
        assert_eq!(display, format!("{}...", "a".repeat(36)));
        assert_eq!(display.chars().count(), 39);
    }

    #[test]
    fn test_truncate_multibyte_value_on_char_boundary() {
        // A CRS header or path can put a multibyte character across the cut
        // point; the cut must land on a character, not a byte.
        let value = format!("{}{}", "a".repeat(35), "é".repeat(5));
        let display = truncate_for_display(&value, 39);
        assert_eq!(display, format!("{}é...", "a".repeat(35)));
    }

    #[test]
    fn test_truncate_at_exact_limit_unchanged() {
        let value = "é".repeat(39);
        assert_eq!(truncate_for_display(&value, 39), value);
    }
}
