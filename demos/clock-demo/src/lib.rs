//! Shared output and logging for the ClockSandbox demos

use std::error::Error;

use serde::Serialize;
use tracing_subscriber::EnvFilter;

use clocksandbox_analysis::{AdevEstimate, ComparisonMetrics};
use clocksandbox_test::ScenarioReport;

/// Install the fmt subscriber; `RUST_LOG` overrides the `info` default
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// How demo results are printed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// `--json` anywhere on the command line selects JSON
    pub fn from_args() -> Self {
        if std::env::args().skip(1).any(|a| a == "--json") {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print comparison metrics under a heading
pub fn print_metrics(title: &str, metrics: &ComparisonMetrics) {
    println!("=== {} ===", title);
    for (name, value) in metrics.named() {
        println!("{}: {:.6e}", name, value);
    }
}

/// Print a scenario report: pairwise metrics, then consensus if present
pub fn print_report(report: &ScenarioReport, format: OutputFormat) -> Result<(), Box<dyn Error>> {
    if format == OutputFormat::Json {
        return print_json(report);
    }

    println!("Scenario: {} ({} samples)", report.name, report.n_samples);
    for pair in &report.pairwise {
        let title = format!("{} -> {}", report.reference, pair.key);
        print_metrics(&title, &pair.metrics);
        println!();
    }

    if let Some(consensus) = &report.consensus {
        println!("=== Consensus weights ({}) ===", consensus.method);
        for (diag, weight) in consensus.detail.inputs.iter().zip(&consensus.weights) {
            println!(
                "{:>12}  weight {:.6}  statistic {:.6e}{}",
                diag.key,
                weight,
                diag.statistic,
                if diag.floored { "  (floored)" } else { "" }
            );
        }
        println!();
        let title = format!("Consensus vs {}", report.reference);
        print_metrics(&title, &consensus.metrics);
    }
    Ok(())
}

/// Print an Allan deviation table with 1-σ uncertainties
pub fn print_adev_table(estimate: &AdevEstimate, format: OutputFormat) -> Result<(), Box<dyn Error>> {
    if format == OutputFormat::Json {
        return print_json(estimate);
    }

    println!("tau [s]   adev       +/- 1σ");
    for (tau, adev, err) in estimate.iter() {
        println!("{:6.0}  {:9.3e}  ± {:9.3e}", tau, adev, err);
    }
    Ok(())
}
