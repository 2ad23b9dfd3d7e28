//! Three noisy clocks fused by consensus, all judged against an ideal reference
//!
//! Usage: triangular-consensus [inv_var_frac | inv_oadev_tau] [--json]

use std::error::Error;

use clock_demo::{init_logging, print_report, OutputFormat};
use clocksandbox_analysis::{ConsensusParams, SimulationConfig, WeightingMethod};
use clocksandbox_test::scenarios;

/// Averaging time used with inv_oadev_tau
const ADEV_TAU: f64 = 100.0;

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();
    let format = OutputFormat::from_args();

    let tag = std::env::args()
        .skip(1)
        .find(|a| !a.starts_with("--"))
        .unwrap_or_else(|| WeightingMethod::default().tag().to_string());
    let tau = match tag.parse::<WeightingMethod>()? {
        WeightingMethod::InverseAdevAtTau => Some(ADEV_TAU),
        WeightingMethod::InverseFrequencyVariance => None,
    };
    let params = ConsensusParams::from_tag(&tag, None, tau)?;

    let mut scenario =
        scenarios::triangular_consensus(SimulationConfig::one_day(), [11, 22, 33], params)?;
    let (_, report) = scenario.run()?;
    print_report(&report, format)?;

    if let Some(consensus) = &report.consensus {
        let total: f64 = consensus.weights.iter().sum();
        if (total - 1.0).abs() >= 1e-12 {
            return Err(format!("weights sum to {}", total).into());
        }
    }
    Ok(())
}
