//! Ideal vs. white frequency noise over one day at 1 s steps
//!
//! Also checks that the Comparison helper reproduces the direct metrics.

use std::error::Error;

use clock_demo::{init_logging, print_report, OutputFormat};
use clocksandbox_analysis::{Comparison, SimulationConfig};
use clocksandbox_test::scenarios;

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();
    let format = OutputFormat::from_args();

    let mut scenario = scenarios::basic_comparison(SimulationConfig::one_day(), 42)?;
    let (series, report) = scenario.run()?;
    print_report(&report, format)?;

    let measured = Comparison::from_series(&series, "ideal", "white")?.measure()?;
    if measured != report.pairwise[0].metrics {
        return Err("Comparison helper disagrees with compare_clocks".into());
    }
    Ok(())
}
