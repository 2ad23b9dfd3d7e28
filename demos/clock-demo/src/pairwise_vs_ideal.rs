//! Random-walk and flicker-like clocks, each against its own ideal reference

use std::error::Error;

use clock_demo::{init_logging, print_report, OutputFormat};
use clocksandbox_analysis::SimulationConfig;
use clocksandbox_test::scenarios;

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();
    let format = OutputFormat::from_args();

    let config = SimulationConfig::one_day();
    for mut scenario in [
        scenarios::random_walk_vs_ideal(config.clone(), 123)?,
        scenarios::flicker_vs_ideal(config, 456)?,
    ] {
        let (_, report) = scenario.run()?;
        print_report(&report, format)?;
        println!();
    }
    Ok(())
}
