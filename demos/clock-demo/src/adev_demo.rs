//! Overlapping Allan deviation of a white-frequency clock over one day

use std::error::Error;

use clock_demo::{init_logging, print_adev_table, OutputFormat};
use clocksandbox_analysis::{fractional_frequency_from_time, overlapping_adev, run_clocks};
use clocksandbox_clock::{Clock, IdealClock, WhiteFrequencyClock};

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();
    let format = OutputFormat::from_args();

    let duration = 24.0 * 3600.0;
    let dt = 1.0;
    let mut clocks: Vec<Box<dyn Clock>> = vec![
        Box::new(IdealClock::new()),
        Box::new(WhiteFrequencyClock::new(1e-11, 101)?),
    ];

    let ts = run_clocks(&mut clocks, duration, dt)?;
    let y = fractional_frequency_from_time(ts.time(), ts.series("clock_1")?, Some(dt))?;

    let taus = [1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0, 200.0, 500.0, 1000.0];
    let estimate = overlapping_adev(&y, dt, Some(&taus))?;
    print_adev_table(&estimate, format)
}
