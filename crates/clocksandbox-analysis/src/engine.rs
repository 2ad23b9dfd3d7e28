//! Simulation engine - advances clocks in lock-step on a shared virtual grid

use serde::Serialize;
use tracing::debug;

use clocksandbox_clock::{Clock, ClockConfig};
use clocksandbox_core::{default_key, SandboxError, SandboxResult, TimeSeries, TIME_KEY};

/// Largest step count whose traces can still be allocated
pub const MAX_STEPS: usize = isize::MAX as usize / std::mem::size_of::<f64>() - 1;

/// Simulation configuration
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationConfig {
    /// Total virtual duration (seconds)
    pub duration: f64,
    /// Step between grid points (seconds)
    pub dt: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::one_day()
    }
}

impl SimulationConfig {
    pub fn new(duration: f64, dt: f64) -> Self {
        SimulationConfig { duration, dt }
    }

    /// One day at 1 s steps
    pub fn one_day() -> Self {
        SimulationConfig {
            duration: 86_400.0,
            dt: 1.0,
        }
    }

    /// Short run at 1 s steps
    pub fn short(duration: f64) -> Self {
        SimulationConfig { duration, dt: 1.0 }
    }

    /// Check duration and step are finite and positive
    pub fn validate(&self) -> SandboxResult<()> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(self.duration) || !valid(self.dt) {
            return Err(SandboxError::invalid_argument(format!(
                "duration and dt must be finite and > 0 (duration={}, dt={})",
                self.duration, self.dt
            )));
        }
        Ok(())
    }

    /// Number of steps, `round(duration / dt)` with ties to even
    pub fn n_steps(&self) -> SandboxResult<usize> {
        self.validate()?;
        let steps = (self.duration / self.dt).round_ties_even();
        if !steps.is_finite() || steps >= MAX_STEPS as f64 {
            return Err(SandboxError::invalid_argument(format!(
                "duration / dt is out of range ({} / {})",
                self.duration, self.dt
            )));
        }
        Ok(steps as usize)
    }
}

/// Ordered set of clocks sharing one virtual time grid.
///
/// Registration order fixes tick order, read order, and the order of the
/// series in the resulting bundle. Clocks keep their state across runs.
#[derive(Default)]
pub struct ClockEnsemble {
    keys: Vec<String>,
    clocks: Vec<Box<dyn Clock>>,
}

impl ClockEnsemble {
    pub fn new() -> Self {
        ClockEnsemble::default()
    }

    /// Register a clock under the next default key (`clock_<i>`)
    pub fn add(&mut self, clock: impl Clock + 'static) -> SandboxResult<&str> {
        let key = default_key(self.clocks.len());
        self.add_labeled(key, clock)
    }

    /// Register a clock under an explicit key
    pub fn add_labeled(
        &mut self,
        key: impl Into<String>,
        clock: impl Clock + 'static,
    ) -> SandboxResult<&str> {
        let key = key.into();
        if key == TIME_KEY || self.keys.contains(&key) {
            return Err(SandboxError::invalid_argument(format!(
                "clock key '{}' is reserved or already registered",
                key
            )));
        }
        self.keys.push(key);
        self.clocks.push(Box::new(clock));
        Ok(self.keys[self.keys.len() - 1].as_str())
    }

    /// Build a clock from its configuration and register it
    pub fn add_config(&mut self, config: &ClockConfig) -> SandboxResult<&str> {
        let clock = config.build()?;
        self.add(clock)
    }

    pub fn len(&self) -> usize {
        self.clocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clocks.is_empty()
    }

    /// Keys in registration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|k| k.as_str())
    }

    /// Get a registered clock
    pub fn clock(&self, key: &str) -> Option<&dyn Clock> {
        self.keys
            .iter()
            .position(|k| k == key)
            .map(|i| self.clocks[i].as_ref())
    }

    /// Step every clock over the configured grid
    pub fn run(&mut self, config: &SimulationConfig) -> SandboxResult<TimeSeries> {
        simulate(&mut self.clocks, &self.keys, config)
    }
}

/// Run clocks in lock-step for `duration` seconds at step `dt`.
///
/// Returns a bundle keyed `clock_0`, `clock_1`, … in slice order, plus the
/// grid under `"time"`. Arguments are validated before any clock is touched.
pub fn run_clocks<C: Clock>(clocks: &mut [C], duration: f64, dt: f64) -> SandboxResult<TimeSeries> {
    let keys: Vec<String> = (0..clocks.len()).map(default_key).collect();
    simulate(clocks, &keys, &SimulationConfig::new(duration, dt))
}

fn simulate<C: Clock>(
    clocks: &mut [C],
    keys: &[String],
    config: &SimulationConfig,
) -> SandboxResult<TimeSeries> {
    let n_steps = config.n_steps()?;
    if clocks.is_empty() {
        return Err(SandboxError::invalid_argument("no clocks to run"));
    }
    let dt = config.dt;

    debug!(clocks = clocks.len(), n_steps, dt, "running clocks");

    // Step 0 is the unticked initial read
    let mut traces: Vec<Vec<f64>> = clocks
        .iter()
        .map(|clock| {
            let mut trace = Vec::with_capacity(n_steps + 1);
            trace.push(clock.read_time());
            trace
        })
        .collect();

    for _ in 0..n_steps {
        // All clocks advance before any is read
        for clock in clocks.iter_mut() {
            clock.tick(dt);
        }
        for (trace, clock) in traces.iter_mut().zip(clocks.iter()) {
            trace.push(clock.read_time());
        }
    }

    let mut series = TimeSeries::uniform(n_steps, dt);
    for ((key, clock), trace) in keys.iter().zip(clocks.iter()).zip(traces) {
        series.insert(key.clone(), Some(clock.kind()), trace)?;
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clocksandbox_clock::{IdealClock, WhiteFrequencyClock};
    use clocksandbox_core::{ClockKind, SandboxError};

    /// Clock that records every tick it receives
    struct CountingClock {
        ticks: usize,
        elapsed: f64,
    }

    impl Clock for CountingClock {
        fn tick(&mut self, dt: f64) {
            self.ticks += 1;
            self.elapsed += dt;
        }

        fn read_time(&self) -> f64 {
            self.elapsed
        }

        fn uncertainty(&self) -> f64 {
            0.0
        }

        fn metadata(&self) -> clocksandbox_clock::ClockMetadata {
            clocksandbox_clock::ClockMetadata::new(ClockKind::Ideal, "counting")
        }
    }

    #[test]
    fn test_run_clocks_grid_and_lengths() {
        let mut clocks = vec![IdealClock::new(), IdealClock::new()];
        let ts = run_clocks(&mut clocks, 10.0, 0.5).unwrap();

        assert_eq!(ts.len(), 21);
        assert_eq!(ts.keys().collect::<Vec<_>>(), vec!["clock_0", "clock_1"]);
        assert_eq!(ts.time()[0], 0.0);
        assert_eq!(ts.time()[20], 10.0);
        assert_eq!(ts.series("clock_1").unwrap()[0], 0.0);
        assert_eq!(ts.series("clock_1").unwrap()[20], 10.0);
    }

    #[test]
    fn test_run_clocks_rounds_step_count() {
        let mut clocks = vec![IdealClock::new()];
        let ts = run_clocks(&mut clocks, 10.4, 1.0).unwrap();
        assert_eq!(ts.len(), 11);

        // Ties go to even
        let mut clocks = vec![IdealClock::new()];
        let ts = run_clocks(&mut clocks, 2.5, 1.0).unwrap();
        assert_eq!(ts.len(), 3);

        let mut clocks = vec![IdealClock::new()];
        let ts = run_clocks(&mut clocks, 0.4, 1.0).unwrap();
        assert_eq!(ts.len(), 1);
    }

    #[test]
    fn test_invalid_arguments_touch_no_clock() {
        let mut clocks = vec![CountingClock {
            ticks: 0,
            elapsed: 0.0,
        }];

        for (duration, dt) in [
            (-1.0, 1.0), (0.0, 1.0), (10.0, 0.0), (10.0, -1.0), (f64::NAN, 1.0),
            (10.0, f64::INFINITY), (f64::INFINITY, 1.0), (2e18, 1.0),
        ] {
            let err = run_clocks(&mut clocks, duration, dt).unwrap_err();
            assert!(matches!(err, SandboxError::InvalidArgument(_)));
        }
        assert_eq!(clocks[0].ticks, 0);
    }

    #[test]
    fn test_step_count_bounded() {
        assert!(SimulationConfig::new(2e18, 1.0).n_steps().is_err());
        assert!(SimulationConfig::new(10.0, f64::INFINITY).n_steps().is_err());
        assert_eq!(SimulationConfig::new(1e6, 1.0).n_steps().unwrap(), 1_000_000);
    }

    #[test]
    fn test_empty_collection_rejected() {
        let mut clocks: Vec<IdealClock> = Vec::new();
        assert!(matches!(
            run_clocks(&mut clocks, 10.0, 1.0),
            Err(SandboxError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_ensemble_labels_and_kinds() {
        let mut ensemble = ClockEnsemble::new();
        ensemble.add_labeled("ideal", IdealClock::new()).unwrap();
        ensemble
            .add_labeled("white", WhiteFrequencyClock::new(1e-11, 42).unwrap())
            .unwrap();
        assert!(ensemble.add_labeled("ideal", IdealClock::new()).is_err());
        assert!(ensemble.add_labeled("time", IdealClock::new()).is_err());

        let ts = ensemble.run(&SimulationConfig::short(100.0)).unwrap();
        assert_eq!(ts.keys().collect::<Vec<_>>(), vec!["ideal", "white"]);
        assert_eq!(ts.kind("ideal"), Some(ClockKind::Ideal));
        assert_eq!(ts.kind("white"), Some(ClockKind::WhiteFrequency));
        assert_eq!(ts.reference_key(), Some("ideal"));
        assert_eq!(ensemble.clock("white").unwrap().read_time(), ts.series("white").unwrap()[100]);
    }

    #[test]
    fn test_ensemble_default_keys_follow_registration() {
        let mut ensemble = ClockEnsemble::new();
        assert_eq!(ensemble.add(IdealClock::new()).unwrap(), "clock_0");
        assert_eq!(
            ensemble.add_config(&ClockConfig::white(1)).unwrap(),
            "clock_1"
        );
        assert_eq!(ensemble.len(), 2);
    }

    #[test]
    fn test_tick_order_does_not_change_values() {
        let white = || WhiteFrequencyClock::new(1e-9, 7).unwrap();

        let mut alone = vec![white()];
        let ts_alone = run_clocks(&mut alone, 50.0, 1.0).unwrap();

        let mut ensemble = ClockEnsemble::new();
        ensemble.add(WhiteFrequencyClock::new(1e-9, 99).unwrap()).unwrap();
        ensemble.add(white()).unwrap();
        let ts_pair = ensemble.run(&SimulationConfig::short(50.0)).unwrap();

        assert_eq!(
            ts_alone.series("clock_0").unwrap(),
            ts_pair.series("clock_1").unwrap()
        );
    }
}
