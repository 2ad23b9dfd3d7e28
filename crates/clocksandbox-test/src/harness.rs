//! Scenario harness - runs an ensemble against its ideal reference
//!
//! A scenario registers clocks, simulates them, compares every noisy clock
//! with the ideal reference, and optionally fuses the noisy clocks into a
//! consensus that is compared with the reference the same way.

use serde::Serialize;
use tracing::info;

use clocksandbox_analysis::{
    compare_clocks, consensus_weighted_average, ClockEnsemble, ComparisonMetrics, ConsensusDetail,
    ConsensusParams, SimulationConfig, WeightingMethod,
};
use clocksandbox_clock::ClockConfig;
use clocksandbox_core::{ClockKind, SandboxError, SandboxResult, TimeSeries};

/// One noisy clock measured against the reference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseReport {
    pub key: String,
    pub kind: Option<ClockKind>,
    pub metrics: ComparisonMetrics,
}

/// Consensus of the noisy clocks measured against the reference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsensusReport {
    pub method: WeightingMethod,
    pub keys: Vec<String>,
    pub weights: Vec<f64>,
    pub detail: ConsensusDetail,
    pub metrics: ComparisonMetrics,
}

/// Scenario outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub n_samples: usize,
    pub reference: String,
    pub pairwise: Vec<PairwiseReport>,
    pub consensus: Option<ConsensusReport>,
}

/// Clock ensemble plus what to run and measure
pub struct Scenario {
    name: String,
    config: SimulationConfig,
    ensemble: ClockEnsemble,
    consensus: Option<ConsensusParams>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, config: SimulationConfig) -> Self {
        Scenario {
            name: name.into(),
            config,
            ensemble: ClockEnsemble::new(),
            consensus: None,
        }
    }

    /// Register a clock under `key`
    pub fn with_clock(mut self, key: &str, clock: &ClockConfig) -> SandboxResult<Self> {
        self.ensemble.add_labeled(key, clock.build()?)?;
        Ok(self)
    }

    /// Fuse the noisy clocks after the run
    pub fn with_consensus(mut self, params: ConsensusParams) -> Self {
        self.consensus = Some(params);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Simulate and measure
    pub fn run(&mut self) -> SandboxResult<(TimeSeries, ScenarioReport)> {
        let series = self.ensemble.run(&self.config)?;
        let report = self.measure(&series)?;

        info!(
            scenario = %self.name,
            samples = report.n_samples,
            clocks = series.series_count(),
            "scenario complete"
        );
        Ok((series, report))
    }

    fn measure(&self, series: &TimeSeries) -> SandboxResult<ScenarioReport> {
        let reference = series
            .reference_key()
            .ok_or_else(|| SandboxError::invalid_argument("scenario has no ideal reference clock"))?;
        let time = series.time();
        let ref_values = series.series(reference)?;

        let noisy: Vec<&str> = series.keys().filter(|k| *k != reference).collect();

        let pairwise = noisy
            .iter()
            .map(|key| {
                Ok(PairwiseReport {
                    key: key.to_string(),
                    kind: series.kind(key),
                    metrics: compare_clocks(time, ref_values, series.series(key)?)?,
                })
            })
            .collect::<SandboxResult<Vec<_>>>()?;

        let consensus = match &self.consensus {
            Some(params) => {
                let result = consensus_weighted_average(series, &noisy, params)?;
                let metrics = compare_clocks(&result.time, ref_values, &result.consensus)?;
                Some(ConsensusReport {
                    method: result.method,
                    keys: noisy.iter().map(|k| k.to_string()).collect(),
                    weights: result.weights,
                    detail: result.detail,
                    metrics,
                })
            }
            None => None,
        };

        Ok(ScenarioReport {
            name: self.name.clone(),
            n_samples: series.len(),
            reference: reference.to_string(),
            pairwise,
            consensus,
        })
    }
}

/// Predefined scenarios
pub mod scenarios {
    use super::*;

    /// Ideal reference against white frequency noise (sigma_y = 1e-11)
    pub fn basic_comparison(config: SimulationConfig, seed: u64) -> SandboxResult<Scenario> {
        Scenario::new("ideal-vs-white", config)
            .with_clock("ideal", &ClockConfig::Ideal)?
            .with_clock(
                "white",
                &ClockConfig::WhiteFrequency {
                    sigma_y: 1e-11,
                    seed,
                },
            )
    }

    /// Ideal reference against random-walk frequency noise
    pub fn random_walk_vs_ideal(config: SimulationConfig, seed: u64) -> SandboxResult<Scenario> {
        Scenario::new("ideal-vs-random-walk", config)
            .with_clock("ideal", &ClockConfig::Ideal)?
            .with_clock(
                "random_walk",
                &ClockConfig::RandomWalkFrequency {
                    sigma_rw: 2e-14,
                    seed,
                },
            )
    }

    /// Ideal reference against flicker-like frequency noise
    pub fn flicker_vs_ideal(config: SimulationConfig, seed: u64) -> SandboxResult<Scenario> {
        Scenario::new("ideal-vs-flicker", config)
            .with_clock("ideal", &ClockConfig::Ideal)?
            .with_clock(
                "flicker",
                &ClockConfig::FlickerFrequency {
                    sigma_w: 5e-12,
                    a: 1e-3,
                    seed,
                },
            )
    }

    /// Three noise models fused by consensus and judged against the reference
    pub fn triangular_consensus(
        config: SimulationConfig,
        seeds: [u64; 3],
        params: ConsensusParams,
    ) -> SandboxResult<Scenario> {
        Ok(Scenario::new("triangular-consensus", config)
            .with_clock("ideal", &ClockConfig::Ideal)?
            .with_clock(
                "white",
                &ClockConfig::WhiteFrequency {
                    sigma_y: 1e-11,
                    seed: seeds[0],
                },
            )?
            .with_clock(
                "random_walk",
                &ClockConfig::RandomWalkFrequency {
                    sigma_rw: 2e-14,
                    seed: seeds[1],
                },
            )?
            .with_clock(
                "flicker",
                &ClockConfig::FlickerFrequency {
                    sigma_w: 5e-12,
                    a: 1e-3,
                    seed: seeds[2],
                },
            )?
            .with_consensus(params))
    }
}
