//! Configuration options for the MCCFR solver.
//!
//! This module provides the configuration structs that control the behavior
//! of the solver, including discounting and the regret weighting rule.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Discounted CFR schedule.
///
/// Every `interval` completed iterations `t`, positive regrets are scaled by
/// `t^alpha / (t^alpha + 1)`, negative regrets by `t^beta / (t^beta + 1)` and
/// strategy sums by `(t / (t + 1))^gamma`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscountConfig {
    /// Exponent for positive regrets.
    pub alpha: f64,
    /// Exponent for negative regrets.
    pub beta: f64,
    /// Exponent for strategy sums.
    pub gamma: f64,
    /// Iterations between applications.
    pub interval: u64,
}

impl Default for DiscountConfig {
    fn default() -> Self {
        Self {
            alpha: 1.5,
            beta: 0.0,
            gamma: 2.0,
            interval: 100,
        }
    }
}

impl DiscountConfig {
    /// Multipliers `(positive, negative, strategy)` after `t` iterations.
    pub fn factors(&self, t: u64) -> (f64, f64, f64) {
        let t = t as f64;
        let pos = t.powf(self.alpha);
        let neg = t.powf(self.beta);
        (
            pos / (pos + 1.0),
            neg / (neg + 1.0),
            (t / (t + 1.0)).powf(self.gamma),
        )
    }
}

/// Configuration for the MCCFR solver.
///
/// # Example
/// ```
/// use postflop_mccfr::cfr::SolverConfig;
///
/// let config = SolverConfig::default().with_seed(7).with_iterations(500);
/// assert!(config.validate().is_ok());
/// assert!(config.discount.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Number of iterations run by `solve()`.
    pub iterations: u64,

    /// Iterations between progress callbacks.
    pub progress_interval: u64,

    /// Random seed for reproducibility. `None` seeds from entropy.
    pub seed: Option<u64>,

    /// Discounted CFR schedule. `None` disables discounting.
    pub discount: Option<DiscountConfig>,

    /// Floor cumulative regrets at zero after every update (CFR+).
    pub use_cfr_plus: bool,

    /// Weight strategy-sum contributions by the iteration number.
    pub use_linear_averaging: bool,

    /// Scale regret updates by the opponent's reach probability.
    ///
    /// When false, the sampled counterfactual value difference is used
    /// directly, which is the textbook external-sampling estimator.
    pub weight_regrets_by_opponent_reach: bool,

    /// Probability of sampling an opponent action uniformly instead of from
    /// the current strategy.
    pub exploration: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            iterations: 10_000,
            progress_interval: 100,
            seed: None,
            discount: Some(DiscountConfig::default()),
            use_cfr_plus: false,
            use_linear_averaging: false,
            weight_regrets_by_opponent_reach: true,
            exploration: 0.0,
        }
    }
}

impl SolverConfig {
    /// Create a new config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain external-sampling MCCFR with no discounting.
    pub fn vanilla() -> Self {
        Self {
            discount: None,
            weight_regrets_by_opponent_reach: false,
            ..Default::default()
        }
    }

    /// CFR+ with linear averaging, usually the quickest to settle.
    pub fn fast() -> Self {
        Self {
            discount: None,
            use_cfr_plus: true,
            use_linear_averaging: true,
            weight_regrets_by_opponent_reach: false,
            ..Default::default()
        }
    }

    /// Builder method: set the iteration count.
    pub fn with_iterations(mut self, iterations: u64) -> Self {
        self.iterations = iterations;
        self
    }

    /// Builder method: set the progress interval.
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Builder method: set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder method: set or clear the discount schedule.
    pub fn with_discount(mut self, discount: Option<DiscountConfig>) -> Self {
        self.discount = discount;
        self
    }

    /// Builder method: set whether to use CFR+.
    pub fn with_cfr_plus(mut self, enable: bool) -> Self {
        self.use_cfr_plus = enable;
        self
    }

    /// Builder method: set the regret weighting rule.
    pub fn with_opponent_reach_weighting(mut self, enable: bool) -> Self {
        self.weight_regrets_by_opponent_reach = enable;
        self
    }

    /// Builder method: set exploration probability.
    ///
    /// Values outside [0, 1] are kept and rejected by [`SolverConfig::validate`].
    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    /// Load a config from a JSON string and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON file and validate it.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.progress_interval == 0 {
            return Err(ConfigError::Invalid("progress_interval must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.exploration) {
            return Err(ConfigError::InvalidExploration(self.exploration));
        }
        if let Some(d) = &self.discount {
            if d.interval == 0 {
                return Err(ConfigError::Invalid("discount interval must be positive".into()));
            }
            for (name, value) in [("alpha", d.alpha), ("beta", d.beta), ("gamma", d.gamma)] {
                if !value.is_finite() || value < 0.0 {
                    return Err(ConfigError::InvalidDiscount(name, value));
                }
            }
        }
        Ok(())
    }
}

/// Errors produced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Exploration probability is out of range [0, 1].
    #[error("exploration probability {0} is out of range [0, 1]")]
    InvalidExploration(f64),
    /// A discount exponent is negative or not finite.
    #[error("discount exponent {0} = {1} must be finite and non-negative")]
    InvalidDiscount(&'static str, f64),
    /// Any other invalid setting.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// The config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// The config text is not valid JSON for this struct.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Statistics tracked during a solve.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SolveStats {
    /// Total number of completed iterations.
    pub iterations: u64,
    /// Iterations skipped because no deal was possible.
    pub skipped_deals: u64,
    /// Number of information sets discovered.
    pub info_sets: usize,
    /// Time spent in the last `solve` call, in seconds.
    pub elapsed_seconds: f64,
    /// Iterations per second during the last `solve` call.
    pub iterations_per_second: f64,
}

impl SolveStats {
    /// Update iterations per second from a batch size.
    pub fn update_rate(&mut self, batch: u64) {
        if self.elapsed_seconds > 0.0 {
            self.iterations_per_second = batch as f64 / self.elapsed_seconds;
        }
    }
}

/// Progress snapshot handed to progress callbacks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveProgress {
    /// Completed iterations.
    pub iteration: u64,
    /// Iterations requested for this solve.
    pub total: u64,
    /// Progress proxy, see [`progress_proxy`](crate::cfr::progress_proxy).
    pub exploitability: f64,
    /// True on the final report of a solve.
    pub complete: bool,
    /// Human-readable status line.
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SolverConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.iterations, 10_000);
        assert_eq!(config.progress_interval, 100);
        assert_eq!(config.discount, Some(DiscountConfig::default()));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = SolverConfig { exploration: 1.5, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidExploration(_))));

        let config = SolverConfig::default().with_discount(Some(DiscountConfig {
            alpha: -1.0,
            ..Default::default()
        }));
        assert!(matches!(config.validate(), Err(ConfigError::InvalidDiscount("alpha", _))));

        let config = SolverConfig::default().with_progress_interval(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder_keeps_out_of_range_exploration() {
        let config = SolverConfig::default().with_exploration(2.0);
        assert_eq!(config.exploration, 2.0);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidExploration(e)) if e == 2.0));

        let config = SolverConfig::default().with_exploration(-0.1);
        assert!(config.validate().is_err());

        let config = SolverConfig::default().with_exploration(0.25);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_discount_factors() {
        let d = DiscountConfig::default();
        let (pos, neg, strat) = d.factors(100);
        assert!((pos - 1000.0 / 1001.0).abs() < 1e-12);
        assert!((neg - 0.5).abs() < 1e-12);
        assert!((strat - (100.0f64 / 101.0).powi(2)).abs() < 1e-12);
        assert!(pos < 1.0 && neg < 1.0 && strat < 1.0);
    }

    #[test]
    fn test_json_round_trip_with_defaults() {
        let config = SolverConfig::from_json_str(r#"{"iterations": 250, "seed": 3}"#).unwrap();
        assert_eq!(config.iterations, 250);
        assert_eq!(config.seed, Some(3));
        assert!(config.weight_regrets_by_opponent_reach);

        let err = SolverConfig::from_json_str(r#"{"exploration": 2.0}"#);
        assert!(err.is_err());
        assert!(matches!(SolverConfig::from_json_str("not json"), Err(ConfigError::Parse(_))));
    }
}
