//! Engine configuration types.

use crate::encoding::weights::MAX_SCALE;
use crate::error::{LogifyError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for knowledge base construction and queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Time budget for every individual solver call, in milliseconds
    pub solver_timeout_ms: u64,
    /// Multiplier applied before rounding soft weights to integers
    pub weight_scale: f64,
    /// Reject queries that name propositions unknown to the knowledge base
    pub strict_propositions: bool,
    /// Fail construction instead of marking all queries vacuous
    pub reject_inconsistent_hard_set: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            solver_timeout_ms: 60_000,
            weight_scale: 1_000_000.0,
            strict_propositions: false,
            reject_inconsistent_hard_set: false,
        }
    }
}

impl EngineConfig {
    /// Load from JSON; missing fields take their defaults
    pub fn from_json(text: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1.0..=MAX_SCALE).contains(&self.weight_scale) {
            return Err(LogifyError::InvalidConfig(format!(
                "weight_scale must lie between 1 and {:e}, got {}",
                MAX_SCALE, self.weight_scale
            )));
        }
        Ok(())
    }

    pub fn solver_timeout(&self) -> Duration {
        Duration::from_millis(self.solver_timeout_ms)
    }

    pub fn with_solver_timeout(mut self, budget: Duration) -> Self {
        self.solver_timeout_ms = budget.as_millis().min(u64::MAX as u128) as u64;
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict_propositions = true;
        self
    }
}
