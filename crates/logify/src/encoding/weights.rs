//! Confidence to weight transform
//!
//! `W(w) = max(1, round(scale * -ln(1 - w)))`
//!
//! A soft constraint held with confidence `w` costs `W(w)` to violate and
//! `W(1 - w)` to satisfy, i.e. the negative log-probability of the state
//! the model chose. Strictly increasing for confidences at least
//! `1 / scale` apart (the derivative of `-ln(1 - w)` is at least 1).

use crate::error::{LogifyError, Result};

pub const DEFAULT_SCALE: f64 = 1_000_000.0;

/// Largest accepted scale; larger values saturate weights of ordinary
/// confidences and let a handful of soft clauses overflow the cost sum
pub const MAX_SCALE: f64 = 1e12;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WeightTransform {
    scale: f64,
}

impl Default for WeightTransform {
    fn default() -> Self {
        WeightTransform { scale: DEFAULT_SCALE }
    }
}

impl WeightTransform {
    /// `scale` must lie in `[1, MAX_SCALE]` (`EngineConfig::validate`
    /// checks this for configured values)
    pub fn new(scale: f64) -> Self {
        WeightTransform { scale }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Weight of violating a constraint held with `confidence`
    pub fn weight(&self, confidence: f64) -> Result<u64> {
        let w = validate_confidence(confidence)?;
        // -ln(1 - w) via ln_1p keeps precision near w = 0
        let raw = self.scale * -(-w).ln_1p();
        Ok(raw.round().max(1.0) as u64)
    }

    /// `(W(w), W(1 - w))`: weights of the asserted and the negated unit
    pub fn pair(&self, confidence: f64) -> Result<(u64, u64)> {
        let w = validate_confidence(confidence)?;
        Ok((self.weight(w)?, self.weight(1.0 - w)?))
    }
}

/// Accept only finite confidences strictly between 0 and 1
pub fn validate_confidence(value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(LogifyError::InvalidConfidence { value })
    }
}
