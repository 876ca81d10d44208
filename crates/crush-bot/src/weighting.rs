//! Weighting models turn a set of importance tiers into normalized weights.

use crate::error::BotError;
use core::fmt;
use std::collections::{BTreeMap, BTreeSet};

/// Importance bucket used to group heuristics before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tier(pub u8);

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tier-{}", self.0)
    }
}

pub trait WeightingModel {
    /// Declared tiers, least important first.
    fn tiers(&self) -> &[Tier];

    /// Weights for exactly the `used` tiers, summing to `1.0`.
    ///
    /// Fails with [`BotError::IllegalWeight`] when a tier is not declared.
    fn weights(&self, used: &BTreeSet<Tier>) -> Result<BTreeMap<Tier, f64>, BotError>;
}

/// Exponential slider: tier `i` weighs `exp(i * factor)` before
/// normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderModel {
    factor: f64,
}

impl SliderModel {
    pub const VERY_LOW: Tier = Tier(0);
    pub const LOW: Tier = Tier(1);
    pub const MEDIUM: Tier = Tier(2);
    pub const HIGH: Tier = Tier(3);
    pub const VERY_HIGH: Tier = Tier(4);

    const TIERS: [Tier; 5] = [
        Self::VERY_LOW,
        Self::LOW,
        Self::MEDIUM,
        Self::HIGH,
        Self::VERY_HIGH,
    ];

    pub const DEFAULT_FACTOR: f64 = 2.0;

    pub const fn new(factor: f64) -> Self {
        Self { factor }
    }

    pub const fn factor(&self) -> f64 {
        self.factor
    }
}

impl Default for SliderModel {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FACTOR)
    }
}

impl WeightingModel for SliderModel {
    fn tiers(&self) -> &[Tier] {
        &Self::TIERS
    }

    fn weights(&self, used: &BTreeSet<Tier>) -> Result<BTreeMap<Tier, f64>, BotError> {
        let mut raw = BTreeMap::new();
        for tier in used {
            let index = Self::TIERS
                .iter()
                .position(|declared| declared == tier)
                .ok_or(BotError::IllegalWeight(*tier))?;
            raw.insert(*tier, (index as f64 * self.factor).exp());
        }

        let total: f64 = raw.values().sum();
        Ok(raw
            .into_iter()
            .map(|(tier, weight)| (tier, weight / total))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn used(tiers: &[Tier]) -> BTreeSet<Tier> {
        tiers.iter().copied().collect()
    }

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() < tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn factor_one_over_three_tiers() {
        let model = SliderModel::new(1.0);
        let weights = model
            .weights(&used(&[SliderModel::VERY_LOW, SliderModel::MEDIUM, SliderModel::HIGH]))
            .unwrap();

        assert_eq!(weights.len(), 3);
        assert_close(weights[&SliderModel::VERY_LOW], 0.0351, 1e-4);
        assert_close(weights[&SliderModel::MEDIUM], 0.2595, 1e-4);
        assert_close(weights[&SliderModel::HIGH], 0.7054, 1e-4);
        assert_close(weights.values().sum(), 1.0, 1e-12);
    }

    #[test]
    fn default_factor_sharpens_the_top_tier() {
        let model = SliderModel::default();
        let weights = model
            .weights(&used(&[SliderModel::VERY_LOW, SliderModel::MEDIUM, SliderModel::HIGH]))
            .unwrap();

        assert_close(weights[&SliderModel::VERY_LOW], 0.00218, 1e-5);
        assert_close(weights[&SliderModel::MEDIUM], 0.11894, 1e-5);
        assert_close(weights[&SliderModel::HIGH], 0.87888, 1e-5);
    }

    #[test]
    fn single_tier_always_weighs_one() {
        for factor in [0.0, 0.5, 1.7, 9.0] {
            let weights = SliderModel::new(factor)
                .weights(&used(&[SliderModel::HIGH]))
                .unwrap();
            assert_eq!(weights[&SliderModel::HIGH], 1.0);
        }
    }

    #[test]
    fn zero_factor_is_flat() {
        let weights = SliderModel::new(0.0)
            .weights(&used(&SliderModel::TIERS))
            .unwrap();
        for weight in weights.values() {
            assert_close(*weight, 0.2, 1e-12);
        }
    }

    #[test]
    fn undeclared_tiers_are_rejected() {
        let err = SliderModel::default()
            .weights(&used(&[SliderModel::LOW, Tier(9)]))
            .unwrap_err();
        assert_eq!(err, BotError::IllegalWeight(Tier(9)));
    }

    #[test]
    fn nothing_requested_yields_nothing() {
        assert!(SliderModel::default().weights(&BTreeSet::new()).unwrap().is_empty());
    }
}
