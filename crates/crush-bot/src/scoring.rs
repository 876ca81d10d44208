use crate::error::BotError;
use crate::heuristics::Heuristic;
use crate::weighting::{Tier, WeightingModel};
use std::collections::BTreeMap;

/// Combines heuristics grouped by tier into one weighted utility.
///
/// Tiers are only checked against the model when [`ScoringEngine::evaluate`]
/// runs.
pub struct ScoringEngine<'a, M: WeightingModel> {
    model: M,
    groups: BTreeMap<Tier, Vec<&'a dyn Heuristic>>,
}

impl<'a, M: WeightingModel> ScoringEngine<'a, M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            groups: BTreeMap::new(),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn add(&mut self, heuristic: &'a dyn Heuristic, tier: Tier) -> &mut Self {
        self.groups.entry(tier).or_default().push(heuristic);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Sum over populated tiers of `weight(tier) * mean(heuristics in tier)`.
    pub fn evaluate(&self) -> Result<f64, BotError> {
        let weights = self.model.weights(&self.groups.keys().copied().collect())?;

        let mut total = 0.0;
        for (tier, heuristics) in &self.groups {
            let mut sum = 0.0;
            for heuristic in heuristics {
                sum += heuristic.evaluate()?;
            }
            let weight = weights
                .get(tier)
                .copied()
                .ok_or(BotError::IllegalWeight(*tier))?;
            total += weight * sum / heuristics.len() as f64;
        }
        Ok(total)
    }
}
