//! Depth-limited minimax with alpha-beta pruning over a node arena.
//!
//! A move that grants an extra turn does not spend search depth, and the
//! same side moves again in the next ply. After a node has been searched its
//! board is dropped, and its subtree is dropped unless it is the root or a
//! child of the root.

mod driver;
mod tree;

pub use driver::{SearchDriver, choose_move};
pub use tree::{GameTree, NodeId, NodeState};

pub(crate) use tree::score_move;

/// Tuning knobs for [`SearchDriver`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    /// Plies searched below the root, not counting extra turns.
    pub depth: usize,
    /// Slider factor of the weighting model used for every node.
    pub slider_factor: f64,
}

impl SearchConfig {
    pub const DEFAULT_DEPTH: usize = 3;
    pub const DEFAULT_SLIDER_FACTOR: f64 = 1.7;
    pub const MAX_DEPTH: usize = 6;

    pub const fn new(depth: usize, slider_factor: f64) -> Self {
        Self {
            depth,
            slider_factor,
        }
    }

    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let depth = read("CRUSH_SEARCH_DEPTH")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|depth| (1..=Self::MAX_DEPTH).contains(depth))
            .unwrap_or(Self::DEFAULT_DEPTH);

        let slider_factor = read("CRUSH_SLIDER_FACTOR")
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|factor| factor.is_finite() && (0.0..=10.0).contains(factor))
            .unwrap_or(Self::DEFAULT_SLIDER_FACTOR);

        Self {
            depth,
            slider_factor,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DEPTH, Self::DEFAULT_SLIDER_FACTOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn search_config_defaults_without_env() {
        let config = SearchConfig::from_reader(|_| None);
        assert_eq!(config, SearchConfig::default());
        assert_eq!(config.depth, 3);
        assert!((config.slider_factor - 1.7).abs() < f64::EPSILON);
    }

    #[test]
    fn search_config_reads_overrides() {
        let mut vars = HashMap::new();
        vars.insert("CRUSH_SEARCH_DEPTH".to_string(), " 2 ".to_string());
        vars.insert("CRUSH_SLIDER_FACTOR".to_string(), "0.5".to_string());

        let config = SearchConfig::from_reader(|key| vars.get(key).cloned());
        assert_eq!(config.depth, 2);
        assert!((config.slider_factor - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn search_config_ignores_out_of_range_values() {
        let mut vars = HashMap::new();
        vars.insert("CRUSH_SEARCH_DEPTH".to_string(), "0".to_string());
        vars.insert("CRUSH_SLIDER_FACTOR".to_string(), "NaN".to_string());

        let config = SearchConfig::from_reader(|key| vars.get(key).cloned());
        assert_eq!(config, SearchConfig::default());
    }
}
