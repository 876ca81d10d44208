//! Deterministic head-to-head benchmark for the crush bots.

pub mod analytics;
pub mod config;
pub mod logging;
pub mod tournament;
