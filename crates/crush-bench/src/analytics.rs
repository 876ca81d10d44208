use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::config::{AgentKind, BenchmarkConfig};
use crate::tournament::{DecisionSummary, GameOutcome};

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("agent '{0}' defined in results but missing from configuration")]
    UnknownAgent(String),
    #[error("game {0} finished with {1} seats instead of 2")]
    SeatCount(String, usize),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Aggregates per-agent results while games are played.
pub struct AnalyticsCollector {
    agents: HashMap<String, AgentAccumulator>,
    agent_order: Vec<String>,
    games: usize,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Self {
        let mut agents = HashMap::new();
        let mut order = Vec::new();
        for agent in &config.agents {
            agents.insert(
                agent.name.clone(),
                AgentAccumulator::new(agent.name.clone(), agent.kind),
            );
            order.push(agent.name.clone());
        }

        Self {
            agents,
            agent_order: order,
            games: 0,
        }
    }

    pub fn record_game(
        &mut self,
        game_index: usize,
        order_index: usize,
        outcome: &GameOutcome,
    ) -> Result<(), AnalyticsError> {
        let [first, second] = outcome.seat_results.as_slice() else {
            return Err(AnalyticsError::SeatCount(
                format!("G{game_index:05}_S{order_index}"),
                outcome.seat_results.len(),
            ));
        };

        for (seat, opponent) in [(first, second), (second, first)] {
            let acc = self
                .agents
                .get_mut(&seat.agent_name)
                .ok_or_else(|| AnalyticsError::UnknownAgent(seat.agent_name.clone()))?;
            acc.record_game(
                seat.points,
                opponent.points,
                seat.extra_turns,
                &seat.metrics,
            );
        }

        self.games += 1;
        Ok(())
    }

    pub fn finalize(self) -> TournamentSummary {
        let mut agents = Vec::with_capacity(self.agent_order.len());
        let mut accumulators = self.agents;
        for name in &self.agent_order {
            if let Some(acc) = accumulators.remove(name) {
                agents.push(acc.finalize());
            }
        }

        TournamentSummary {
            games: self.games,
            agents,
        }
    }
}

struct AgentAccumulator {
    name: String,
    kind: AgentKind,
    games: usize,
    wins: usize,
    draws: usize,
    points: u64,
    margin: i64,
    extra_turns: u64,
    decisions: u64,
    total_ms: f64,
}

impl AgentAccumulator {
    fn new(name: String, kind: AgentKind) -> Self {
        Self {
            name,
            kind,
            games: 0,
            wins: 0,
            draws: 0,
            points: 0,
            margin: 0,
            extra_turns: 0,
            decisions: 0,
            total_ms: 0.0,
        }
    }

    fn record_game(
        &mut self,
        points: u32,
        opponent_points: u32,
        extra_turns: u32,
        metrics: &DecisionSummary,
    ) {
        self.games += 1;
        match points.cmp(&opponent_points) {
            std::cmp::Ordering::Greater => self.wins += 1,
            std::cmp::Ordering::Equal => self.draws += 1,
            std::cmp::Ordering::Less => {}
        }
        self.points += u64::from(points);
        self.margin += i64::from(points) - i64::from(opponent_points);
        self.extra_turns += u64::from(extra_turns);
        self.decisions += u64::from(metrics.decisions);
        self.total_ms += metrics.total_ms;
    }

    fn finalize(self) -> AgentSummary {
        let games = self.games.max(1) as f64;
        AgentSummary {
            name: self.name,
            kind: self.kind,
            games: self.games,
            wins: self.wins,
            draws: self.draws,
            avg_points: self.points as f64 / games,
            avg_margin: self.margin as f64 / games,
            avg_extra_turns: self.extra_turns as f64 / games,
            avg_ms_per_decision: if self.decisions == 0 {
                0.0
            } else {
                self.total_ms / self.decisions as f64
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentSummary {
    pub name: String,
    pub kind: AgentKind,
    pub games: usize,
    pub wins: usize,
    pub draws: usize,
    pub avg_points: f64,
    pub avg_margin: f64,
    pub avg_extra_turns: f64,
    pub avg_ms_per_decision: f64,
}

impl AgentSummary {
    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.wins as f64 / self.games as f64
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TournamentSummary {
    pub games: usize,
    pub agents: Vec<AgentSummary>,
}

impl TournamentSummary {
    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut rows = String::new();
        rows.push_str("# Tournament Summary\n\n");
        rows.push_str(&format!("Games played: {}\n\n", self.games));
        rows.push_str("| Agent | Kind | Games | Win % | Draws | Avg points | Avg margin | Extra turns/game | Avg ms/decision |\n");
        rows.push_str("|-------|------|-------|-------|-------|------------|------------|------------------|-----------------|\n");

        for agent in &self.agents {
            rows.push_str(&format!(
                "| {name} | {kind:?} | {games} | {win:.1}% | {draws} | {points:.2} | {margin:+.2} | {extra:.2} | {latency:.2} |\n",
                name = agent.name,
                kind = agent.kind,
                games = agent.games,
                win = agent.win_rate() * 100.0,
                draws = agent.draws,
                points = agent.avg_points,
                margin = agent.avg_margin,
                extra = agent.avg_extra_turns,
                latency = agent.avg_ms_per_decision,
            ));
        }

        fs::write(path, rows).map_err(|source| AnalyticsError::Io {
            context: "writing summary markdown",
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(decisions: u32, total_ms: f64) -> DecisionSummary {
        DecisionSummary {
            decisions,
            avg_ms_per_decision: total_ms / f64::from(decisions.max(1)),
            total_ms,
        }
    }

    #[test]
    fn accumulator_tracks_results_and_latency() {
        let mut acc = AgentAccumulator::new("searcher".into(), AgentKind::Heuristic);
        acc.record_game(30, 20, 2, &metrics(10, 50.0));
        acc.record_game(15, 15, 0, &metrics(10, 30.0));
        acc.record_game(5, 25, 1, &metrics(5, 20.0));

        let summary = acc.finalize();
        assert_eq!(summary.games, 3);
        assert_eq!(summary.wins, 1);
        assert_eq!(summary.draws, 1);
        assert!((summary.avg_points - 50.0 / 3.0).abs() < 1e-9);
        assert!((summary.avg_margin - (-10.0 / 3.0)).abs() < 1e-9);
        assert!((summary.avg_extra_turns - 1.0).abs() < 1e-9);
        assert!((summary.avg_ms_per_decision - 4.0).abs() < 1e-9);
        assert!((summary.win_rate() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_accumulator_does_not_divide_by_zero() {
        let summary = AgentAccumulator::new("idle".into(), AgentKind::Heuristic).finalize();
        assert_eq!(summary.avg_points, 0.0);
        assert_eq!(summary.avg_ms_per_decision, 0.0);
        assert_eq!(summary.win_rate(), 0.0);
    }
}
