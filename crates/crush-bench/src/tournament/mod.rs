mod seating;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::logging::TELEMETRY_FILE;
use crush_bot::{BotDifficulty, BotError, Policy, SearchConfig, SliderModel, policy_for};
use crush_core::game::match_state::{MatchError, MatchState, PlayerId};
use crush_core::game::serialization::BoardSnapshot;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{AgentConfig, AgentKind, BenchmarkConfig, ResolvedOutputs};

use seating::SeatOrders;

/// Plays every configured game between two agents and records the results.
pub struct TournamentRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    agents: Vec<AgentBlueprint>,
    seat_orders: SeatOrders,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub games_played: usize,
    pub seat_orders: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
}

impl TournamentRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let agents = AgentBlueprint::from_configs(&config.agents)?;

        if agents.len() != 2 {
            return Err(RunnerError::SeatCount {
                found: agents.len(),
            });
        }

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            seat_orders: SeatOrders::new(config.games.swap_seats),
            config,
            outputs,
            agents,
        })
    }

    /// Execute the tournament, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let orders = self.seat_orders.as_slice();
        let mut rng = StdRng::seed_from_u64(self.config.games.seed.unwrap_or(0));
        let mut rows_written = 0usize;
        let mut analytics = AnalyticsCollector::new(&self.config);

        for game_index in 0..self.config.games.count {
            let game_seed = rng.next_u64();

            for (order_index, order) in orders.iter().enumerate() {
                let outcome = self.play_game(game_index, order_index, game_seed, order)?;
                analytics.record_game(game_index, order_index, &outcome)?;
                rows_written += write_game_rows(
                    &mut writer,
                    &self.config,
                    game_index,
                    order_index,
                    game_seed,
                    &outcome,
                )?;
            }
        }

        writer.flush()?;

        let summary = analytics.finalize();
        summary.write_markdown(&self.outputs.summary_md)?;

        let telemetry_path = self
            .logging_enabled
            .then(|| self.outputs.telemetry_dir().join(TELEMETRY_FILE));

        Ok(RunSummary {
            games_played: self.config.games.count,
            seat_orders: orders.len(),
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            telemetry_path,
        })
    }

    fn play_game(
        &self,
        game_index: usize,
        order_index: usize,
        game_seed: u64,
        order: &[usize; 2],
    ) -> Result<GameOutcome, RunnerError> {
        let mut state = MatchState::with_seed(self.config.rules(), game_seed)?;
        let mut seats = build_seat_states(order, &self.agents)?;
        let mut reshuffles = 0u32;

        while !state.is_finished() {
            let player = state.to_move();
            let seat = &mut seats[player.index()];
            let legal = state.legal_moves();
            // Policies never see the staging rows.
            let view = state.board().masked();

            let start = Instant::now();
            let mv = seat.policy.choose_move(&view, &legal)?;
            let elapsed_ms = seat.metrics.record(start.elapsed());

            let turn = state.apply_move(&mv)?;
            seat.moves
                .push(mv.directed().map_err(BotError::from)?.to_array());
            if turn.reshuffled {
                reshuffles += 1;
            }

            if self.logging_enabled && tracing::enabled!(target: "crush_bench::turn", Level::INFO) {
                event!(
                    target: "crush_bench::turn",
                    Level::INFO,
                    run_id = %self.config.run_id,
                    game_index = game_index as u32,
                    order_index = order_index as u32,
                    turn = state.turns_played(),
                    seat = %player,
                    bot = %seat.agent_name,
                    mv = %mv,
                    removed = turn.removed as u32,
                    cascades = turn.cascades as u32,
                    extra_turn = turn.extra_turn,
                    reshuffled = turn.reshuffled,
                    elapsed_ms
                );
            }
        }

        let scores = state.scores();
        let mut seat_results = Vec::with_capacity(seats.len());
        for seat in seats.into_iter() {
            seat_results.push(SeatResult {
                points: scores[seat.player.index()],
                extra_turns: state.extra_turns(seat.player),
                agent_name: seat.agent_name,
                player: seat.player,
                moves: seat.moves,
                metrics: seat.metrics.finalize(),
            });
        }

        Ok(GameOutcome {
            seat_results,
            reshuffles,
            turns: state.turns_played(),
            final_board: BoardSnapshot::capture(state.board()),
        })
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_game_rows(
    writer: &mut BufWriter<File>,
    config: &BenchmarkConfig,
    game_index: usize,
    order_index: usize,
    game_seed: u64,
    outcome: &GameOutcome,
) -> Result<usize, RunnerError> {
    let game_id = format!("G{game_index:05}_S{order_index:02}");

    let mut rows_written = 0usize;
    for (seat_result, opponent) in outcome
        .seat_results
        .iter()
        .zip(outcome.seat_results.iter().rev())
    {
        let row = GameLogRow {
            run_id: &config.run_id,
            game_id: &game_id,
            game_index,
            order_index,
            game_seed,
            seat: seat_result.player.to_string(),
            bot: &seat_result.agent_name,
            opponent: &opponent.agent_name,
            points: seat_result.points,
            opponent_points: opponent.points,
            result: GameResult::between(seat_result.points, opponent.points),
            extra_turns: seat_result.extra_turns,
            reshuffles: outcome.reshuffles,
            turns: outcome.turns,
            speed_ms_turn: seat_result.metrics.avg_ms_per_decision,
            decisions: seat_result.metrics.decisions,
            moves: &seat_result.moves,
            final_board: &outcome.final_board,
        };

        serde_json::to_writer(&mut *writer, &row)?;
        writer.write_all(b"\n")?;
        rows_written += 1;
    }

    Ok(rows_written)
}

fn build_seat_states(
    order: &[usize; 2],
    agents: &[AgentBlueprint],
) -> Result<Vec<SeatState>, RunnerError> {
    let mut seats = Vec::with_capacity(2);
    for (player, agent_idx) in PlayerId::LOOP.into_iter().zip(order.iter()) {
        let agent = agents
            .get(*agent_idx)
            .ok_or(RunnerError::InvalidSeatOrder {
                seat: player.index(),
                agent_index: *agent_idx,
            })?;
        seats.push(SeatState::new(player, agent));
    }
    Ok(seats)
}

struct SeatState {
    player: PlayerId,
    agent_name: String,
    policy: Box<dyn Policy>,
    moves: Vec<[i32; 3]>,
    metrics: DecisionMetrics,
}

impl SeatState {
    fn new(player: PlayerId, agent: &AgentBlueprint) -> Self {
        Self {
            player,
            agent_name: agent.name.clone(),
            policy: agent.spawn_policy(),
            moves: Vec::new(),
            metrics: DecisionMetrics::default(),
        }
    }
}

pub struct GameOutcome {
    pub seat_results: Vec<SeatResult>,
    pub reshuffles: u32,
    pub turns: u32,
    pub final_board: BoardSnapshot,
}

pub struct SeatResult {
    pub agent_name: String,
    pub player: PlayerId,
    pub points: u32,
    pub extra_turns: u32,
    /// Moves in `[x, y, direction]` wire form, in play order.
    pub moves: Vec<[i32; 3]>,
    pub metrics: DecisionSummary,
}

#[derive(Default)]
struct DecisionMetrics {
    total: Duration,
    decisions: u32,
}

impl DecisionMetrics {
    fn record(&mut self, duration: Duration) -> f64 {
        self.total += duration;
        self.decisions += 1;
        duration.as_secs_f64() * 1000.0
    }

    fn finalize(self) -> DecisionSummary {
        let avg_ms = if self.decisions == 0 {
            0.0
        } else {
            self.total.as_secs_f64() * 1000.0 / f64::from(self.decisions)
        };

        DecisionSummary {
            decisions: self.decisions,
            avg_ms_per_decision: avg_ms,
            total_ms: self.total.as_secs_f64() * 1000.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecisionSummary {
    pub decisions: u32,
    pub avg_ms_per_decision: f64,
    pub total_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum GameResult {
    Win,
    Draw,
    Loss,
}

impl GameResult {
    fn between(points: u32, opponent_points: u32) -> Self {
        match points.cmp(&opponent_points) {
            std::cmp::Ordering::Greater => GameResult::Win,
            std::cmp::Ordering::Equal => GameResult::Draw,
            std::cmp::Ordering::Less => GameResult::Loss,
        }
    }
}

#[derive(Serialize)]
struct GameLogRow<'a> {
    run_id: &'a str,
    game_id: &'a str,
    game_index: usize,
    order_index: usize,
    game_seed: u64,
    seat: String,
    bot: &'a str,
    opponent: &'a str,
    points: u32,
    opponent_points: u32,
    result: GameResult,
    extra_turns: u32,
    reshuffles: u32,
    turns: u32,
    speed_ms_turn: f64,
    decisions: u32,
    moves: &'a [[i32; 3]],
    final_board: &'a BoardSnapshot,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Agent(#[from] AgentError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("bot failed to decide: {0}")]
    Bot(#[from] BotError),
    #[error("match rejected a move: {0}")]
    Match(#[from] MatchError),
    #[error("configuration requires exactly 2 agents but found {found}")]
    SeatCount { found: usize },
    #[error("seat {seat} references invalid agent index {agent_index}")]
    InvalidSeatOrder { seat: usize, agent_index: usize },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid heuristic parameter for agent '{name}': {message}")]
    InvalidHeuristicParam { name: String, message: String },
}

struct AgentBlueprint {
    name: String,
    options: HeuristicOptions,
}

impl AgentBlueprint {
    fn from_configs(configs: &[AgentConfig]) -> Result<Vec<Self>, AgentError> {
        configs.iter().map(Self::from_config).collect()
    }

    fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let options = match config.kind {
            AgentKind::Heuristic => HeuristicOptions::from_params(&config.name, &config.params)?,
        };

        Ok(Self {
            name: config.name.clone(),
            options,
        })
    }

    fn spawn_policy(&self) -> Box<dyn Policy> {
        policy_for(self.options.difficulty, self.options.search)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct HeuristicOptions {
    difficulty: BotDifficulty,
    search: SearchConfig,
}

impl HeuristicOptions {
    fn from_params(name: &str, params: &serde_yaml::Value) -> Result<Self, AgentError> {
        let invalid = |message: String| AgentError::InvalidHeuristicParam {
            name: name.to_string(),
            message,
        };

        if params.is_null() {
            return Ok(Self::for_difficulty(BotDifficulty::default()));
        }

        let mapping = params
            .as_mapping()
            .ok_or_else(|| invalid("expected mapping for heuristic params".to_string()))?;
        let lookup = |key: &str| {
            mapping
                .iter()
                .find_map(|(k, value)| (k.as_str() == Some(key)).then_some(value))
        };

        let difficulty = match lookup("difficulty") {
            Some(value) => {
                let text = value
                    .as_str()
                    .ok_or_else(|| invalid("difficulty must be a string".to_string()))?;
                BotDifficulty::parse(text)
                    .ok_or_else(|| invalid(format!("unknown difficulty '{text}'")))?
            }
            None => BotDifficulty::default(),
        };

        let mut options = Self::for_difficulty(difficulty);

        if let Some(value) = lookup("depth") {
            let depth = value
                .as_u64()
                .map(|depth| depth as usize)
                .filter(|depth| (1..=SearchConfig::MAX_DEPTH).contains(depth))
                .ok_or_else(|| {
                    invalid(format!(
                        "depth must be an integer between 1 and {}",
                        SearchConfig::MAX_DEPTH
                    ))
                })?;
            options.search.depth = depth;
        }

        if let Some(value) = lookup("slider_factor") {
            let factor = value
                .as_f64()
                .filter(|factor| factor.is_finite() && (0.0..=10.0).contains(factor))
                .ok_or_else(|| {
                    invalid("slider_factor must be a number between 0 and 10".to_string())
                })?;
            options.search.slider_factor = factor;
        }

        Ok(options)
    }

    fn for_difficulty(difficulty: BotDifficulty) -> Self {
        let mut search = SearchConfig::default();
        if difficulty == BotDifficulty::Normal {
            search.slider_factor = SliderModel::DEFAULT_FACTOR;
        }
        Self { difficulty, search }
    }
}
