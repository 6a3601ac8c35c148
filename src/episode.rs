//! Drives episodes: rewards, truncation, the training loop with periodic
//! checkpoints and evaluations, and the greedy evaluation run.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Serialize, Deserialize};
use tracing::{debug, info, warn};

use crate::agent::Agent;
use crate::agent::replaybuffer::Transition;
use crate::approximator::Approximator;
use crate::error::{Result, SnakeError};
use crate::game::{Board, Death, StepOutcome};
use crate::history::{EpisodeRecord, EvaluationRecord, RunLog};
use crate::sequential::Sequential;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    pub food: f32,
    pub hazard: f32,
    pub death: f32,
    pub step: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            food: 1.0,
            hazard: -1.0,
            death: -5.0,
            step: 0.0,
        }
    }
}

impl RewardConfig {
    pub fn reward(&self, outcome: StepOutcome) -> f32 {
        match outcome {
            StepOutcome::Moved => self.step,
            StepOutcome::Ate => self.food,
            StepOutcome::Shrank => self.hazard,
            StepOutcome::Died(_) => self.death,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub episodes: usize,
    pub max_steps_without_food: usize,
    pub save_every: usize,
    pub eval_every: usize,
    pub eval_episodes: usize,
    /// Evaluations in a row without a new best before training stops.
    pub patience: usize,
    pub run_dir: PathBuf,
    pub show_vision: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            episodes: 10_000,
            max_steps_without_food: 100,
            save_every: 10,
            eval_every: 10,
            eval_episodes: 100,
            patience: 50,
            run_dir: PathBuf::from("models").join("model"),
            show_vision: false,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("max_steps_without_food", self.max_steps_without_food),
            ("save_every", self.save_every),
            ("eval_every", self.eval_every),
            ("eval_episodes", self.eval_episodes),
            ("patience", self.patience),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(SnakeError::config(format!("{name} must be positive")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeEnd {
    Terminal(Death),
    /// No food for too long.
    Truncated,
    /// A stop was requested mid-episode.
    Stopped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary {
    pub reward: f32,
    /// Longest the snake got during the episode.
    pub length: usize,
    pub steps: usize,
    pub end: EpisodeEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingEnd {
    Completed,
    NoImprovement,
    Interrupted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub episodes: usize,
    pub best_average: f32,
    pub end: TrainingEnd,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationSummary {
    pub games: usize,
    pub average_length: f32,
    pub max_length: usize,
}

pub struct Trainer<A: Approximator = Sequential> {
    agent: Agent<A>,
    board: Board,
    rewards: RewardConfig,
    run: RunConfig,
    stop: Arc<AtomicBool>,
}

impl<A: Approximator> Trainer<A> {
    pub fn new(agent: Agent<A>, board: Board, rewards: RewardConfig, run: RunConfig, stop: Arc<AtomicBool>) -> Self {
        Self { agent, board, rewards, run, stop }
    }

    pub fn agent(&self) -> &Agent<A> {
        &self.agent
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Plays the current board to the end, learning unless the agent is in
    /// evaluation mode, then resets the board.
    pub fn play_episode(&mut self) -> Result<EpisodeSummary> {
        let mut state = self.agent.encode(&self.board);
        let mut reward = 0.0;
        let mut length = self.board.length();
        let mut steps = 0;
        let mut since_food = 0;

        let end = loop {
            if self.stop_requested() {
                break EpisodeEnd::Stopped;
            }
            if since_food >= self.run.max_steps_without_food {
                break EpisodeEnd::Truncated;
            }

            if self.run.show_vision {
                println!("{}", self.board.vision());
            }
            let action = self.agent.select_action(&self.board, &state);
            let direction = self.agent.direction(self.board.heading(), action).ok_or_else(|| {
                SnakeError::config(format!("action {action} is outside the encoder's action space"))
            })?;
            if self.run.show_vision {
                println!("{}\n", direction.name());
            }

            let outcome = self.board.apply_action(direction)?;
            let step_reward = self.rewards.reward(outcome);
            reward += step_reward;
            steps += 1;

            if outcome == StepOutcome::Ate {
                since_food = 0;
                length = length.max(self.board.length());
            } else {
                since_food += 1;
            }

            let next_state = self.agent.encode(&self.board);
            if !self.agent.is_evaluation() {
                self.agent.train_step(Transition {
                    state,
                    action,
                    reward: step_reward,
                    next_state: next_state.clone(),
                    terminal: outcome.is_terminal(),
                });
            }
            state = next_state;

            if let StepOutcome::Died(death) = outcome {
                break EpisodeEnd::Terminal(death);
            }
        };

        debug!(?end, steps, length, "episode finished");
        self.board.reset()?;
        Ok(EpisodeSummary { reward, length, steps, end })
    }

    /// Max lengths of the greedy episodes that ran to the end. A stop cuts the
    /// run short and the interrupted game is dropped. Weights and the replay
    /// buffer are left untouched.
    pub fn evaluate_lengths(&mut self, episodes: usize) -> Result<Vec<usize>> {
        let was_evaluating = self.agent.is_evaluation();
        self.agent.set_evaluation(true);

        let mut lengths = Vec::with_capacity(episodes);
        let mut result = Ok(());
        for _ in 0..episodes {
            if self.stop_requested() {
                break;
            }
            match self.play_episode() {
                Ok(summary) if summary.end == EpisodeEnd::Stopped => break,
                Ok(summary) => lengths.push(summary.length),
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }

        self.agent.set_evaluation(was_evaluating);
        result.map(|_| lengths)
    }

    /// Mean length over `episodes` greedy games, `None` when a stop arrived
    /// before all of them finished.
    pub fn evaluate(&mut self, episodes: usize) -> Result<Option<f32>> {
        let lengths = self.evaluate_lengths(episodes)?;
        Ok((lengths.len() == episodes).then(|| mean(&lengths)))
    }

    /// Greedy run of `run.episodes` episodes, one log line each.
    pub fn run_evaluation(&mut self) -> Result<EvaluationSummary> {
        self.agent.set_evaluation(true);
        let mut lengths = Vec::new();

        for episode in 1..=self.run.episodes {
            if self.stop_requested() {
                break;
            }
            let summary = self.play_episode()?;
            if summary.end == EpisodeEnd::Stopped {
                break;
            }
            info!("{} length:{} steps:{}", episode, summary.length, summary.steps);
            lengths.push(summary.length);
        }

        Ok(EvaluationSummary {
            games: lengths.len(),
            average_length: mean(&lengths),
            max_length: lengths.iter().copied().max().unwrap_or(0),
        })
    }
}

#[derive(Debug, Default)]
struct Progress {
    started: usize,
    played: usize,
    best_average: f32,
    poor_evaluations: usize,
}

impl Trainer<Sequential> {
    /// The training loop: one log line per episode, a checkpoint every
    /// `save_every` episodes, an evaluation every `eval_every` episodes and a
    /// final save on the way out, errors included.
    pub fn train(&mut self) -> Result<TrainingReport> {
        self.run.validate()?;
        let mut log = RunLog::create(&self.run.run_dir)?;
        let model_path = log.model_path();
        info!(run_dir = %self.run.run_dir.display(), episodes = self.run.episodes, "training started");

        let mut progress = Progress::default();
        let outcome = self.run_episodes(&mut log, &model_path, &mut progress);
        if let Err(e) = &outcome {
            warn!(error = %e, episodes = progress.played, "training failed");
        }

        let flushed = log.flush();
        // a failed episode may still have trained the network
        let saved = if progress.started > 0 {
            self.agent.save(&model_path).map(|_| info!(path = %model_path.display(), "model saved"))
        } else {
            Ok(())
        };

        let end = outcome?;
        flushed?;
        saved?;
        Ok(TrainingReport { episodes: progress.played, best_average: progress.best_average, end })
    }

    fn run_episodes(&mut self, log: &mut RunLog, model_path: &Path, progress: &mut Progress) -> Result<TrainingEnd> {
        for episode in 1..=self.run.episodes {
            if self.stop_requested() {
                return Ok(TrainingEnd::Interrupted);
            }

            progress.started = episode;
            let summary = self.play_episode()?;
            let record = EpisodeRecord {
                episode,
                reward: summary.reward,
                length: summary.length,
                steps: summary.steps,
                memory_size: self.agent.memory_size(),
            };
            info!("{}", record.log_line());
            log.episode(&record)?;
            progress.played = episode;

            if summary.end == EpisodeEnd::Stopped {
                return Ok(TrainingEnd::Interrupted);
            }

            if episode % self.run.save_every == 0 {
                self.agent.save(model_path)?;
                log.flush()?;
            }

            if episode % self.run.eval_every == 0 {
                info!("Evaluating model at episode {}...", episode);
                let Some(average) = self.evaluate(self.run.eval_episodes)? else {
                    info!("Evaluation at episode {} was interrupted", episode);
                    return Ok(TrainingEnd::Interrupted);
                };
                let record = EvaluationRecord {
                    episode,
                    average_length: average,
                    record: average >= progress.best_average,
                };
                info!("{}", record.log_line());
                log.evaluation(&record)?;

                if average > progress.best_average {
                    progress.best_average = average;
                    progress.poor_evaluations = 0;
                    info!("New best average length: {:.2}!", progress.best_average);
                } else {
                    progress.poor_evaluations += 1;
                    info!("No improvement. Poor performance count: {}/{}", progress.poor_evaluations, self.run.patience);
                }

                if progress.poor_evaluations >= self.run.patience {
                    info!("No improvement for {} consecutive evaluations. Stopping training.", self.run.patience);
                    return Ok(TrainingEnd::NoImprovement);
                }
            }
        }

        Ok(TrainingEnd::Completed)
    }
}

fn mean(lengths: &[usize]) -> f32 {
    if lengths.is_empty() {
        return 0.0;
    }
    lengths.iter().sum::<usize>() as f32 / lengths.len() as f32
}
