pub mod config;
pub mod policy;
pub mod replaybuffer;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use config::{AgentConfig, TargetSync};
use policy::ActionPolicy;
use replaybuffer::{ReplayBuffer, Transition};

use crate::approximator::{self, Approximator};
use crate::encoder::{EncoderKind, StateEncoder};
use crate::error::{Result, SnakeError};
use crate::game::{Board, Direction};
use crate::sequential::{
    tensor::Tensor,
    loss::MeanSquaredError,
    optimizer::Adam,
    Sequential
};

use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Serialize, Deserialize};
use tracing::{debug, info};

/// Everything needed to rebuild and check a trained network.
#[derive(Serialize, Deserialize)]
pub struct ModelArtifact {
    pub input_size: usize,
    pub first_layer: usize,
    pub second_layer: usize,
    pub output_size: usize,
    pub encoder: EncoderKind,
    pub epsilon: f32,
    pub train_steps: u64,
    pub network: Sequential,
}

pub struct Agent<A: Approximator = Sequential> {
    live: A,
    target: A,
    buffer: ReplayBuffer,
    encoder: Box<dyn StateEncoder>,
    policy: Box<dyn ActionPolicy>,
    config: AgentConfig,

    epsilon: f32,
    train_steps: u64,
    evaluation: bool,
    rng: StdRng,
}

/// `reward` for terminal transitions, the discounted bootstrap otherwise.
pub fn bellman_target(reward: f32, terminal: bool, gamma: f32, next_max: f32) -> f32 {
    if terminal {
        reward
    } else {
        reward + gamma * next_max
    }
}

impl<A: Approximator + Clone> Agent<A> {
    /// The target network starts as a copy of `live`.
    pub fn with_approximator(config: AgentConfig, live: A) -> Result<Self> {
        config.validate()?;
        let encoder = config.encoder.build();
        if live.input_size() != encoder.input_size() || live.output_size() != encoder.action_count() {
            return Err(SnakeError::config(format!(
                "approximator maps {} -> {} but the {:?} encoder needs {} -> {}",
                live.input_size(),
                live.output_size(),
                config.encoder,
                encoder.input_size(),
                encoder.action_count()
            )));
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            target: live.clone(),
            live,
            buffer: ReplayBuffer::new(config.buffer_capacity),
            encoder,
            policy: config.exploration.build(),
            epsilon: config.epsilon_start,
            train_steps: 0,
            evaluation: false,
            rng,
            config,
        })
    }
}

impl<A: Approximator> Agent<A> {
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn train_steps(&self) -> u64 {
        self.train_steps
    }

    pub fn buffer(&self) -> &ReplayBuffer {
        &self.buffer
    }

    pub fn memory_size(&self) -> usize {
        self.buffer.len()
    }

    pub fn live(&self) -> &A {
        &self.live
    }

    pub fn target(&self) -> &A {
        &self.target
    }

    pub fn encoder(&self) -> &dyn StateEncoder {
        self.encoder.as_ref()
    }

    /// Greedy, non-learning mode.
    pub fn set_evaluation(&mut self, evaluation: bool) {
        self.evaluation = evaluation;
    }

    pub fn is_evaluation(&self) -> bool {
        self.evaluation
    }

    pub fn encode(&self, board: &Board) -> Vec<f32> {
        self.encoder.encode(board)
    }

    /// Absolute move for `action` given the current heading.
    pub fn direction(&self, heading: Direction, action: usize) -> Option<Direction> {
        self.encoder.direction(heading, action)
    }

    pub fn greedy_action(&mut self, state: &[f32]) -> usize {
        let values = self.live.predict(&Tensor::row_vector(state.to_vec()));
        values.argmax_row(0)
    }

    pub fn select_action(&mut self, board: &Board, state: &[f32]) -> usize {
        if !self.evaluation && self.rng.random::<f32>() < self.epsilon {
            self.policy.explore(board, self.encoder.as_ref(), &mut self.rng)
        } else {
            self.greedy_action(state)
        }
    }

    /// Stores the transition and, once the buffer holds a full batch, takes one
    /// gradient step. Returns the batch loss when a step was taken.
    pub fn train_step(&mut self, transition: Transition) -> Option<f32> {
        if self.evaluation {
            return None;
        }
        self.buffer.push(transition);

        // too few transitions yet
        let batch = self.buffer.sample_batch(self.config.batch_size, &mut self.rng).ok()?;

        let next_max = self.target.predict(&batch.next_states).max_per_row();
        let mut labels = self.live.predict(&batch.states);
        for row in 0..batch.len() {
            let target = bellman_target(batch.rewards[row], batch.terminals[row], self.config.gamma, next_max[row]);
            labels.row_mut(row)[batch.actions[row]] = target;
        }

        let loss = self.live.fit(&batch.states, &labels);

        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
        self.train_steps += 1;
        self.sync_target();

        Some(loss)
    }

    fn sync_target(&mut self) {
        match self.config.target_sync {
            TargetSync::Hard { every } => {
                if self.train_steps % every as u64 == 0 {
                    self.target.set_weights(&self.live.weights());
                    debug!(step = self.train_steps, "target network synced");
                }
            }
            TargetSync::Soft { tau } => {
                let blended = approximator::blend(&self.live.weights(), &self.target.weights(), tau);
                self.target.set_weights(&blended);
            }
        }
    }
}

impl Agent<Sequential> {
    pub fn new(config: AgentConfig) -> Result<Self> {
        config.validate()?;
        let encoder = config.encoder.build();
        let mut init_rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_os_rng(),
        };
        let network = Sequential::mlp(
            encoder.input_size(),
            config.first_layer,
            config.second_layer,
            encoder.action_count(),
            Box::new(MeanSquaredError),
            Box::new(Adam::new(config.learning_rate)),
            &mut init_rng,
        );
        Self::with_approximator(config, network)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let artifact = ModelArtifact {
            input_size: self.encoder.input_size(),
            first_layer: self.config.first_layer,
            second_layer: self.config.second_layer,
            output_size: self.encoder.action_count(),
            encoder: self.config.encoder,
            epsilon: self.epsilon,
            train_steps: self.train_steps,
            network: self.live.clone(),
        };

        let mut file = BufWriter::new(File::create(path)?);
        bincode::serialize_into(&mut file, &artifact).map_err(std::io::Error::other)?;
        file.flush()?;
        debug!(path = %path.display(), "model saved");
        Ok(())
    }

    /// Rebuilds an agent from a saved model. Anything that does not match
    /// `config` is a `ModelLoad` error, never a fresh network.
    pub fn load(path: &Path, config: AgentConfig) -> Result<Self> {
        let file = File::open(path).map_err(|e| SnakeError::model_load(path, e))?;
        let artifact: ModelArtifact = bincode::deserialize_from(BufReader::new(file))
            .map_err(|e| SnakeError::model_load(path, e))?;

        let encoder = config.encoder.build();
        let expected_meta = (encoder.input_size(), config.first_layer, config.second_layer, encoder.action_count());
        let stored_meta = (artifact.input_size, artifact.first_layer, artifact.second_layer, artifact.output_size);
        if artifact.encoder != config.encoder {
            return Err(SnakeError::model_load(path, format!(
                "model was trained with the {:?} encoder, {:?} requested", artifact.encoder, config.encoder
            )));
        }
        if stored_meta != expected_meta {
            return Err(SnakeError::model_load(path, format!(
                "stored architecture {:?} does not match configured {:?}", stored_meta, expected_meta
            )));
        }

        let (input, first, second, output) = expected_meta;
        let expected_shapes = vec![(input, first), (first, second), (second, output)];
        let shapes = artifact.network.layer_shapes();
        if shapes != expected_shapes {
            return Err(SnakeError::model_load(path, format!(
                "stored layers {:?} do not match {:?}", shapes, expected_shapes
            )));
        }

        let mut agent = Self::with_approximator(config, artifact.network)?;
        agent.epsilon = artifact.epsilon;
        agent.train_steps = artifact.train_steps;
        info!(path = %path.display(), epsilon = agent.epsilon, steps = agent.train_steps, "model loaded");
        Ok(agent)
    }
}
