use clap::ValueEnum;
use serde::{Serialize, Deserialize};

use crate::encoder::EncoderKind;
use crate::error::{Result, SnakeError};

/// How the target network follows the live one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TargetSync {
    /// Copy the live weights every `every` training steps.
    Hard { every: usize },
    /// `target = tau * live + (1 - tau) * target` after every training step.
    Soft { tau: f32 },
}

impl Default for TargetSync {
    fn default() -> Self {
        TargetSync::Hard { every: 700 }
    }
}

/// Which actions a random exploration step may pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum Exploration {
    /// any action
    #[default]
    Uniform,
    /// only actions that do not die on the spot, when one exists
    Safe,
    /// safe most of the time, uniform otherwise
    HalfSafe,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub first_layer: usize,
    pub second_layer: usize,
    pub batch_size: usize,
    pub buffer_capacity: usize,
    pub gamma: f32,
    pub epsilon_start: f32,
    pub epsilon_min: f32,
    pub epsilon_decay: f32,
    pub learning_rate: f32,
    pub target_sync: TargetSync,
    pub encoder: EncoderKind,
    pub exploration: Exploration,
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            first_layer: 32,
            second_layer: 16,
            batch_size: 64,
            buffer_capacity: 10_000,
            gamma: 0.95,
            epsilon_start: 1.0,
            epsilon_min: 0.01,
            epsilon_decay: 0.9995,
            learning_rate: 0.001,
            target_sync: TargetSync::default(),
            encoder: EncoderKind::default(),
            exploration: Exploration::default(),
            seed: None,
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.first_layer == 0 || self.second_layer == 0 {
            return Err(SnakeError::config(format!(
                "layer sizes must be positive, got {} and {}",
                self.first_layer, self.second_layer
            )));
        }
        if self.batch_size == 0 {
            return Err(SnakeError::config("batch size must be positive"));
        }
        if self.buffer_capacity < self.batch_size {
            return Err(SnakeError::config(format!(
                "buffer capacity {} is smaller than batch size {}",
                self.buffer_capacity, self.batch_size
            )));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(SnakeError::config(format!("gamma {} is outside [0, 1]", self.gamma)));
        }
        if !(0.0..=1.0).contains(&self.epsilon_start) || !(0.0..=1.0).contains(&self.epsilon_min) {
            return Err(SnakeError::config("epsilon values must lie in [0, 1]"));
        }
        if self.epsilon_min > self.epsilon_start {
            return Err(SnakeError::config(format!(
                "epsilon floor {} is above the starting epsilon {}",
                self.epsilon_min, self.epsilon_start
            )));
        }
        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return Err(SnakeError::config(format!("epsilon decay {} is outside (0, 1]", self.epsilon_decay)));
        }
        if !(self.learning_rate > 0.0) {
            return Err(SnakeError::config(format!("learning rate {} must be positive", self.learning_rate)));
        }
        match self.target_sync {
            TargetSync::Hard { every: 0 } => Err(SnakeError::config("hard sync period must be positive")),
            TargetSync::Soft { tau } if !(tau > 0.0 && tau <= 1.0) => {
                Err(SnakeError::config(format!("soft update rate {} is outside (0, 1]", tau)))
            }
            _ => Ok(()),
        }
    }
}
