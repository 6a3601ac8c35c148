use crate::error::{Result, SnakeError};
use crate::sequential::tensor::Tensor;

use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: Vec<f32>,
    pub action: usize,
    pub reward: f32,
    pub next_state: Vec<f32>,
    pub terminal: bool,
}

/// A sampled batch, one row per transition.
#[derive(Debug)]
pub struct Batch {
    pub states: Tensor,
    pub actions: Vec<usize>,
    pub rewards: Vec<f32>,
    pub next_states: Tensor,
    pub terminals: Vec<bool>,
    // slot of every row in the buffer
    pub indices: Vec<usize>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Fixed-capacity ring of transitions. Once full, `cursor` points at the
/// oldest entry, which the next push overwrites.
pub struct ReplayBuffer {
    buffer: Vec<Transition>,
    capacity: usize,
    cursor: usize,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            capacity,
            cursor: 0,
        }
    }

    pub fn push(&mut self, transition: Transition) {
        if self.capacity == 0 {
            return;
        }
        if self.buffer.len() < self.capacity {
            self.buffer.push(transition);
        } else {
            self.buffer[self.cursor] = transition;
        }
        self.cursor = (self.cursor + 1) % self.capacity;
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Transition> {
        self.buffer.get(index)
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        let start = if self.buffer.len() < self.capacity { 0 } else { self.cursor };
        self.buffer[start..].iter().chain(self.buffer[..start].iter())
    }

    /// `batch_size` distinct transitions, uniformly at random.
    pub fn sample_batch<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Result<Batch> {
        if self.buffer.len() < batch_size || batch_size == 0 {
            return Err(SnakeError::InsufficientData {
                available: self.buffer.len(),
                requested: batch_size,
            });
        }

        let indices = rand::seq::index::sample(rng, self.buffer.len(), batch_size).into_vec();
        let picked: Vec<&Transition> = indices.iter().map(|&i| &self.buffer[i]).collect();
        let features = picked[0].state.len();

        Ok(Batch {
            states: Tensor::stack(picked.iter().map(|t| t.state.as_slice()), features),
            actions: picked.iter().map(|t| t.action).collect(),
            rewards: picked.iter().map(|t| t.reward).collect(),
            next_states: Tensor::stack(picked.iter().map(|t| t.next_state.as_slice()), features),
            terminals: picked.iter().map(|t| t.terminal).collect(),
            indices,
        })
    }
}
