//! Exploration policies: how the agent picks an action when the epsilon coin
//! says "explore".

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

use super::config::Exploration;
use crate::encoder::StateEncoder;
use crate::game::Board;

const HALF_SAFE_CHANCE: f32 = 0.9;

pub trait ActionPolicy: Send {
    fn explore(&self, board: &Board, encoder: &dyn StateEncoder, rng: &mut StdRng) -> usize;
}

impl Exploration {
    pub fn build(self) -> Box<dyn ActionPolicy> {
        match self {
            Exploration::Uniform => Box::new(Uniform),
            Exploration::Safe => Box::new(Safe),
            Exploration::HalfSafe => Box::new(HalfSafe),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Uniform;

impl ActionPolicy for Uniform {
    fn explore(&self, _board: &Board, encoder: &dyn StateEncoder, rng: &mut StdRng) -> usize {
        rng.random_range(0..encoder.action_count())
    }
}

/// Random among actions that survive the next step, uniform when none do.
#[derive(Debug, Clone, Copy, Default)]
pub struct Safe;

impl ActionPolicy for Safe {
    fn explore(&self, board: &Board, encoder: &dyn StateEncoder, rng: &mut StdRng) -> usize {
        let safe = safe_actions(board, encoder);
        match safe.choose(rng) {
            Some(&action) => action,
            None => Uniform.explore(board, encoder, rng),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HalfSafe;

impl ActionPolicy for HalfSafe {
    fn explore(&self, board: &Board, encoder: &dyn StateEncoder, rng: &mut StdRng) -> usize {
        if rng.random::<f32>() < HALF_SAFE_CHANCE {
            Safe.explore(board, encoder, rng)
        } else {
            Uniform.explore(board, encoder, rng)
        }
    }
}

pub fn safe_actions(board: &Board, encoder: &dyn StateEncoder) -> Vec<usize> {
    (0..encoder.action_count())
        .filter(|&action| {
            encoder
                .direction(board.heading(), action)
                .is_some_and(|direction| !board.would_die(direction))
        })
        .collect()
}
