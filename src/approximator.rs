//! The value-function approximator seen by the agent: action values in,
//! one gradient step out, and raw weights for target syncing.

use crate::sequential::Sequential;
use crate::sequential::tensor::Tensor;

pub trait Approximator {
    fn input_size(&self) -> usize;
    fn output_size(&self) -> usize;

    /// One row of action values per input row.
    fn predict(&mut self, states: &Tensor) -> Tensor;

    /// A single gradient step towards `targets`, returns the batch loss.
    fn fit(&mut self, states: &Tensor, targets: &Tensor) -> f32;

    fn weights(&self) -> Vec<Tensor>;

    /// Panics if `weights` does not come from a structurally identical approximator.
    fn set_weights(&mut self, weights: &[Tensor]);
}

impl Approximator for Sequential {
    fn input_size(&self) -> usize {
        Sequential::input_size(self)
    }

    fn output_size(&self) -> usize {
        Sequential::output_size(self)
    }

    fn predict(&mut self, states: &Tensor) -> Tensor {
        Sequential::predict(self, states)
    }

    fn fit(&mut self, states: &Tensor, targets: &Tensor) -> f32 {
        self.train_on_batch(states, targets)
    }

    fn weights(&self) -> Vec<Tensor> {
        self.layers.iter().flat_map(|layer| layer.params()).cloned().collect()
    }

    fn set_weights(&mut self, weights: &[Tensor]) {
        let mut source = weights.iter();
        for layer in &mut self.layers {
            for param in layer.params_mut() {
                let Some(new) = source.next() else {
                    panic!("weight blob is missing tensors");
                };
                assert_eq!(param.shape(), new.shape(), "weight shapes differ");
                *param = new.clone();
            }
        }
        assert!(source.next().is_none(), "weight blob has extra tensors");
    }
}

/// `tau * source + (1 - tau) * target`, tensor by tensor.
pub fn blend(source: &[Tensor], target: &[Tensor], tau: f32) -> Vec<Tensor> {
    source
        .iter()
        .zip(target)
        .map(|(s, t)| s.map2(t, |s, t| tau * s + (1.0 - tau) * t))
        .collect()
}
