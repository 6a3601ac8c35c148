pub mod tensor;
pub mod layer;
pub mod loss;
pub mod optimizer;

use tensor::Tensor;
use layer::{Layer, Dense, ReLU};
use loss::Loss;
use optimizer::Optimizer;

use rand::Rng;
use serde::{Serialize, Deserialize};

#[derive(Serialize, Deserialize)]
pub struct Sequential {
    pub layers: Vec<Box<dyn Layer>>,
    pub loss: Box<dyn Loss>,
    pub optimizer: Box<dyn Optimizer>
}

impl Sequential {
    pub fn new(layers: Vec<Box<dyn Layer>>, loss: Box<dyn Loss>, optimizer: Box<dyn Optimizer>) -> Self {
        Self {
            layers,
            loss,
            optimizer
        }
    }

    /// input -> dense -> relu -> dense -> relu -> dense (linear action values)
    pub fn mlp<R: Rng + ?Sized>(
        input_size: usize,
        first_layer: usize,
        second_layer: usize,
        output_size: usize,
        loss: Box<dyn Loss>,
        optimizer: Box<dyn Optimizer>,
        rng: &mut R,
    ) -> Self {
        let layers: Vec<Box<dyn Layer>> = vec![
            Box::new(Dense::new(input_size, first_layer, rng)),
            Box::new(ReLU::new()),
            Box::new(Dense::new(first_layer, second_layer, rng)),
            Box::new(ReLU::new()),
            Box::new(Dense::new(second_layer, output_size, rng)),
        ];
        Self::new(layers, loss, optimizer)
    }

    /// (inputs, outputs) of every dense layer, first to last.
    pub fn layer_shapes(&self) -> Vec<(usize, usize)> {
        self.layers.iter().filter_map(|layer| layer.shape()).collect()
    }

    pub fn input_size(&self) -> usize {
        self.layer_shapes().first().map_or(0, |shape| shape.0)
    }

    pub fn output_size(&self) -> usize {
        self.layer_shapes().last().map_or(0, |shape| shape.1)
    }

    pub fn predict(&mut self, input: &Tensor) -> Tensor {
        let mut output = input.clone();
        for layer in &mut self.layers {
            output = layer.forward(&output);
        }
        output
    }

    /// One gradient step on a batch, returns the loss before the update.
    pub fn train_on_batch(&mut self, x_batch: &Tensor, y_batch: &Tensor) -> f32 {
        let y_pred = self.predict(x_batch);
        let loss = self.loss.calculate(&y_pred, y_batch);
        let mut d_output = self.loss.gradient(&y_pred, y_batch);
        for layer in self.layers.iter_mut().rev() {
            d_output = layer.backward(&d_output);
        }
        self.optimizer.step(&mut self.layers);
        loss
    }
}

impl Clone for Sequential {
    fn clone(&self) -> Self {
        Self {
            layers: self.layers.iter().map(|layer| layer.clone_box()).collect(),
            loss: self.loss.clone_box(),
            optimizer: self.optimizer.clone_box()
        }
    }
}
