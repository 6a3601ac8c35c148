use super::tensor::Tensor;
use rand::Rng;
use rayon::prelude::*;
use serde::{Serialize, Deserialize};

#[typetag::serde]
pub trait Layer: Send + Sync {
    fn forward(&mut self, input: &Tensor) -> Tensor;
    fn backward(&mut self, d_output: &Tensor) -> Tensor;
    /// Trainable tensors paired with their latest gradients.
    fn params_and_grads(&mut self) -> Vec<(&mut Tensor, Option<&Tensor>)>;
    fn params(&self) -> Vec<&Tensor>;
    fn params_mut(&mut self) -> Vec<&mut Tensor>;
    /// (inputs, outputs) for layers that have a fixed width.
    fn shape(&self) -> Option<(usize, usize)>;
    fn clone_box(&self) -> Box<dyn Layer>;
}


// dense layer

#[derive(Serialize, Deserialize, Clone)]
pub struct Dense {
    pub weights: Tensor,
    pub biases: Tensor,
    #[serde(skip)]
    cached_input: Option<Tensor>, // for back propagation
    #[serde(skip)]
    pub d_weights: Option<Tensor>,
    #[serde(skip)]
    pub d_biases: Option<Tensor>
}

impl Dense {
    /// He-initialized weights, zero biases.
    pub fn new<R: Rng + ?Sized>(input_size: usize, output_size: usize, rng: &mut R) -> Self {
        let std_dev = (2.0 / input_size.max(1) as f32).sqrt();
        Self {
            weights: Tensor::random_normal(input_size, output_size, std_dev, rng),
            biases: Tensor::zeros(1, output_size),
            cached_input: None,
            d_weights: None,
            d_biases: None
        }
    }
}

#[typetag::serde]
impl Layer for Dense {
    fn forward(&mut self, input: &Tensor) -> Tensor {
        self.cached_input = Some(input.clone());

        let mut output = input.matmul(&self.weights);

        // add biases
        let output_size = output.cols;
        let biases_data = self.biases.read();
        if output_size > 0 {
            output.write().par_chunks_mut(output_size).for_each(|row_chunk| {
                for (value, bias) in row_chunk.iter_mut().zip(biases_data) {
                    *value += bias;
                }
            });
        }

        output
    }

    fn backward(&mut self, d_output: &Tensor) -> Tensor {
        if let Some(cached_input) = &self.cached_input {
            // dL/dW = input.T @ dL/dY
            self.d_weights = Some(cached_input.t_matmul(d_output));

            // dL/db = dL/dY.sum(axis=0)
            self.d_biases = Some(d_output.sum_rows());

            // dL/dX = dL/dY @ weights.T
            d_output.matmul_t(&self.weights)
        } else {
            panic!("complete forward pass first.");
        }
    }

    fn params_and_grads(&mut self) -> Vec<(&mut Tensor, Option<&Tensor>)> {
        vec![
            (&mut self.weights, self.d_weights.as_ref()),
            (&mut self.biases, self.d_biases.as_ref()),
        ]
    }

    fn params(&self) -> Vec<&Tensor> {
        vec![&self.weights, &self.biases]
    }

    fn params_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.weights, &mut self.biases]
    }

    fn shape(&self) -> Option<(usize, usize)> {
        Some(self.weights.shape())
    }

    fn clone_box(&self) -> Box<dyn Layer> {
        Box::new(self.clone())
    }
}


// relu layer

#[derive(Serialize, Deserialize, Clone, Default)]
pub struct ReLU {
    #[serde(skip)]
    cached_input: Option<Tensor>
}

impl ReLU {
    pub fn new() -> Self {
        Self {
            cached_input: None
        }
    }
}

#[typetag::serde]
impl Layer for ReLU {
    fn forward(&mut self, input: &Tensor) -> Tensor {
        self.cached_input = Some(input.clone());
        input.map(|x| x.max(0.0))
    }

    fn backward(&mut self, d_output: &Tensor) -> Tensor {
        if let Some(cached_input) = &self.cached_input {
            cached_input.map2(d_output, |input_val, output_val| {
                if input_val > 0.0 {
                    output_val
                } else {
                    0.0
                }
            })
        } else {
            panic!("complete forward pass first.");
        }
    }

    fn params_and_grads(&mut self) -> Vec<(&mut Tensor, Option<&Tensor>)> {
        Vec::new()
    }

    fn params(&self) -> Vec<&Tensor> {
        Vec::new()
    }

    fn params_mut(&mut self) -> Vec<&mut Tensor> {
        Vec::new()
    }

    fn shape(&self) -> Option<(usize, usize)> {
        None
    }

    fn clone_box(&self) -> Box<dyn Layer> {
        Box::new(self.clone())
    }
}
