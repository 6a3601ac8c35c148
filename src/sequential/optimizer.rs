use super::layer::Layer;
use super::tensor::Tensor;
use serde::{Serialize, Deserialize};

#[typetag::serde]
pub trait Optimizer: Send + Sync {
    fn step(&mut self, layers: &mut [Box<dyn Layer>]);
    fn clone_box(&self) -> Box<dyn Optimizer>;
}


// SGD

#[derive(Serialize, Deserialize, Clone)]
pub struct SGD {
    learning_rate: f32
}

impl SGD {
    pub fn new(learning_rate: f32) -> Self {
        Self {
            learning_rate
        }
    }
}

#[typetag::serde]
impl Optimizer for SGD {
    fn step(&mut self, layers: &mut [Box<dyn Layer>]) {
        for layer in layers {
            for (param, grad) in layer.params_and_grads() {
                if let Some(grad) = grad {
                    *param = param.map2(grad, |w, dw| w - self.learning_rate * dw);
                }
            }
        }
    }

    fn clone_box(&self) -> Box<dyn Optimizer> {
        Box::new(self.clone())
    }
}


// Adam

#[derive(Serialize, Deserialize, Clone)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    t: i32,
    // first and second moments, one slot per parameter tensor
    m: Vec<Tensor>,
    v: Vec<Tensor>
}

impl Adam {
    pub fn new(learning_rate: f32) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
            t: 0,
            m: Vec::new(),
            v: Vec::new()
        }
    }
}

#[typetag::serde]
impl Optimizer for Adam {
    fn step(&mut self, layers: &mut [Box<dyn Layer>]) {
        self.t = self.t.saturating_add(1);
        let bias1 = 1.0 - self.beta1.powi(self.t);
        let bias2 = 1.0 - self.beta2.powi(self.t);
        let (beta1, beta2, eps) = (self.beta1, self.beta2, self.epsilon);
        let step_size = self.learning_rate;

        let mut slot = 0;
        for layer in layers {
            for (param, grad) in layer.params_and_grads() {
                if self.m.len() <= slot {
                    self.m.push(Tensor::zeros(param.rows, param.cols));
                    self.v.push(Tensor::zeros(param.rows, param.cols));
                }

                if let Some(grad) = grad {
                    let m = self.m[slot].map2(grad, |m, g| beta1 * m + (1.0 - beta1) * g);
                    let v = self.v[slot].map2(grad, |v, g| beta2 * v + (1.0 - beta2) * g * g);

                    let update = m.map2(&v, |m, v| step_size * (m / bias1) / ((v / bias2).sqrt() + eps));
                    *param = param.map2(&update, |w, u| w - u);

                    self.m[slot] = m;
                    self.v[slot] = v;
                }
                slot += 1;
            }
        }
    }

    fn clone_box(&self) -> Box<dyn Optimizer> {
        Box::new(self.clone())
    }
}
