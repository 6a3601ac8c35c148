use super::tensor::Tensor;
use serde::{Serialize, Deserialize};

#[typetag::serde]
pub trait Loss: Send + Sync {
    fn calculate(&self, y_pred: &Tensor, y_true: &Tensor) -> f32;
    fn gradient(&self, y_pred: &Tensor, y_true: &Tensor) -> Tensor;
    fn clone_box(&self) -> Box<dyn Loss>;
}


// mean squared error

#[derive(Serialize, Deserialize, Clone)]
pub struct MeanSquaredError;

#[typetag::serde]
impl Loss for MeanSquaredError {
    fn calculate(&self, y_pred: &Tensor, y_true: &Tensor) -> f32 {
        let diff = y_pred.map2(y_true, |pred_x, true_x| pred_x - true_x);
        let squared_errors = diff.map(|x| x * x);
        squared_errors.read().iter().sum::<f32>() / y_pred.rows.max(1) as f32
    }

    fn gradient(&self, y_pred: &Tensor, y_true: &Tensor) -> Tensor {
        let batch_size = y_pred.rows.max(1) as f32;
        y_pred.map2(y_true, |pred_x, true_x| 2.0 * (pred_x - true_x) / batch_size)
    }

    fn clone_box(&self) -> Box<dyn Loss> {
        Box::new(self.clone())
    }
}


// huber loss, quadratic inside `delta` and linear outside

#[derive(Serialize, Deserialize, Clone)]
pub struct Huber {
    pub delta: f32
}

impl Huber {
    pub fn new(delta: f32) -> Self {
        Self { delta }
    }
}

#[typetag::serde]
impl Loss for Huber {
    fn calculate(&self, y_pred: &Tensor, y_true: &Tensor) -> f32 {
        let delta = self.delta;
        let losses = y_pred.map2(y_true, |pred_x, true_x| {
            let e = (pred_x - true_x).abs();
            if e <= delta { 0.5 * e * e } else { delta * (e - 0.5 * delta) }
        });
        losses.read().iter().sum::<f32>() / y_pred.rows.max(1) as f32
    }

    fn gradient(&self, y_pred: &Tensor, y_true: &Tensor) -> Tensor {
        let delta = self.delta;
        let batch_size = y_pred.rows.max(1) as f32;
        y_pred.map2(y_true, |pred_x, true_x| (pred_x - true_x).clamp(-delta, delta) / batch_size)
    }

    fn clone_box(&self) -> Box<dyn Loss> {
        Box::new(self.clone())
    }
}
