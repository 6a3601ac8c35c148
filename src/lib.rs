pub mod error;
pub mod game;
pub mod encoder;

pub mod sequential;

pub use sequential::tensor::Tensor;
pub use sequential::layer::{
    Layer,
    Dense,
    ReLU,
};
pub use sequential::loss::{
    Loss,
    MeanSquaredError,
    Huber
};
pub use sequential::optimizer::{
    Optimizer,
    SGD,
    Adam
};
pub use sequential::Sequential;

pub mod approximator;
pub mod agent;

pub use approximator::Approximator;
pub use agent::Agent;
pub use agent::config::{AgentConfig, Exploration, TargetSync};
pub use agent::replaybuffer::{ReplayBuffer, Transition};

pub mod episode;
pub mod history;

pub use error::{Result, SnakeError};
pub use game::{Board, Cell, Direction, StepOutcome};
pub use encoder::{EncoderKind, StateEncoder};
pub use episode::{RewardConfig, RunConfig, Trainer};
