//! The fetch → label → train → predict pipeline.
//!
//! Each stage lives in its own module; `main.rs` wires them together.

pub mod dataset;
pub mod labeler;
pub mod likelihood;
pub mod predictor;
pub mod trainer;

pub use dataset::DatasetBuilder;
pub use labeler::label;
pub use likelihood::thunderstorm_likelihood;
pub use predictor::Predictor;
pub use trainer::{Trainer, TrainerConfig, TrainingOutcome};
