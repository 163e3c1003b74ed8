//! Model artifacts and inference components

pub mod artifact;
pub mod classifier;
pub mod inference;
pub mod loader;

pub use artifact::{ArtifactBundle, ArtifactError};
pub use classifier::Classifier;
pub use inference::InferenceEngine;
pub use loader::ArtifactLoader;
