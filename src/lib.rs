//! # gliclass-onnx
//!
//! Zero-shot text classification for Rust, powered by GLiClass ONNX models.
//! Texts and candidate labels go in; labeled probability scores come out,
//! with batching, padding and multi-threaded inference handled by the
//! pipeline. See [`pipelines::zero_shot_classification`] for a quick start.

pub mod error;
pub mod models;
pub mod pipelines;
pub mod request;

// Re-export the common surface so users can `use gliclass_onnx::...;`
// without walking the module tree.
pub use error::{PipelineError, Result};
pub use models::ExecutionBackend;
pub use pipelines::zero_shot_classification::{
    ClassificationOutput, Prediction, ZeroShotClassificationPipeline,
    ZeroShotClassificationPipelineBuilder,
};
pub use request::{ClassificationPolicy, ClassificationRequest, LabelSpec};
