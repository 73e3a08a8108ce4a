//! Zero-shot text classification pipeline.
//!
//! Classify text into categories you define at runtime, no training
//! required. Candidate labels are embedded directly into the prompt the
//! GLiClass model sees, so one forward pass scores every label for a text.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use gliclass_onnx::pipelines::zero_shot_classification::ZeroShotClassificationPipelineBuilder;
//! use gliclass_onnx::request::ClassificationPolicy;
//!
//! # fn main() -> gliclass_onnx::Result<()> {
//! let pipeline = ZeroShotClassificationPipelineBuilder::new(
//!     "onnx/model.onnx",
//!     "tokenizer/tokenizer.json",
//! )
//! .build()?;
//!
//! let texts = ["The team won the championship game!"];
//! let labels = ["sports", "politics", "technology"];
//! let output = pipeline.run(&texts, &labels, ClassificationPolicy::MultiLabel)?;
//!
//! for result in output.results.iter().flatten() {
//!     for p in result {
//!         println!("{}: {:.2}", p.label, p.score);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Multi-Label vs Single-Label
//!
//! **Multi-label**: every label whose probability clears the threshold is
//! emitted. Use when several categories can apply at once.
//!
//! **Single-label**: exactly one prediction per text, the highest-scoring
//! label.
//!
//! # Batching and concurrency
//!
//! Requests of any size are split into fixed-size batches and processed
//! concurrently on a worker pool; each batch runs the whole prompt,
//! tokenize, infer, decode chain independently. A batch that fails
//! (tokenizer error, engine error) is dropped and counted in
//! [`ClassificationOutput::failed_batches`] while the rest of the run
//! continues.

pub(crate) mod batching;
pub(crate) mod decoding;
pub(crate) mod encoding;
pub(crate) mod tensors;

pub mod builder;
pub mod pipeline;
pub mod prompt;

pub use builder::ZeroShotClassificationPipelineBuilder;
pub use decoding::Prediction;
pub use pipeline::{ClassificationOutput, ZeroShotClassificationPipeline};
pub use prompt::{Prompt, LABEL_MARKER, SEPARATOR};
