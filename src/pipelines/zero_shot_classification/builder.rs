use std::path::PathBuf;

use tokenizers::Tokenizer;

use super::pipeline::ZeroShotClassificationPipeline;
use crate::error::{PipelineError, Result};
use crate::models::{ExecutionBackend, GliClassModel};

const DEFAULT_BATCH_SIZE: usize = 8;
const DEFAULT_WORKERS: usize = 8;
const DEFAULT_INTRA_THREADS: usize = 8;

/// Builds a [`ZeroShotClassificationPipeline`] from a GLiClass ONNX model
/// file and a `tokenizer.json`.
///
/// ```rust,no_run
/// # use gliclass_onnx::pipelines::zero_shot_classification::ZeroShotClassificationPipelineBuilder;
/// # fn main() -> gliclass_onnx::Result<()> {
/// let pipeline = ZeroShotClassificationPipelineBuilder::new(
///     "onnx/model.onnx",
///     "tokenizer/tokenizer.json",
/// )
/// .batch_size(8)
/// .workers(4)
/// .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ZeroShotClassificationPipelineBuilder {
    model_path: PathBuf,
    tokenizer_path: PathBuf,
    backend: ExecutionBackend,
    batch_size: usize,
    workers: usize,
    intra_threads: usize,
}

impl ZeroShotClassificationPipelineBuilder {
    pub fn new(model_path: impl Into<PathBuf>, tokenizer_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            tokenizer_path: tokenizer_path.into(),
            backend: ExecutionBackend::Cpu,
            batch_size: DEFAULT_BATCH_SIZE,
            workers: DEFAULT_WORKERS,
            intra_threads: DEFAULT_INTRA_THREADS,
        }
    }

    /// Texts per inference batch.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Size of the worker pool that processes batches concurrently.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Intra/inter-op thread count for the engine session (CPU only; has
    /// no effect on accelerator throughput).
    pub fn intra_threads(mut self, intra_threads: usize) -> Self {
        self.intra_threads = intra_threads;
        self
    }

    /// Run the model on a CUDA device instead of the CPU. Engine calls are
    /// serialized for this backend.
    #[cfg(feature = "cuda")]
    pub fn cuda(mut self, device_id: i32) -> Self {
        self.backend = ExecutionBackend::Cuda { device_id };
        self
    }

    pub fn build(self) -> Result<ZeroShotClassificationPipeline> {
        if self.batch_size == 0 {
            return Err(PipelineError::Config(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(PipelineError::Config(
                "workers must be at least 1".to_string(),
            ));
        }

        let tokenizer = Tokenizer::from_file(&self.tokenizer_path)
            .map_err(|e| PipelineError::TokenizerLoad(e.to_string()))?;

        // The concurrency discipline around the engine is fixed here, once:
        // backends safe for concurrent invocation get a session slot per
        // worker, the rest share a single serializing slot.
        let slot_count = if self.backend.supports_concurrent_run() {
            self.workers
        } else {
            1
        };
        let model = GliClassModel::load(
            &self.model_path,
            self.backend,
            self.intra_threads,
            slot_count,
        )?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        Ok(ZeroShotClassificationPipeline {
            model,
            tokenizer,
            pool,
            batch_size: self.batch_size,
        })
    }
}
