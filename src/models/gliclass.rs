//! GLiClass ONNX session wrapper.
//!
//! Owns the ONNX Runtime sessions for a GLiClass classification model and
//! the run-call serialization discipline around them. Everything upstream
//! (prompting, tokenization) and downstream (decoding) of [`GliClassModel::run`]
//! is plain per-batch data and needs no synchronization.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use ort::session::Session;
use ort::value::TensorRef;
use tracing::info;

use crate::error::{PipelineError, Result};

const INPUT_IDS: &str = "input_ids";
const ATTENTION_MASK: &str = "attention_mask";

/// Where the model graph executes.
///
/// Resolved once at session creation; it decides both the session options
/// and whether run calls from different workers may proceed concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionBackend {
    /// CPU execution. The session parallelizes internally through its
    /// intra/inter-op thread pools, and concurrent run calls are safe.
    Cpu,
    /// CUDA execution on the given device. Run calls must be serialized.
    #[cfg(feature = "cuda")]
    Cuda { device_id: i32 },
}

impl ExecutionBackend {
    /// Whether the backend tolerates run calls from multiple workers at
    /// once. Decided here, once, for every call site.
    pub(crate) fn supports_concurrent_run(self) -> bool {
        match self {
            Self::Cpu => true,
            #[cfg(feature = "cuda")]
            Self::Cuda { .. } => false,
        }
    }
}

/// Raw logits copied out of the engine, shape `(batch_size, num_classes)`.
#[derive(Debug, Clone)]
pub struct Logits {
    pub data: Vec<f32>,
    pub batch_size: usize,
    pub num_classes: usize,
}

impl Logits {
    /// Logits row for the text at `index` within the batch.
    pub fn row(&self, index: usize) -> &[f32] {
        &self.data[index * self.num_classes..(index + 1) * self.num_classes]
    }
}

/// A GLiClass model loaded into one or more ONNX Runtime sessions.
///
/// The binding requires exclusive access to a session for every run call,
/// so each session lives behind its own mutex. Backends that support
/// concurrent invocation get one session slot per worker and calls proceed
/// in parallel; backends that do not get a single slot, which serializes
/// every call through one gate.
pub struct GliClassModel {
    slots: Vec<Mutex<Session>>,
    next: AtomicUsize,
    output_name: String,
    backend: ExecutionBackend,
}

impl GliClassModel {
    /// Load the model from `path`, creating `slot_count` sessions with the
    /// given intra/inter-op thread count.
    pub fn load(
        path: impl AsRef<Path>,
        backend: ExecutionBackend,
        intra_threads: usize,
        slot_count: usize,
    ) -> Result<Self> {
        let path = path.as_ref();
        let slot_count = slot_count.max(1);

        let mut slots = Vec::with_capacity(slot_count);
        for _ in 0..slot_count {
            slots.push(Mutex::new(build_session(path, backend, intra_threads)?));
        }

        let output_name = {
            let session = match slots[0].lock() {
                Ok(session) => session,
                Err(_) => return Err(PipelineError::SessionPoisoned),
            };
            session
                .outputs()
                .first()
                .map(|output| output.name().to_string())
                .ok_or_else(|| {
                    PipelineError::Config("model has no output tensors".to_string())
                })?
        };

        info!(
            model = %path.display(),
            ?backend,
            slots = slot_count,
            output = %output_name,
            "loaded GLiClass model"
        );

        Ok(Self {
            slots,
            next: AtomicUsize::new(0),
            output_name,
            backend,
        })
    }

    pub fn backend(&self) -> ExecutionBackend {
        self.backend
    }

    /// Run one batch through the model.
    ///
    /// `input_ids` and `attention_mask` are row-major `(rows, cols)` buffers
    /// of equal shape. The returned logits are copied out of the engine so
    /// the session lock is released before decoding starts.
    pub fn run(
        &self,
        input_ids: &[i64],
        attention_mask: &[i64],
        shape: [usize; 2],
    ) -> Result<Logits> {
        let ids_tensor =
            TensorRef::from_array_view((shape, input_ids)).map_err(PipelineError::Inference)?;
        let mask_tensor = TensorRef::from_array_view((shape, attention_mask))
            .map_err(PipelineError::Inference)?;

        let mut session = match self.pick().lock() {
            Ok(session) => session,
            Err(_) => return Err(PipelineError::SessionPoisoned),
        };

        let outputs = session
            .run(ort::inputs! {
                INPUT_IDS => ids_tensor,
                ATTENTION_MASK => mask_tensor,
            })
            .map_err(PipelineError::Inference)?;

        let value = outputs
            .get(&self.output_name)
            .ok_or_else(|| PipelineError::OutputMissing {
                name: self.output_name.clone(),
            })?;
        let (logits_shape, logits) = value
            .try_extract_tensor::<f32>()
            .map_err(PipelineError::Inference)?;

        let batch_size = logits_shape.first().copied().unwrap_or(0) as usize;
        if batch_size != shape[0] {
            return Err(PipelineError::OutputShape {
                expected: shape[0],
                actual: batch_size,
            });
        }
        let num_classes = match logits_shape.get(1) {
            Some(&cols) if cols > 0 => cols as usize,
            // Collapsed or scalar trailing dimension; recover the column
            // count from the element count.
            _ => logits.len() / batch_size.max(1),
        };

        Ok(Logits {
            data: logits.to_vec(),
            batch_size,
            num_classes,
        })
    }

    // Round-robin over the slots; a single slot is the serialized case.
    fn pick(&self) -> &Mutex<Session> {
        if self.slots.len() == 1 {
            return &self.slots[0];
        }
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        &self.slots[index % self.slots.len()]
    }
}

fn build_session(
    path: &Path,
    backend: ExecutionBackend,
    intra_threads: usize,
) -> Result<Session> {
    let builder = Session::builder()
        .map_err(PipelineError::Session)?
        .with_intra_threads(intra_threads)
        .map_err(|e| PipelineError::Session(e.into()))?
        .with_inter_threads(intra_threads)
        .map_err(|e| PipelineError::Session(e.into()))?;

    let mut builder = match backend {
        ExecutionBackend::Cpu => builder,
        #[cfg(feature = "cuda")]
        ExecutionBackend::Cuda { device_id } => {
            use ort::execution_providers::CUDAExecutionProvider;
            use ort::session::builder::GraphOptimizationLevel;

            builder
                .with_execution_providers([CUDAExecutionProvider::default()
                    .with_device_id(device_id)
                    .build()])
                .map_err(|e| PipelineError::Session(e.into()))?
                .with_optimization_level(GraphOptimizationLevel::Level3)
                .map_err(|e| PipelineError::Session(e.into()))?
        }
    };

    builder.commit_from_file(path).map_err(PipelineError::Session)
}
