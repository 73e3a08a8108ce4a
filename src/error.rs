use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    // Request document
    #[error("failed to read request document: {0}")]
    DocumentRead(#[from] std::io::Error),

    #[error("failed to parse request document: {0}")]
    DocumentParse(#[from] serde_json::Error),

    #[error("unsupported classification type {0:?}, expected \"multi-label\" or \"single-label\"")]
    UnsupportedPolicy(String),

    #[error("label specification mismatch: {texts} texts but {label_sets} label sets")]
    LabelCount { texts: usize, label_sets: usize },

    #[error("invalid configuration: {0}")]
    Config(String),

    // Tokenization
    #[error("failed to load tokenizer: {0}")]
    TokenizerLoad(String),

    #[error("tokenization failed: {0}")]
    Tokenization(String),

    // Inference engine
    #[error("failed to create inference session: {0}")]
    Session(#[source] ort::Error),

    #[error("inference failed: {0}")]
    Inference(#[source] ort::Error),

    #[error("inference session lock poisoned")]
    SessionPoisoned,

    #[error("model output {name:?} missing from inference outputs")]
    OutputMissing { name: String },

    #[error("unexpected logits shape: expected {expected} rows, got {actual}")]
    OutputShape { expected: usize, actual: usize },
}
