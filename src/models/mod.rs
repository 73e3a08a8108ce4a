pub mod gliclass;

pub use gliclass::{ExecutionBackend, GliClassModel, Logits};
