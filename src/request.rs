//! Classification request documents.
//!
//! A request bundles the texts to classify, the candidate labels (shared
//! across all texts or one set per text), the classification policy and the
//! decode/prompt settings. Requests can be built in code or loaded from the
//! JSON document format:
//!
//! ```json
//! {
//!   "texts": ["I love this movie", "The service was awful"],
//!   "labels": ["positive", "negative"],
//!   "same_labels": true,
//!   "classification_type": "multi-label",
//!   "threshold": 0.5,
//!   "prompt_first": true
//! }
//! ```
//!
//! With `same_labels: false`, `labels` is a nested array with one label set
//! per text.

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{PipelineError, Result};

/// Decision threshold applied in multi-label mode unless the document
/// overrides it.
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Token budget per prompt unless the document overrides it.
pub const DEFAULT_MAX_LENGTH: usize = 2048;

/// How decoded scores are turned into predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationPolicy {
    /// Independent per-label threshold decisions; any number of labels can
    /// match a text.
    MultiLabel,
    /// Exactly one label per text, the highest-scoring one.
    SingleLabel,
}

impl FromStr for ClassificationPolicy {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "multi-label" => Ok(Self::MultiLabel),
            "single-label" => Ok(Self::SingleLabel),
            other => Err(PipelineError::UnsupportedPolicy(other.to_string())),
        }
    }
}

/// Candidate labels for a request.
#[derive(Debug, Clone)]
pub enum LabelSpec {
    /// One ordered label set applied to every text.
    Shared(Vec<String>),
    /// One ordered label set per text, in text order.
    PerText(Vec<Vec<String>>),
}

impl LabelSpec {
    /// Labels for the text at `index`.
    ///
    /// Label order is authoritative: it is the order prompts are built with
    /// and the order logits columns are decoded against.
    pub fn for_text(&self, index: usize) -> &[String] {
        match self {
            Self::Shared(labels) => labels,
            Self::PerText(sets) => sets.get(index).map(Vec::as_slice).unwrap_or(&[]),
        }
    }
}

/// A validated zero-shot classification request.
#[derive(Debug, Clone)]
pub struct ClassificationRequest {
    pub texts: Vec<String>,
    pub labels: LabelSpec,
    pub policy: ClassificationPolicy,
    /// Multi-label decision threshold; scores strictly above it are emitted.
    pub threshold: f32,
    /// Place the label block before the text (true) or after it (false).
    pub prompt_first: bool,
    /// Maximum tokens per prompt; longer sequences are truncated.
    pub max_length: usize,
}

impl ClassificationRequest {
    /// Request with one shared label set and default decode settings.
    pub fn shared<T, L>(texts: &[T], labels: &[L], policy: ClassificationPolicy) -> Self
    where
        T: AsRef<str>,
        L: AsRef<str>,
    {
        Self {
            texts: texts.iter().map(|t| t.as_ref().to_string()).collect(),
            labels: LabelSpec::Shared(labels.iter().map(|l| l.as_ref().to_string()).collect()),
            policy,
            threshold: DEFAULT_THRESHOLD,
            prompt_first: true,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }

    /// Load and validate a request from a JSON document file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Parse and validate a request from a JSON document string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawDocument = serde_json::from_str(json)?;
        let policy = raw.classification_type.parse()?;

        let labels = match (raw.same_labels, raw.labels) {
            (true, RawLabels::Shared(labels)) => LabelSpec::Shared(labels),
            (false, RawLabels::PerText(sets)) => LabelSpec::PerText(sets),
            (true, RawLabels::PerText(_)) => {
                return Err(PipelineError::Config(
                    "same_labels is set but labels is a nested array".to_string(),
                ));
            }
            (false, RawLabels::Shared(_)) => {
                return Err(PipelineError::Config(
                    "same_labels is unset but labels is a flat array".to_string(),
                ));
            }
        };

        let request = Self {
            texts: raw.texts,
            labels,
            policy,
            threshold: raw.threshold,
            prompt_first: raw.prompt_first,
            max_length: raw.max_length,
        };
        request.validate()?;
        Ok(request)
    }

    /// Check the per-text label-count invariant: in per-text mode there must
    /// be exactly one label set per text.
    pub fn validate(&self) -> Result<()> {
        if let LabelSpec::PerText(sets) = &self.labels {
            if sets.len() != self.texts.len() {
                return Err(PipelineError::LabelCount {
                    texts: self.texts.len(),
                    label_sets: sets.len(),
                });
            }
        }
        if self.max_length == 0 {
            return Err(PipelineError::Config(
                "max_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct RawDocument {
    texts: Vec<String>,
    labels: RawLabels,
    #[serde(default)]
    same_labels: bool,
    classification_type: String,
    #[serde(default = "default_prompt_first")]
    prompt_first: bool,
    #[serde(default = "default_threshold")]
    threshold: f32,
    #[serde(default = "default_max_length")]
    max_length: usize,
}

// Nested arrays are tried first; a flat label list can never deserialize as
// one, so the two shapes are unambiguous.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLabels {
    PerText(Vec<Vec<String>>),
    Shared(Vec<String>),
}

fn default_prompt_first() -> bool {
    true
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

fn default_max_length() -> usize {
    DEFAULT_MAX_LENGTH
}
