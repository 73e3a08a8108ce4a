use rayon::prelude::*;
use tokenizers::Tokenizer;
use tracing::{debug, warn};

use super::batching::{self, Batch};
use super::decoding::{self, Prediction};
use super::{encoding, prompt, tensors};
use crate::error::Result;
use crate::models::GliClassModel;
use crate::request::ClassificationRequest;

/// Everything a classification run produced.
#[derive(Debug)]
pub struct ClassificationOutput {
    /// One entry per input text, in input order. `None` marks a text whose
    /// batch failed; `Some(vec![])` is a multi-label text with no label
    /// above the threshold.
    pub results: Vec<Option<Vec<Prediction>>>,
    /// Batches that were abandoned after a stage failure.
    pub failed_batches: usize,
}

/// Classifies texts against candidate labels using a GLiClass ONNX model.
///
/// Construct with [`ZeroShotClassificationPipelineBuilder`](super::ZeroShotClassificationPipelineBuilder).
pub struct ZeroShotClassificationPipeline {
    pub(crate) model: GliClassModel,
    pub(crate) tokenizer: Tokenizer,
    pub(crate) pool: rayon::ThreadPool,
    pub(crate) batch_size: usize,
}

impl std::fmt::Debug for ZeroShotClassificationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZeroShotClassificationPipeline")
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl ZeroShotClassificationPipeline {
    /// Run a full classification request.
    ///
    /// The request is split into batches of at most the configured batch
    /// size and the batches are processed concurrently on the worker pool,
    /// each one flowing through prompt building, tokenization, tensor
    /// assembly, inference and decoding on whichever worker claims it.
    ///
    /// A failed batch is logged, contributes `None` for each of its texts
    /// and never aborts the run; input-shape problems in the request
    /// itself fail the whole run up front.
    pub fn classify(&self, request: &ClassificationRequest) -> Result<ClassificationOutput> {
        request.validate()?;

        let plan = batching::plan(request.texts.len(), self.batch_size);
        debug!(
            texts = request.texts.len(),
            batches = plan.len(),
            batch_size = self.batch_size,
            "dispatching classification request"
        );

        // Workers pull the next unclaimed batch; uneven per-batch cost
        // does not stall the rest of the pool.
        let outcomes: Vec<Result<Vec<Vec<Prediction>>>> = self.pool.install(|| {
            plan.par_iter()
                .map(|batch| self.process_batch(request, *batch))
                .collect()
        });

        Ok(collect_results(&plan, outcomes, request.texts.len()))
    }

    /// Convenience wrapper: one shared label set, default settings.
    pub fn run<T: AsRef<str>, L: AsRef<str>>(
        &self,
        texts: &[T],
        labels: &[L],
        policy: crate::request::ClassificationPolicy,
    ) -> Result<ClassificationOutput> {
        self.classify(&ClassificationRequest::shared(texts, labels, policy))
    }

    fn process_batch(
        &self,
        request: &ClassificationRequest,
        batch: Batch,
    ) -> Result<Vec<Vec<Prediction>>> {
        let prompts: Vec<prompt::Prompt> = batch
            .range()
            .map(|index| {
                prompt::build(
                    &request.texts[index],
                    request.labels.for_text(index),
                    request.prompt_first,
                )
            })
            .collect();

        let tokenized = encoding::encode(&self.tokenizer, prompts, request.max_length)?;
        let assembled = tensors::assemble(tokenized);

        let logits = self.model.run(
            &assembled.input_ids.data,
            &assembled.attention_mask.data,
            assembled.input_ids.shape,
        )?;

        Ok(decoding::decode(
            &logits,
            &assembled.label_orders,
            request.threshold,
            request.policy,
        ))
    }
}

/// Stitch per-batch outcomes back into per-text results.
///
/// Failed batches are logged and counted; their texts stay `None`.
fn collect_results(
    plan: &[Batch],
    outcomes: Vec<Result<Vec<Vec<Prediction>>>>,
    text_count: usize,
) -> ClassificationOutput {
    let mut results: Vec<Option<Vec<Prediction>>> = vec![None; text_count];
    let mut failed_batches = 0;

    for (batch, outcome) in plan.iter().zip(outcomes) {
        match outcome {
            Ok(predictions) => {
                for (offset, text_predictions) in predictions.into_iter().enumerate() {
                    results[batch.start + offset] = Some(text_predictions);
                }
            }
            Err(error) => {
                warn!(
                    start = batch.start,
                    size = batch.size,
                    %error,
                    "batch failed, skipping"
                );
                failed_batches += 1;
            }
        }
    }

    ClassificationOutput {
        results,
        failed_batches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    fn prediction(label: &str) -> Vec<Vec<Prediction>> {
        vec![vec![Prediction {
            label: label.to_string(),
            score: 0.9,
        }]]
    }

    #[test]
    fn failed_batch_skips_its_texts_and_counts_once() {
        let plan = batching::plan(3, 1);
        let outcomes = vec![
            Ok(prediction("first")),
            Err(PipelineError::Tokenization("boom".to_string())),
            Ok(prediction("third")),
        ];

        let output = collect_results(&plan, outcomes, 3);

        assert_eq!(output.failed_batches, 1);
        assert_eq!(output.results[0].as_ref().unwrap()[0].label, "first");
        assert!(output.results[1].is_none());
        assert_eq!(output.results[2].as_ref().unwrap()[0].label, "third");
    }

    #[test]
    fn short_final_batch_lands_on_the_right_texts() {
        let plan = batching::plan(5, 2);
        let outcomes = vec![
            Ok(vec![prediction("a").remove(0), prediction("b").remove(0)]),
            Ok(vec![prediction("c").remove(0), prediction("d").remove(0)]),
            Ok(prediction("e")),
        ];

        let output = collect_results(&plan, outcomes, 5);

        assert_eq!(output.failed_batches, 0);
        let labels: Vec<_> = output
            .results
            .iter()
            .map(|r| r.as_ref().unwrap()[0].label.clone())
            .collect();
        assert_eq!(labels, ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn all_batches_failing_still_reports_every_text() {
        let plan = batching::plan(4, 2);
        let outcomes = vec![
            Err(PipelineError::Tokenization("x".to_string())),
            Err(PipelineError::Tokenization("y".to_string())),
        ];

        let output = collect_results(&plan, outcomes, 4);

        assert_eq!(output.failed_batches, 2);
        assert_eq!(output.results.len(), 4);
        assert!(output.results.iter().all(Option::is_none));
    }
}
