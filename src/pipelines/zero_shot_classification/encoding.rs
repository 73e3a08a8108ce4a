//! Batch tokenization, truncation and padding.

use tokenizers::Tokenizer;

use super::prompt::Prompt;
use crate::error::{PipelineError, Result};

/// Padding sentinel written into all three matrices.
const PAD_ID: u32 = 0;

/// One tokenized batch: three `(batch_size x seq_length)` matrices plus the
/// per-text label orders threaded through from prompt building.
///
/// Everything a batch owns travels in this one value, so abandoning a batch
/// on failure releases all of it in one drop.
#[derive(Debug)]
pub struct TokenizedBatch {
    pub input_ids: Vec<Vec<u32>>,
    pub token_type_ids: Vec<Vec<u32>>,
    pub attention_mask: Vec<Vec<u32>>,
    pub batch_size: usize,
    pub seq_length: usize,
    pub label_orders: Vec<Vec<String>>,
}

/// Tokenize a batch of prompts in one call to the tokenizer engine.
///
/// Sequences longer than `max_length` keep their leading `max_length`
/// tokens. `seq_length` is the longest kept sequence in the batch; shorter
/// rows are right-padded with id 0 / type-id 0 / mask 0. Token-type ids are
/// always 0: classification prompts are single-segment.
pub fn encode(
    tokenizer: &Tokenizer,
    prompts: Vec<Prompt>,
    max_length: usize,
) -> Result<TokenizedBatch> {
    let batch_size = prompts.len();
    let mut label_orders = Vec::with_capacity(batch_size);
    let mut texts = Vec::with_capacity(batch_size);
    for prompt in prompts {
        label_orders.push(prompt.label_order);
        texts.push(prompt.text);
    }

    let encodings = tokenizer
        .encode_batch(texts, true)
        .map_err(|e| PipelineError::Tokenization(e.to_string()))?;

    let seq_length = encodings
        .iter()
        .map(|encoding| encoding.len().min(max_length))
        .max()
        .unwrap_or(0);

    let mut input_ids = Vec::with_capacity(batch_size);
    let mut token_type_ids = Vec::with_capacity(batch_size);
    let mut attention_mask = Vec::with_capacity(batch_size);

    for encoding in &encodings {
        let ids = encoding.get_ids();
        let kept = ids.len().min(max_length);

        let mut id_row = Vec::with_capacity(seq_length);
        id_row.extend_from_slice(&ids[..kept]);
        id_row.resize(seq_length, PAD_ID);

        let mut mask_row = vec![1; kept];
        mask_row.resize(seq_length, 0);

        input_ids.push(id_row);
        token_type_ids.push(vec![0; seq_length]);
        attention_mask.push(mask_row);
    }

    Ok(TokenizedBatch {
        input_ids,
        token_type_ids,
        attention_mask,
        batch_size,
        seq_length,
        label_orders,
    })
}
