//! Flat tensor assembly for the inference engine.

use super::encoding::TokenizedBatch;

/// A flat row-major buffer with its `(rows, cols)` shape, widened to the
/// engine's `i64` element type.
#[derive(Debug)]
pub struct InputTensor {
    pub data: Vec<i64>,
    pub shape: [usize; 2],
}

/// Tensors for one batch, ready to hand to the engine, with the label
/// orders still riding along for decode.
#[derive(Debug)]
pub struct AssembledBatch {
    pub input_ids: InputTensor,
    pub attention_mask: InputTensor,
    pub label_orders: Vec<Vec<String>>,
}

/// Flatten the padded matrices into contiguous engine buffers.
///
/// Consumes the tokenized batch; the per-row matrices are freed here. The
/// model takes only ids and mask, so token-type ids are dropped without
/// being assembled.
pub fn assemble(batch: TokenizedBatch) -> AssembledBatch {
    let shape = [batch.batch_size, batch.seq_length];

    AssembledBatch {
        input_ids: InputTensor {
            data: flatten(&batch.input_ids, shape),
            shape,
        },
        attention_mask: InputTensor {
            data: flatten(&batch.attention_mask, shape),
            shape,
        },
        label_orders: batch.label_orders,
    }
}

fn flatten(rows: &[Vec<u32>], shape: [usize; 2]) -> Vec<i64> {
    let mut flat = Vec::with_capacity(shape[0] * shape[1]);
    for row in rows {
        flat.extend(row.iter().map(|&value| i64::from(value)));
    }
    flat
}
