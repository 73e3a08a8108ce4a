//! Logit decoding under the two classification policies.

use crate::models::Logits;
use crate::request::ClassificationPolicy;

/// Placeholder emitted when a logits column has no matching label, which
/// only happens if the model produces more classes than the prompt carried
/// labels.
const UNKNOWN_LABEL: &str = "unknown";

/// A label with its decoded probability.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub score: f32,
}

/// Map one batch of logits back to labeled predictions.
///
/// `label_orders[i]` must be the label order the prompt for text `i` was
/// built with; column `j` of the logits row is attributed to
/// `label_orders[i][j]`. Columns beyond a text's label order decode to the
/// `"unknown"` placeholder rather than failing the batch.
///
/// Multi-label emits every label whose probability is strictly greater
/// than `threshold`; single-label emits exactly one prediction per text,
/// with ties broken toward the lowest column index.
pub fn decode(
    logits: &Logits,
    label_orders: &[Vec<String>],
    threshold: f32,
    policy: ClassificationPolicy,
) -> Vec<Vec<Prediction>> {
    (0..logits.batch_size)
        .map(|index| {
            let row = logits.row(index);
            let labels = label_orders.get(index).map(Vec::as_slice).unwrap_or(&[]);
            match policy {
                ClassificationPolicy::MultiLabel => decode_multi_label(row, labels, threshold),
                ClassificationPolicy::SingleLabel => decode_single_label(row, labels),
            }
        })
        .collect()
}

fn decode_multi_label(row: &[f32], labels: &[String], threshold: f32) -> Vec<Prediction> {
    row.iter()
        .enumerate()
        .filter_map(|(column, &logit)| {
            let score = sigmoid(logit);
            (score > threshold).then(|| Prediction {
                label: label_at(labels, column),
                score,
            })
        })
        .collect()
}

fn decode_single_label(row: &[f32], labels: &[String]) -> Vec<Prediction> {
    let mut best_score = 0.0f32;
    let mut best_column = None;
    for (column, &logit) in row.iter().enumerate() {
        let score = sigmoid(logit);
        if score > best_score {
            best_score = score;
            best_column = Some(column);
        }
    }

    let label = match best_column {
        Some(column) => label_at(labels, column),
        None => UNKNOWN_LABEL.to_string(),
    };
    vec![Prediction {
        label,
        score: best_score,
    }]
}

fn label_at(labels: &[String], column: usize) -> String {
    labels
        .get(column)
        .cloned()
        .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
}

pub(crate) fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logits(rows: &[&[f32]]) -> Logits {
        let num_classes = rows.first().map(|row| row.len()).unwrap_or(0);
        Logits {
            data: rows.concat(),
            batch_size: rows.len(),
            num_classes,
        }
    }

    fn orders(sets: &[&[&str]]) -> Vec<Vec<String>> {
        sets.iter()
            .map(|set| set.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn sigmoid_is_monotonic_and_bounded() {
        assert!(sigmoid(-5.0) < sigmoid(0.0));
        assert!(sigmoid(0.0) < sigmoid(5.0));
        assert!(sigmoid(-50.0) > 0.0);
        assert!(sigmoid(50.0) < 1.0);
        assert_eq!(sigmoid(0.0), 0.5);
    }

    #[test]
    fn multi_label_excludes_threshold_boundary() {
        // logit 0.0 decodes to exactly 0.5; with threshold 0.5 it must not
        // be emitted.
        let predictions = decode(
            &logits(&[&[0.0, 2.0, -2.0]]),
            &orders(&[&["a", "b", "c"]]),
            0.5,
            ClassificationPolicy::MultiLabel,
        );

        assert_eq!(predictions[0].len(), 1);
        assert_eq!(predictions[0][0].label, "b");
        assert!(predictions[0][0].score > 0.5);
    }

    #[test]
    fn multi_label_can_emit_no_predictions() {
        let predictions = decode(
            &logits(&[&[-1.0, -2.0]]),
            &orders(&[&["a", "b"]]),
            0.5,
            ClassificationPolicy::MultiLabel,
        );
        assert!(predictions[0].is_empty());
    }

    #[test]
    fn single_label_breaks_ties_toward_lowest_column() {
        let predictions = decode(
            &logits(&[&[0.2, 0.2, -1.0]]),
            &orders(&[&["a", "b", "c"]]),
            0.5,
            ClassificationPolicy::SingleLabel,
        );

        assert_eq!(predictions[0].len(), 1);
        assert_eq!(predictions[0][0].label, "a");
    }

    #[test]
    fn single_label_with_no_classes_yields_unknown() {
        let predictions = decode(
            &logits(&[&[]]),
            &orders(&[&[]]),
            0.5,
            ClassificationPolicy::SingleLabel,
        );

        assert_eq!(predictions[0].len(), 1);
        assert_eq!(predictions[0][0].label, "unknown");
        assert_eq!(predictions[0][0].score, 0.0);
    }

    #[test]
    fn columns_beyond_label_order_decode_to_unknown() {
        let predictions = decode(
            &logits(&[&[5.0, 5.0]]),
            &orders(&[&["only"]]),
            0.5,
            ClassificationPolicy::MultiLabel,
        );

        assert_eq!(predictions[0].len(), 2);
        assert_eq!(predictions[0][0].label, "only");
        assert_eq!(predictions[0][1].label, "unknown");
    }

    #[test]
    fn label_order_round_trips_per_text() {
        // Two texts with different label orders in one batch; each row's
        // columns must map through its own order.
        let predictions = decode(
            &logits(&[&[3.0, -3.0], &[-3.0, 3.0]]),
            &orders(&[&["cat", "dog"], &["red", "blue"]]),
            0.5,
            ClassificationPolicy::MultiLabel,
        );

        assert_eq!(predictions[0].len(), 1);
        assert_eq!(predictions[0][0].label, "cat");
        assert_eq!(predictions[1].len(), 1);
        assert_eq!(predictions[1][0].label, "blue");
    }

    #[test]
    fn single_label_prefers_higher_probability() {
        let predictions = decode(
            &logits(&[&[-1.0, 4.0, 2.0]]),
            &orders(&[&["a", "b", "c"]]),
            0.5,
            ClassificationPolicy::SingleLabel,
        );

        assert_eq!(predictions[0][0].label, "b");
        assert!(predictions[0][0].score > 0.9);
    }
}
