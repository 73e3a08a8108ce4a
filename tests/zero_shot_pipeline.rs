// End-to-end pipeline test against real model artifacts.
//
// Needs a GLiClass ONNX export and its tokenizer on disk; point
// GLICLASS_MODEL and GLICLASS_TOKENIZER at them to enable. Without the
// artifacts the test is skipped so the suite stays runnable offline.

use gliclass_onnx::{
    ClassificationPolicy, ClassificationRequest, ZeroShotClassificationPipelineBuilder,
};

fn artifact_paths() -> Option<(String, String)> {
    let model = std::env::var("GLICLASS_MODEL").ok()?;
    let tokenizer = std::env::var("GLICLASS_TOKENIZER").ok()?;
    Some((model, tokenizer))
}

#[test]
fn classifies_a_small_request_end_to_end() -> anyhow::Result<()> {
    let Some((model, tokenizer)) = artifact_paths() else {
        eprintln!("skipping: GLICLASS_MODEL / GLICLASS_TOKENIZER not set");
        return Ok(());
    };

    let pipeline = ZeroShotClassificationPipelineBuilder::new(&model, &tokenizer)
        .batch_size(2)
        .workers(2)
        .build()?;

    let texts = [
        "The election results were surprising.",
        "The team won the championship game.",
        "New research shows promising results.",
    ];
    let labels = ["politics", "sports", "science"];
    let request = ClassificationRequest::shared(&texts, &labels, ClassificationPolicy::SingleLabel);

    let output = pipeline.classify(&request)?;

    assert_eq!(output.results.len(), texts.len());
    assert_eq!(output.failed_batches, 0);
    for result in &output.results {
        let predictions = result.as_ref().expect("no batch should fail");
        assert_eq!(predictions.len(), 1);
        assert!(labels.contains(&predictions[0].label.as_str()));
        assert!(predictions[0].score > 0.0 && predictions[0].score < 1.0);
    }
    Ok(())
}

#[test]
fn multi_label_batch_respects_per_text_label_sets() -> anyhow::Result<()> {
    let Some((model, tokenizer)) = artifact_paths() else {
        eprintln!("skipping: GLICLASS_MODEL / GLICLASS_TOKENIZER not set");
        return Ok(());
    };

    let pipeline = ZeroShotClassificationPipelineBuilder::new(&model, &tokenizer).build()?;

    let request = ClassificationRequest::from_json_str(
        r#"{
            "texts": ["I loved this movie", "The stock market dropped"],
            "labels": [["positive", "negative"], ["finance", "sports", "weather"]],
            "same_labels": false,
            "classification_type": "multi-label",
            "threshold": 0.1
        }"#,
    )?;

    let output = pipeline.classify(&request)?;

    let allowed: [&[&str]; 2] = [&["positive", "negative"], &["finance", "sports", "weather"]];
    for (result, allowed) in output.results.iter().zip(allowed) {
        for prediction in result.as_ref().expect("no batch should fail") {
            assert!(allowed.contains(&prediction.label.as_str()));
        }
    }
    Ok(())
}
