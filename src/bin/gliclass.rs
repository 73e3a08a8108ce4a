//! Command-line launcher: load a request document, run the pipeline,
//! print predictions.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gliclass_onnx::{ClassificationRequest, ZeroShotClassificationPipelineBuilder};

#[derive(Parser)]
#[command(name = "gliclass", about = "Zero-shot text classification with GLiClass ONNX models")]
struct Args {
    /// JSON request document with texts, labels and classification settings
    input: PathBuf,

    /// Path to the ONNX model file
    #[arg(long, default_value = "onnx/model.onnx")]
    model: PathBuf,

    /// Path to the tokenizer.json file
    #[arg(long, default_value = "tokenizer/tokenizer.json")]
    tokenizer: PathBuf,

    /// Texts per inference batch
    #[arg(long, default_value_t = 8)]
    batch_size: usize,

    /// Worker threads processing batches concurrently
    #[arg(long, default_value_t = 8)]
    workers: usize,

    /// Intra/inter-op threads for the inference session (CPU)
    #[arg(long, default_value_t = 8)]
    intra_threads: usize,

    /// Run on the given CUDA device instead of the CPU
    #[cfg(feature = "cuda")]
    #[arg(long)]
    cuda: Option<i32>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gliclass_onnx=info,gliclass=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let request = ClassificationRequest::from_json_file(&args.input)
        .with_context(|| format!("loading request document {}", args.input.display()))?;
    info!(texts = request.texts.len(), "request document loaded");

    #[allow(unused_mut)]
    let mut builder = ZeroShotClassificationPipelineBuilder::new(&args.model, &args.tokenizer)
        .batch_size(args.batch_size)
        .workers(args.workers)
        .intra_threads(args.intra_threads);
    #[cfg(feature = "cuda")]
    if let Some(device_id) = args.cuda {
        builder = builder.cuda(device_id);
    }

    let pipeline = builder.build().context("building pipeline")?;
    let output = pipeline.classify(&request).context("running request")?;

    for (text, result) in request.texts.iter().zip(&output.results) {
        println!("{text}");
        match result {
            Some(predictions) if predictions.is_empty() => println!("  (no label above threshold)"),
            Some(predictions) => {
                for prediction in predictions {
                    println!("  {}: {:.4}", prediction.label, prediction.score);
                }
            }
            None => println!("  (batch failed)"),
        }
    }

    if output.failed_batches > 0 {
        warn!(failed = output.failed_batches, "some batches failed");
    }

    Ok(())
}
