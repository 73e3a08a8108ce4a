// Pipeline modules organized by functionality
pub mod zero_shot_classification;

pub use zero_shot_classification::{
    ClassificationOutput, Prediction, ZeroShotClassificationPipeline,
    ZeroShotClassificationPipelineBuilder,
};
