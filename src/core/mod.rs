pub mod classifier;
pub mod clause_pipeline;
pub mod dedup;
pub mod etl;
pub mod extract;
pub mod filter;
pub mod normalize;
pub mod segment;
pub mod vocabulary;

pub use crate::domain::model::{
    ClassifiedClause, ClauseReport, DocumentFormat, PipelineStats, Prediction, RawDocument,
    RiskLevel, TransformResult,
};
pub use crate::domain::ports::{Classifier, ConfigProvider, Pipeline, Storage, TextExtractor};
pub use crate::utils::error::Result;
