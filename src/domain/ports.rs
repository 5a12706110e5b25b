use crate::domain::model::{DocumentFormat, Prediction, RawDocument, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn document_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn vocabulary_path(&self) -> Option<&str>;
    fn vocabulary_column(&self) -> &str;
    fn inline_terms(&self) -> &[String];
    fn blacklist(&self) -> &[String];
    fn min_words(&self) -> usize;
    fn min_chars(&self) -> usize;
    fn output_formats(&self) -> &[String];
    fn save_extracted_text(&self) -> bool;
    fn compression_filename(&self) -> Option<&str>;
}

/// Turns the bytes of one container format into raw text.
pub trait TextExtractor: Send + Sync {
    fn format(&self) -> DocumentFormat;
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

/// Assigns a risk level and category to each clause.
///
/// Implementations return exactly one prediction per clause, in input order.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, clauses: &[String]) -> Result<Vec<Prediction>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<RawDocument>;
    async fn transform(&self, document: RawDocument) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
