use crate::core::clause_pipeline::ClausePipeline;
use crate::core::extract::extract_text;
use crate::core::{
    ClassifiedClause, Classifier, ClauseReport, ConfigProvider, DocumentFormat, Pipeline,
    RawDocument, Storage, TransformResult,
};
use crate::utils::error::{EtlError, Result};
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

pub const EXTRACTED_TEXT_FILE: &str = "extracted_text.txt";
pub const JSON_REPORT_FILE: &str = "clauses.json";
pub const CSV_REPORT_FILE: &str = "clauses.csv";

/// 單一文件的 ETL：抽取文字 → 篩選條款 + 分類 → 寫出報告
pub struct DocumentPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    clauses: ClausePipeline,
    classifier: Box<dyn Classifier>,
}

impl<S: Storage, C: ConfigProvider> DocumentPipeline<S, C> {
    /// Reads the vocabulary once through [`ClausePipeline::from_config`].
    pub fn new(storage: S, config: C, classifier: Box<dyn Classifier>) -> Self {
        let clauses = ClausePipeline::from_config(&config);
        Self::with_clause_pipeline(storage, config, clauses, classifier)
    }

    /// Uses an already built clause pipeline, e.g. one whose vocabulary is
    /// shared with other documents.
    pub fn with_clause_pipeline(
        storage: S,
        config: C,
        clauses: ClausePipeline,
        classifier: Box<dyn Classifier>,
    ) -> Self {
        Self {
            storage,
            config,
            clauses,
            classifier,
        }
    }

    pub fn clause_pipeline(&self) -> &ClausePipeline {
        &self.clauses
    }

    fn output_file(&self, name: &str) -> String {
        Path::new(self.config.output_path())
            .join(name)
            .to_string_lossy()
            .into_owned()
    }

    fn extracted_text_file(&self) -> Option<String> {
        self.config
            .save_extracted_text()
            .then(|| self.output_file(EXTRACTED_TEXT_FILE))
    }

    fn render_csv(clauses: &[ClassifiedClause]) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["clause", "risk", "category", "explanation"])?;

        for item in clauses {
            let risk = item.prediction.risk.to_string();
            writer.write_record([
                item.clause.as_str(),
                risk.as_str(),
                item.prediction.category.as_str(),
                item.prediction.explanation.as_str(),
            ])?;
        }

        writer.into_inner().map_err(|e| EtlError::ProcessingError {
            message: format!("Failed to flush CSV report: {}", e),
        })
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for DocumentPipeline<S, C> {
    async fn extract(&self) -> Result<RawDocument> {
        let source = self.config.document_path();
        let format = DocumentFormat::from_path(source);
        tracing::debug!("Reading {} document: {}", format, source);

        let bytes = self.storage.read_file(source).await?;
        tracing::debug!("Read {} bytes", bytes.len());

        let document = RawDocument::new(source, format, extract_text(format, &bytes));
        if document.is_blank() {
            tracing::warn!("⚠️ No text extracted from {}", source);
        }

        if let Some(path) = self.extracted_text_file() {
            tracing::debug!("Saving extracted text to {}", path);
            self.storage.write_file(&path, document.text.as_bytes()).await?;
        }

        Ok(document)
    }

    async fn transform(&self, document: RawDocument) -> Result<TransformResult> {
        let (clauses, stats) = self.clauses.run(&document.text);

        let predictions = self.classifier.classify(&clauses).await?;
        if predictions.len() != clauses.len() {
            return Err(EtlError::ProcessingError {
                message: format!(
                    "Classifier returned {} predictions for {} clauses",
                    predictions.len(),
                    clauses.len()
                ),
            });
        }

        let clauses = clauses
            .into_iter()
            .zip(predictions)
            .map(|(clause, prediction)| ClassifiedClause { clause, prediction })
            .collect();

        Ok(TransformResult {
            source: document.source,
            clauses,
            stats,
            extracted_text_file: self.extracted_text_file(),
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let report = ClauseReport::from(result);
        let mut written: Vec<(&str, Vec<u8>)> = Vec::new();
        let mut seen: Vec<&str> = Vec::new();

        for format in self.config.output_formats() {
            // 重複的格式只寫一次，否則 ZIP 會出現重複項目
            if seen.contains(&format.as_str()) {
                tracing::debug!("Skipping repeated output format {}", format);
                continue;
            }
            seen.push(format.as_str());

            match format.as_str() {
                "json" => {
                    let json = serde_json::to_vec_pretty(&report)?;
                    written.push((JSON_REPORT_FILE, json));
                }
                "csv" => written.push((CSV_REPORT_FILE, Self::render_csv(&report.clauses)?)),
                other => {
                    return Err(EtlError::InvalidConfigValueError {
                        field: "output_formats".to_string(),
                        value: other.to_string(),
                        reason: "Unsupported output format".to_string(),
                    })
                }
            }
        }

        for (name, data) in &written {
            let path = self.output_file(name);
            tracing::debug!("Writing {} ({} bytes)", path, data.len());
            self.storage.write_file(&path, data).await?;
        }

        if let Some(archive_name) = self.config.compression_filename() {
            let extracted_text = match &report.extracted_text_file {
                Some(path) => Some(self.storage.read_file(path).await?),
                None => None,
            };

            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

                for (name, data) in &written {
                    zip.start_file::<_, ()>(*name, FileOptions::default())?;
                    zip.write_all(data)?;
                }

                if let Some(text) = &extracted_text {
                    zip.start_file::<_, ()>(EXTRACTED_TEXT_FILE, FileOptions::default())?;
                    zip.write_all(text)?;
                }

                zip.finish()?.into_inner()
            };

            let path = self.output_file(archive_name);
            tracing::debug!("Writing ZIP bundle ({} bytes) to {}", zip_data.len(), path);
            self.storage.write_file(&path, &zip_data).await?;
            return Ok(path);
        }

        match written.first() {
            Some((name, _)) => Ok(self.output_file(name)),
            None => Err(EtlError::ProcessingError {
                message: "No output format configured".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::HeuristicClassifier;
    use crate::core::{Prediction, RiskLevel};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::io::Read;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_document(path: &str, data: &[u8]) -> Self {
            let mut files = HashMap::new();
            files.insert(path.to_string(), data.to_vec());
            Self {
                files: Arc::new(Mutex::new(files)),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        document_path: String,
        output_path: String,
        inline_terms: Vec<String>,
        blacklist: Vec<String>,
        min_words: usize,
        output_formats: Vec<String>,
        save_extracted_text: bool,
        compression_filename: Option<String>,
    }

    impl MockConfig {
        fn new(document_path: &str) -> Self {
            Self {
                document_path: document_path.to_string(),
                output_path: "test_output".to_string(),
                inline_terms: vec!["coverage".to_string(), "hospitalization".to_string()],
                blacklist: vec!["the clause is classified as".to_string()],
                min_words: 3,
                output_formats: vec!["json".to_string()],
                save_extracted_text: false,
                compression_filename: None,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn document_path(&self) -> &str {
            &self.document_path
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn vocabulary_path(&self) -> Option<&str> {
            None
        }

        fn vocabulary_column(&self) -> &str {
            "keywords"
        }

        fn inline_terms(&self) -> &[String] {
            &self.inline_terms
        }

        fn blacklist(&self) -> &[String] {
            &self.blacklist
        }

        fn min_words(&self) -> usize {
            self.min_words
        }

        fn min_chars(&self) -> usize {
            0
        }

        fn output_formats(&self) -> &[String] {
            &self.output_formats
        }

        fn save_extracted_text(&self) -> bool {
            self.save_extracted_text
        }

        fn compression_filename(&self) -> Option<&str> {
            self.compression_filename.as_deref()
        }
    }

    /// 回傳錯誤數量預測的分類器
    struct ShortClassifier;

    #[async_trait]
    impl Classifier for ShortClassifier {
        async fn classify(&self, _clauses: &[String]) -> Result<Vec<Prediction>> {
            Ok(vec![])
        }
    }

    const POLICY: &str = "Coverage applies only to hospitalization.\n\nThis clause is classified as high risk.\n\nHospitalization expenses are\nexcluded for cosmetic surgery.\n";

    fn pipeline(config: MockConfig) -> (DocumentPipeline<MockStorage, MockConfig>, MockStorage) {
        let storage = MockStorage::with_document(&config.document_path, POLICY.as_bytes());
        let pipeline = DocumentPipeline::new(
            storage.clone(),
            config,
            Box::new(HeuristicClassifier::new()),
        );
        (pipeline, storage)
    }

    #[tokio::test]
    async fn test_extract_plain_text_document() {
        let (pipeline, storage) = pipeline(MockConfig::new("policy.txt"));

        let document = pipeline.extract().await.unwrap();

        assert_eq!(document.format, DocumentFormat::Text);
        assert_eq!(document.text, POLICY);
        assert!(storage.get_file("test_output/extracted_text.txt").await.is_none());
    }

    #[tokio::test]
    async fn test_extract_saves_side_file() {
        let mut config = MockConfig::new("policy.txt");
        config.save_extracted_text = true;
        let (pipeline, storage) = pipeline(config);

        pipeline.extract().await.unwrap();

        let saved = storage.get_file("test_output/extracted_text.txt").await;
        assert_eq!(saved.as_deref(), Some(POLICY.as_bytes()));
    }

    #[tokio::test]
    async fn test_extract_unknown_format_passes_diagnostic_text() {
        let (pipeline, _) = pipeline(MockConfig::new("policy.rtf"));

        let document = pipeline.extract().await.unwrap();
        assert_eq!(document.format, DocumentFormat::Unknown);
        assert_eq!(document.text, "Unsupported file format.");

        let result = pipeline.transform(document).await.unwrap();
        assert!(result.clauses.is_empty());
    }

    #[tokio::test]
    async fn test_extract_missing_document_is_an_error() {
        let config = MockConfig::new("policy.txt");
        let storage = MockStorage::with_document("other.txt", b"");
        let pipeline =
            DocumentPipeline::new(storage, config, Box::new(HeuristicClassifier::new()));

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, EtlError::IoError(_)));
    }

    #[tokio::test]
    async fn test_transform_pairs_clauses_with_predictions() {
        let (pipeline, _) = pipeline(MockConfig::new("policy.txt"));
        let document = pipeline.extract().await.unwrap();

        let result = pipeline.transform(document).await.unwrap();

        assert_eq!(result.clauses.len(), 2);
        assert_eq!(result.clauses[0].clause, "Coverage applies only to hospitalization.");
        assert_eq!(result.clauses[0].prediction.risk, RiskLevel::Low);
        assert_eq!(
            result.clauses[1].clause,
            "Hospitalization expenses are excluded for cosmetic surgery."
        );
        assert_eq!(result.clauses[1].prediction.risk, RiskLevel::High);
        assert_eq!(result.stats.candidates, 3);
        assert_eq!(result.stats.unique, 2);
    }

    #[tokio::test]
    async fn test_transform_rejects_misaligned_classifier_output() {
        let config = MockConfig::new("policy.txt");
        let storage = MockStorage::with_document("policy.txt", POLICY.as_bytes());
        let pipeline = DocumentPipeline::new(storage, config, Box::new(ShortClassifier));

        let document = pipeline.extract().await.unwrap();
        let err = pipeline.transform(document).await.unwrap_err();

        assert!(matches!(err, EtlError::ProcessingError { .. }));
    }

    #[tokio::test]
    async fn test_load_writes_json_and_csv() {
        let mut config = MockConfig::new("policy.txt");
        config.output_formats = vec!["json".to_string(), "csv".to_string()];
        let (pipeline, storage) = pipeline(config);

        let document = pipeline.extract().await.unwrap();
        let result = pipeline.transform(document).await.unwrap();
        let output_path = pipeline.load(result).await.unwrap();

        assert_eq!(output_path, "test_output/clauses.json");

        let json = storage.get_file("test_output/clauses.json").await.unwrap();
        let report: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(report["source"], "policy.txt");
        assert_eq!(report["clauses"].as_array().unwrap().len(), 2);
        assert_eq!(
            report["clauses"][0]["clause"],
            "Coverage applies only to hospitalization."
        );
        assert!(report.get("extracted_text_file").is_none());

        let csv = storage.get_file("test_output/clauses.csv").await.unwrap();
        let csv = String::from_utf8(csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("clause,risk,category,explanation"));
        assert!(lines
            .next()
            .unwrap()
            .starts_with("Coverage applies only to hospitalization.,low,"));
    }

    #[tokio::test]
    async fn test_load_repeated_format_written_once_in_bundle() {
        let mut config = MockConfig::new("policy.txt");
        config.output_formats = vec!["json".to_string(), "json".to_string()];
        config.compression_filename = Some("clause_report.zip".to_string());
        let (pipeline, storage) = pipeline(config);

        let document = pipeline.extract().await.unwrap();
        let result = pipeline.transform(document).await.unwrap();
        let output_path = pipeline.load(result).await.unwrap();
        assert_eq!(output_path, "test_output/clause_report.zip");

        let zip_bytes = storage.get_file("test_output/clause_report.zip").await.unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();
        assert_eq!(archive.len(), 1);
        assert!(archive.file_names().any(|name| name == "clauses.json"));
    }

    #[tokio::test]
    async fn test_load_zip_bundle_includes_extracted_text() {
        let mut config = MockConfig::new("policy.txt");
        config.output_formats = vec!["json".to_string(), "csv".to_string()];
        config.save_extracted_text = true;
        config.compression_filename = Some("clause_report.zip".to_string());
        let (pipeline, storage) = pipeline(config);

        let document = pipeline.extract().await.unwrap();
        let result = pipeline.transform(document).await.unwrap();
        let output_path = pipeline.load(result).await.unwrap();

        assert_eq!(output_path, "test_output/clause_report.zip");

        let zip_bytes = storage.get_file("test_output/clause_report.zip").await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();

        let mut file_names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        file_names.sort();
        assert_eq!(
            file_names,
            vec!["clauses.csv", "clauses.json", "extracted_text.txt"]
        );

        let mut text = String::new();
        archive
            .by_name("extracted_text.txt")
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, POLICY);
    }
}
