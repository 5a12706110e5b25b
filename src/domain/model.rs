use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Container type of an uploaded document, resolved once from its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Text,
    Unknown,
}

impl DocumentFormat {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("pdf") => DocumentFormat::Pdf,
            Some("docx") => DocumentFormat::Docx,
            Some("txt") => DocumentFormat::Text,
            _ => DocumentFormat::Unknown,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "DOCX",
            DocumentFormat::Text => "text",
            DocumentFormat::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Text produced by an extractor. Only line boundaries carry structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub source: String,
    pub format: DocumentFormat,
    pub text: String,
}

impl RawDocument {
    pub fn new(source: impl Into<String>, format: DocumentFormat, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            format,
            text: text.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Moderate,
    Low,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RiskLevel::High => "high",
            RiskLevel::Moderate => "moderate",
            RiskLevel::Low => "low",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub risk: RiskLevel,
    pub category: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedClause {
    pub clause: String,
    pub prediction: Prediction,
}

/// 各階段剩下的候選數量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub candidates: usize,
    pub after_min_chars: usize,
    pub kept: usize,
    pub unique: usize,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub source: String,
    pub clauses: Vec<ClassifiedClause>,
    pub stats: PipelineStats,
    pub extracted_text_file: Option<String>,
}

/// JSON shape written by the load phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClauseReport {
    pub source: String,
    pub generated_at: DateTime<Utc>,
    pub stats: PipelineStats,
    pub clauses: Vec<ClassifiedClause>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_text_file: Option<String>,
}

impl From<TransformResult> for ClauseReport {
    fn from(result: TransformResult) -> Self {
        Self {
            source: result.source,
            generated_at: Utc::now(),
            stats: result.stats,
            clauses: result.clauses,
            extracted_text_file: result.extracted_text_file,
        }
    }
}
