use crate::core::clause_pipeline::DEFAULT_BLACKLIST;
use crate::core::filter::DEFAULT_MIN_WORDS;
use crate::core::vocabulary::DEFAULT_TERM_COLUMN;
use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var regex"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub vocabulary: VocabularyConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub document: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VocabularyConfig {
    pub path: Option<String>,
    pub column: Option<String>,
    #[serde(default)]
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "default_blacklist")]
    pub blacklist: Vec<String>,
    #[serde(default = "default_min_words")]
    pub min_words: usize,
    #[serde(default)]
    pub min_chars: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            blacklist: default_blacklist(),
            min_words: default_min_words(),
            min_chars: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    #[default]
    Heuristic,
    Http,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub kind: ClassifierKind,
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    #[serde(default = "default_output_formats")]
    pub output_formats: Vec<String>,
    #[serde(default)]
    pub save_extracted_text: bool,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

fn default_blacklist() -> Vec<String> {
    DEFAULT_BLACKLIST.iter().map(|s| s.to_string()).collect()
}

fn default_min_words() -> usize {
    DEFAULT_MIN_WORDS
}

fn default_output_formats() -> Vec<String> {
    vec!["json".to_string()]
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| EtlError::ConfigError {
            message: format!("cannot read config file {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${POLICY_DIR})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("pipeline.name", &self.pipeline.name)?;
        validation::validate_path("source.document", &self.source.document)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_positive_number("filter.min_words", self.filter.min_words, 1)?;
        validation::validate_output_formats("load.output_formats", &self.load.output_formats)?;

        if let Some(path) = &self.vocabulary.path {
            validation::validate_file_extension("vocabulary.path", path, &["csv", "tsv"])?;
        }

        if self.classifier.kind == ClassifierKind::Http {
            let endpoint =
                validation::validate_required_field("classifier.endpoint", &self.classifier.endpoint)?;
            validation::validate_url("classifier.endpoint", endpoint)?;
        }

        if let Some(compression) = self.load.compression.as_ref().filter(|c| c.enabled) {
            validation::validate_file_extension("load.compression.filename", &compression.filename, &["zip"])?;
        }

        Ok(())
    }

    /// 遠端分類器端點（僅 http 模式）
    pub fn classifier_endpoint(&self) -> Option<&str> {
        match self.classifier.kind {
            ClassifierKind::Http => self.classifier.endpoint.as_deref(),
            ClassifierKind::Heuristic => None,
        }
    }

    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_secs(self.classifier.timeout_seconds.unwrap_or(30))
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn document_path(&self) -> &str {
        &self.source.document
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn vocabulary_path(&self) -> Option<&str> {
        self.vocabulary.path.as_deref()
    }

    fn vocabulary_column(&self) -> &str {
        self.vocabulary.column.as_deref().unwrap_or(DEFAULT_TERM_COLUMN)
    }

    fn inline_terms(&self) -> &[String] {
        &self.vocabulary.terms
    }

    fn blacklist(&self) -> &[String] {
        &self.filter.blacklist
    }

    fn min_words(&self) -> usize {
        self.filter.min_words
    }

    fn min_chars(&self) -> usize {
        self.filter.min_chars
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn save_extracted_text(&self) -> bool {
        self.load.save_extracted_text
    }

    fn compression_filename(&self) -> Option<&str> {
        self.load
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| c.filename.as_str())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[pipeline]
name = "policy-clauses"
version = "1.0.0"

[source]
document = "policy.pdf"

[load]
output_path = "./output"
"#;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let config = TomlConfig::from_toml_str(MINIMAL).unwrap();

        assert_eq!(config.pipeline.name, "policy-clauses");
        assert_eq!(config.document_path(), "policy.pdf");
        assert_eq!(config.min_words(), 5);
        assert_eq!(config.min_chars(), 0);
        assert_eq!(config.vocabulary_column(), "keywords");
        assert_eq!(config.output_formats(), ["json".to_string()]);
        assert_eq!(config.blacklist().len(), DEFAULT_BLACKLIST.len());
        assert!(config.vocabulary_path().is_none());
        assert!(config.compression_filename().is_none());
        assert!(config.classifier_endpoint().is_none());
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[pipeline]
name = "health-policy"
description = "Health policy clauses"
version = "1.0"

[source]
document = "docs/policy.docx"

[vocabulary]
path = "data/keywords.csv"
column = "terms"
terms = ["co-pay", "room rent"]

[filter]
blacklist = ["all rights reserved"]
min_words = 3
min_chars = 21

[classifier]
kind = "http"
endpoint = "https://models.example.com/classify"
timeout_seconds = 10

[load]
output_path = "./reports"
output_formats = ["json", "csv"]
save_extracted_text = true

[load.compression]
enabled = true
filename = "clauses.zip"

[monitoring]
enabled = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.vocabulary_path(), Some("data/keywords.csv"));
        assert_eq!(config.vocabulary_column(), "terms");
        assert_eq!(config.inline_terms().len(), 2);
        assert_eq!(config.blacklist(), ["all rights reserved".to_string()]);
        assert_eq!(config.min_words(), 3);
        assert_eq!(config.min_chars(), 21);
        assert_eq!(
            config.classifier_endpoint(),
            Some("https://models.example.com/classify")
        );
        assert_eq!(config.classifier_timeout(), Duration::from_secs(10));
        assert_eq!(config.compression_filename(), Some("clauses.zip"));
        assert!(config.save_extracted_text());
        assert!(config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CLAUSE_ETL_TEST_DOC", "/data/policy.txt");

        let toml_content = r#"
[pipeline]
name = "test"
version = "1.0"

[source]
document = "${CLAUSE_ETL_TEST_DOC}"

[load]
output_path = "${CLAUSE_ETL_TEST_UNSET_DIR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.source.document, "/data/policy.txt");
        assert_eq!(config.load.output_path, "${CLAUSE_ETL_TEST_UNSET_DIR}");

        std::env::remove_var("CLAUSE_ETL_TEST_DOC");
    }

    #[test]
    fn test_config_validation() {
        let http_without_endpoint = format!("{}\n[classifier]\nkind = \"http\"\n", MINIMAL);
        let config = TomlConfig::from_toml_str(&http_without_endpoint).unwrap();
        assert!(matches!(
            config.validate(),
            Err(EtlError::MissingConfigError { .. })
        ));

        let bad_format = MINIMAL.replace(
            "output_path = \"./output\"",
            "output_path = \"./output\"\noutput_formats = [\"xml\"]",
        );
        let config = TomlConfig::from_toml_str(&bad_format).unwrap();
        assert!(config.validate().is_err());

        let zero_words = format!("{}\n[filter]\nmin_words = 0\n", MINIMAL);
        let config = TomlConfig::from_toml_str(&zero_words).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[pipeline\nname=").unwrap_err();
        assert!(matches!(err, EtlError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_missing_config_file_is_config_error() {
        let err = TomlConfig::from_file("definitely/missing/clause-etl.toml").unwrap_err();
        assert!(matches!(err, EtlError::ConfigError { .. }));
        assert_eq!(err.category(), crate::utils::error::ErrorCategory::Configuration);
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.pipeline.name, "policy-clauses");
    }
}
