pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::clause_pipeline::DEFAULT_BLACKLIST;
#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "clause-etl")]
#[command(about = "Extract candidate coverage clauses from a policy document")]
pub struct CliConfig {
    /// Policy document (.pdf, .docx or .txt)
    #[arg(long)]
    pub document: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// CSV/TSV file with a column of comma- or list-encoded keywords
    #[arg(long)]
    pub vocabulary: Option<String>,

    #[arg(long, default_value = "keywords")]
    pub vocabulary_column: String,

    /// Extra keywords added to the vocabulary
    #[arg(long, value_delimiter = ',')]
    pub terms: Vec<String>,

    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_BLACKLIST.map(String::from))]
    pub blacklist: Vec<String>,

    #[arg(long, default_value = "5")]
    pub min_words: usize,

    /// Minimum clause length in characters, 0 disables the check
    #[arg(long, default_value = "0")]
    pub min_chars: usize,

    #[arg(long, value_delimiter = ',', default_value = "json")]
    pub output_formats: Vec<String>,

    /// Also write the raw extracted text next to the report
    #[arg(long)]
    pub save_extracted_text: bool,

    /// Bundle all outputs into this zip file
    #[arg(long)]
    pub zip: Option<String>,

    /// Remote classifier endpoint; the built-in heuristic is used otherwise
    #[arg(long)]
    pub classifier_endpoint: Option<String>,

    #[arg(long, default_value = "30")]
    pub classifier_timeout: u64,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn document_path(&self) -> &str {
        &self.document
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn vocabulary_path(&self) -> Option<&str> {
        self.vocabulary.as_deref()
    }

    fn vocabulary_column(&self) -> &str {
        &self.vocabulary_column
    }

    fn inline_terms(&self) -> &[String] {
        &self.terms
    }

    fn blacklist(&self) -> &[String] {
        &self.blacklist
    }

    fn min_words(&self) -> usize {
        self.min_words
    }

    fn min_chars(&self) -> usize {
        self.min_chars
    }

    fn output_formats(&self) -> &[String] {
        &self.output_formats
    }

    fn save_extracted_text(&self) -> bool {
        self.save_extracted_text
    }

    fn compression_filename(&self) -> Option<&str> {
        self.zip.as_deref()
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("document", &self.document)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_positive_number("min_words", self.min_words, 1)?;
        validation::validate_output_formats("output_formats", &self.output_formats)?;

        if let Some(vocabulary) = &self.vocabulary {
            validation::validate_file_extension("vocabulary", vocabulary, &["csv", "tsv"])?;
        }
        if let Some(zip) = &self.zip {
            validation::validate_file_extension("zip", zip, &["zip"])?;
        }
        if let Some(endpoint) = &self.classifier_endpoint {
            validation::validate_url("classifier_endpoint", endpoint)?;
            validation::validate_positive_number("classifier_timeout", self.classifier_timeout as usize, 1)?;
        }

        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let config = CliConfig::try_parse_from(["clause-etl", "--document", "policy.pdf"]).unwrap();

        assert_eq!(config.output_path, "./output");
        assert_eq!(config.min_words, 5);
        assert_eq!(config.min_chars, 0);
        assert_eq!(config.output_formats, vec!["json"]);
        assert_eq!(config.blacklist.len(), DEFAULT_BLACKLIST.len());
        assert!(config.blacklist.contains(&"the clause is classified as".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_lists_and_validation() {
        let config = CliConfig::try_parse_from([
            "clause-etl",
            "--document",
            "policy.docx",
            "--terms",
            "coverage,benefit",
            "--output-formats",
            "json,csv",
            "--vocabulary",
            "keywords.xlsx",
        ])
        .unwrap();

        assert_eq!(config.terms, vec!["coverage", "benefit"]);
        assert_eq!(config.output_formats, vec!["json", "csv"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cli_rejects_bad_endpoint() {
        let config = CliConfig::try_parse_from([
            "clause-etl",
            "--document",
            "policy.txt",
            "--classifier-endpoint",
            "not a url",
        ])
        .unwrap();
        assert!(config.validate().is_err());
    }
}
