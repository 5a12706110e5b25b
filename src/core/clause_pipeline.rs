use crate::core::dedup::dedupe;
use crate::core::filter::{Blacklist, KeywordFilter, DEFAULT_MIN_WORDS};
use crate::core::segment::segment;
use crate::core::vocabulary::{load_vocabulary, Vocabulary};
use crate::domain::model::PipelineStats;
use crate::domain::ports::ConfigProvider;
use std::path::Path;
use std::sync::Arc;

pub const DEFAULT_BLACKLIST: [&str; 4] = [
    "the clause is classified as",
    "this is a demo explanation for the clause",
    "all rights reserved",
    "this page is intentionally left blank",
];

/// Reduces raw extracted text to an ordered, deduplicated clause list.
///
/// Stages run in a fixed order: segment, minimum characters, keyword filter
/// (blacklist, minimum words, vocabulary match), dedupe. The vocabulary is
/// shared read-only, so clones of one pipeline can run on several threads.
#[derive(Debug, Clone)]
pub struct ClausePipeline {
    vocabulary: Arc<Vocabulary>,
    blacklist: Blacklist,
    filter: KeywordFilter,
    min_words: usize,
    min_chars: usize,
}

impl ClausePipeline {
    pub fn new(vocabulary: Arc<Vocabulary>, blacklist: Blacklist) -> Self {
        Self::with_thresholds(vocabulary, blacklist, DEFAULT_MIN_WORDS, 0)
    }

    /// `min_chars` of 0 turns the character stage off.
    pub fn with_thresholds(
        vocabulary: Arc<Vocabulary>,
        blacklist: Blacklist,
        min_words: usize,
        min_chars: usize,
    ) -> Self {
        let filter = KeywordFilter::new(&vocabulary, blacklist.clone(), min_words);
        Self {
            vocabulary,
            blacklist,
            filter,
            min_words,
            min_chars,
        }
    }

    /// Builds the pipeline from configuration. The vocabulary file is read
    /// here once; inline terms from the configuration are merged in.
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        let mut vocabulary = match config.vocabulary_path() {
            Some(path) => load_vocabulary(path, config.vocabulary_column()),
            None => {
                tracing::warn!("⚠️ No vocabulary source configured");
                Vocabulary::new()
            }
        };
        vocabulary.extend(config.inline_terms());

        if vocabulary.is_empty() {
            tracing::warn!("⚠️ Vocabulary is empty, every candidate will be rejected");
        }

        Self::with_thresholds(
            Arc::new(vocabulary),
            Blacklist::new(config.blacklist()),
            config.min_words(),
            config.min_chars(),
        )
    }

    pub fn vocabulary(&self) -> &Arc<Vocabulary> {
        &self.vocabulary
    }

    pub fn blacklist(&self) -> &Blacklist {
        &self.blacklist
    }

    pub fn min_words(&self) -> usize {
        self.min_words
    }

    pub fn min_chars(&self) -> usize {
        self.min_chars
    }

    /// Same thresholds and blacklist over another vocabulary.
    pub fn with_vocabulary(&self, vocabulary: Arc<Vocabulary>) -> Self {
        Self::with_thresholds(
            vocabulary,
            self.blacklist.clone(),
            self.min_words,
            self.min_chars,
        )
    }

    /// Re-reads the vocabulary source. Runs already holding the previous
    /// `Arc` keep using it.
    pub fn reload_vocabulary<P: AsRef<Path>>(&mut self, path: P, column: &str) {
        *self = self.with_vocabulary(Arc::new(load_vocabulary(path, column)));
    }

    pub fn extract_clauses(&self, raw_text: &str) -> Vec<String> {
        self.run(raw_text).0
    }

    pub fn run(&self, raw_text: &str) -> (Vec<String>, PipelineStats) {
        let candidates = segment(raw_text);
        let mut stats = PipelineStats {
            candidates: candidates.len(),
            ..PipelineStats::default()
        };

        let sized: Vec<String> = candidates
            .into_iter()
            .filter(|candidate| candidate.chars().count() >= self.min_chars)
            .collect();
        stats.after_min_chars = sized.len();

        let kept: Vec<String> = sized
            .into_iter()
            .filter(|candidate| self.filter.keep(candidate))
            .map(|candidate| candidate.trim().to_string())
            .collect();
        stats.kept = kept.len();

        let clauses = dedupe(kept);
        stats.unique = clauses.len();

        tracing::debug!(
            "Clause pipeline: {} candidates, {} after min_chars, {} kept, {} unique",
            stats.candidates,
            stats.after_min_chars,
            stats.kept,
            stats.unique
        );

        (clauses, stats)
    }
}
