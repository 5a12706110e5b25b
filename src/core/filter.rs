//! Blacklist and keyword filters applied to each candidate.
//!
//! Both filters decide on the normalized form of a candidate only; the
//! candidate text itself is never rewritten here.

use crate::core::normalize::{normalize, word_count};
use crate::core::vocabulary::Vocabulary;
use std::collections::HashSet;

pub const DEFAULT_MIN_WORDS: usize = 5;

/// Boilerplate phrases that exclude a candidate regardless of keywords.
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    phrases: Vec<String>,
}

impl Blacklist {
    /// Phrases are normalized up front; phrases that normalize to nothing
    /// are ignored so they cannot match every candidate.
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = phrases
            .into_iter()
            .map(|phrase| normalize(phrase.as_ref()))
            .filter(|phrase| !phrase.is_empty())
            .collect();
        normalized.sort();
        normalized.dedup();

        Self { phrases: normalized }
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    pub fn is_blacklisted(&self, candidate: &str) -> bool {
        self.matches_normalized(&normalize(candidate))
    }

    fn matches_normalized(&self, normalized: &str) -> bool {
        self.phrases
            .iter()
            .any(|phrase| normalized.contains(phrase.as_str()))
    }
}

pub fn is_blacklisted(candidate: &str, blacklist: &Blacklist) -> bool {
    blacklist.is_blacklisted(candidate)
}

/// Whole-word matcher over the normalized vocabulary.
///
/// Single-word terms are looked up per token; multi-word terms match a run
/// of consecutive tokens, so `"rate"` never matches inside `"separate"`.
#[derive(Debug, Clone, Default)]
pub struct KeywordMatcher {
    words: HashSet<String>,
    phrases: Vec<Vec<String>>,
}

impl KeywordMatcher {
    pub fn new(vocabulary: &Vocabulary) -> Self {
        let mut words = HashSet::new();
        let mut phrases = Vec::new();

        for term in vocabulary.iter() {
            let tokens: Vec<String> = normalize(term)
                .split_whitespace()
                .map(str::to_string)
                .collect();

            match tokens.len() {
                0 => {}
                1 => {
                    words.extend(tokens);
                }
                _ => phrases.push(tokens),
            }
        }
        phrases.sort();
        phrases.dedup();

        Self { words, phrases }
    }

    pub fn matches(&self, normalized: &str) -> bool {
        let tokens: Vec<&str> = normalized.split_whitespace().collect();

        if tokens.iter().any(|token| self.words.contains(*token)) {
            return true;
        }

        self.phrases.iter().any(|phrase| {
            tokens
                .windows(phrase.len())
                .any(|window| window.iter().zip(phrase).all(|(token, term)| *token == term.as_str()))
        })
    }
}

/// Keeps candidates that are not blacklisted, have at least `min_words`
/// normalized words, and contain a vocabulary term.
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    matcher: KeywordMatcher,
    blacklist: Blacklist,
    min_words: usize,
}

impl KeywordFilter {
    pub fn new(vocabulary: &Vocabulary, blacklist: Blacklist, min_words: usize) -> Self {
        Self {
            matcher: KeywordMatcher::new(vocabulary),
            blacklist,
            min_words,
        }
    }

    pub fn min_words(&self) -> usize {
        self.min_words
    }

    pub fn keep(&self, candidate: &str) -> bool {
        let normalized = normalize(candidate);

        if self.blacklist.matches_normalized(&normalized) {
            tracing::trace!("blacklisted: {}", candidate);
            return false;
        }

        if word_count(&normalized) < self.min_words {
            return false;
        }

        self.matcher.matches(&normalized)
    }
}

pub fn keep(candidate: &str, vocabulary: &Vocabulary, blacklist: &Blacklist, min_words: usize) -> bool {
    KeywordFilter::new(vocabulary, blacklist.clone(), min_words).keep(candidate)
}
