use crate::core::filter::KeywordMatcher;
use crate::core::normalize::normalize;
use crate::core::vocabulary::Vocabulary;
use crate::domain::model::{Prediction, RiskLevel};
use crate::domain::ports::Classifier;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const CATEGORY_EXCLUSIONS: &str = "Exclusions";
pub const CATEGORY_TREATMENT_LIMITATIONS: &str = "Treatment Limitations";
pub const CATEGORY_AUTHORIZATION: &str = "Authorization Requirements";
pub const CATEGORY_NETWORK: &str = "Network Restrictions";

// 以完整詞比對，"exclusive" 不算 exclusion、"unlimited" 不算 limit
const EXCLUSION_CUES: [&str; 10] = [
    "exclude",
    "excluded",
    "excludes",
    "exclusion",
    "exclusions",
    "not covered",
    "not payable",
    "shall not be liable",
    "will not pay",
    "not be admissible",
];
const AUTHORIZATION_CUES: [&str; 11] = [
    "authorization",
    "authorisation",
    "authorized",
    "authorised",
    "preauthorization",
    "preauthorisation",
    "preauthorized",
    "preauthorised",
    "preapproval",
    "priorapproval",
    "prior approval",
];
const NETWORK_CUES: [&str; 7] = [
    "network",
    "nonnetwork",
    "empanelled",
    "empaneled",
    "preferred provider",
    "preferred providers",
    "cashless",
];
const LIMIT_CUES: [&str; 15] = [
    "limit",
    "limits",
    "limited",
    "limitation",
    "limitations",
    "capped",
    "maximum",
    "waiting period",
    "sublimit",
    "sublimits",
    "copay",
    "copayment",
    "deductible",
    "deductibles",
    "proportionate",
];

fn cue_matcher(cues: &[&str]) -> KeywordMatcher {
    KeywordMatcher::new(&Vocabulary::from_terms(cues))
}

/// Rule-based stand-in for the pretrained sequence classifier.
///
/// Deterministic: the same clause always yields the same prediction. Cues
/// are matched on whole normalized tokens, like vocabulary keywords.
#[derive(Debug, Clone)]
pub struct HeuristicClassifier {
    exclusion: KeywordMatcher,
    authorization: KeywordMatcher,
    network: KeywordMatcher,
    limit: KeywordMatcher,
}

impl HeuristicClassifier {
    pub fn new() -> Self {
        Self {
            exclusion: cue_matcher(&EXCLUSION_CUES),
            authorization: cue_matcher(&AUTHORIZATION_CUES),
            network: cue_matcher(&NETWORK_CUES),
            limit: cue_matcher(&LIMIT_CUES),
        }
    }

    pub fn predict(&self, clause: &str) -> Prediction {
        let normalized = normalize(clause);

        let excluded = self.exclusion.matches(&normalized);
        let limited = self.limit.matches(&normalized);

        let category = if excluded {
            CATEGORY_EXCLUSIONS
        } else if self.authorization.matches(&normalized) {
            CATEGORY_AUTHORIZATION
        } else if self.network.matches(&normalized) {
            CATEGORY_NETWORK
        } else {
            CATEGORY_TREATMENT_LIMITATIONS
        };

        let (risk, explanation) = if excluded {
            (
                RiskLevel::High,
                "The clause removes or denies coverage for the described case.",
            )
        } else if limited {
            (
                RiskLevel::Moderate,
                "The clause caps, delays or shares the cost of the benefit.",
            )
        } else {
            (
                RiskLevel::Low,
                "No exclusion or limit wording was found in the clause.",
            )
        };

        Prediction {
            risk,
            category: category.to_string(),
            explanation: explanation.to_string(),
        }
    }
}

impl Default for HeuristicClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Classifier for HeuristicClassifier {
    async fn classify(&self, clauses: &[String]) -> Result<Vec<Prediction>> {
        Ok(clauses.iter().map(|clause| self.predict(clause)).collect())
    }
}

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    clauses: &'a [String],
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Bare(Vec<Prediction>),
    Wrapped { predictions: Vec<Prediction> },
}

/// Sends clauses to a remote model server as `{"clauses": [...]}`.
pub struct HttpClassifier {
    client: Client,
    endpoint: String,
}

impl HttpClassifier {
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, clauses: &[String]) -> Result<Vec<Prediction>> {
        if clauses.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(
            "Sending {} clauses to classifier at {}",
            clauses.len(),
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ClassifyRequest { clauses })
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Classifier response status: {}", status);

        if !status.is_success() {
            return Err(EtlError::ClassifierError {
                message: format!("classifier returned HTTP {}", status),
            });
        }

        let predictions = match response.json::<ClassifyResponse>().await? {
            ClassifyResponse::Bare(predictions) => predictions,
            ClassifyResponse::Wrapped { predictions } => predictions,
        };

        if predictions.len() != clauses.len() {
            return Err(EtlError::ClassifierError {
                message: format!(
                    "expected {} predictions, got {}",
                    clauses.len(),
                    predictions.len()
                ),
            });
        }

        Ok(predictions)
    }
}

/// HTTP classifier when an endpoint is configured, the heuristic otherwise.
pub fn build_classifier(
    endpoint: Option<&str>,
    timeout: Option<Duration>,
) -> Result<Box<dyn Classifier>> {
    match endpoint {
        Some(endpoint) => {
            tracing::info!("🤖 Using remote classifier at {}", endpoint);
            Ok(Box::new(HttpClassifier::new(endpoint, timeout)?))
        }
        None => {
            tracing::info!("🤖 Using built-in heuristic classifier");
            Ok(Box::new(HeuristicClassifier::new()))
        }
    }
}
