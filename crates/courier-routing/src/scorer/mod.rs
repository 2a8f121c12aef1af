//! Candidate scoring and deterministic provider selection.
//!
//! Selection is a pure function of `(profile, registry, config)`: identical
//! inputs always produce the identical service id, which is what makes
//! routing reproducible and cacheable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use courier_core::TaskProfile;

use crate::error::{Result, RouteError};
use crate::registry::Registry;

/// Score awarded for membership in a relevant category.
const CATEGORY_MATCH_SCORE: i32 = 5;
/// Score awarded when the service supports a non-default profile language.
const LANGUAGE_SUPPORT_SCORE: i32 = 3;
/// Score awarded to reasoning-capable services for complex tasks.
const REASONING_BONUS: i32 = 2;
/// Complexity above which tasks escalate to reasoning providers.
const ESCALATION_COMPLEXITY: u8 = 7;
/// Capability tag checked for the reasoning bonus.
const REASONING_CAPABILITY: &str = "reasoning";

/// Closed set of categories the scorer routes into.
///
/// Adding a category is a compile-time-checked change here, not a runtime
/// map mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    /// Image and multimodal understanding.
    Multimodal,
    /// Code generation, completion, and debugging.
    Coding,
    /// Complex reasoning, problem solving, and planning.
    Reasoning,
    /// Multilingual text processing and translation.
    Multilingual,
}

impl TaskCategory {
    /// Catalog name for this category.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Multimodal => "multimodal",
            Self::Coding => "coding",
            Self::Reasoning => "reasoning",
            Self::Multilingual => "multilingual",
        }
    }
}

/// One provider under consideration for a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredCandidate {
    /// Candidate service id.
    pub service_id: String,
    /// Additive integer score.
    pub score: i32,
    /// Position of the service in the catalog; the tie-break key.
    pub declaration_index: usize,
}

/// The scorer's explainable result.
#[derive(Debug, Clone, Serialize)]
pub struct SelectionDecision {
    /// Selected service id.
    pub service_id: String,
    /// Score of the selected candidate; 0 for overrides and defaults.
    pub score: i32,
    /// Why this service was selected.
    pub reasoning: String,
}

/// Scores registry candidates against a task profile.
#[derive(Debug, Clone)]
pub struct CandidateScorer {
    /// Service used when no category is relevant or no candidate exists.
    default_service: String,
    /// Language tag that does not trigger multilingual routing.
    default_language: String,
}

impl CandidateScorer {
    /// Creates a scorer with the given defaults.
    #[must_use]
    pub fn new(default_service: impl Into<String>, default_language: impl Into<String>) -> Self {
        Self {
            default_service: default_service.into(),
            default_language: default_language.into(),
        }
    }

    /// The configured default service id.
    #[must_use]
    pub fn default_service(&self) -> &str {
        &self.default_service
    }

    /// Determines which categories are relevant for a profile.
    #[must_use]
    pub fn relevant_categories(&self, profile: &TaskProfile) -> Vec<TaskCategory> {
        let mut categories = Vec::new();

        if profile.requires_vision {
            categories.push(TaskCategory::Multimodal);
        }
        if profile.requires_code {
            categories.push(TaskCategory::Coding);
        }
        if profile.requires_reasoning || profile.complexity > ESCALATION_COMPLEXITY {
            categories.push(TaskCategory::Reasoning);
        }
        if profile.language != self.default_language {
            categories.push(TaskCategory::Multilingual);
        }

        categories
    }

    /// Ranks all candidates from the relevant categories.
    ///
    /// Additive score: +5 per relevant category the service belongs to,
    /// +3 for matching a non-default language, +2 for reasoning capability
    /// on complex tasks. Ranking is a stable sort on the composite key
    /// `(score desc, declaration index asc)`; first-declared wins ties.
    #[must_use]
    pub fn rank(&self, profile: &TaskProfile, registry: &Registry) -> Vec<ScoredCandidate> {
        let mut base_scores: BTreeMap<usize, i32> = BTreeMap::new();

        for category in self.relevant_categories(profile) {
            for &index in registry.category_member_indexes(category.name()) {
                *base_scores.entry(index).or_insert(0) += CATEGORY_MATCH_SCORE;
            }
        }

        let foreign_language = profile.language != self.default_language;
        let complex = profile.complexity > ESCALATION_COMPLEXITY;
        let services = registry.all_services();

        let mut candidates: Vec<ScoredCandidate> = base_scores
            .into_iter()
            .map(|(declaration_index, mut score)| {
                let service = &services[declaration_index];

                if foreign_language && service.languages.contains(&profile.language) {
                    score += LANGUAGE_SUPPORT_SCORE;
                }

                if complex
                    && service
                        .capabilities
                        .iter()
                        .any(|capability| capability == REASONING_CAPABILITY)
                {
                    score += REASONING_BONUS;
                }

                ScoredCandidate {
                    service_id: service.id.clone(),
                    score,
                    declaration_index,
                }
            })
            .collect();

        candidates.sort_by(|left, right| {
            right
                .score
                .cmp(&left.score)
                .then_with(|| left.declaration_index.cmp(&right.declaration_index))
        });

        candidates
    }

    /// Selects the provider for a profile.
    ///
    /// An explicit requirement naming a registered service always wins.
    /// Otherwise the top-ranked candidate is returned, falling back to the
    /// configured default service when no category matched.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::UnknownService`] when the explicit requirement
    /// names a service absent from the registry; no fallback is attempted
    /// since the intent was explicit.
    pub fn select(
        &self,
        profile: &TaskProfile,
        registry: &Registry,
        explicit: Option<&str>,
    ) -> Result<SelectionDecision> {
        if let Some(required) = explicit {
            if registry.has_service(required) {
                return Ok(SelectionDecision {
                    service_id: required.to_owned(),
                    score: 0,
                    reasoning: "explicitly required by caller".to_owned(),
                });
            }
            return Err(RouteError::UnknownService(required.to_owned()));
        }

        let relevant = self.relevant_categories(profile);
        let ranked = self.rank(profile, registry);

        ranked.first().map_or_else(
            || {
                Ok(SelectionDecision {
                    service_id: self.default_service.clone(),
                    score: 0,
                    reasoning: "no relevant category matched; using default service".to_owned(),
                })
            },
            |top| {
                let names: Vec<&str> = relevant
                    .iter()
                    .map(|category| category.name())
                    .collect();
                Ok(SelectionDecision {
                    service_id: top.service_id.clone(),
                    score: top.score,
                    reasoning: format!(
                        "scored {} across categories [{}]",
                        top.score,
                        names.join(", ")
                    ),
                })
            },
        )
    }
}
