//! Task analysis: deriving a structured profile from an inbound task.
//!
//! The analyzer is a pure function of its inputs. Its lexical heuristics are
//! intentionally simple and replaceable; the contract is the shape of the
//! produced [`TaskProfile`], not the exact lexicon.

/// Complexity estimation for tasks.
pub mod complexity;
/// Lexical signals: code/reasoning detection, intent, language, tokens.
pub mod signals;

use courier_core::{InputKind, RequestContext, TaskProfile};

/// Derives a [`TaskProfile`] from one inbound task.
#[derive(Debug, Clone)]
pub struct TaskAnalyzer {
    /// Language tag assumed when detection finds nothing else.
    default_language: String,
}

impl TaskAnalyzer {
    /// Creates an analyzer with the given default language.
    #[must_use]
    pub fn new(default_language: impl Into<String>) -> Self {
        Self {
            default_language: default_language.into(),
        }
    }

    /// Analyzes one task. Pure: identical inputs yield identical profiles.
    #[must_use]
    pub fn analyze(
        &self,
        input: &str,
        input_type: InputKind,
        context: &RequestContext,
    ) -> TaskProfile {
        let lowered = input.to_lowercase();

        let language = context
            .language
            .clone()
            .filter(|tag| !tag.is_empty())
            .unwrap_or_else(|| signals::detect_language(input, &self.default_language));

        TaskProfile {
            language,
            complexity: complexity::assess(&lowered),
            intent: signals::classify_intent(&lowered),
            requires_vision: input_type == InputKind::Image,
            requires_code: signals::contains_code(&lowered),
            requires_reasoning: signals::requires_reasoning(&lowered),
            estimated_tokens: signals::estimate_tokens(input),
        }
    }
}

impl Default for TaskAnalyzer {
    fn default() -> Self {
        Self::new("en")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::TaskIntent;

    #[test]
    fn test_coding_scenario() {
        let analyzer = TaskAnalyzer::default();
        let profile = analyzer.analyze(
            "Write a function to sort a list",
            InputKind::Text,
            &RequestContext::default(),
        );

        assert!(profile.requires_code);
        assert!(!profile.requires_vision);
        assert!(!profile.requires_reasoning);
        assert_eq!(profile.complexity, 1);
        assert_eq!(profile.intent, TaskIntent::Generation);
    }

    #[test]
    fn test_reasoning_scenario() {
        let analyzer = TaskAnalyzer::default();
        let profile = analyzer.analyze(
            "Why does consequently imply causation, therefore explain the implications",
            InputKind::Text,
            &RequestContext::default(),
        );

        assert!(profile.requires_reasoning);
        assert!(!profile.requires_code);
        // Base 1 (short input) + 2 analytical + 2 causal.
        assert_eq!(profile.complexity, 5);
    }

    #[test]
    fn test_image_input_requires_vision() {
        let analyzer = TaskAnalyzer::default();
        let profile = analyzer.analyze(
            "Describe this photo",
            InputKind::Image,
            &RequestContext::default(),
        );
        assert!(profile.requires_vision);
    }

    #[test]
    fn test_context_language_override_wins() {
        let analyzer = TaskAnalyzer::default();
        let context = RequestContext::new().with_language("fr");
        let profile = analyzer.analyze("Bonjour tout le monde", InputKind::Text, &context);
        assert_eq!(profile.language, "fr");
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let analyzer = TaskAnalyzer::default();
        let context = RequestContext::default();
        let first = analyzer.analyze("Compare these approaches", InputKind::Text, &context);
        let second = analyzer.analyze("Compare these approaches", InputKind::Text, &context);
        assert_eq!(first, second);
    }
}
