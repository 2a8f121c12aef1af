use super::signals::contains_any;

/// Keywords marking analytical work.
const ANALYTICAL_KEYWORDS: [&str; 7] = [
    "analyze",
    "analyse",
    "compare",
    "evaluate",
    "explain",
    "justify",
    "synthesize",
];

/// Keywords marking causal or conditional framing.
const CAUSAL_KEYWORDS: [&str; 5] = ["why", "how", "what if", "consider", "implication"];

/// Upper bound of the complexity scale.
const MAX_COMPLEXITY: u8 = 10;

/// Scores task complexity on a 0–10 scale.
///
/// Word count sets the base (≤50 words → 1, ≤100 → 2, else 3); an
/// analytical keyword adds 2, a causal/conditional keyword adds 2 more.
/// Expects lowercased input.
#[must_use]
pub fn assess(input: &str) -> u8 {
    let word_count = input.split_whitespace().count();

    let mut score: u8 = if word_count <= 50 {
        1
    } else if word_count <= 100 {
        2
    } else {
        3
    };

    if contains_any(input, &ANALYTICAL_KEYWORDS) {
        score += 2;
    }

    if contains_any(input, &CAUSAL_KEYWORDS) {
        score += 2;
    }

    score.min(MAX_COMPLEXITY)
}
