use courier_core::TaskIntent;

/// Keywords suggesting the task involves source code.
const CODE_KEYWORDS: [&str; 8] = [
    "function", "class", "def ", "fn ", "struct", "import", "require", "return",
];

/// Punctuation sequences that read as code rather than prose.
const CODE_TOKENS: [&str; 8] = ["{", "}", ";", "=>", "==", "=", "//", "/*"];

/// Reasoning and causal vocabulary.
const REASONING_KEYWORDS: [&str; 20] = [
    "analyze",
    "analyse",
    "compare",
    "contrast",
    "evaluate",
    "justify",
    "synthesize",
    "reason",
    "logic",
    "think",
    "consider",
    "implication",
    "conclusion",
    "therefore",
    "thus",
    "hence",
    "because",
    "since",
    "consequently",
    "accordingly",
];

/// Information-seeking vocabulary.
const INFORMATION_KEYWORDS: [&str; 9] = [
    "how", "why", "what", "when", "where", "who", "explain", "describe", "tell me about",
];

/// Generation vocabulary.
const GENERATION_KEYWORDS: [&str; 8] = [
    "create", "write", "generate", "make", "build", "code", "compose", "draft",
];

/// Debugging vocabulary.
const DEBUGGING_KEYWORDS: [&str; 6] = ["fix", "debug", "error", "problem", "issue", "not working"];

/// Translation vocabulary.
const TRANSLATION_KEYWORDS: [&str; 3] = ["translate", "translation", "localize"];

/// Whether any of the given needles appears in the input.
#[must_use]
pub fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}

/// Whether the input looks like a coding task. Expects lowercased input.
#[must_use]
pub fn contains_code(input: &str) -> bool {
    contains_any(input, &CODE_KEYWORDS) || contains_any(input, &CODE_TOKENS)
}

/// Whether the input calls for multi-step reasoning. Expects lowercased
/// input.
#[must_use]
pub fn requires_reasoning(input: &str) -> bool {
    contains_any(input, &REASONING_KEYWORDS)
}

/// Classifies the coarse intent of the input. First match wins; ordering
/// follows the precedence information > generation > debugging >
/// translation. Expects lowercased input.
#[must_use]
pub fn classify_intent(input: &str) -> TaskIntent {
    if contains_any(input, &INFORMATION_KEYWORDS) {
        TaskIntent::Information
    } else if contains_any(input, &GENERATION_KEYWORDS) {
        TaskIntent::Generation
    } else if contains_any(input, &DEBUGGING_KEYWORDS) {
        TaskIntent::Debugging
    } else if contains_any(input, &TRANSLATION_KEYWORDS) {
        TaskIntent::Translation
    } else {
        TaskIntent::General
    }
}

/// Rough token estimate: one token per four characters, rounded up.
#[must_use]
pub fn estimate_tokens(input: &str) -> usize {
    input.len().div_ceil(4)
}

/// Detects the dominant script of the input and maps it to a language tag.
///
/// Context overrides win before this is consulted; this is a last-resort
/// heuristic, not a language identifier.
#[must_use]
pub fn detect_language(input: &str, default: &str) -> String {
    let has = |range: fn(char) -> bool| input.chars().any(range);

    if has(|letter| matches!(letter, '\u{3040}'..='\u{30FF}')) {
        "ja".to_owned()
    } else if has(|letter| matches!(letter, '\u{AC00}'..='\u{D7AF}')) {
        "ko".to_owned()
    } else if has(|letter| matches!(letter, '\u{4E00}'..='\u{9FFF}')) {
        "zh".to_owned()
    } else if has(|letter| matches!(letter, '\u{0400}'..='\u{04FF}')) {
        "ru".to_owned()
    } else if has(|letter| matches!(letter, '\u{0600}'..='\u{06FF}')) {
        "ar".to_owned()
    } else {
        default.to_owned()
    }
}
