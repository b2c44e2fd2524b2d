use once_cell::sync::Lazy;
use regex::Regex;

/// Finite verbs common in news copy: modals, copulas, action and reporting
/// verbs. A sentence without any of these is treated as verbless.
static FINITE_VERB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(will|is|are|was|were|opens?|open|launch(?:es|ed)?|orders?|approv(?:e|es|ed)|votes?|plans?|aims?|uses?|deploys?|announced|said|stated|confirmed|reported)\b",
    )
    .unwrap()
});

/// Vacuous openers that mark a weak lead sentence
static WEAK_OPENER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:the plan\b|there (?:is|are)\b|it (?:is|was)\b)").unwrap());

/// Modal/auxiliary verbs that cannot start a standalone salvaged fragment
const LEADING_MODALS: &[&str] = &[
    "will", "would", "shall", "should", "can", "could", "may", "might", "must", "is", "are",
    "was", "were", "has", "have", "had",
];

/// Abstract noun heads that indicate the redaction removed the real subject
const ABSTRACT_NOUN_HEADS: &[&str] = &["plan", "proposal", "initiative", "program", "project"];

/// Reporting-verb phrases stripped from the front of a salvaged fragment.
/// Longest first so "said that" wins over "said".
const REPORTING_PREFIXES: &[&str] = &[
    "announced that",
    "said that",
    "stated that",
    "confirmed that",
    "reported that",
    "added that",
    "announced",
    "said",
    "stated",
    "confirmed",
    "reported",
    "added",
];

pub fn has_finite_verb(sentence: &str) -> bool {
    FINITE_VERB.is_match(sentence)
}

/// A weak lead is empty, starts with a vacuous opener, or carries no finite
/// verb.
pub fn is_weak_lead(sentence: &str) -> bool {
    let trimmed = sentence.trim();
    trimmed.is_empty() || WEAK_OPENER.is_match(trimmed) || !has_finite_verb(trimmed)
}

/// True when a salvaged fragment starts with a modal/auxiliary verb or a bare
/// abstract-noun phrase - signs that redaction removed the subject and the
/// remainder is a dangling fragment.
pub fn lacks_subject(fragment: &str) -> bool {
    let mut words = fragment.split_whitespace().map(normalize_word);
    let Some(first) = words.next() else {
        return true;
    };
    if LEADING_MODALS.contains(&first.as_str()) {
        return true;
    }
    if matches!(first.as_str(), "the" | "a" | "an") {
        return match words.next() {
            Some(second) => ABSTRACT_NOUN_HEADS.contains(&second.as_str()),
            None => true,
        };
    }
    ABSTRACT_NOUN_HEADS.contains(&first.as_str())
}

/// Strip one leading reporting-verb phrase ("announced that", "said", ...)
pub fn strip_reporting_prefix(fragment: &str) -> &str {
    let trimmed = fragment.trim_start();
    let bytes = trimmed.as_bytes();
    for prefix in REPORTING_PREFIXES {
        let len = prefix.len();
        if bytes.len() >= len
            && bytes[..len].eq_ignore_ascii_case(prefix.as_bytes())
            && (bytes.len() == len || bytes[len] == b' ')
        {
            return trimmed[len..].trim_start();
        }
    }
    trimmed
}

fn normalize_word(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}
