use regex::Regex;

/// Whole-word matcher for flagged terms, tolerant of internal space/hyphen
/// variation: "mega-lizard" also matches "mega lizard" and vice versa.
#[derive(Debug)]
pub struct TermMatcher {
    patterns: Vec<(String, Regex)>,
}

impl TermMatcher {
    pub fn new(terms: &[String]) -> Self {
        let patterns = terms
            .iter()
            .filter_map(|term| term_regex(term).map(|re| (term.clone(), re)))
            .collect();
        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Does any flagged term occur in the sentence as a whole word?
    pub fn matches(&self, sentence: &str) -> bool {
        self.patterns.iter().any(|(_, re)| re.is_match(sentence))
    }

    /// Flagged terms that occur in the sentence, in matcher order
    pub fn matched_terms(&self, sentence: &str) -> Vec<&str> {
        self.patterns
            .iter()
            .filter(|(_, re)| re.is_match(sentence))
            .map(|(term, _)| term.as_str())
            .collect()
    }

    /// Remove every flagged-term occurrence and collapse the remaining
    /// whitespace to single spaces.
    pub fn redact(&self, sentence: &str) -> String {
        let mut redacted = sentence.to_string();
        for (_, re) in &self.patterns {
            redacted = re.replace_all(&redacted, "").into_owned();
        }
        redacted.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Build the whole-word pattern for one term. Edge punctuation is trimmed so
/// a term quoted with trailing punctuation still anchors on word boundaries;
/// terms with no word characters are skipped - an empty pattern would match
/// everywhere.
fn term_regex(term: &str) -> Option<Regex> {
    let parts: Vec<String> = term
        .split([' ', '-'])
        .map(|p| p.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|p| !p.is_empty())
        .map(regex::escape)
        .collect();
    if parts.is_empty() {
        return None;
    }
    let body = parts.join(r"[\s\-]+");
    Regex::new(&format!(r"(?i)\b{}\b", body)).ok()
}
