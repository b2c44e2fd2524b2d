use once_cell::sync::Lazy;
use regex::Regex;

/// Abbreviations whose internal periods must not end a sentence
const COMMON_ABBREVIATIONS: &[&str] = &[
    "Mr.", "Mrs.", "Ms.", "Dr.", "Prof.", "Gov.", "Sen.", "Rep.", "Maj.", "Col.", "Gen.",
    "Jr.", "Sr.", "St.",
    "Jan.", "Feb.", "Mar.", "Apr.", "Jun.", "Jul.", "Aug.", "Sep.", "Sept.", "Oct.", "Nov.",
    "Dec.",
    "a.m.", "p.m.",
    "U.S.", "No.", "vs.", "etc.", "e.g.", "i.e.",
];

/// Private-use placeholder substituted for protected periods during the scan
const PERIOD_SENTINEL: char = '\u{E000}';

static ABBREVIATION_PATTERNS: Lazy<Vec<(Regex, String)>> = Lazy::new(|| {
    COMMON_ABBREVIATIONS
        .iter()
        .map(|abbr| {
            let pattern = format!(r"\b{}", regex::escape(abbr));
            let replacement = abbr.replace('.', &PERIOD_SENTINEL.to_string());
            (Regex::new(&pattern).unwrap(), replacement)
        })
        .collect()
});

static SPACED_EM_DASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+\u{2014}\s+").unwrap());

/// Split text into sentences, keeping common abbreviations intact.
///
/// A boundary is any sentence-ending punctuation mark, optionally followed by
/// closing quotes/brackets, that is followed by whitespace. Candidates are
/// trimmed and empty ones discarded. Same input always yields the same
/// output; empty input yields an empty sequence.
pub fn split_sentences(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return vec![];
    }

    let mut protected = text.to_string();
    for (pattern, replacement) in ABBREVIATION_PATTERNS.iter() {
        protected = pattern
            .replace_all(&protected, replacement.as_str())
            .into_owned();
    }
    let normalized = protected.replace('\u{2026}', "...");
    let normalized = SPACED_EM_DASH
        .replace_all(&normalized, " \u{2014} ")
        .into_owned();

    let chars: Vec<char> = normalized.chars().collect();
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        current.push(c);

        if matches!(c, '.' | '!' | '?') {
            let mut j = i + 1;
            while j < chars.len() && matches!(chars[j], '"' | '\'' | ')' | ']' | '}') {
                current.push(chars[j]);
                j += 1;
            }
            if j < chars.len() && chars[j].is_whitespace() {
                flush(&mut sentences, &mut current);
                while j < chars.len() && chars[j].is_whitespace() {
                    j += 1;
                }
            }
            i = j;
            continue;
        }

        i += 1;
    }

    flush(&mut sentences, &mut current);
    sentences
}

fn flush(sentences: &mut Vec<String>, current: &mut String) {
    let restored: String = current
        .chars()
        .map(|c| if c == PERIOD_SENTINEL { '.' } else { c })
        .collect();
    let trimmed = restored.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   \n  ").is_empty());
    }

    #[test]
    fn test_single_sentence_identity() {
        let input = "The council approved the budget on Tuesday.";
        let sentences = split_sentences(input);
        assert_eq!(sentences, vec![input]);

        // Surrounding whitespace is trimmed, nothing else changes.
        let padded = format!("  {}  ", input);
        assert_eq!(split_sentences(&padded), vec![input]);
    }

    #[test]
    fn test_abbreviations_do_not_split() {
        let sentences = split_sentences("Dr. Smith met Sen. Jones.");
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0], "Dr. Smith met Sen. Jones.");
    }

    #[test]
    fn test_multiple_sentences() {
        let sentences = split_sentences("First point. Second point! A question? Done.");
        assert_eq!(
            sentences,
            vec!["First point.", "Second point!", "A question?", "Done."]
        );
    }

    #[test]
    fn test_closing_quote_stays_with_sentence() {
        let sentences = split_sentences(r#"He said "Stop." Then he left."#);
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0], r#"He said "Stop.""#);
        assert_eq!(sentences[1], "Then he left.");
    }

    #[test]
    fn test_us_and_times_survive() {
        let sentences =
            split_sentences("The U.S. office opens at 9 a.m. on Jan. 5. Lines form early.");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0], "The U.S. office opens at 9 a.m. on Jan. 5.");
    }

    #[test]
    fn test_newline_boundary() {
        let sentences = split_sentences("One sentence.\nAnother sentence.");
        assert_eq!(sentences.len(), 2);
    }

    #[test]
    fn test_ellipsis_normalized() {
        let sentences = split_sentences("It went on\u{2026} Then it stopped.");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0], "It went on...");
    }
}
