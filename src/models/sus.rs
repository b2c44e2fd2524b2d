use serde::{Deserialize, Serialize};

/// Report schema version expected from the sanity-check agent.
pub const SUS_VERSION: &str = "sus/v1";

/// Category of a suspicion flag - restricted enum to reduce hallucination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlagCategory {
    /// Entity or event that appears to be fictional
    Fictionality,
    /// Claim that misstates who has authority to act
    Jurisdiction,
    /// Numbers or magnitudes that are physically implausible
    ImpossibleScale,
    /// Text that does not parse as a factual claim
    Nonsense,
    #[default]
    Other,
}

/// Suspicion level of a flag. Ordered: gating only acts on Medium and above.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagLevel {
    #[default]
    None,
    Low,
    Medium,
    High,
}

/// One suspicious term flagged by the sanity-check agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flag {
    /// Term as it appears in the text
    pub term: String,
    #[serde(default)]
    pub category: FlagCategory,
    #[serde(default)]
    pub level: FlagLevel,
    #[serde(default)]
    pub reason: String,
}

/// Output of the secondary sanity-check call (stage >= 6)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SusReport {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub flags: Vec<Flag>,
    /// Terms the agent wants excluded outright, regardless of flag level
    #[serde(default)]
    pub block_terms: Vec<String>,
    #[serde(default)]
    pub rationale: Vec<String>,
}

impl SusReport {
    /// Terms that the stage-7 gate must act on: flags at level >= medium
    /// plus every block term. Order preserved, duplicates removed.
    pub fn gated_terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        for flag in &self.flags {
            if flag.level >= FlagLevel::Medium && !flag.term.trim().is_empty() {
                terms.push(flag.term.clone());
            }
        }
        for term in &self.block_terms {
            if !term.trim().is_empty() {
                terms.push(term.clone());
            }
        }
        let mut seen = std::collections::HashSet::new();
        terms.retain(|t| seen.insert(t.to_lowercase()));
        terms
    }

    /// Fallback report used when the sanity call fails; gates nothing.
    pub fn unavailable(detail: &str) -> Self {
        Self {
            version: SUS_VERSION.to_string(),
            flags: vec![],
            block_terms: vec![],
            rationale: vec![format!("fallback: sanity check unavailable - {detail}")],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sus_report() {
        let json = r#"{
            "version": "sus/v1",
            "flags": [
                {"term": "Godzilla", "category": "fictionality", "level": "high", "reason": "fictional monster"},
                {"term": "city hall", "category": "jurisdiction", "level": "low", "reason": "minor doubt"}
            ],
            "block_terms": ["40-story lizard"],
            "rationale": ["One fictional entity asserted as fact."]
        }"#;

        let report: SusReport = serde_json::from_str(json).unwrap();

        assert_eq!(report.flags.len(), 2);
        assert_eq!(report.flags[0].category, FlagCategory::Fictionality);
        assert_eq!(report.flags[0].level, FlagLevel::High);
    }

    #[test]
    fn test_gated_terms_filters_low_levels() {
        let report = SusReport {
            version: SUS_VERSION.to_string(),
            flags: vec![
                Flag {
                    term: "Godzilla".to_string(),
                    category: FlagCategory::Fictionality,
                    level: FlagLevel::High,
                    reason: String::new(),
                },
                Flag {
                    term: "city hall".to_string(),
                    category: FlagCategory::Jurisdiction,
                    level: FlagLevel::Low,
                    reason: String::new(),
                },
            ],
            block_terms: vec!["mega-lizard".to_string(), "Godzilla".to_string()],
            rationale: vec![],
        };

        let terms = report.gated_terms();
        assert_eq!(terms, vec!["Godzilla", "mega-lizard"]);
    }

    #[test]
    fn test_flag_level_ordering() {
        assert!(FlagLevel::Medium >= FlagLevel::Medium);
        assert!(FlagLevel::High > FlagLevel::Medium);
        assert!(FlagLevel::Low < FlagLevel::Medium);
    }

    #[test]
    fn test_kebab_case_category() {
        let flag: Flag =
            serde_json::from_str(r#"{"term": "x", "category": "impossible-scale"}"#).unwrap();
        assert_eq!(flag.category, FlagCategory::ImpossibleScale);
        assert_eq!(flag.level, FlagLevel::None);
    }
}
