use serde::{Deserialize, Serialize};

/// Counts of external review ratings for one claim
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatingBuckets {
    #[serde(default)]
    pub support: u32,
    #[serde(default)]
    pub mixed: u32,
    #[serde(default)]
    pub dispute: u32,
    #[serde(default)]
    pub clarification: u32,
}

/// Aggregate signals from the fact-verification collaborator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewSignals {
    #[serde(default)]
    pub has_reviews: bool,
    #[serde(default)]
    pub ratings: RatingBuckets,
}

/// Pre-fetched verification result for one claim string.
///
/// The core never fetches these itself; a host that runs external
/// verification passes them in alongside the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationPayload {
    /// The claim sentence that was checked
    pub query: String,
    #[serde(default)]
    pub signals: ReviewSignals,
    /// Raw review entries, passed through for the caller's benefit
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
}

impl VerificationPayload {
    /// Dispute outweighs support and at least one review disputes the claim
    pub fn is_disputed(&self) -> bool {
        let b = &self.signals.ratings;
        self.signals.has_reviews && b.dispute > b.support && b.dispute >= 1
    }
}
