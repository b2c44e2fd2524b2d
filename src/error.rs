use thiserror::Error;

/// Failure modes of the generative collaborator.
///
/// Both variants are absorbed inside the pipeline: an invocation failure is
/// replaced by a blocked-output fallback, a malformed payload additionally
/// raises a human-review recommendation. Neither crosses `run_pipeline`.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The call itself failed (network, provider error, non-2xx status).
    #[error("collaborator call failed: {0}")]
    Invocation(String),

    /// The call succeeded but the payload is not the expected structured shape.
    #[error("malformed collaborator output: {0}")]
    Malformed(String),
}

/// Failure modes of the ruleset source.
#[derive(Debug, Error)]
pub enum RulesetError {
    #[error("failed to read ruleset at {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ruleset at {path} is not valid JSON: {source}")]
    Unparseable {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
