pub mod client;
pub mod prompts;
pub mod validation;

pub use client::*;
pub use prompts::*;
pub use validation::*;

use serde_json::Value;

use crate::error::CollaboratorError;

/// The generative collaborator consumed by the pipeline.
///
/// Both operations return the raw structured payload; the pipeline treats it
/// as untrusted until it passes validation. Implemented by `AnthropicClient`
/// for production and by deterministic stubs in tests.
#[async_trait::async_trait]
pub trait Collaborator: Send + Sync {
    /// Primary rewrite call
    async fn rewrite(
        &self,
        system_prompt: &str,
        user_payload: &str,
    ) -> Result<Value, CollaboratorError>;

    /// Secondary sanity-check call (issued at stage >= 6)
    async fn sanity_check(
        &self,
        system_prompt: &str,
        user_payload: &str,
    ) -> Result<Value, CollaboratorError>;

    /// Model identifier reported in the result's workshop block
    fn model(&self) -> Option<String> {
        None
    }
}
