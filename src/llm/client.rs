use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CollaboratorError;
use crate::llm::Collaborator;

/// Configuration for the Anthropic API client
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key (from ANTHROPIC_API_KEY env var)
    pub api_key: String,
    /// Model to use (e.g., "claude-sonnet-4-20250514")
    pub model: String,
    /// Temperature (0-1, lower = more deterministic)
    pub temperature: f64,
    /// Maximum tokens in response
    pub max_tokens: u32,
}

impl AnthropicConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .context("ANTHROPIC_API_KEY environment variable not set")?;

        Ok(Self {
            api_key,
            model: "claude-sonnet-4-20250514".to_string(),
            temperature: 0.1,
            max_tokens: 4096,
        })
    }

    /// Create with custom settings
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            temperature: 0.1,
            max_tokens: 4096,
        }
    }
}

/// Anthropic API client. Both pipeline calls force a tool so the response is
/// structured JSON rather than free text.
pub struct AnthropicClient {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Send a message forcing the named tool; returns the tool input verbatim
    async fn send_with_tool(
        &self,
        system: &str,
        user: &str,
        tool: Tool,
    ) -> Result<Value, CollaboratorError> {
        let tool_name = tool.name.clone();
        let request = AnthropicToolRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
            system: Some(system.to_string()),
            messages: vec![Message {
                role: "user".to_string(),
                content: user.to_string(),
            }],
            tools: vec![tool],
            tool_choice: Some(ToolChoice {
                choice_type: "tool".to_string(),
                name: tool_name.clone(),
            }),
        };

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| CollaboratorError::Invocation(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::Invocation(format!(
                "Anthropic API error: {status} - {body}"
            )));
        }

        let response: AnthropicResponse = response.json().await.map_err(|e| {
            CollaboratorError::Invocation(format!("failed to parse API response: {e}"))
        })?;

        for content in &response.content {
            if content.content_type == "tool_use" && content.name.as_deref() == Some(&tool_name) {
                if let Some(input) = &content.input {
                    return Ok(input.clone());
                }
            }
        }

        Err(CollaboratorError::Malformed(format!(
            "no {tool_name} tool_use block in response"
        )))
    }
}

#[async_trait::async_trait]
impl Collaborator for AnthropicClient {
    async fn rewrite(
        &self,
        system_prompt: &str,
        user_payload: &str,
    ) -> Result<Value, CollaboratorError> {
        self.send_with_tool(system_prompt, user_payload, report_tool())
            .await
    }

    async fn sanity_check(
        &self,
        system_prompt: &str,
        user_payload: &str,
    ) -> Result<Value, CollaboratorError> {
        self.send_with_tool(system_prompt, user_payload, sanity_tool())
            .await
    }

    fn model(&self) -> Option<String> {
        Some(self.config.model.clone())
    }
}

/// Tool schema for the rewrite call: the editorial report
fn report_tool() -> Tool {
    Tool {
        name: "submit_report".to_string(),
        description: "Submit the editorial analysis and gated rewrite".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "version": {"type": "string"},
                "analysis": {
                    "type": "object",
                    "properties": {
                        "findings": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "rule_id": {"type": "string"},
                                    "title": {"type": "string"},
                                    "level": {"type": "string", "enum": ["soft", "hard"]},
                                    "severity": {"type": "number", "minimum": 0, "maximum": 1},
                                    "confidence": {"type": "number", "minimum": 0, "maximum": 1},
                                    "evidence_snippet": {
                                        "type": "string",
                                        "description": "Excerpt of at most 40 characters"
                                    },
                                    "cues_matched": {"type": "array", "items": {"type": "string"}},
                                    "guard_hits": {"type": "array", "items": {"type": "string"}}
                                },
                                "required": ["rule_id", "title", "level", "severity"]
                            }
                        },
                        "tone": {
                            "type": "object",
                            "properties": {
                                "polarity": {"type": "string"},
                                "confidence": {"type": "number", "minimum": 0, "maximum": 1}
                            }
                        }
                    },
                    "required": ["findings", "tone"]
                },
                "rewrite": {
                    "type": "object",
                    "properties": {
                        "text": {"type": "string"},
                        "rationale": {"type": "array", "items": {"type": "string"}},
                        "ops": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "rule_id": {"type": "string"},
                                    "before": {"type": "string"},
                                    "after": {"type": "string"}
                                },
                                "required": ["rule_id", "before", "after"]
                            }
                        },
                        "spans": {
                            "type": "object",
                            "properties": {
                                "subjects": {"type": "array", "items": {"type": "string"}},
                                "actions": {"type": "array", "items": {"type": "string"}},
                                "where": {"type": "array", "items": {"type": "string"}},
                                "when": {"type": "array", "items": {"type": "string"}},
                                "context": {"type": "array", "items": {"type": "string"}},
                                "numbers": {"type": "array", "items": {"type": "string"}}
                            },
                            "description": "Verbatim substrings of TEXT grouped by role (stage >= 5)"
                        },
                        "lede_candidate": {
                            "type": "string",
                            "description": "One sentence built only from spans plus glue words"
                        }
                    },
                    "required": ["text", "rationale", "ops"]
                }
            },
            "required": ["analysis", "rewrite"]
        }),
    }
}

/// Tool schema for the sanity-check call: the suspicion report
fn sanity_tool() -> Tool {
    Tool {
        name: "submit_sanity_report".to_string(),
        description: "Submit suspicion flags for terms in the text".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "version": {"type": "string"},
                "flags": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "term": {
                                "type": "string",
                                "description": "Verbatim substring of TEXT"
                            },
                            "category": {
                                "type": "string",
                                "enum": ["fictionality", "jurisdiction", "impossible-scale", "nonsense", "other"]
                            },
                            "level": {
                                "type": "string",
                                "enum": ["none", "low", "medium", "high"]
                            },
                            "reason": {"type": "string"}
                        },
                        "required": ["term", "category", "level", "reason"]
                    }
                },
                "block_terms": {"type": "array", "items": {"type": "string"}},
                "rationale": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["flags", "block_terms"]
        }),
    }
}

#[derive(Debug, Serialize)]
struct AnthropicToolRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct Tool {
    name: String,
    description: String,
    input_schema: Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice {
    #[serde(rename = "type")]
    choice_type: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    input: Option<Value>,
}
