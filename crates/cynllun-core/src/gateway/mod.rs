//! The external text-generation service boundary.
//!
//! The core never assumes generation succeeds: both operations are fallible
//! and every failure is scoped to the single action that triggered it.
//! Adapters implement [`GenerationGateway`]; the production adapter is
//! [`anthropic::AnthropicGateway`].

pub mod anthropic;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by a generation gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The service is unreachable because no API key is configured.
    /// Surfaced to end users as a generic service-unavailable message.
    #[error("generation service API key not configured")]
    MissingApiKey,

    /// The service responded with a non-success status.
    #[error("generation service error (status {status})")]
    Upstream { status: u16, details: String },

    /// The request could not be completed at the transport level.
    #[error("generation request failed")]
    Transport(#[from] reqwest::Error),

    /// The service responded 2xx but the body was not in the expected shape.
    #[error("malformed generation response: {0}")]
    MalformedResponse(String),
}

/// A selected statement forwarded to the rubric generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementDetail {
    pub title: String,
    pub summary: String,
    pub description: String,
    pub area: String,
}

/// Inputs to single-shot rubric generation. All fields are optional; the
/// caller validates that at least one of area, outcomes or task description
/// is present before invoking the gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RubricRequest {
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub progression_step: Option<String>,
    #[serde(default)]
    pub selected_statements: Vec<StatementDetail>,
    #[serde(default)]
    pub custom_outcomes: Option<String>,
    #[serde(default)]
    pub task_description: Option<String>,
    #[serde(default)]
    pub uploaded_text: Option<String>,
}

impl RubricRequest {
    /// True when none of area, custom outcomes or task description is
    /// present -- there is nothing to build a rubric from.
    pub fn is_unanchored(&self) -> bool {
        fn blank(v: &Option<String>) -> bool {
            v.as_deref().is_none_or(|s| s.trim().is_empty())
        }
        blank(&self.area) && blank(&self.custom_outcomes) && blank(&self.task_description)
    }
}

/// A text-generation service: structured request in, free-form or JSON
/// text out, or a typed failure.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// Generate free-form activity ideas from a plain-text plan context.
    async fn generate_activities(&self, context: &str) -> Result<String, GatewayError>;

    /// Generate an analytic rubric. The returned string is intended to be a
    /// single JSON object but callers must tolerate arbitrary prose.
    async fn generate_rubric(&self, request: &RubricRequest) -> Result<String, GatewayError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rubric_request_anchoring() {
        let empty = RubricRequest::default();
        assert!(empty.is_unanchored());

        let whitespace_only = RubricRequest {
            custom_outcomes: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(whitespace_only.is_unanchored());

        let with_area = RubricRequest {
            area: Some("Humanities".to_string()),
            ..Default::default()
        };
        assert!(!with_area.is_unanchored());

        let with_task = RubricRequest {
            task_description: Some("Write a field report".to_string()),
            ..Default::default()
        };
        assert!(!with_task.is_unanchored());
    }

    #[test]
    fn rubric_request_deserializes_wire_shape() {
        let req: RubricRequest = serde_json::from_str(
            r#"{
                "area": "Science & Technology",
                "progressionStep": "Step 3: Upper Primary (ages 8–11)",
                "selectedStatements": [
                    {"title": "T", "summary": "S", "description": "D", "area": "A"}
                ],
                "customOutcomes": "Observe and record"
            }"#,
        )
        .unwrap();
        assert_eq!(req.selected_statements.len(), 1);
        assert!(req.task_description.is_none());
        assert!(!req.is_unanchored());
    }
}
