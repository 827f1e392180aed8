//! Anthropic Messages API adapter for the generation gateway.
//!
//! Speaks `POST https://api.anthropic.com/v1/messages` with the prompts the
//! lesson-plan and rubric tools need. The response text is extracted from
//! the first content block; everything else about the reply is opaque.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{GatewayError, GenerationGateway, RubricRequest};

const API_BASE: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Uploaded-document excerpts are truncated to this many characters before
/// being embedded in the rubric prompt.
const UPLOAD_EXCERPT_LIMIT: usize = 3000;

const ACTIVITY_SYSTEM_PROMPT: &str = "\
You are a creative educational activity designer specialising in the Curriculum for Wales 2022 (Cwricwlwm i Gymru).

Your role is to generate engaging, practical activity ideas for Welsh teachers based on their lesson plan selections.

Key principles:
- Activities should be rooted in the Four Purposes of the curriculum
- Activities should reflect the Welsh context (cynefin — sense of place, Welsh language, Welsh culture, local environment)
- Activities should be inclusive and support learner progression
- Activities should be practical, creative, and achievable in the given timeframe
- Where appropriate, suggest bilingual (Welsh/English) elements
- Reference the specific Areas of Learning & Experience, Statements of What Matters, and teaching/assessment methods the teacher has chosen

Format your response as 4-6 activity ideas. For each activity:
1. Give it a creative name (with an emoji)
2. Brief description (2-3 sentences)
3. How it connects to the selected curriculum elements
4. Differentiation tip (how to adapt for different learners)
5. Welsh language/culture connection (where relevant)

Make activities varied — mix individual, pair, group, indoor, outdoor, digital, hands-on.";

const RUBRIC_SYSTEM_PROMPT: &str = "\
You are an expert Welsh education assessment designer specialising in the Curriculum for Wales 2022 (Cwricwlwm i Gymru).

Your task is to create professional analytic rubrics that Welsh teachers can use directly in their classrooms.

Key principles:
- Criteria must be mapped to the selected Statements of What Matters from the Curriculum for Wales
- Performance levels must align with Descriptions of Learning from the curriculum
- Language must be appropriate for the specified Progression Step
- Use Welsh curriculum terminology throughout (cynefin, Four Purposes, Descriptions of Learning, etc.)
- Rubric must be specific enough to be immediately usable
- Each criterion should have clear, distinct descriptors at each performance level

CRITICAL: You MUST return valid JSON in this exact format:
{
  \"title\": \"Rubric title describing the assessment\",
  \"levels\": [\"Emerging\", \"Developing\", \"Securing\", \"Excelling\"],
  \"criteria\": [
    {
      \"name\": \"Criterion name\",
      \"swm\": \"Related Statement of What Matters (if applicable)\",
      \"descriptors\": {
        \"emerging\": \"What emerging performance looks like for this criterion\",
        \"developing\": \"What developing performance looks like\",
        \"securing\": \"What securing performance looks like\",
        \"excelling\": \"What excelling performance looks like\"
      }
    }
  ]
}

Generate 4-8 criteria depending on the complexity of the task. Each descriptor should be 1-3 sentences.
The four levels should show clear, meaningful progression:
- Emerging: Beginning to engage; needs significant support; shows initial awareness
- Developing: Growing understanding; needs some support; can demonstrate with guidance
- Securing: Confident application; works independently; consistent demonstration
- Excelling: Sophisticated, deep understanding; leads and innovates; exceeds expectations

Return ONLY the JSON object. No markdown code fences, no explanation — just the raw JSON.";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Gateway adapter for the Anthropic Messages API.
#[derive(Clone)]
pub struct AnthropicGateway {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicGateway")
            .field("model", &self.model)
            .finish()
    }
}

impl AnthropicGateway {
    /// Create a gateway with an explicit API key and the default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_key: api_key.into().trim().to_string(),
            model: DEFAULT_MODEL.to_string(),
            client,
        }
    }

    /// Override the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn complete(
        &self,
        system: &str,
        user_message: String,
        max_tokens: u32,
    ) -> Result<String, GatewayError> {
        if self.api_key.is_empty() {
            return Err(GatewayError::MissingApiKey);
        }

        let body = MessagesRequest {
            model: &self.model,
            max_tokens,
            system,
            messages: vec![Message {
                role: "user",
                content: user_message,
            }],
        };

        debug!(model = %self.model, max_tokens, "sending generation request");
        let response = self
            .client
            .post(API_BASE)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "generation service returned failure");
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
                details,
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
        parsed
            .content
            .first()
            .and_then(|block| block.text.clone())
            .ok_or_else(|| GatewayError::MalformedResponse("no text content block".to_string()))
    }
}

#[async_trait]
impl GenerationGateway for AnthropicGateway {
    async fn generate_activities(&self, context: &str) -> Result<String, GatewayError> {
        let user_message = format!(
            "Please generate creative activity ideas for this Welsh curriculum lesson plan:\n\n\
             {context}\n\n\
             Generate 4-6 varied, engaging activity ideas that align with these selections."
        );
        self.complete(ACTIVITY_SYSTEM_PROMPT, user_message, 2048).await
    }

    async fn generate_rubric(&self, request: &RubricRequest) -> Result<String, GatewayError> {
        self.complete(RUBRIC_SYSTEM_PROMPT, rubric_user_message(request), 4096)
            .await
    }
}

/// Assemble the rubric user message from the request fields, omitting the
/// optional blocks that are absent.
fn rubric_user_message(request: &RubricRequest) -> String {
    let area = request.area.as_deref().unwrap_or("Not specified");
    let step = request
        .progression_step
        .as_deref()
        .unwrap_or("Not specified");

    let mut msg = String::from("Create an analytic rubric for the following:\n\n");
    msg.push_str(&format!("AREA OF LEARNING AND EXPERIENCE: {area}\n"));
    msg.push_str(&format!("PROGRESSION STEP: {step}\n\n"));

    if !request.selected_statements.is_empty() {
        let statements = request
            .selected_statements
            .iter()
            .map(|s| {
                format!(
                    "- \"{}\" ({}): {}\n  Full: {}",
                    s.title, s.area, s.summary, s.description
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        msg.push_str(&format!(
            "STATEMENTS OF WHAT MATTERS (from the Curriculum for Wales):\n{statements}\n\n"
        ));
    }

    if let Some(outcomes) = non_blank(&request.custom_outcomes) {
        msg.push_str(&format!("CUSTOM LEARNING OUTCOMES:\n{outcomes}\n\n"));
    }
    if let Some(task) = non_blank(&request.task_description) {
        msg.push_str(&format!("TASK DESCRIPTION:\n{task}\n\n"));
    }
    if let Some(uploaded) = non_blank(&request.uploaded_text) {
        let excerpt: String = uploaded.chars().take(UPLOAD_EXCERPT_LIMIT).collect();
        msg.push_str(&format!(
            "ADDITIONAL CONTEXT FROM UPLOADED DOCUMENT:\n{excerpt}\n\n"
        ));
    }

    msg.push_str(&format!(
        "Generate the rubric as JSON now. Remember: criteria mapped to the Statements of What \
         Matters, language appropriate for {step}, Welsh curriculum terminology throughout."
    ));
    msg
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::StatementDetail;

    #[tokio::test]
    async fn empty_api_key_is_a_config_error() {
        let gateway = AnthropicGateway::new("");
        let err = gateway.generate_activities("TOPIC: x").await.unwrap_err();
        assert!(matches!(err, GatewayError::MissingApiKey));
    }

    #[test]
    fn rubric_message_includes_present_blocks_only() {
        let request = RubricRequest {
            area: Some("Humanities".to_string()),
            progression_step: Some("Step 4: Lower Secondary (ages 11–14)".to_string()),
            selected_statements: vec![StatementDetail {
                title: "Human Societies".to_string(),
                summary: "Societies are complex.".to_string(),
                description: "Long description.".to_string(),
                area: "Humanities".to_string(),
            }],
            custom_outcomes: None,
            task_description: Some("Design a local history exhibition".to_string()),
            uploaded_text: None,
        };
        let msg = rubric_user_message(&request);
        assert!(msg.contains("AREA OF LEARNING AND EXPERIENCE: Humanities"));
        assert!(msg.contains("STATEMENTS OF WHAT MATTERS"));
        assert!(msg.contains("- \"Human Societies\" (Humanities): Societies are complex."));
        assert!(msg.contains("TASK DESCRIPTION:\nDesign a local history exhibition"));
        assert!(!msg.contains("CUSTOM LEARNING OUTCOMES"));
        assert!(!msg.contains("UPLOADED DOCUMENT"));
    }

    #[test]
    fn rubric_message_truncates_uploaded_text() {
        let request = RubricRequest {
            area: Some("Maths".to_string()),
            uploaded_text: Some("x".repeat(5000)),
            ..Default::default()
        };
        let msg = rubric_user_message(&request);
        let excerpt_len = msg
            .split("UPLOADED DOCUMENT:\n")
            .nth(1)
            .and_then(|rest| rest.split("\n\n").next())
            .map(|s| s.chars().count())
            .unwrap_or(0);
        assert_eq!(excerpt_len, UPLOAD_EXCERPT_LIMIT);
    }

    #[test]
    fn rubric_message_defaults_missing_fields() {
        let msg = rubric_user_message(&RubricRequest::default());
        assert!(msg.contains("AREA OF LEARNING AND EXPERIENCE: Not specified"));
        assert!(msg.contains("PROGRESSION STEP: Not specified"));
    }

    #[test]
    fn messages_response_extracts_first_text_block() {
        let parsed: MessagesResponse = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"Hello"},{"type":"text","text":"ignored"}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.content[0].text.as_deref(), Some("Hello"));
    }

    #[test]
    fn gateway_debug_omits_api_key() {
        let gateway = AnthropicGateway::new("sk-secret").with_model("claude-test");
        let debug = format!("{gateway:?}");
        assert!(debug.contains("claude-test"));
        assert!(!debug.contains("sk-secret"));
    }
}
