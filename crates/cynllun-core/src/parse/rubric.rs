//! Parses the rubric generator's response into a structured table.
//!
//! The service is asked for a bare JSON object but replies are untrusted:
//! the JSON may arrive inside a fenced code block, use alternate field
//! names, or not be JSON at all. Any parse failure degrades to prose
//! rendering via [`format_prose`] -- never an error.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

/// Level names used when the response omits them.
pub const DEFAULT_LEVELS: [&str; 4] = ["Emerging", "Developing", "Securing", "Excelling"];

/// A structured analytic rubric.
#[derive(Debug, Clone, Deserialize)]
pub struct Rubric {
    #[serde(default = "default_title")]
    pub title: String,
    /// Ordered level names, one table column each.
    #[serde(default = "default_levels")]
    pub levels: Vec<String>,
    pub criteria: Vec<Criterion>,
}

/// One rubric criterion: a table row with a descriptor per level.
#[derive(Debug, Clone, Deserialize)]
pub struct Criterion {
    #[serde(alias = "criterion")]
    pub name: String,
    /// Related Statement of What Matters, if the generator mapped one.
    #[serde(default, alias = "swm")]
    pub statement: Option<String>,
    #[serde(default, alias = "levels")]
    pub descriptors: HashMap<String, String>,
}

impl Criterion {
    /// Descriptor cell for a level column. Keys are matched by lowercased
    /// level name first, then by the exact name.
    pub fn descriptor(&self, level: &str) -> &str {
        self.descriptors
            .get(&level.to_lowercase())
            .or_else(|| self.descriptors.get(level))
            .map(String::as_str)
            .unwrap_or("")
    }
}

fn default_title() -> String {
    "Analytic Rubric".to_string()
}

fn default_levels() -> Vec<String> {
    DEFAULT_LEVELS.iter().map(|s| s.to_string()).collect()
}

/// Best-effort parse of a rubric response.
///
/// Extracts the interior of a fenced code block when one is present, then
/// parses as JSON. `None` means the caller should render the raw text as
/// prose instead of a table.
pub fn parse_rubric(text: &str) -> Option<Rubric> {
    let candidate = extract_fenced_block(text).unwrap_or(text);
    match serde_json::from_str::<Rubric>(candidate.trim()) {
        Ok(rubric) if !rubric.criteria.is_empty() => Some(rubric),
        Ok(_) => {
            debug!("rubric response parsed but had no criteria, falling back to prose");
            None
        }
        Err(e) => {
            debug!(error = %e, "rubric response was not structured JSON, falling back to prose");
            None
        }
    }
}

/// Interior of the first fenced code block (``` or ```json), if any.
fn extract_fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    let after_tag = after_fence.strip_prefix("json").unwrap_or(after_fence);
    let end = after_tag.find("```")?;
    Some(&after_tag[..end])
}

/// Normalize generated prose for plain display: bold markers dropped,
/// heading markers dropped, bullets unified. Used when [`parse_rubric`]
/// yields nothing.
pub fn format_prose(text: &str) -> String {
    text.lines()
        .map(|line| {
            let trimmed = line.trim_end();
            let hashes = trimmed.chars().take_while(|c| *c == '#').count();
            let stripped = if (1..=3).contains(&hashes)
                && trimmed[hashes..].starts_with(' ')
            {
                trimmed[hashes + 1..].to_string()
            } else if let Some(rest) = trimmed.strip_prefix("- ") {
                format!("• {rest}")
            } else {
                trimmed.to_string()
            };
            stripped.replace("**", "")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_json_response() {
        let response = "```json\n{\"title\":\"T\",\"levels\":[\"Emerging\",\"Excelling\"],\"criteria\":[{\"name\":\"C1\",\"descriptors\":{\"emerging\":\"E1\",\"excelling\":\"X1\"}}]}\n```";
        let rubric = parse_rubric(response).expect("should parse");
        assert_eq!(rubric.title, "T");
        assert_eq!(rubric.levels, ["Emerging", "Excelling"]);
        assert_eq!(rubric.criteria.len(), 1);
        let row = &rubric.criteria[0];
        let cells: Vec<&str> = rubric.levels.iter().map(|l| row.descriptor(l)).collect();
        assert_eq!(cells, ["E1", "X1"]);
    }

    #[test]
    fn parses_bare_json_response() {
        let response = r#"{"title":"Field Report Rubric","criteria":[{"name":"Observation","descriptors":{"emerging":"Notices features"}}]}"#;
        let rubric = parse_rubric(response).expect("should parse");
        assert_eq!(rubric.levels, DEFAULT_LEVELS);
        assert_eq!(rubric.criteria[0].descriptor("Emerging"), "Notices features");
    }

    #[test]
    fn malformed_json_falls_back_without_panicking() {
        assert!(parse_rubric("Here is your rubric: it has four levels...").is_none());
        assert!(parse_rubric("```json\n{not valid}\n```").is_none());
        assert!(parse_rubric("").is_none());
    }

    #[test]
    fn empty_criteria_falls_back() {
        assert!(parse_rubric(r#"{"title":"T","criteria":[]}"#).is_none());
    }

    #[test]
    fn criterion_field_aliases() {
        let response = r#"{"criteria":[{"criterion":"C1","swm":"Human Societies","levels":{"emerging":"E"}}]}"#;
        let rubric = parse_rubric(response).expect("should parse");
        assert_eq!(rubric.criteria[0].name, "C1");
        assert_eq!(rubric.criteria[0].statement.as_deref(), Some("Human Societies"));
        assert_eq!(rubric.criteria[0].descriptor("emerging"), "E");
    }

    #[test]
    fn descriptor_lookup_prefers_lowercase_then_exact() {
        let response = r#"{"criteria":[{"name":"C","descriptors":{"Securing":"exact-case"}}]}"#;
        let rubric = parse_rubric(response).expect("should parse");
        assert_eq!(rubric.criteria[0].descriptor("Securing"), "exact-case");
        assert_eq!(rubric.criteria[0].descriptor("Emerging"), "");
    }

    #[test]
    fn fence_without_closing_uses_raw_text() {
        let response = r#"```json {"criteria": [{"name":"C","descriptors":{}}]}"#;
        // No closing fence: the raw text is not valid JSON, so prose fallback.
        assert!(parse_rubric(response).is_none());
    }

    #[test]
    fn format_prose_normalizes_markup() {
        let text = "## Levels\n**Emerging**: first steps\n- one\n- two";
        assert_eq!(format_prose(text), "Levels\nEmerging: first steps\n• one\n• two");
    }

    #[test]
    fn untitled_rubric_gets_default_title() {
        let response = r#"{"criteria":[{"name":"C","descriptors":{"emerging":"E"}}]}"#;
        assert_eq!(parse_rubric(response).unwrap().title, "Analytic Rubric");
    }
}
