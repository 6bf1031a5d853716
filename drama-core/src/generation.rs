//! The text-generation seam.
//!
//! The director and the characters never talk to a model directly. They
//! hand a [`GenerationRequest`] to a [`TextGenerator`] and parse whatever
//! comes back with [`parse_structured`], which never fails: text that is
//! not the expected JSON comes back as [`Structured::Raw`].

use async_trait::async_trait;
use claude::{Claude, Request, Response, StopReason};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Agent label used for director requests.
pub const DIRECTOR_AGENT: &str = "Director";

/// Errors from a text generator.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Claude error: {0}")]
    Claude(#[from] claude::Error),

    #[error("Generator unavailable: {0}")]
    Unavailable(String),

    #[error("Empty completion")]
    Empty,
}

/// One prompt for one agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// "Director" or the name of the speaking character.
    pub agent: String,
    pub prompt: String,
}

impl GenerationRequest {
    pub fn new(agent: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            prompt: prompt.into(),
        }
    }

    pub fn director(prompt: impl Into<String>) -> Self {
        Self::new(DIRECTOR_AGENT, prompt)
    }
}

/// Anything that can turn a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError>;
}

/// Generator backed by the Claude Messages API.
#[derive(Clone)]
pub struct ClaudeGenerator {
    client: Claude,
    max_tokens: usize,
    temperature: Option<f32>,
}

impl ClaudeGenerator {
    pub fn new(client: Claude) -> Self {
        Self {
            client,
            max_tokens: 512,
            temperature: None,
        }
    }

    /// Build from `ANTHROPIC_API_KEY`, applying the story config's model
    /// settings.
    pub fn from_env(config: &crate::StoryConfig) -> Result<Self, GenerationError> {
        let mut client = Claude::from_env()?;
        if let Some(model) = &config.model {
            client = client.with_model(model.clone());
        }
        Ok(Self {
            client,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[async_trait]
impl TextGenerator for ClaudeGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let mut api_request = Request::prompt(request.prompt).with_max_tokens(self.max_tokens);
        if let Some(temperature) = self.temperature {
            api_request = api_request.with_temperature(temperature);
        }

        let response = self.client.complete(api_request).await?;
        completion_text(&request.agent, &response)
    }
}

/// Log the completion's metadata and return its text.
fn completion_text(agent: &str, response: &Response) -> Result<String, GenerationError> {
    tracing::debug!(
        agent,
        id = %response.id,
        model = %response.model,
        input_tokens = response.usage.input_tokens,
        output_tokens = response.usage.output_tokens,
        "Completion received"
    );
    if response.stop_reason == StopReason::MaxTokens {
        tracing::warn!(
            agent,
            output_tokens = response.usage.output_tokens,
            "Completion hit max_tokens, reply may be truncated"
        );
    }

    let text = response.text();
    if text.trim().is_empty() {
        return Err(GenerationError::Empty);
    }
    Ok(text)
}

/// Result of parsing a completion that should have been JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Structured<T> {
    Parsed(T),
    /// The trimmed completion, when no strategy produced a `T`.
    Raw(String),
}

impl<T> Structured<T> {
    pub fn parsed(self) -> Option<T> {
        match self {
            Structured::Parsed(value) => Some(value),
            Structured::Raw(_) => None,
        }
    }
}

/// Parse a completion into `T`, trying in order: the text as-is, the first
/// fenced code block, the text with trailing commas removed, and the code
/// block with trailing commas removed.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Structured<T> {
    let trimmed = raw.trim();

    if let Ok(parsed) = serde_json::from_str::<T>(trimmed) {
        return Structured::Parsed(parsed);
    }

    let fenced = extract_json_from_codeblock(trimmed);
    if let Some(json) = fenced {
        if let Ok(parsed) = serde_json::from_str::<T>(json) {
            return Structured::Parsed(parsed);
        }
    }

    if let Ok(parsed) = serde_json::from_str::<T>(&strip_trailing_commas(trimmed)) {
        return Structured::Parsed(parsed);
    }

    if let Some(json) = fenced {
        if let Ok(parsed) = serde_json::from_str::<T>(&strip_trailing_commas(json)) {
            return Structured::Parsed(parsed);
        }
    }

    Structured::Raw(trimmed.to_string())
}

fn extract_json_from_codeblock(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_fence = &text[open + 3..];
    // Skip the info string ("json") up to the end of the line.
    let body_start = after_fence.find('\n').map_or(0, |nl| nl + 1);
    let body = &after_fence[body_start..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}

/// Strip commas that sit directly before a closing brace or bracket.
/// Commas inside string literals are kept.
fn strip_trailing_commas(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    // A comma seen outside a string, held until the next significant char.
    let mut pending_comma = false;
    let mut whitespace = String::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            result.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        if c.is_whitespace() {
            if pending_comma {
                whitespace.push(c);
            } else {
                result.push(c);
            }
            continue;
        }

        if pending_comma {
            if c != '}' && c != ']' {
                result.push(',');
            }
            result.push_str(&whitespace);
            whitespace.clear();
            pending_comma = false;
        }

        match c {
            ',' => pending_comma = true,
            '"' => {
                in_string = true;
                result.push(c);
            }
            _ => result.push(c),
        }
    }

    if pending_comma {
        result.push(',');
    }
    result.push_str(&whitespace);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pick {
        next_speaker: String,
    }

    fn response(content: &[&str], stop_reason: StopReason) -> Response {
        Response {
            id: "msg_1".to_string(),
            model: "claude-test".to_string(),
            content: content.iter().map(|c| c.to_string()).collect(),
            stop_reason,
            usage: claude::Usage {
                input_tokens: 120,
                output_tokens: 40,
            },
        }
    }

    #[test]
    fn test_completion_text_joins_blocks() {
        let reply = response(&["{\"next_speaker\": ", "\"Saleem\"}"], StopReason::EndTurn);
        assert_eq!(
            completion_text("Director", &reply).unwrap(),
            "{\"next_speaker\": \"Saleem\"}"
        );

        // A truncated reply still returns whatever text arrived.
        let cut = response(&["{\"dialogue\": \"Sahib"], StopReason::MaxTokens);
        assert_eq!(completion_text("Saleem", &cut).unwrap(), "{\"dialogue\": \"Sahib");
    }

    #[test]
    fn test_blank_completion_is_an_error() {
        let blank = response(&["  ", "\n"], StopReason::EndTurn);
        assert!(matches!(
            completion_text("Saleem", &blank),
            Err(GenerationError::Empty)
        ));
    }

    #[test]
    fn test_direct_json() {
        let parsed = parse_structured::<Pick>(r#" {"next_speaker": "Saleem"} "#);
        assert_eq!(
            parsed,
            Structured::Parsed(Pick {
                next_speaker: "Saleem".to_string()
            })
        );
    }

    #[test]
    fn test_fenced_json() {
        let raw = "Here you go:\n```json\n{\"next_speaker\": \"Uncle Jameel\"}\n```\nEnjoy.";
        let parsed = parse_structured::<Pick>(raw).parsed().unwrap();
        assert_eq!(parsed.next_speaker, "Uncle Jameel");
    }

    #[test]
    fn test_trailing_comma_repair() {
        let parsed = parse_structured::<Pick>("{\"next_speaker\": \"Ahmed Malik\",\n}");
        assert_eq!(parsed.parsed().unwrap().next_speaker, "Ahmed Malik");

        let fenced = "```\n{\"next_speaker\": \"Constable Raza\", }\n```";
        assert_eq!(
            parse_structured::<Pick>(fenced).parsed().unwrap().next_speaker,
            "Constable Raza"
        );
    }

    #[test]
    fn test_prose_falls_back_to_raw() {
        let parsed = parse_structured::<Pick>("  Saleem should speak next.  ");
        assert_eq!(parsed, Structured::Raw("Saleem should speak next.".to_string()));
    }

    #[test]
    fn test_strip_trailing_commas_keeps_inner_commas() {
        assert_eq!(strip_trailing_commas(r#"{"a": 1, "b": [1, 2,],}"#), r#"{"a": 1, "b": [1, 2]}"#);
    }

    #[test]
    fn test_strip_trailing_commas_leaves_strings_alone() {
        let raw = r#"{"line": "Wait, }no, ]stop", "quote": "he said \",}\"",}"#;
        assert_eq!(
            strip_trailing_commas(raw),
            r#"{"line": "Wait, }no, ]stop", "quote": "he said \",}\""}"#
        );

        let reply = format!("{{\"next_speaker\": \"Saleem, ]\",\n{}}}", " ".repeat(10_000));
        let parsed = parse_structured::<Pick>(&reply).parsed().unwrap();
        assert_eq!(parsed.next_speaker, "Saleem, ]");
    }
}
