use std::fmt;
use std::str::FromStr;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::prompts;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const OPENAI_BASE_URL: &str = "https://api.openai.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gemini,
    OpenAi,
}

impl Provider {
    /// Stable identifier used in the config file.
    pub fn id(self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenAi => "openai",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Provider::Gemini => "Gemini",
            Provider::OpenAi => "OpenAI",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Provider::Gemini => Provider::OpenAi,
            Provider::OpenAi => Provider::Gemini,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gemini" => Ok(Provider::Gemini),
            "openai" => Ok(Provider::OpenAi),
            other => Err(format!("unknown provider '{other}' (expected 'gemini' or 'openai')")),
        }
    }
}

/// One user action's worth of input to `explain`. Built per call, never reused.
pub struct ExplainRequest<'a> {
    pub source_text: &'a str,
    pub api_key: &'a str,
    pub provider: Provider,
    pub model: &'a str,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("unexpected response shape from provider")]
    Malformed,
    #[error("provider returned an empty answer")]
    EmptyAnswer,
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Network(err.to_string())
    }
}

#[derive(Clone)]
pub struct ProviderClient {
    http: Client,
    gemini_base: String,
    openai_base: String,
}

impl ProviderClient {
    pub fn new() -> Self {
        Self::with_base_urls(GEMINI_BASE_URL, OPENAI_BASE_URL)
    }

    pub fn with_base_urls(gemini_base: &str, openai_base: &str) -> Self {
        Self {
            http: Client::new(),
            gemini_base: gemini_base.trim_end_matches('/').to_string(),
            openai_base: openai_base.trim_end_matches('/').to_string(),
        }
    }

    /// Sends the source text to the configured provider and returns the
    /// answer text. One outbound request per call, no retries.
    pub async fn explain(&self, req: &ExplainRequest<'_>) -> Result<String, ProviderError> {
        match req.provider {
            Provider::Gemini => self.explain_gemini(req).await,
            Provider::OpenAi => self.explain_openai(req).await,
        }
    }

    async fn explain_gemini(&self, req: &ExplainRequest<'_>) -> Result<String, ProviderError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.gemini_base, req.model, req.api_key
        );
        let body = gemini_body(prompts::combined_prompt(req.source_text));

        debug!(model = req.model, "gemini generateContent request");

        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(api_error(status.as_u16(), &text));
        }
        extract_gemini_text(&text)
    }

    async fn explain_openai(&self, req: &ExplainRequest<'_>) -> Result<String, ProviderError> {
        let url = format!("{}/v1/chat/completions", self.openai_base);
        let body = chat_body(req.model, req.source_text);

        debug!(model = req.model, "openai chat completion request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(req.api_key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(api_error(status.as_u16(), &text));
        }
        extract_openai_text(&text)
    }
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiTurn>,
}

#[derive(Serialize)]
struct GeminiTurn {
    parts: Vec<GeminiRequestPart>,
}

#[derive(Serialize)]
struct GeminiRequestPart {
    text: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatResponseMessage>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

fn gemini_body(prompt: String) -> GeminiRequest {
    GeminiRequest {
        contents: vec![GeminiTurn {
            parts: vec![GeminiRequestPart { text: prompt }],
        }],
    }
}

fn chat_body(model: &str, source_text: &str) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage {
                role: "system",
                content: prompts::SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: "user",
                content: source_text.to_string(),
            },
        ],
    }
}

/// Non-2xx responses carry their own error shape; fall back to a generic
/// label when the body is not parsable.
fn api_error(status: u16, body: &str) -> ProviderError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .unwrap_or_else(|| "API error".to_string());
    ProviderError::Api { status, message }
}

fn extract_gemini_text(body: &str) -> Result<String, ProviderError> {
    let parsed: GeminiResponse = serde_json::from_str(body).map_err(|_| ProviderError::Malformed)?;
    let text = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or(ProviderError::Malformed)?;
    non_empty(text)
}

fn extract_openai_text(body: &str) -> Result<String, ProviderError> {
    let parsed: ChatResponse = serde_json::from_str(body).map_err(|_| ProviderError::Malformed)?;
    let text = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .ok_or(ProviderError::Malformed)?;
    non_empty(text)
}

fn non_empty(text: String) -> Result<String, ProviderError> {
    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(ProviderError::EmptyAnswer);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn gemini_body_is_a_single_combined_turn() {
        let body = serde_json::to_value(gemini_body(prompts::combined_prompt("let x = 1;"))).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "parts": [{
                        "text": format!("{}\n\nCode:\n{}", prompts::SYSTEM_PROMPT, "let x = 1;")
                    }]
                }]
            })
        );
    }

    #[test]
    fn chat_body_splits_system_and_user_messages() {
        let body = serde_json::to_value(chat_body("gpt-4", "fn main() {}")).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "gpt-4",
                "messages": [
                    { "role": "system", "content": prompts::SYSTEM_PROMPT },
                    { "role": "user", "content": "fn main() {}" }
                ]
            })
        );
    }

    #[test]
    fn gemini_extraction_follows_the_fixed_path() {
        let body = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "  the answer  " }] }
            }]
        })
        .to_string();
        assert_eq!(extract_gemini_text(&body).unwrap(), "the answer");
    }

    #[test]
    fn gemini_missing_path_segments_are_malformed() {
        for body in [
            json!({}),
            json!({ "candidates": [] }),
            json!({ "candidates": [{}] }),
            json!({ "candidates": [{ "content": { "parts": [] } }] }),
            json!({ "candidates": [{ "content": { "parts": [{}] } }] }),
        ] {
            let err = extract_gemini_text(&body.to_string()).unwrap_err();
            assert!(matches!(err, ProviderError::Malformed), "body: {body}");
        }
    }

    #[test]
    fn blank_answer_is_never_a_success() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "   " }] } }]
        })
        .to_string();
        assert!(matches!(
            extract_gemini_text(&body),
            Err(ProviderError::EmptyAnswer)
        ));
    }

    #[test]
    fn openai_extraction_follows_the_fixed_path() {
        let body = json!({
            "choices": [{ "message": { "role": "assistant", "content": "done" } }]
        })
        .to_string();
        assert_eq!(extract_openai_text(&body).unwrap(), "done");
    }

    #[test]
    fn openai_missing_choices_are_malformed() {
        for body in [
            json!({}),
            json!({ "choices": [] }),
            json!({ "choices": [{}] }),
            json!({ "choices": [{ "message": { "role": "assistant" } }] }),
        ] {
            let err = extract_openai_text(&body.to_string()).unwrap_err();
            assert!(matches!(err, ProviderError::Malformed), "body: {body}");
        }
    }

    #[test]
    fn api_error_prefers_the_provider_message() {
        let err = api_error(400, &json!({ "error": { "message": "API key not valid" } }).to_string());
        match err {
            ProviderError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn api_error_falls_back_to_a_generic_label() {
        let err = api_error(502, "<html>bad gateway</html>");
        match err {
            ProviderError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "API error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn provider_ids_round_trip() {
        for provider in [Provider::Gemini, Provider::OpenAi] {
            assert_eq!(provider.id().parse::<Provider>().unwrap(), provider);
        }
        assert!("claude".parse::<Provider>().is_err());
    }

    mod http {
        use super::*;
        use pretty_assertions::assert_eq;
        use wiremock::matchers::{bearer_token, body_partial_json, method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        fn request<'a>(provider: Provider, model: &'a str) -> ExplainRequest<'a> {
            ExplainRequest {
                source_text: "fn broken() {",
                api_key: "k",
                provider,
                model,
            }
        }

        #[tokio::test]
        async fn gemini_sends_one_request_with_the_key_as_query_param() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
                .and(query_param("key", "k"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "candidates": [{ "content": { "parts": [{ "text": "answer" }] } }]
                })))
                .expect(1)
                .mount(&server)
                .await;

            let client = ProviderClient::with_base_urls(&server.uri(), &server.uri());
            let text = client
                .explain(&request(Provider::Gemini, "gemini-1.5-flash"))
                .await
                .unwrap();
            assert_eq!(text, "answer");
        }

        #[tokio::test]
        async fn openai_sends_one_request_with_bearer_auth() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/v1/chat/completions"))
                .and(bearer_token("k"))
                .and(body_partial_json(json!({ "model": "gpt-4" })))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "choices": [{ "message": { "role": "assistant", "content": "done" } }]
                })))
                .expect(1)
                .mount(&server)
                .await;

            let client = ProviderClient::with_base_urls(&server.uri(), &server.uri());
            let text = client
                .explain(&request(Provider::OpenAi, "gpt-4"))
                .await
                .unwrap();
            assert_eq!(text, "done");
        }

        #[tokio::test]
        async fn non_success_status_surfaces_the_provider_message() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                    "error": { "message": "API key not valid" }
                })))
                .expect(1)
                .mount(&server)
                .await;

            let client = ProviderClient::with_base_urls(&server.uri(), &server.uri());
            let err = client
                .explain(&request(Provider::Gemini, "gemini-1.5-flash"))
                .await
                .unwrap_err();
            match err {
                ProviderError::Api { status, message } => {
                    assert_eq!(status, 400);
                    assert_eq!(message, "API key not valid");
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[tokio::test]
        async fn malformed_success_body_is_a_provider_error() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
                .expect(1)
                .mount(&server)
                .await;

            let client = ProviderClient::with_base_urls(&server.uri(), &server.uri());
            let err = client
                .explain(&request(Provider::Gemini, "gemini-1.5-flash"))
                .await
                .unwrap_err();
            assert!(matches!(err, ProviderError::Malformed));
        }
    }
}
