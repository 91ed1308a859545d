//! Google Gemini provider implementation
//!
//! Single-shot calls go to `:generateContent`; incremental calls go to
//! `:streamGenerateContent?alt=sse`, which answers with one JSON chunk per
//! server-sent event.

use super::sse::SseDecoder;
use super::types::{LlmRequest, LlmResponse, TextStream};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Public Gemini API root
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Gemini service implementation
pub struct GeminiService {
    client: Client,
    api_key: String,
    api_base: String,
    model_id: String,
}

impl GeminiService {
    pub fn new(api_key: String, model: &str, api_base: &str) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            model_id: model.to_string(),
        })
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model_id)
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.api_base, self.model_id
        )
    }

    fn translate_request(request: &LlmRequest) -> GeminiRequest {
        let system_instruction = if request.system_instruction.is_empty() {
            None
        } else {
            Some(GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: Some(request.system_instruction.clone()),
                }],
            })
        };

        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(request.user_text.clone()),
                }],
            }],
            system_instruction,
        }
    }

    fn normalize_response(resp: GeminiResponse) -> Result<LlmResponse, LlmError> {
        let text = resp.text();
        let Some(candidate) = resp.candidates.into_iter().next() else {
            let reason = resp
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates".to_string());
            return Err(LlmError::unknown(format!("Response blocked: {reason}")));
        };

        if text.is_empty() {
            return Err(LlmError::unknown(format!(
                "No text in response (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(LlmResponse {
            text,
            end_turn: candidate.finish_reason.as_deref() == Some("STOP"),
        })
    }

    async fn post(&self, url: &str, request: &LlmRequest) -> Result<reqwest::Response, LlmError> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::translate_request(request))
            .send()
            .await
            .map_err(|e| LlmError::from_reqwest(&e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;
        let message = serde_json::from_str::<GeminiErrorResponse>(&body)
            .map_or(body, |e| e.error.message);
        Err(LlmError::from_status(status.as_u16(), &message))
    }
}

#[async_trait]
impl LlmService for GeminiService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let response = self.post(&self.generate_url(), request).await?;

        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        let gemini_response: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::unknown(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        Self::normalize_response(gemini_response)
    }

    async fn open_stream(&self, request: &LlmRequest) -> Result<TextStream, LlmError> {
        let response = self.post(&self.stream_url(), request).await?;

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
            .boxed();

        Ok(fragment_stream(body))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

struct StreamState {
    body: BoxStream<'static, Result<Vec<u8>, reqwest::Error>>,
    decoder: SseDecoder,
    pending: VecDeque<Result<String, LlmError>>,
    finished: bool,
}

impl StreamState {
    fn enqueue(&mut self, data: &str) {
        if let Some(item) = parse_stream_event(data) {
            self.pending.push_back(item);
        }
    }
}

/// Turn a raw SSE body into text fragments, stopping after the first error
pub(crate) fn fragment_stream(
    body: BoxStream<'static, Result<Vec<u8>, reqwest::Error>>,
) -> TextStream {
    let state = StreamState {
        body,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                if item.is_err() {
                    state.finished = true;
                    state.pending.clear();
                }
                return Some((item, state));
            }
            if state.finished {
                return None;
            }
            match state.body.next().await {
                Some(Ok(chunk)) => {
                    for data in state.decoder.push(&chunk) {
                        state.enqueue(&data);
                    }
                }
                Some(Err(e)) => {
                    state
                        .pending
                        .push_back(Err(LlmError::network(format!("Stream interrupted: {e}"))));
                }
                None => {
                    if let Some(data) = state.decoder.finish() {
                        state.enqueue(&data);
                    }
                    state.finished = true;
                }
            }
        }
    })
    .boxed()
}

/// Decode one SSE payload. Chunks without text yield nothing.
pub(crate) fn parse_stream_event(data: &str) -> Option<Result<String, LlmError>> {
    let data = data.trim();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<GeminiStreamEvent>(data) {
        Ok(GeminiStreamEvent::Error { error }) => Some(Err(LlmError::from_status(
            error.code.and_then(|c| u16::try_from(c).ok()).unwrap_or(500),
            &error.message,
        ))),
        Ok(GeminiStreamEvent::Chunk(chunk)) => {
            let text = chunk.text();
            if text.is_empty() {
                None
            } else {
                Some(Ok(text))
            }
        }
        Err(e) => Some(Err(LlmError::unknown(format!(
            "Failed to parse stream chunk: {e}"
        )))),
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

impl GeminiResponse {
    /// Text of the first candidate, parts concatenated in order
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeminiStreamEvent {
    Error { error: GeminiError },
    Chunk(GeminiResponse),
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
    #[serde(default)]
    code: Option<i64>,
}
