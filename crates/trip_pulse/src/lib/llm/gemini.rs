use futures::{StreamExt, TryStreamExt};
use reqwest::Client;
use serde::Deserialize;
use tokio_util::{
    codec::{FramedRead, LinesCodec},
    io::StreamReader,
};

use crate::{
    llm::generator::{Generator, TextStream},
    types::ItineraryPrompt,
};

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Stream error: {0}")]
    Stream(String),
    #[error("Prompt blocked: {0}")]
    Blocked(String),
    #[error("No content in response")]
    EmptyResponse,
}

impl GeminiClient {
    pub const DEFAULT_MODEL: &'static str = "gemini-1.5-flash-latest";

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: Self::DEFAULT_MODEL.into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn request_body(prompt: &ItineraryPrompt) -> serde_json::Value {
        serde_json::json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": prompt.as_str() }]
                }
            ]
        })
    }

    async fn send(&self, url: String, prompt: &ItineraryPrompt) -> Result<reqwest::Response, GeminiError> {
        let resp = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::request_body(prompt))
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(GeminiError::Api { status, message });
        }

        Ok(resp)
    }

    pub async fn send_generate_request(
        &self,
        prompt: &ItineraryPrompt,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let resp = self.send(url, prompt).await?;
        Ok(resp.json::<GenerateContentResponse>().await?)
    }

    /// Opens a server-sent-events generation stream; each `data:` line carries a
    /// partial [`GenerateContentResponse`].
    pub async fn send_stream_request(
        &self,
        prompt: &ItineraryPrompt,
    ) -> Result<TextStream<GeminiError>, GeminiError> {
        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        );
        let resp = self.send(url, prompt).await?;

        let bytes = resp.bytes_stream().map_err(std::io::Error::other);
        let lines = FramedRead::new(StreamReader::new(bytes), LinesCodec::new());

        let fragments = lines.filter_map(|line| async move {
            match line {
                Ok(line) => parse_sse_line(&line).transpose(),
                Err(e) => Some(Err(GeminiError::Stream(e.to_string()))),
            }
        });

        Ok(fragments.boxed())
    }
}

/// Extracts the text carried by one SSE line. Non-data lines and data without
/// text yield `None`.
pub fn parse_sse_line(line: &str) -> Result<Option<String>, GeminiError> {
    let Some(data) = line.strip_prefix("data:").map(str::trim) else {
        return Ok(None);
    };
    if data.is_empty() || data == "[DONE]" {
        return Ok(None);
    }

    let chunk = serde_json::from_str::<GenerateContentResponse>(data)?;
    chunk.into_text().map(|text| (!text.is_empty()).then_some(text))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerateContentResponse {
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Part {
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    pub fn into_text(self) -> Result<String, GeminiError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(GeminiError::Blocked(reason));
        }

        Ok(self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default())
    }
}

impl Generator for GeminiClient {
    type Error = GeminiError;

    fn model(&self) -> &str {
        &self.model
    }

    #[tracing::instrument(skip_all, fields(model = %self.model))]
    async fn generate(&self, prompt: &ItineraryPrompt) -> Result<String, Self::Error> {
        let text = self
            .send_generate_request(prompt)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to generate itinerary"))?
            .into_text()?;

        if text.is_empty() {
            return Err(GeminiError::EmptyResponse);
        }
        Ok(text)
    }

    #[tracing::instrument(skip_all, fields(model = %self.model))]
    async fn generate_stream(
        &self,
        prompt: &ItineraryPrompt,
    ) -> Result<TextStream<Self::Error>, Self::Error> {
        self.send_stream_request(prompt)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to open generation stream"))
    }
}
