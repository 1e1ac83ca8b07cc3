use reqwest::Client;
use serde::Deserialize;

use crate::{types::VideoCandidate, yt::VideoSearch};

/// YouTube Data API v3 client.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum YouTubeError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

impl YouTubeClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_key)
    }

    pub fn with_client(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: "https://www.googleapis.com/youtube/v3".into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub async fn send_search_request(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<SearchListResponse, YouTubeError> {
        let max_results = max_results.to_string();
        let resp = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("part", "snippet"),
                ("q", query),
                ("type", "video"),
                ("maxResults", max_results.as_str()),
                ("order", "relevance"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(YouTubeError::Api { status, message });
        }

        Ok(resp.json::<SearchListResponse>().await?)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    pub id: SearchResultId,
    pub snippet: Option<SearchSnippet>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchResultId {
    pub video_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchSnippet {
    pub title: String,
    pub description: String,
}

impl SearchResult {
    /// Results that are not videos (channels, playlists) carry no `videoId` and map to `None`.
    pub fn into_candidate(self) -> Option<VideoCandidate> {
        let id = self.id.video_id?;
        let snippet = self.snippet.unwrap_or_default();
        Some(VideoCandidate {
            id,
            title: snippet.title,
            description: snippet.description,
        })
    }
}

impl VideoSearch for YouTubeClient {
    type Error = YouTubeError;

    #[tracing::instrument(skip(self))]
    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<VideoCandidate>, Self::Error> {
        let response = self.send_search_request(query, max_results).await?;

        let videos = response
            .items
            .into_iter()
            .filter_map(SearchResult::into_candidate)
            .collect::<Vec<_>>();

        if videos.is_empty() {
            tracing::info!("No videos found for query");
        }

        Ok(videos)
    }
}
