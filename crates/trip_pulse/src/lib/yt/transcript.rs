use std::{fmt, sync::LazyLock};

use regex::Regex;
use yt_transcript_rs::api::YouTubeTranscriptApi;

use crate::yt::TranscriptFetcher;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("Failed to initialise transcript client: {0}")]
    Client(String),
    #[error("Could not retrieve transcript for video {video_id}: {reason}")]
    Unavailable { video_id: String, reason: String },
    #[error("No transcript available for video {0}")]
    NoTranscript(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    pub start_ms: u64,
    pub duration_ms: u64,
    pub text: String,
}

/// Fetches captions through the video's player response, so both uploaded
/// and auto-generated tracks are found.
pub struct CaptionClient {
    api: YouTubeTranscriptApi,
    languages: Vec<String>,
}

impl fmt::Debug for CaptionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptionClient")
            .field("languages", &self.languages)
            .finish_non_exhaustive()
    }
}

impl CaptionClient {
    /// `languages` is in order of preference.
    pub fn new<L>(languages: impl IntoIterator<Item = L>) -> Result<Self, TranscriptError>
    where
        L: Into<String>,
    {
        let api = YouTubeTranscriptApi::new(None, None, None)
            .map_err(|e| TranscriptError::Client(e.to_string()))?;

        Ok(Self {
            api,
            languages: languages.into_iter().map(Into::into).collect(),
        })
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }
}

/// Converts `(start_secs, duration_secs, text)` snippets into ordered,
/// non-empty segments with collapsed whitespace.
pub fn into_segments<I>(video_id: &str, snippets: I) -> Result<Vec<TranscriptSegment>, TranscriptError>
where
    I: IntoIterator<Item = (f64, f64, String)>,
{
    let segments = snippets
        .into_iter()
        .filter_map(|(start, duration, text)| {
            let text = WHITESPACE_RE.replace_all(text.trim(), " ").into_owned();
            (!text.is_empty()).then(|| TranscriptSegment {
                start_ms: secs_to_ms(start),
                duration_ms: secs_to_ms(duration),
                text,
            })
        })
        .collect::<Vec<_>>();

    if segments.is_empty() {
        return Err(TranscriptError::NoTranscript(video_id.to_string()));
    }

    Ok(segments)
}

fn secs_to_ms(secs: f64) -> u64 {
    (secs.max(0.0) * 1000.0).round() as u64
}

impl TranscriptFetcher for CaptionClient {
    type Error = TranscriptError;

    #[tracing::instrument(skip(self), fields(languages = ?self.languages))]
    async fn fetch_transcript(&self, video_id: &str) -> Result<Vec<TranscriptSegment>, Self::Error> {
        let languages = self.languages.iter().map(String::as_str).collect::<Vec<_>>();

        let transcript = self
            .api
            .fetch_transcript(video_id, &languages, false)
            .await
            .map_err(|e| TranscriptError::Unavailable {
                video_id: video_id.to_string(),
                reason: e.to_string(),
            })?;

        tracing::debug!(
            language = %transcript.language_code,
            is_generated = transcript.is_generated,
            snippets = transcript.snippets.len(),
            "Fetched transcript"
        );

        into_segments(
            video_id,
            transcript
                .snippets
                .into_iter()
                .map(|snippet| (snippet.start, snippet.duration, snippet.text)),
        )
    }
}
