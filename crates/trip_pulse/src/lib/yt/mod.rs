pub mod search;
pub mod transcript;

use std::{fmt::Display, future::Future};

use crate::types::VideoCandidate;

pub use search::{YouTubeClient, YouTubeError};
pub use transcript::{CaptionClient, TranscriptError, TranscriptSegment};

pub trait VideoSearch {
    type Error: Display;

    /// Returns videos for `query` in provider relevance order. An empty list is not an error.
    fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> impl Future<Output = Result<Vec<VideoCandidate>, Self::Error>> + Send;
}

pub trait TranscriptFetcher {
    type Error: Display;

    fn fetch_transcript(
        &self,
        video_id: &str,
    ) -> impl Future<Output = Result<Vec<TranscriptSegment>, Self::Error>> + Send;
}
