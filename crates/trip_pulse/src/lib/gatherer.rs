//! # Evidence gathering
//!
//! Turns a [`TripRequest`] into an [`EvidenceBlob`] by searching for travel
//! videos and reading either their search snippets or their transcripts.
//! A specific query is tried first; when it yields no usable text a broad
//! destination-only query is tried with a larger result cap.

use futures::StreamExt;
use itertools::{Either, Itertools};

use crate::{
    error::Error,
    types::{EvidenceBlob, EvidenceSource, TripRequest, VideoCandidate},
    yt::{TranscriptFetcher, TranscriptSegment, VideoSearch},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub primary_max_results: u32,
    pub fallback_max_results: u32,
}

impl SearchLimits {
    /// Largest `maxResults` the YouTube search endpoint accepts.
    pub const MAX_RESULTS: u32 = 50;

    /// Caps both limits to `1..=MAX_RESULTS`.
    pub fn clamped(self) -> Self {
        Self {
            primary_max_results: self.primary_max_results.clamp(1, Self::MAX_RESULTS),
            fallback_max_results: self.fallback_max_results.clamp(1, Self::MAX_RESULTS),
        }
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            primary_max_results: 5,
            fallback_max_results: 10,
        }
    }
}

/// A video whose transcript could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedVideo {
    pub video_id: String,
    pub reason: String,
}

/// Outcome of collecting transcripts: the usable evidence plus what was skipped.
#[derive(Debug, Clone)]
pub struct TranscriptHarvest {
    pub evidence: EvidenceBlob,
    pub skipped: Vec<SkippedVideo>,
}

#[derive(Debug)]
pub struct EvidenceGatherer<S, T> {
    search: S,
    transcripts: T,
    source: EvidenceSource,
    limits: SearchLimits,
    transcript_concurrency: usize,
}

impl<S, T> EvidenceGatherer<S, T>
where
    S: VideoSearch + Send + Sync,
    T: TranscriptFetcher + Send + Sync,
{
    pub fn new(search: S, transcripts: T, source: EvidenceSource) -> Self {
        Self {
            search,
            transcripts,
            source,
            limits: SearchLimits::default(),
            transcript_concurrency: 1,
        }
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits.clamped();
        self
    }

    /// Number of transcripts fetched at once. `1` fetches sequentially.
    pub fn with_transcript_concurrency(mut self, concurrency: usize) -> Self {
        self.transcript_concurrency = concurrency.max(1);
        self
    }

    pub fn source(&self) -> EvidenceSource {
        self.source
    }

    #[tracing::instrument(skip(self))]
    pub async fn search(&self, query: &str, max_results: u32) -> Result<Vec<VideoCandidate>, Error> {
        self.search
            .search(query, max_results)
            .await
            .map_err(|e| Error::SearchFailed(e.to_string()))
            .inspect_err(|e| tracing::error!(error = %e, "Video search failed"))
    }

    /// One `title + description` fragment per candidate, in the given order.
    pub fn collect_snippet_text(candidates: &[VideoCandidate]) -> EvidenceBlob {
        let fragments = candidates
            .iter()
            .filter(|v| !(v.title.trim().is_empty() && v.description.trim().is_empty()))
            .map(|v| {
                format!(
                    "Video Title: {}\nVideo Description: {}",
                    v.title, v.description
                )
            })
            .collect::<Vec<_>>();

        EvidenceBlob::new(EvidenceSource::Snippets, fragments)
    }

    /// Fetches a transcript for every candidate. Failed or empty transcripts are
    /// skipped and reported in [`TranscriptHarvest::skipped`]; they never fail the call.
    #[tracing::instrument(skip_all, fields(count = candidates.len()))]
    pub async fn collect_transcript_text(&self, candidates: Vec<VideoCandidate>) -> TranscriptHarvest {
        let outcomes = futures::stream::iter(candidates)
            .map(|video| async move {
                let outcome = self
                    .transcripts
                    .fetch_transcript(&video.id)
                    .await
                    .map_err(|e| e.to_string());
                (video, outcome)
            })
            // `buffered` keeps candidate order regardless of completion order
            .buffered(self.transcript_concurrency)
            .collect::<Vec<_>>()
            .await;

        let (fragments, skipped): (Vec<_>, Vec<_>) =
            outcomes
                .into_iter()
                .partition_map(|(video, outcome)| match outcome {
                    Ok(segments) if !segments.is_empty() => {
                        Either::Left(transcript_fragment(&video, &segments))
                    }
                    Ok(_) => Either::Right(SkippedVideo {
                        video_id: video.id,
                        reason: "empty transcript".into(),
                    }),
                    Err(reason) => Either::Right(SkippedVideo {
                        video_id: video.id,
                        reason,
                    }),
                });

        for skip in &skipped {
            tracing::warn!(video_id = %skip.video_id, reason = %skip.reason, "Skipping video transcript");
        }
        tracing::info!(
            collected = fragments.len(),
            skipped = skipped.len(),
            "Collected video transcripts"
        );

        TranscriptHarvest {
            evidence: EvidenceBlob::new(EvidenceSource::Transcripts, fragments),
            skipped,
        }
    }

    async fn collect(&self, candidates: Vec<VideoCandidate>) -> EvidenceBlob {
        match self.source {
            EvidenceSource::Snippets => Self::collect_snippet_text(&candidates),
            EvidenceSource::Transcripts => self.collect_transcript_text(candidates).await.evidence,
        }
    }

    /// Searches with the specific trip query, then with the broad destination
    /// query if the first attempt produced no evidence.
    #[tracing::instrument(skip_all, fields(destination = %trip.destination))]
    pub async fn gather_with_fallback(&self, trip: &TripRequest) -> Result<EvidenceBlob, Error> {
        let attempts = [
            (trip.specific_query(), self.limits.primary_max_results),
            (trip.broad_query(), self.limits.fallback_max_results),
        ];
        let mut videos_seen = 0;

        for (attempt, (query, max_results)) in attempts.into_iter().enumerate() {
            if attempt > 0 {
                tracing::info!(%query, "No evidence from specific query, broadening search");
            }

            let candidates = self.search(&query, max_results).await?;
            if candidates.is_empty() {
                tracing::info!(%query, "No videos found");
                continue;
            }
            videos_seen += candidates.len();

            let evidence = self.collect(candidates).await;
            if !evidence.is_empty() {
                tracing::info!(
                    %query,
                    fragments = evidence.fragments().len(),
                    "Gathered video evidence"
                );
                return Ok(evidence);
            }
        }

        Err(Error::NoEvidenceFound { videos_seen })
    }
}

fn transcript_fragment(video: &VideoCandidate, segments: &[TranscriptSegment]) -> String {
    let text = segments.iter().map(|s| s.text.as_str()).join(" ");
    format!("Video Title: {}\nVideo Transcript: {}", video.title, text)
}
