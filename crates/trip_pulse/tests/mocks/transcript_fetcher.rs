use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};
use trip_pulse::yt::{TranscriptFetcher, TranscriptSegment};

/// Returns a one-segment transcript `"transcript of {id}"` unless the id is listed as failing.
#[derive(Clone, Default)]
pub struct MockTranscriptFetcher {
    pub failing_ids: HashSet<String>,
    pub empty_ids: HashSet<String>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockTranscriptFetcher {
    pub fn failing_for(ids: &[&str]) -> Self {
        Self {
            failing_ids: ids.iter().map(|id| id.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn empty_for(mut self, ids: &[&str]) -> Self {
        self.empty_ids = ids.iter().map(|id| id.to_string()).collect();
        self
    }
}

impl TranscriptFetcher for MockTranscriptFetcher {
    type Error = anyhow::Error;

    async fn fetch_transcript(&self, video_id: &str) -> anyhow::Result<Vec<TranscriptSegment>> {
        self.calls.lock().unwrap().push(video_id.to_string());
        if self.failing_ids.contains(video_id) {
            return Err(anyhow::anyhow!("captions disabled for {}", video_id));
        }
        if self.empty_ids.contains(video_id) {
            return Ok(Vec::new());
        }
        Ok(vec![TranscriptSegment {
            start_ms: 0,
            duration_ms: 1_000,
            text: format!("transcript of {video_id}"),
        }])
    }
}
