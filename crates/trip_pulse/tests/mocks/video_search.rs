use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use trip_pulse::{types::VideoCandidate, yt::VideoSearch};

/// Answers each query from a fixed table; unknown queries return no videos.
#[derive(Clone, Default)]
pub struct MockVideoSearch {
    pub results: HashMap<String, Vec<VideoCandidate>>,
    pub calls: Arc<Mutex<Vec<(String, u32)>>>,
    pub fail_with: Option<String>,
    /// Never answer.
    pub stalls: bool,
}

impl MockVideoSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(mut self, query: &str, videos: Vec<VideoCandidate>) -> Self {
        self.results.insert(query.to_string(), videos);
        self
    }

    /// Returns `videos` for every query.
    pub fn always(videos: Vec<VideoCandidate>) -> Self {
        Self {
            results: HashMap::from([("*".to_string(), videos)]),
            ..Default::default()
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }

    pub fn stalling() -> Self {
        Self {
            stalls: true,
            ..Default::default()
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(query, _)| query.clone())
            .collect()
    }
}

impl VideoSearch for MockVideoSearch {
    type Error = anyhow::Error;

    async fn search(&self, query: &str, max_results: u32) -> anyhow::Result<Vec<VideoCandidate>> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), max_results));
        if self.stalls {
            futures::future::pending::<()>().await;
        }
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        let videos = self
            .results
            .get(query)
            .or_else(|| self.results.get("*"))
            .cloned()
            .unwrap_or_default();
        Ok(videos.into_iter().take(max_results as usize).collect())
    }
}
