#![allow(dead_code)]

pub mod generator;
pub mod transcript_fetcher;
pub mod video_search;

use trip_pulse::types::VideoCandidate;

pub fn video(id: &str, title: &str, description: &str) -> VideoCandidate {
    VideoCandidate {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
    }
}
