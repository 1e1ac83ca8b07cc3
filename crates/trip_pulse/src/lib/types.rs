use std::fmt;

use futures::stream::BoxStream;

use crate::error::Error;

/// A validated set of trip parameters.
///
/// All fields are non-empty; `duration` is kept as the caller sent it and is
/// only ever interpolated into text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripRequest {
    pub destination: String,
    pub start_location: String,
    pub duration: String,
    pub trip_type: String,
    pub budget: String,
}

impl TripRequest {
    /// `"{duration} day {tripType} trip to {destination} from {startLocation} travel guide"`
    pub fn specific_query(&self) -> String {
        format!(
            "{} day {} trip to {} from {} travel guide",
            self.duration, self.trip_type, self.destination, self.start_location
        )
    }

    /// Broadened query used when the specific one yields nothing. Drops style and origin.
    pub fn broad_query(&self) -> String {
        format!("{} travel guide", self.destination)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoCandidate {
    pub id: String,
    pub title: String,
    pub description: String,
}

/// Where the evidence text of a video comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum EvidenceSource {
    /// Title and description from the search result
    #[default]
    Snippets,
    /// Full spoken transcript of the video
    Transcripts,
}

impl EvidenceSource {
    pub fn label(&self) -> &'static str {
        match self {
            EvidenceSource::Snippets => "Titles and Descriptions",
            EvidenceSource::Transcripts => "Transcripts",
        }
    }
}

/// How the generated itinerary is delivered to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum DeliveryMode {
    Buffered,
    #[default]
    Streaming,
}

/// Ordered per-video text fragments gathered for a trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceBlob {
    source: EvidenceSource,
    fragments: Vec<String>,
}

impl EvidenceBlob {
    pub const DELIMITER: &'static str = "\n\n---\n\n";

    pub fn new(source: EvidenceSource, fragments: Vec<String>) -> Self {
        Self { source, fragments }
    }

    pub fn source(&self) -> EvidenceSource {
        self.source
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn text(&self) -> String {
        self.fragments.join(Self::DELIMITER)
    }
}

/// Rendered instruction document handed to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItineraryPrompt(String);

impl ItineraryPrompt {
    pub(crate) fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItineraryPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lazy, single-pass sequence of generated text fragments.
pub type FragmentStream = BoxStream<'static, Result<String, Error>>;

pub enum ItineraryResult {
    Complete(String),
    Stream(FragmentStream),
}

impl fmt::Debug for ItineraryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItineraryResult::Complete(text) => f.debug_tuple("Complete").field(text).finish(),
            ItineraryResult::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}
