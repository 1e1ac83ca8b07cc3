use std::time::Duration;

use crate::{
    gatherer::{EvidenceGatherer, SearchLimits},
    llm::generator::Generator,
    types::{DeliveryMode, EvidenceSource},
    yt::{TranscriptFetcher, VideoSearch},
    ItineraryPipeline,
};

pub struct ItineraryPipelineBuilder<S = (), T = (), G = ()> {
    video_search: S,
    transcript_fetcher: T,
    generator: G,
    evidence_source: EvidenceSource,
    delivery: DeliveryMode,
    limits: SearchLimits,
    transcript_concurrency: usize,
    deadline: Duration,
}

impl Default for ItineraryPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ItineraryPipelineBuilder {
    pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(60);

    pub fn new() -> Self {
        Self {
            video_search: (),
            transcript_fetcher: (),
            generator: (),
            evidence_source: EvidenceSource::default(),
            delivery: DeliveryMode::default(),
            limits: SearchLimits::default(),
            transcript_concurrency: 1,
            deadline: Self::DEFAULT_DEADLINE,
        }
    }
}

impl<S, T, G> ItineraryPipelineBuilder<S, T, G> {
    pub fn video_search<S2: VideoSearch + Send + Sync + 'static>(
        self,
        video_search: S2,
    ) -> ItineraryPipelineBuilder<S2, T, G> {
        ItineraryPipelineBuilder {
            video_search,
            transcript_fetcher: self.transcript_fetcher,
            generator: self.generator,
            evidence_source: self.evidence_source,
            delivery: self.delivery,
            limits: self.limits,
            transcript_concurrency: self.transcript_concurrency,
            deadline: self.deadline,
        }
    }

    pub fn transcript_fetcher<T2: TranscriptFetcher + Send + Sync + 'static>(
        self,
        transcript_fetcher: T2,
    ) -> ItineraryPipelineBuilder<S, T2, G> {
        ItineraryPipelineBuilder {
            video_search: self.video_search,
            transcript_fetcher,
            generator: self.generator,
            evidence_source: self.evidence_source,
            delivery: self.delivery,
            limits: self.limits,
            transcript_concurrency: self.transcript_concurrency,
            deadline: self.deadline,
        }
    }

    pub fn generator<G2: Generator + Send + Sync + 'static>(
        self,
        generator: G2,
    ) -> ItineraryPipelineBuilder<S, T, G2> {
        ItineraryPipelineBuilder {
            video_search: self.video_search,
            transcript_fetcher: self.transcript_fetcher,
            generator,
            evidence_source: self.evidence_source,
            delivery: self.delivery,
            limits: self.limits,
            transcript_concurrency: self.transcript_concurrency,
            deadline: self.deadline,
        }
    }

    pub fn evidence_source(mut self, evidence_source: EvidenceSource) -> Self {
        self.evidence_source = evidence_source;
        self
    }

    pub fn delivery(mut self, delivery: DeliveryMode) -> Self {
        self.delivery = delivery;
        self
    }

    pub fn search_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn transcript_concurrency(mut self, concurrency: usize) -> Self {
        self.transcript_concurrency = concurrency;
        self
    }

    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }
}

impl<S, T, G> ItineraryPipelineBuilder<S, T, G>
where
    S: VideoSearch + Send + Sync + 'static,
    T: TranscriptFetcher + Send + Sync + 'static,
    G: Generator + Send + Sync + 'static,
{
    pub fn build(self) -> ItineraryPipeline<S, T, G> {
        let gatherer =
            EvidenceGatherer::new(self.video_search, self.transcript_fetcher, self.evidence_source)
                .with_limits(self.limits)
                .with_transcript_concurrency(self.transcript_concurrency);

        ItineraryPipeline {
            gatherer,
            generator: self.generator,
            delivery: self.delivery,
            deadline: self.deadline,
        }
    }
}
