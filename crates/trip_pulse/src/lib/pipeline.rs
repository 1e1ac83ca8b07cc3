pub mod builder;

use std::{collections::HashMap, fmt::Display, time::Duration};

use futures::{future, stream, StreamExt, TryStreamExt};
use tokio::time::Instant;

use crate::{
    error::Error,
    gatherer::EvidenceGatherer,
    llm::generator::Generator,
    prompt::build_prompt,
    types::{DeliveryMode, FragmentStream, ItineraryPrompt, ItineraryResult, TripRequest},
    validator::validate,
    yt::{TranscriptFetcher, VideoSearch},
};

// The request-scoped itinerary pipeline: validate, gather, prompt, generate
#[derive(Debug)]
pub struct ItineraryPipeline<S, T, G>
where
    S: VideoSearch + Send + Sync + 'static,
    T: TranscriptFetcher + Send + Sync + 'static,
    G: Generator + Send + Sync + 'static,
{
    pub(crate) gatherer: EvidenceGatherer<S, T>,
    pub(crate) generator: G,
    pub(crate) delivery: DeliveryMode,
    pub(crate) deadline: Duration,
}

fn generation_failed(e: impl Display) -> Error {
    Error::GenerationFailed(e.to_string())
}

impl<S, T, G> ItineraryPipeline<S, T, G>
where
    S: VideoSearch + Send + Sync + 'static,
    T: TranscriptFetcher + Send + Sync + 'static,
    G: Generator + Send + Sync + 'static,
{
    pub fn gatherer(&self) -> &EvidenceGatherer<S, T> {
        &self.gatherer
    }

    pub fn delivery(&self) -> DeliveryMode {
        self.delivery
    }

    /// Runs the whole pipeline for a raw parameter map.
    #[tracing::instrument(skip_all)]
    pub async fn run(&self, params: &HashMap<String, String>) -> Result<ItineraryResult, Error> {
        let trip = validate(params)
            .inspect_err(|e| tracing::warn!(error = %e, "Rejected itinerary request"))?;
        self.plan(trip).await
    }

    /// Gathers evidence and generates an itinerary for an already validated trip.
    ///
    /// Everything up to the first generated fragment must finish within the
    /// configured deadline; a stream still running at the deadline ends with
    /// [`Error::DeadlineExceeded`].
    #[tracing::instrument(skip(self), fields(delivery = ?self.delivery, model = self.generator.model()))]
    pub async fn plan(&self, trip: TripRequest) -> Result<ItineraryResult, Error> {
        let deadline = Instant::now() + self.deadline;

        tokio::time::timeout_at(deadline, self.plan_until(&trip, deadline))
            .await
            .map_err(|_| Error::DeadlineExceeded(self.deadline))
            .inspect_err(|e| tracing::error!(error = %e, "Itinerary deadline exceeded"))?
    }

    async fn plan_until(
        &self,
        trip: &TripRequest,
        deadline: Instant,
    ) -> Result<ItineraryResult, Error> {
        let evidence = self.gatherer.gather_with_fallback(trip).await?;
        let prompt = build_prompt(trip, &evidence);

        match self.delivery {
            DeliveryMode::Buffered => self.generate(&prompt).await.map(ItineraryResult::Complete),
            DeliveryMode::Streaming => self
                .generate_stream(&prompt, deadline)
                .await
                .map(ItineraryResult::Stream),
        }
    }

    async fn generate(&self, prompt: &ItineraryPrompt) -> Result<String, Error> {
        let text = self
            .generator
            .generate(prompt)
            .await
            .map_err(generation_failed)?;

        if text.trim().is_empty() {
            return Err(Error::GenerationFailed("model returned no content".into()));
        }
        Ok(text)
    }

    /// Opens the model stream and waits for its first fragment, so failures
    /// before any output can still become an error status.
    async fn generate_stream(
        &self,
        prompt: &ItineraryPrompt,
        deadline: Instant,
    ) -> Result<FragmentStream, Error> {
        let mut upstream = self
            .generator
            .generate_stream(prompt)
            .await
            .map_err(generation_failed)?
            .map_err(generation_failed);

        let first = match upstream.next().await {
            Some(Ok(fragment)) => fragment,
            Some(Err(e)) => return Err(e),
            None => return Err(Error::GenerationFailed("model returned no content".into())),
        };

        let limit = self.deadline;
        let rest = stream::unfold(Some(upstream), move |upstream| async move {
            let mut upstream = upstream?;
            match tokio::time::timeout_at(deadline, upstream.next()).await {
                Ok(Some(item)) => Some((item, Some(upstream))),
                Ok(None) => None,
                // Terminal error so the chunked body is aborted, not completed.
                Err(_) => Some((Err(Error::DeadlineExceeded(limit)), None)),
            }
        });

        let fragments = stream::once(future::ready(Ok(first)))
            .chain(rest)
            .inspect_err(|e| tracing::error!(error = %e, "Generation failed mid-stream"));

        Ok(fragments.boxed())
    }
}
