use std::{fmt::Display, future::Future};

use futures::stream::BoxStream;

use crate::types::ItineraryPrompt;

/// Incremental text fragments as produced by a model.
pub type TextStream<E> = BoxStream<'static, Result<String, E>>;

pub trait Generator {
    type Error: Display + Send + 'static;

    /// Model identifier requests are sent to.
    fn model(&self) -> &str;

    /// Blocks until generation completes and returns the full text.
    fn generate(
        &self,
        prompt: &ItineraryPrompt,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;

    /// Opens an incremental generation channel. Dropping the stream aborts generation.
    fn generate_stream(
        &self,
        prompt: &ItineraryPrompt,
    ) -> impl Future<Output = Result<TextStream<Self::Error>, Self::Error>> + Send;
}
