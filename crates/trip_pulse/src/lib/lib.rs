mod error;
pub mod gatherer;
mod llm;
mod pipeline;
pub mod prompt;
pub mod server;
pub mod tracing;
pub mod types;
pub mod validator;
pub mod yt;

pub use error::Error;
pub use llm::gemini;
pub use llm::generator::{Generator, TextStream};
pub use pipeline::{builder::ItineraryPipelineBuilder, ItineraryPipeline};
