use std::sync::{Arc, Mutex};

use futures::StreamExt;
use trip_pulse::{types::ItineraryPrompt, Generator, TextStream};

#[derive(Clone)]
pub struct MockGenerator {
    pub fragments: Vec<String>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<String>,
    /// Emit an error after this many fragments have been streamed.
    pub fail_after: Option<usize>,
    /// Keep the stream open without further output once the fragments run out.
    pub stalls: bool,
}

impl MockGenerator {
    pub fn new(response: &str) -> Self {
        Self::streaming(&[response])
    }

    pub fn streaming(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
            fail_after: None,
            stalls: false,
        }
    }

    pub fn stalling(fragments: &[&str]) -> Self {
        Self {
            stalls: true,
            ..Self::streaming(fragments)
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Self::streaming(&[])
        }
    }

    pub fn failing_after(mut self, fragments: usize, msg: &str) -> Self {
        self.fail_after = Some(fragments);
        self.fail_with = Some(msg.to_string());
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Generator for MockGenerator {
    type Error = anyhow::Error;

    fn model(&self) -> &str {
        "mock-gemini"
    }

    async fn generate(&self, prompt: &ItineraryPrompt) -> anyhow::Result<String> {
        self.calls.lock().unwrap().push(prompt.to_string());
        if self.stalls {
            futures::future::pending::<()>().await;
        }
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        Ok(self.fragments.concat())
    }

    async fn generate_stream(
        &self,
        prompt: &ItineraryPrompt,
    ) -> anyhow::Result<TextStream<anyhow::Error>> {
        self.calls.lock().unwrap().push(prompt.to_string());

        let mut items = self
            .fragments
            .iter()
            .cloned()
            .map(Ok)
            .collect::<Vec<anyhow::Result<String>>>();

        match (self.fail_after, &self.fail_with) {
            (Some(after), Some(msg)) => {
                items.truncate(after);
                items.push(Err(anyhow::anyhow!("{}", msg)));
            }
            (None, Some(msg)) => return Err(anyhow::anyhow!("{}", msg)),
            _ => {}
        }

        let fragments = futures::stream::iter(items);
        if self.stalls {
            return Ok(fragments.chain(futures::stream::pending()).boxed());
        }
        Ok(fragments.boxed())
    }
}
