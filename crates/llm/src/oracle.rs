//! Budgeted wrapper around a generation-oracle backend.
//!
//! Every external call in the engine goes through [`Oracle::generate`],
//! which folds transport failures (timeout, network, quota) into a `None`
//! sentinel so downstream logic has exactly one failure shape to check.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tracing::{debug, warn};

use crate::provider::{LlmProvider, Message};

pub struct Oracle {
    provider: Box<dyn LlmProvider>,
    max_queries: usize,
    queries: AtomicUsize,
    delay: Duration,
}

impl Oracle {
    pub fn new(provider: Box<dyn LlmProvider>, max_queries: usize, delay: Duration) -> Self {
        Self {
            provider,
            max_queries,
            queries: AtomicUsize::new(0),
            delay,
        }
    }

    /// One blocking round-trip to the oracle. Returns `None` when the query
    /// budget is exhausted or the call fails; neither is fatal to a pass.
    pub async fn generate(&self, prompt: &str) -> Option<String> {
        let used = self.queries.fetch_add(1, Ordering::SeqCst);
        if used >= self.max_queries {
            warn!(
                max_queries = self.max_queries,
                "oracle query budget exhausted, skipping call"
            );
            return None;
        }

        debug!(query = used + 1, prompt_len = prompt.len(), "oracle call");
        match self.provider.complete(vec![Message::user(prompt)]).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(error = %e, "oracle call failed");
                None
            }
        }
    }

    /// Number of oracle calls attempted so far in this run.
    pub fn queries_used(&self) -> usize {
        self.queries.load(Ordering::SeqCst).min(self.max_queries)
    }

    /// Observe the configured inter-call delay. The synthesis pass calls
    /// this after each oracle round-trip to respect external rate limits.
    pub async fn pace(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}
