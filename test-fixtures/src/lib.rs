//! Shared test fakes for the Glyco workspace.
//!
//! `FakeVectorStore` serves scripted hits per collection and can inject
//! missing-collection, backend-failure, and latency conditions.
//! `FakeModel` replays scripted responses and records received prompts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use glyco_core::errors::{GenerationError, GlycoError, GlycoResult, VectorStoreError};
use glyco_core::session::CollectionId;
use glyco_core::traits::{GenerationConfig, IGenerativeModel, IVectorStore, SearchHit, TextStream};

/// Build a hit with the given text and distance.
pub fn hit(text: &str, distance: f64) -> SearchHit {
    SearchHit {
        text: text.to_string(),
        distance,
        metadata: HashMap::new(),
    }
}

enum CollectionScript {
    Hits(Vec<SearchHit>),
    NotFound,
    BackendFailure(String),
    /// Sleep before answering; used to exercise fan-out timeouts.
    Slow(Duration, Vec<SearchHit>),
}

/// In-memory vector store with per-collection scripts.
#[derive(Default)]
pub struct FakeVectorStore {
    scripts: Mutex<HashMap<CollectionId, CollectionScript>>,
}

impl FakeVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hits(self, collection: &str, hits: Vec<SearchHit>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(CollectionId::new(collection), CollectionScript::Hits(hits));
        self
    }

    pub fn with_missing(self, collection: &str) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(CollectionId::new(collection), CollectionScript::NotFound);
        self
    }

    pub fn with_failure(self, collection: &str, reason: &str) -> Self {
        self.scripts.lock().unwrap().insert(
            CollectionId::new(collection),
            CollectionScript::BackendFailure(reason.to_string()),
        );
        self
    }

    pub fn with_slow(self, collection: &str, delay: Duration, hits: Vec<SearchHit>) -> Self {
        self.scripts.lock().unwrap().insert(
            CollectionId::new(collection),
            CollectionScript::Slow(delay, hits),
        );
        self
    }
}

impl IVectorStore for FakeVectorStore {
    fn search(
        &self,
        collection: &CollectionId,
        _query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchHit>, VectorStoreError> {
        let scripts = self.scripts.lock().unwrap();
        match scripts.get(collection) {
            Some(CollectionScript::Hits(hits)) => Ok(hits.iter().take(top_k).cloned().collect()),
            Some(CollectionScript::NotFound) | None => Err(VectorStoreError::CollectionNotFound {
                collection: collection.to_string(),
            }),
            Some(CollectionScript::BackendFailure(reason)) => Err(VectorStoreError::Backend {
                reason: reason.clone(),
            }),
            Some(CollectionScript::Slow(delay, hits)) => {
                let delay = *delay;
                let hits: Vec<SearchHit> = hits.iter().take(top_k).cloned().collect();
                drop(scripts);
                std::thread::sleep(delay);
                Ok(hits)
            }
        }
    }
}

/// Scripted generative model. Responses are consumed in order; the last one
/// repeats once the script runs out. `Err` entries simulate failed calls.
pub struct FakeModel {
    responses: Mutex<Vec<Result<String, String>>>,
    cursor: AtomicUsize,
    delay: Option<Duration>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    pub fn new(responses: Vec<Result<String, String>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            cursor: AtomicUsize::new(0),
            delay: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before every answer; used to exercise generation timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// A model that always returns the same answer.
    pub fn always(answer: &str) -> Self {
        Self::new(vec![Ok(answer.to_string())])
    }

    /// A model that always fails.
    pub fn always_failing(reason: &str) -> Self {
        Self::new(vec![Err(reason.to_string())])
    }

    pub fn call_count(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> Result<String, String> {
        let responses = self.responses.lock().unwrap();
        let idx = self.cursor.fetch_add(1, Ordering::SeqCst);
        responses
            .get(idx)
            .or_else(|| responses.last())
            .cloned()
            .unwrap_or_else(|| Err("no scripted response".to_string()))
    }
}

impl IGenerativeModel for FakeModel {
    fn generate(&self, prompt: &str, _config: &GenerationConfig) -> GlycoResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.next_response().map_err(|reason| {
            GlycoError::Generation(GenerationError::CallFailed { reason })
        })
    }

    fn generate_stream(&self, prompt: &str, config: &GenerationConfig) -> GlycoResult<TextStream> {
        // Stream the scripted answer in two chunks.
        let answer = self.generate(prompt, config)?;
        let mid = answer.len() / 2;
        let split = answer
            .char_indices()
            .map(|(i, _)| i)
            .min_by_key(|i| i.abs_diff(mid))
            .unwrap_or(0);
        let (a, b) = answer.split_at(split);
        let chunks = vec![Ok(a.to_string()), Ok(b.to_string())];
        Ok(Box::new(chunks.into_iter()))
    }
}
