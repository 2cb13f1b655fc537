//! RetrievalOrchestrator: bounded parallel fan-out with per-call deadlines.
//!
//! One search per resolved collection runs on a fixed-size worker pool.
//! Collections that miss the deadline or fail are recorded in diagnostics
//! and contribute nothing, so a single bad collection never aborts the batch.
//! The merged ranking is deterministic regardless of completion order.

use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use glyco_core::config::RetrievalConfig;
use glyco_core::errors::VectorStoreError;
use glyco_core::models::{
    CollectionFailure, CollectionFailureKind, QueryCategory, RetrievalDiagnostics,
    RetrievalQuality, RetrievalResult,
};
use glyco_core::session::{CollectionId, SessionHash};
use glyco_core::traits::{IVectorStore, SearchHit};
use glyco_core::Confidence;
use glyco_personalization::PersonalizationEngine;

use crate::collection_map::CollectionMap;

type SearchOutcome = (CollectionId, Result<Vec<SearchHit>, VectorStoreError>);

pub struct RetrievalOrchestrator {
    store: Arc<dyn IVectorStore>,
    map: CollectionMap,
    personalization: Option<Arc<PersonalizationEngine>>,
    config: RetrievalConfig,
}

impl RetrievalOrchestrator {
    pub fn new(store: Arc<dyn IVectorStore>, map: CollectionMap, config: RetrievalConfig) -> Self {
        Self {
            store,
            map,
            personalization: None,
            config,
        }
    }

    /// Attach the personalization engine used for post-merge boosting.
    pub fn with_personalization(mut self, engine: Arc<PersonalizationEngine>) -> Self {
        self.personalization = Some(engine);
        self
    }

    /// Retrieve for a set of categories. Never errors: every failure path
    /// degrades to fewer chunks, surfaced only through diagnostics.
    pub fn retrieve(
        &self,
        query: &str,
        categories: &[QueryCategory],
        session: Option<&SessionHash>,
    ) -> (Vec<RetrievalResult>, RetrievalQuality, RetrievalDiagnostics) {
        let collections = self.map.resolve_all(categories);
        if collections.is_empty() {
            debug!(?categories, "no collections resolved, empty batch");
            return (
                Vec::new(),
                RetrievalQuality::empty(),
                RetrievalDiagnostics::default(),
            );
        }

        let (per_collection, mut diagnostics) = self.fan_out(query, &collections);

        // Merge in collection-priority order so the pre-sort layout is
        // independent of the fan-out's completion order.
        let mut merged: Vec<RetrievalResult> = Vec::new();
        for collection in &collections {
            let Some(hits) = per_collection.get(collection) else {
                continue;
            };
            for hit in hits {
                merged.push(RetrievalResult {
                    text: hit.text.clone(),
                    confidence: Confidence::from_distance(hit.distance),
                    collection_id: collection.clone(),
                    is_user_device: false,
                    distance: hit.distance,
                });
            }
        }

        let mut deduped = dedupe_by_text(merged);

        if let Some(personalization) = &self.personalization {
            deduped = personalization.boost(deduped, session);
        }

        // Stable sort: boosted confidence descending, collection priority
        // breaking ties.
        deduped.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    self.map
                        .priority_of(&a.collection_id)
                        .cmp(&self.map.priority_of(&b.collection_id))
                })
        });
        deduped.truncate(self.config.top_k);

        let quality = RetrievalQuality::from_results(&deduped);
        diagnostics.collections_attempted = collections.len();
        info!(
            chunks = quality.chunk_count,
            avg_confidence = quality.average_confidence,
            coverage = ?quality.coverage,
            attempted = diagnostics.collections_attempted,
            returned = diagnostics.collections_returned,
            "retrieval batch complete"
        );
        (deduped, quality, diagnostics)
    }

    /// Dispatch one search per collection over a bounded worker pool and
    /// collect until the per-call deadline. Collections unheard from by the
    /// deadline are abandoned: their worker threads outlive the batch but
    /// their sends land in a closed channel.
    fn fan_out(
        &self,
        query: &str,
        collections: &[CollectionId],
    ) -> (HashMap<CollectionId, Vec<SearchHit>>, RetrievalDiagnostics) {
        let timeout = Duration::from_millis(self.config.collection_timeout_ms);
        let deadline = Instant::now() + timeout;
        let workers = self.config.max_parallel_fetches.min(collections.len());

        let queue: Arc<Mutex<VecDeque<CollectionId>>> =
            Arc::new(Mutex::new(collections.iter().cloned().collect()));
        let (tx, rx) = mpsc::channel::<SearchOutcome>();

        for _ in 0..workers {
            let store = Arc::clone(&self.store);
            let queue = Arc::clone(&queue);
            let tx = tx.clone();
            let query = query.to_string();
            let top_k = self.config.per_collection_k;
            thread::spawn(move || loop {
                let next = queue.lock().ok().and_then(|mut q| q.pop_front());
                let Some(collection) = next else { break };
                let outcome = store.search(&collection, &query, top_k);
                if tx.send((collection, outcome)).is_err() {
                    break;
                }
            });
        }
        drop(tx);

        let mut per_collection: HashMap<CollectionId, Vec<SearchHit>> = HashMap::new();
        let mut diagnostics = RetrievalDiagnostics::default();
        let mut heard = 0usize;

        while heard < collections.len() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok((collection, Ok(hits))) => {
                    heard += 1;
                    diagnostics.collections_returned += 1;
                    per_collection.insert(collection, hits);
                }
                Ok((collection, Err(e))) => {
                    heard += 1;
                    let kind = match &e {
                        VectorStoreError::CollectionNotFound { .. } => {
                            warn!(collection = %collection, "collection not found");
                            CollectionFailureKind::NotFound
                        }
                        VectorStoreError::Timeout { .. } => CollectionFailureKind::Timeout,
                        VectorStoreError::Backend { .. } => {
                            warn!(collection = %collection, error = %e, "vector store backend failure");
                            CollectionFailureKind::Backend
                        }
                    };
                    diagnostics.failures.push(CollectionFailure {
                        collection_id: collection,
                        kind,
                        detail: e.to_string(),
                    });
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        // Whatever we did not hear from is a timeout.
        for collection in collections {
            let answered = per_collection.contains_key(collection)
                || diagnostics
                    .failures
                    .iter()
                    .any(|f| &f.collection_id == collection);
            if !answered {
                warn!(collection = %collection, timeout_ms = self.config.collection_timeout_ms, "collection missed deadline");
                diagnostics.failures.push(CollectionFailure {
                    collection_id: collection.clone(),
                    kind: CollectionFailureKind::Timeout,
                    detail: format!("no response within {}ms", self.config.collection_timeout_ms),
                });
            }
        }

        (per_collection, diagnostics)
    }
}

/// Deduplicate by normalized text content. The first occurrence (priority
/// order) wins unless a later duplicate is strictly more confident.
fn dedupe_by_text(results: Vec<RetrievalResult>) -> Vec<RetrievalResult> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<RetrievalResult> = Vec::new();
    for result in results {
        let normalized = result
            .text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        let key = blake3::hash(normalized.as_bytes()).to_hex().to_string();
        match seen.get(&key) {
            Some(&idx) => {
                if result.confidence > out[idx].confidence {
                    out[idx] = result;
                }
            }
            None => {
                seen.insert(key, out.len());
                out.push(result);
            }
        }
    }
    out
}
