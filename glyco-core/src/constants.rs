/// Glyco engine version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minimum chunk count for `Coverage::Sufficient`.
pub const SUFFICIENT_MIN_CHUNKS: usize = 3;

/// Minimum average confidence for `Coverage::Sufficient`.
pub const SUFFICIENT_MIN_CONFIDENCE: f64 = 0.70;

/// Generated ratio used when retrieval is sparse. Kept at or above 0.7.
pub const SPARSE_GENERATED_RATIO: f64 = 0.85;

/// Fixed confidence assigned to the model's own (non-retrieved) knowledge
/// when computing a blended confidence.
pub const GENERATED_KNOWLEDGE_CONFIDENCE: f64 = 0.6;

/// Classification confidence is capped here regardless of matched terms.
pub const CLASSIFICATION_CONFIDENCE_CAP: f64 = 0.95;

/// Secondary categories must score within this band of the winner.
pub const SECONDARY_CATEGORY_BAND: f64 = 0.15;

/// Default per-collection retrieval timeout.
pub const DEFAULT_COLLECTION_TIMEOUT_MS: u64 = 5_000;

/// Default bounded worker count for retrieval fan-out.
pub const DEFAULT_MAX_PARALLEL_FETCHES: usize = 4;

/// Default number of results kept after merge/boost/truncate.
pub const DEFAULT_TOP_K: usize = 8;

/// Feedback learning: boost step for the very first feedback event.
pub const DEFAULT_BOOST_BASE_RATE: f64 = 0.05;

/// Feedback learning: decay factor regularizing later feedback.
pub const DEFAULT_BOOST_DECAY_FACTOR: f64 = 0.2;

/// Upper bound on any per-collection confidence boost.
pub const DEFAULT_MAX_BOOST: f64 = 0.2;

/// Minimum distinguishable source markers in a partially generated answer.
pub const DEFAULT_MIN_CITATIONS: usize = 3;

/// Answers shorter than this skip the citation-sufficiency check.
pub const DEFAULT_CITATION_MIN_ANSWER_CHARS: usize = 280;

/// Default generation retry cap.
pub const DEFAULT_GENERATION_MAX_ATTEMPTS: u32 = 3;

/// Default base backoff delay between generation retries.
pub const DEFAULT_GENERATION_BACKOFF_MS: u64 = 500;

/// Default overall per-query time budget.
pub const DEFAULT_QUERY_BUDGET_MS: u64 = 30_000;

/// Two rule groups from distinct categories both clearing this score
/// turn the classification into `Hybrid`.
pub const DEFAULT_HYBRID_THRESHOLD: f64 = 0.75;

/// Precomposed safe answer used whenever a blocked answer must be replaced.
pub const SAFE_FALLBACK_ANSWER: &str = "I can't help with specific dose amounts \
or timing. Please use your pump or meter's built-in bolus calculator, and \
confirm any dosing change with your diabetes care team. If this is urgent, \
for example you feel faint or confused or your glucose is dangerously high or \
low, contact emergency services right away.";

/// Notice returned when generation is exhausted on a non-safety-sensitive
/// query. An answer is never empty.
pub const GENERATION_DEGRADED_NOTICE: &str = "I wasn't able to put together a \
reliable answer just now. Please try again in a moment, or check your \
sources directly.";

/// Disclaimer appended when an answer leans on uncited model knowledge.
pub const VERIFY_DISCLAIMER: &str = "Parts of this answer come from general \
knowledge rather than your sources. Please verify anything important with \
your care team or your device's official documentation.";
