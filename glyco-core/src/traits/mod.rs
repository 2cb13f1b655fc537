//! Collaborator traits at the system's seams. All object safe, `Send + Sync`,
//! implemented by the embedding application (or by test fakes).

mod audit_sink;
mod model;
mod session_store;
mod vector_store;

pub use audit_sink::IAuditSink;
pub use model::{GenerationConfig, IGenerativeModel, TextStream};
pub use session_store::ISessionStore;
pub use vector_store::{IVectorStore, SearchHit};
