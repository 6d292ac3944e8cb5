//! Knowledge retrieval for Docent.
//!
//! An in-memory knowledge store with category and keyword inverted indexes,
//! plus a stateless scoring search engine over it. The store is volatile by
//! design: it is rebuilt at process start from the fixed seed set and any
//! runtime mutations are lost on restart.

pub mod error;
pub mod normalize;
pub mod search;
pub mod seed;
pub mod store;

pub use error::KnowledgeError;
pub use search::{SearchEngine, SearchOptions, SearchResult};
pub use seed::{seed_entries, seed_store};
pub use store::{EntryPatch, ImportReport, KnowledgeEntry, KnowledgeStore, NewEntry, StoreStats};
