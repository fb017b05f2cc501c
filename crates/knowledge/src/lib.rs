//! # Kisan Knowledge
//!
//! The curated reference corpus: government schemes, crop and pest guidance,
//! weather advisories. Entries are validated once at load time and never
//! mutated afterwards; reloading replaces the whole store.
//!
//! ```text
//! EntryRecord[] (JSON / TOML / database rows, loaded by the caller)
//!     │
//!     ├──> validate (id, title, languages, timestamp)
//!     ├──> normalize tags / languages, tokenize title + summary + body
//!     └──> KnowledgeStore (immutable) ──> StoreHandle (Arc snapshot swap)
//! ```

mod entry;
mod error;
mod handle;
mod record;
mod store;

pub use entry::KnowledgeEntry;
pub use error::{KnowledgeError, Result};
pub use handle::StoreHandle;
pub use record::EntryRecord;
pub use store::{KnowledgeStore, LoadReport, SkippedRecord};
