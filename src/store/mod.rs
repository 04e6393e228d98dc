pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::models::{Listing, ListingDraft, ListingEdits, ListingOrder};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("no listing with id {0}")]
    NotFound(i64),
}

/// Persistence seam for the pipeline and the external editing UI.
///
/// "Not found" lookups return `Ok(None)`: the pipeline treats them as
/// ordinary control flow, not failures. `insert` assigns the id, the
/// acquisition timestamp, and the triage defaults.
pub trait RecordStore: Send + Sync {
    fn find_by_url(&self, url: &str) -> Result<Option<Listing>, StoreError>;
    fn find_by_registration(&self, registration: &str) -> Result<Option<Listing>, StoreError>;
    fn insert(&self, draft: &ListingDraft) -> Result<Listing, StoreError>;
    fn list_all(&self, order: ListingOrder) -> Result<Vec<Listing>, StoreError>;

    /// Fetch one listing for the detail/editing view.
    fn get(&self, id: i64) -> Result<Option<Listing>, StoreError>;

    /// Apply user edits. Identity fields (`url`, `title`, `source_time`)
    /// are not part of [`ListingEdits`] and never change.
    fn update(&self, id: i64, edits: &ListingEdits) -> Result<(), StoreError>;
}
