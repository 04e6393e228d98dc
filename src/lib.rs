//! Aircraft-for-sale listing acquisition and valuation.
//!
//! Four marketplace adapters feed a deduplicating pipeline that persists
//! canonical [`models::Listing`] records; [`valuation`] derives a
//! normalized market model from whatever was stored.

pub mod config;
pub mod fields;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod scrapers;
pub mod store;
pub mod valuation;

pub use config::SourceConfig;
pub use models::{Listing, ListingDraft, ListingEdits, ListingOrder};
pub use pipeline::{Pipeline, RunReport, SourceJob, DEFAULT_REQUEST_DELAY};
pub use store::{MemoryStore, RecordStore, SqliteStore, StoreError};
