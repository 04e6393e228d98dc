use crate::models::{Listing, ListingDraft, ListingEdits, ListingOrder};
use crate::store::{RecordStore, StoreError};
use chrono::Utc;
use std::sync::Mutex;

/// In-memory record store. Backs `--dry-run` and the integration tests;
/// same contract as [`crate::store::SqliteStore`], nothing survives the
/// process.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    listings: Vec<Listing>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn find_by_url(&self, url: &str) -> Result<Option<Listing>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.listings.iter().find(|l| l.url == url).cloned())
    }

    fn find_by_registration(&self, registration: &str) -> Result<Option<Listing>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .listings
            .iter()
            .find(|l| l.registration.as_deref() == Some(registration))
            .cloned())
    }

    fn insert(&self, draft: &ListingDraft) -> Result<Listing, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.listings.iter().any(|l| l.url == draft.url) {
            return Err(StoreError::Duplicate(draft.url.clone()));
        }
        inner.next_id += 1;
        let listing = Listing::from_draft(inner.next_id, draft.clone(), Utc::now());
        inner.listings.push(listing.clone());
        Ok(listing)
    }

    fn list_all(&self, order: ListingOrder) -> Result<Vec<Listing>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut listings = inner.listings.clone();
        match order {
            ListingOrder::Year => listings.sort_by_key(|l| l.year),
            ListingOrder::SourceTime => listings.sort_by_key(|l| l.source_time),
        }
        Ok(listings)
    }

    fn get(&self, id: i64) -> Result<Option<Listing>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.listings.iter().find(|l| l.id == id).cloned())
    }

    fn update(&self, id: i64, edits: &ListingEdits) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let listing = inner
            .listings
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(StoreError::NotFound(id))?;
        listing.year = edits.year;
        listing.model = edits.model.clone();
        listing.registration = edits.registration.clone();
        listing.serial = edits.serial.clone();
        listing.airframe_hours = edits.airframe_hours;
        listing.engine_hours = edits.engine_hours;
        listing.overhaul_type = edits.overhaul_type.clone();
        listing.gps = edits.gps.clone();
        listing.transponder = edits.transponder.clone();
        listing.city = edits.city.clone();
        listing.state = edits.state.clone();
        listing.price = edits.price;
        listing.sold = edits.sold;
        listing.starred = edits.starred;
        listing.eliminated = edits.eliminated;
        listing.notes = edits.notes.clone();
        Ok(())
    }
}
