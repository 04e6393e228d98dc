use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One canonical aircraft-for-sale record, as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    pub title: String,
    /// Listing page URL. Unique, immutable, primary dedup key.
    pub url: String,
    pub year: Option<i32>,
    pub model: Option<String>,
    /// Tail number. Secondary dedup key when present.
    pub registration: Option<String>,
    pub serial: Option<String>,
    pub airframe_hours: Option<f64>,
    pub engine_hours: Option<f64>,
    /// Free text, e.g. "SMOH" or "TBO".
    pub overhaul_type: Option<String>,
    pub gps: Option<String>,
    pub transponder: Option<String>,
    pub city: Option<String>,
    /// Two-letter abbreviation where recognized, raw text otherwise.
    pub state: Option<String>,
    pub price: Option<f64>,
    pub source_time: DateTime<Utc>,
    pub sold: bool,
    pub starred: bool,
    pub eliminated: bool,
    pub notes: String,
}

/// Adapter output: a listing as parsed from one detail page, before the
/// store assigns an id, timestamp, and triage defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingDraft {
    pub title: String,
    pub url: String,
    pub year: Option<i32>,
    pub model: Option<String>,
    pub registration: Option<String>,
    pub serial: Option<String>,
    pub airframe_hours: Option<f64>,
    pub engine_hours: Option<f64>,
    pub overhaul_type: Option<String>,
    pub gps: Option<String>,
    pub transponder: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub price: Option<f64>,
}

/// The mutation surface exposed to the record-editing UI. Identity fields
/// (`url`), `title`, and `source_time` are deliberately absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingEdits {
    pub year: Option<i32>,
    pub model: Option<String>,
    pub registration: Option<String>,
    pub serial: Option<String>,
    pub airframe_hours: Option<f64>,
    pub engine_hours: Option<f64>,
    pub overhaul_type: Option<String>,
    pub gps: Option<String>,
    pub transponder: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub price: Option<f64>,
    pub sold: bool,
    pub starred: bool,
    pub eliminated: bool,
    pub notes: String,
}

/// Ordering for `RecordStore::list_all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingOrder {
    Year,
    SourceTime,
}

impl Listing {
    /// Build a stored listing from a draft plus store-assigned identity.
    pub fn from_draft(id: i64, draft: ListingDraft, source_time: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            url: draft.url,
            year: draft.year,
            model: draft.model,
            registration: draft.registration,
            serial: draft.serial,
            airframe_hours: draft.airframe_hours,
            engine_hours: draft.engine_hours,
            overhaul_type: draft.overhaul_type,
            gps: draft.gps,
            transponder: draft.transponder,
            city: draft.city,
            state: draft.state,
            price: draft.price,
            source_time,
            sold: false,
            starred: false,
            eliminated: false,
            notes: String::new(),
        }
    }
}
