use crate::models::{Listing, ListingDraft, ListingEdits, ListingOrder};
use crate::store::{RecordStore, StoreError};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::Mutex;

/// SQLite-backed record store. A single connection behind a mutex is
/// plenty here: the pipeline writes at most one listing per politeness
/// interval.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

const SELECT_COLUMNS: &str = "id, title, url, year, model, registration, serial, \
     airframe_hours, engine_hours, overhaul_type, gps, transponder, \
     city, state, price, source_time, sold, starred, eliminated, notes";

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS listings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        url TEXT NOT NULL UNIQUE,
        year INTEGER,
        model TEXT,
        registration TEXT,
        serial TEXT,
        airframe_hours REAL,
        engine_hours REAL,
        overhaul_type TEXT,
        gps TEXT,
        transponder TEXT,
        city TEXT,
        state TEXT,
        price REAL,
        source_time TEXT NOT NULL,
        sold INTEGER NOT NULL DEFAULT 0,
        starred INTEGER NOT NULL DEFAULT 0,
        eliminated INTEGER NOT NULL DEFAULT 0,
        notes TEXT NOT NULL DEFAULT ''
    );
    CREATE INDEX IF NOT EXISTS idx_listings_registration
        ON listings(registration);";

impl SqliteStore {
    /// Open (or create) the listings database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// In-memory database, for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn row_to_listing(row: &Row<'_>) -> rusqlite::Result<Listing> {
        Ok(Listing {
            id: row.get(0)?,
            title: row.get(1)?,
            url: row.get(2)?,
            year: row.get(3)?,
            model: row.get(4)?,
            registration: row.get(5)?,
            serial: row.get(6)?,
            airframe_hours: row.get(7)?,
            engine_hours: row.get(8)?,
            overhaul_type: row.get(9)?,
            gps: row.get(10)?,
            transponder: row.get(11)?,
            city: row.get(12)?,
            state: row.get(13)?,
            price: row.get(14)?,
            source_time: row.get::<_, DateTime<Utc>>(15)?,
            sold: row.get(16)?,
            starred: row.get(17)?,
            eliminated: row.get(18)?,
            notes: row.get(19)?,
        })
    }

    fn find_one(&self, column: &str, value: &str) -> Result<Option<Listing>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("SELECT {SELECT_COLUMNS} FROM listings WHERE {column} = ?1");
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query_map(params![value], Self::row_to_listing)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }
}

impl RecordStore for SqliteStore {
    fn find_by_url(&self, url: &str) -> Result<Option<Listing>, StoreError> {
        self.find_one("url", url)
    }

    fn find_by_registration(&self, registration: &str) -> Result<Option<Listing>, StoreError> {
        self.find_one("registration", registration)
    }

    fn insert(&self, draft: &ListingDraft) -> Result<Listing, StoreError> {
        let source_time = Utc::now();
        let conn = self.conn.lock().unwrap();
        let result = conn.execute(
            "INSERT INTO listings (title, url, year, model, registration, serial, \
             airframe_hours, engine_hours, overhaul_type, gps, transponder, \
             city, state, price, source_time) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                draft.title,
                draft.url,
                draft.year,
                draft.model,
                draft.registration,
                draft.serial,
                draft.airframe_hours,
                draft.engine_hours,
                draft.overhaul_type,
                draft.gps,
                draft.transponder,
                draft.city,
                draft.state,
                draft.price,
                source_time,
            ],
        );
        match result {
            Ok(_) => {
                let id = conn.last_insert_rowid();
                Ok(Listing::from_draft(id, draft.clone(), source_time))
            }
            Err(rusqlite::Error::SqliteFailure(e, msg))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::Duplicate(msg.unwrap_or_else(|| draft.url.clone())))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn list_all(&self, order: ListingOrder) -> Result<Vec<Listing>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let order_by = match order {
            ListingOrder::Year => "year",
            ListingOrder::SourceTime => "source_time",
        };
        let sql = format!("SELECT {SELECT_COLUMNS} FROM listings ORDER BY {order_by}");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], Self::row_to_listing)?;
        let mut listings = Vec::new();
        for row in rows {
            listings.push(row?);
        }
        Ok(listings)
    }

    fn get(&self, id: i64) -> Result<Option<Listing>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("SELECT {SELECT_COLUMNS} FROM listings WHERE id = ?1");
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query_map(params![id], Self::row_to_listing)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    fn update(&self, id: i64, edits: &ListingEdits) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE listings SET year = ?1, model = ?2, registration = ?3, serial = ?4, \
             airframe_hours = ?5, engine_hours = ?6, overhaul_type = ?7, gps = ?8, \
             transponder = ?9, city = ?10, state = ?11, price = ?12, \
             sold = ?13, starred = ?14, eliminated = ?15, notes = ?16 \
             WHERE id = ?17",
            params![
                edits.year,
                edits.model,
                edits.registration,
                edits.serial,
                edits.airframe_hours,
                edits.engine_hours,
                edits.overhaul_type,
                edits.gps,
                edits.transponder,
                edits.city,
                edits.state,
                edits.price,
                edits.sold,
                edits.starred,
                edits.eliminated,
                edits.notes,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(url: &str, registration: Option<&str>) -> ListingDraft {
        ListingDraft {
            title: "1979 Mooney M20J 201".to_string(),
            url: url.to_string(),
            year: Some(1979),
            registration: registration.map(str::to_string),
            price: Some(100_000.0),
            ..Default::default()
        }
    }

    #[test]
    fn insert_and_find() {
        let store = SqliteStore::open_in_memory().unwrap();
        let listing = store.insert(&draft("http://x/1", Some("N201BD"))).unwrap();
        assert!(listing.id > 0);
        assert!(!listing.sold && !listing.starred && !listing.eliminated);

        let by_url = store.find_by_url("http://x/1").unwrap().unwrap();
        assert_eq!(by_url.id, listing.id);
        let by_reg = store.find_by_registration("N201BD").unwrap().unwrap();
        assert_eq!(by_reg.id, listing.id);

        assert!(store.find_by_url("http://x/other").unwrap().is_none());
        assert!(store.find_by_registration("N999ZZ").unwrap().is_none());
    }

    #[test]
    fn duplicate_url_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert(&draft("http://x/1", None)).unwrap();
        let err = store.insert(&draft("http://x/1", None)).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[test]
    fn list_all_orders_by_year() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut a = draft("http://x/1", None);
        a.year = Some(1994);
        let mut b = draft("http://x/2", None);
        b.year = Some(1979);
        store.insert(&a).unwrap();
        store.insert(&b).unwrap();

        let listings = store.list_all(ListingOrder::Year).unwrap();
        assert_eq!(listings[0].year, Some(1979));
        assert_eq!(listings[1].year, Some(1994));
    }

    #[test]
    fn update_touches_edit_fields_only() {
        let store = SqliteStore::open_in_memory().unwrap();
        let listing = store.insert(&draft("http://x/1", Some("N201BD"))).unwrap();

        let mut edits = ListingEdits {
            year: listing.year,
            registration: listing.registration.clone(),
            price: Some(95_000.0),
            starred: true,
            notes: "called seller".to_string(),
            ..Default::default()
        };
        edits.model = Some("M20J".to_string());
        store.update(listing.id, &edits).unwrap();

        let updated = store.get(listing.id).unwrap().unwrap();
        assert_eq!(updated.price, Some(95_000.0));
        assert!(updated.starred);
        assert_eq!(updated.notes, "called seller");
        // Identity untouched.
        assert_eq!(updated.url, listing.url);
        assert_eq!(updated.title, listing.title);
        assert_eq!(updated.source_time, listing.source_time);
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store.update(42, &ListingEdits::default()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(42)));
    }

    #[test]
    fn open_creates_file_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mooney.db");
        let store = SqliteStore::open(&path).unwrap();
        store.insert(&draft("http://x/1", None)).unwrap();
        drop(store);

        // Re-opening sees the persisted row.
        let store = SqliteStore::open(&path).unwrap();
        assert!(store.find_by_url("http://x/1").unwrap().is_some());
    }
}
