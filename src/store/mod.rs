//! Record store boundary.
//!
//! The analytics engine never talks to a store. Callers load a snapshot
//! through [`RecordStore`], hand it to the engine, and persist whatever
//! the user changed.

pub mod book;

pub use book::ListingBook;

use crate::error::{MarketError, MarketResult};
use crate::models::ListingRecord;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// Durable home of the listing collection.
pub trait RecordStore {
    /// Current snapshot in insertion order.
    fn list(&self) -> MarketResult<Vec<ListingRecord>>;

    /// Persist a new record and return the id assigned to it.
    fn create(&mut self, record: &ListingRecord) -> MarketResult<String>;

    /// Remove the record with `id`.
    fn delete(&mut self, id: &str) -> MarketResult<()>;

    /// Replace the whole collection. Records without an id get one; the
    /// stored collection is returned.
    fn replace_all(&mut self, records: Vec<ListingRecord>) -> MarketResult<Vec<ListingRecord>>;
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn assign_missing_ids(records: Vec<ListingRecord>) -> Vec<ListingRecord> {
    records
        .into_iter()
        .map(|r| if r.id.is_some() { r } else { r.with_id(new_id()) })
        .collect()
}

/// Stores the collection as a pretty-printed JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, records: &[ListingRecord]) -> MarketResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, content)?;
        debug!("Wrote {} listings to {}", records.len(), self.path.display());
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn list(&self) -> MarketResult<Vec<ListingRecord>> {
        if !self.path.exists() {
            info!("No store at {}, starting empty", self.path.display());
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    fn create(&mut self, record: &ListingRecord) -> MarketResult<String> {
        let mut records = self.list()?;
        let id = new_id();
        records.push(record.clone().with_id(id.clone()));
        self.write(&records)?;
        Ok(id)
    }

    fn delete(&mut self, id: &str) -> MarketResult<()> {
        let mut records = self.list()?;
        let position = records
            .iter()
            .position(|r| r.id.as_deref() == Some(id))
            .ok_or_else(|| MarketError::NotFound(id.to_string()))?;
        records.remove(position);
        self.write(&records)
    }

    fn replace_all(&mut self, records: Vec<ListingRecord>) -> MarketResult<Vec<ListingRecord>> {
        let records = assign_missing_ids(records);
        self.write(&records)?;
        Ok(records)
    }
}

/// Keeps the collection in memory only.
#[derive(Debug, Clone, Default)]
#[allow(dead_code)] // Backend for tests and embedding callers
pub struct MemoryStore {
    records: Vec<ListingRecord>,
}

#[allow(dead_code)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<ListingRecord>) -> Self {
        Self { records }
    }
}

impl RecordStore for MemoryStore {
    fn list(&self) -> MarketResult<Vec<ListingRecord>> {
        Ok(self.records.clone())
    }

    fn create(&mut self, record: &ListingRecord) -> MarketResult<String> {
        let id = new_id();
        self.records.push(record.clone().with_id(id.clone()));
        Ok(id)
    }

    fn delete(&mut self, id: &str) -> MarketResult<()> {
        let before = self.records.len();
        self.records.retain(|r| r.id.as_deref() != Some(id));
        if self.records.len() == before {
            return Err(MarketError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn replace_all(&mut self, records: Vec<ListingRecord>) -> MarketResult<Vec<ListingRecord>> {
        self.records = assign_missing_ids(records);
        Ok(self.records.clone())
    }
}
