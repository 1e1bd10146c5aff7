//! In-memory listing collection backed by a record store.
//!
//! The book owns the snapshot handed to the analytics engine. Every
//! mutation goes to the store first and only touches the snapshot once
//! the store accepted it.

use crate::error::{MarketError, MarketResult};
use crate::models::{ListingRecord, NewListing};
use crate::store::RecordStore;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

/// The working collection of listings.
pub struct ListingBook<S: RecordStore> {
    store: S,
    records: Vec<ListingRecord>,
    /// Bumped on every successful mutation.
    revision: u64,
}

impl<S: RecordStore> ListingBook<S> {
    /// Load the current snapshot from `store`.
    pub fn open(store: S) -> MarketResult<Self> {
        let records = store.list()?;
        info!("Loaded {} listings", records.len());

        Ok(Self {
            store,
            records,
            revision: 0,
        })
    }

    /// A book that has not read the store yet.
    ///
    /// Only useful before [`import_json`](Self::import_json), which replaces
    /// the collection without looking at what the store held.
    pub fn unloaded(store: S) -> Self {
        Self {
            store,
            records: Vec::new(),
            revision: 0,
        }
    }

    /// Snapshot in insertion order.
    pub fn records(&self) -> &[ListingRecord] {
        &self.records
    }

    /// Mutation counter, usable as a cache key.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, id: &str) -> Option<&ListingRecord> {
        self.records.iter().find(|r| r.id.as_deref() == Some(id))
    }

    fn position(&self, id: &str) -> MarketResult<usize> {
        self.records
            .iter()
            .position(|r| r.id.as_deref() == Some(id))
            .ok_or_else(|| MarketError::NotFound(id.to_string()))
    }

    /// Create a listing dated `today` on behalf of `responsible`.
    ///
    /// Refused before the store is touched when no responsible name is set
    /// or the condominium is blank.
    pub fn create(
        &mut self,
        input: NewListing,
        responsible: &str,
        today: NaiveDate,
    ) -> MarketResult<&ListingRecord> {
        let responsible = responsible.trim();
        if responsible.is_empty() {
            return Err(MarketError::MissingIdentity);
        }
        if input.condominium.trim().is_empty() {
            return Err(MarketError::MissingCondominium);
        }

        let record = ListingRecord::from_input(input, responsible, today);
        if record.unit_value.is_none() {
            warn!(
                "Listing in '{}' has no usable area/price; it will not count in market figures",
                record.condominium
            );
        }

        let id = self.store.create(&record)?;
        debug!("Created listing {}", id);

        self.records.push(record.with_id(id));
        self.revision += 1;

        let index = self.records.len() - 1;
        Ok(&self.records[index])
    }

    /// Delete a listing, returning it.
    pub fn delete(&mut self, id: &str) -> MarketResult<ListingRecord> {
        let index = self.position(id)?;
        self.store.delete(id)?;

        self.revision += 1;
        debug!("Deleted listing {}", id);
        Ok(self.records.remove(index))
    }

    /// Flip the favorite flag; returns the new value.
    pub fn toggle_favorite(&mut self, id: &str) -> MarketResult<bool> {
        let index = self.position(id)?;

        let mut snapshot = self.records.clone();
        snapshot[index].favorite = !snapshot[index].favorite;
        let favorite = snapshot[index].favorite;

        self.records = self.store.replace_all(snapshot)?;
        self.revision += 1;
        Ok(favorite)
    }

    /// Pretty-printed JSON array of the whole collection.
    pub fn export_json(&self) -> MarketResult<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }

    /// Replace the collection with a JSON array of listings.
    ///
    /// Every record needs a condominium. On any failure the current
    /// collection is left as it was.
    pub fn import_json(&mut self, text: &str) -> MarketResult<usize> {
        let imported: Vec<ListingRecord> =
            serde_json::from_str(text).map_err(|e| MarketError::MalformedImport(e.to_string()))?;

        if let Some(index) = imported
            .iter()
            .position(|r| r.condominium.trim().is_empty())
        {
            return Err(MarketError::MalformedImport(format!(
                "record {} has no condominium",
                index
            )));
        }

        let count = imported.len();
        self.records = self.store.replace_all(imported)?;
        self.revision += 1;

        info!("Imported {} listings", count);
        Ok(count)
    }
}
