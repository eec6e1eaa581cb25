// Saved-location list persisted wholesale as one JSON blob.

use crate::domain::LocationError;
use crate::domain::locations::{SavedLocation, validate_location_name};
use crate::domain::ports::{BlobStore, Clock};
use crate::domain::position::Position;
use chrono::Local;
use tracing::{error, info};

/// Key the saved-location list lives under.
pub const STORAGE_KEY: &str = "savedLocations";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Result of reading the persisted blob.
#[derive(Debug)]
pub enum StoredLocations {
    Absent,
    Valid(Vec<SavedLocation>),
    Corrupt { raw: String, reason: String },
}

pub struct LocationStore<S, C> {
    store: S,
    clock: C,
    key: String,
    locations: Vec<SavedLocation>,
}

impl<S, C> LocationStore<S, C>
where
    S: BlobStore,
    C: Clock,
{
    /// Loads the persisted list. Corrupt data is copied aside and replaced by an empty list.
    pub fn open(store: S, clock: C, key: impl Into<String>) -> Result<Self, LocationError> {
        let key = key.into();
        let locations = match load_all(&store, &key)? {
            StoredLocations::Absent => Vec::new(),
            StoredLocations::Valid(locations) => {
                info!(count = locations.len(), "loaded saved locations");
                locations
            }
            StoredLocations::Corrupt { raw, reason } => {
                let backup_key = format!("{key}.corrupt");
                error!(%key, %backup_key, %reason, "stored locations are corrupt; starting empty");
                store
                    .write(&backup_key, &raw)
                    .map_err(|e| LocationError::Storage(e.to_string()))?;
                Vec::new()
            }
        };

        Ok(Self {
            store,
            clock,
            key,
            locations,
        })
    }

    pub fn list(&self) -> &[SavedLocation] {
        &self.locations
    }

    pub fn save(&mut self, name: &str, position: Position) -> Result<SavedLocation, LocationError> {
        let name = validate_location_name(name)?;
        let location = SavedLocation {
            name,
            x: position.x,
            y: position.y,
            z: position.z,
            timestamp: self
                .clock
                .now()
                .with_timezone(&Local)
                .format(TIMESTAMP_FORMAT)
                .to_string(),
        };

        self.locations.push(location.clone());
        if let Err(e) = self.persist() {
            self.locations.pop();
            return Err(e);
        }
        Ok(location)
    }

    pub fn delete(&mut self, index: usize, confirmed: bool) -> Result<SavedLocation, LocationError> {
        if index >= self.locations.len() {
            return Err(LocationError::IndexOutOfRange {
                index,
                len: self.locations.len(),
            });
        }
        if !confirmed {
            return Err(LocationError::NotConfirmed);
        }

        let removed = self.locations.remove(index);
        if let Err(e) = self.persist() {
            self.locations.insert(index, removed);
            return Err(e);
        }
        Ok(removed)
    }

    fn persist(&self) -> Result<(), LocationError> {
        let blob = serde_json::to_string(&self.locations)
            .map_err(|e| LocationError::Storage(e.to_string()))?;
        self.store
            .write(&self.key, &blob)
            .map_err(|e| LocationError::Storage(e.to_string()))
    }
}

/// Reads the blob under `key` and classifies it.
pub fn load_all<S: BlobStore + ?Sized>(
    store: &S,
    key: &str,
) -> Result<StoredLocations, LocationError> {
    let raw = match store.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Ok(StoredLocations::Absent),
        Err(e) => return Err(LocationError::Storage(e.to_string())),
    };

    match serde_json::from_str::<Vec<SavedLocation>>(&raw) {
        Ok(locations) => Ok(StoredLocations::Valid(locations)),
        Err(e) => Ok(StoredLocations::Corrupt {
            raw,
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{FixedClock, MemoryBlobStore};

    fn open_store(blobs: &MemoryBlobStore) -> LocationStore<MemoryBlobStore, FixedClock> {
        LocationStore::open(blobs.clone(), FixedClock::epoch(1_700_000_000), STORAGE_KEY)
            .expect("store should open")
    }

    #[test]
    fn missing_blob_loads_as_absent_and_empty() {
        let blobs = MemoryBlobStore::new();

        assert!(matches!(
            load_all(&blobs, STORAGE_KEY),
            Ok(StoredLocations::Absent)
        ));
        assert!(open_store(&blobs).list().is_empty());
    }

    #[test]
    fn saved_location_survives_reload() {
        let blobs = MemoryBlobStore::new();
        let mut store = open_store(&blobs);

        let saved = store
            .save("Base", Position::new(0.0, 64.0, 0.0))
            .expect("save should succeed");
        assert_eq!(saved.name, "Base");
        assert!(!saved.timestamp.is_empty());

        let reloaded = open_store(&blobs);
        assert_eq!(reloaded.list().len(), 1);
        let base = &reloaded.list()[0];
        assert_eq!(base.name, "Base");
        assert_eq!(base.position(), Position::new(0.0, 64.0, 0.0));
    }

    #[test]
    fn save_trims_name_and_keeps_insertion_order() {
        let blobs = MemoryBlobStore::new();
        let mut store = open_store(&blobs);

        store.save("  Farm ", Position::ORIGIN).unwrap();
        store.save("Mine", Position::new(1.0, 12.0, 3.0)).unwrap();

        let names: Vec<&str> = store.list().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Farm", "Mine"]);
    }

    #[test]
    fn blank_name_is_rejected_without_persisting() {
        let blobs = MemoryBlobStore::new();
        let mut store = open_store(&blobs);

        let result = store.save("   ", Position::ORIGIN);

        assert!(matches!(result, Err(LocationError::BlankName)));
        assert!(store.list().is_empty());
        assert_eq!(blobs.get(STORAGE_KEY), None);
    }

    #[test]
    fn deleting_only_entry_persists_empty_array() {
        let blobs = MemoryBlobStore::new();
        let mut store = open_store(&blobs);
        store.save("Base", Position::new(0.0, 64.0, 0.0)).unwrap();

        let removed = store.delete(0, true).expect("delete should succeed");

        assert_eq!(removed.name, "Base");
        assert!(store.list().is_empty());
        assert_eq!(blobs.get(STORAGE_KEY).as_deref(), Some("[]"));
    }

    #[test]
    fn unconfirmed_delete_keeps_entry() {
        let blobs = MemoryBlobStore::new();
        let mut store = open_store(&blobs);
        store.save("Base", Position::ORIGIN).unwrap();

        let result = store.delete(0, false);

        assert!(matches!(result, Err(LocationError::NotConfirmed)));
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn out_of_range_delete_is_rejected() {
        let blobs = MemoryBlobStore::new();
        let mut store = open_store(&blobs);
        store.save("Base", Position::ORIGIN).unwrap();

        let result = store.delete(1, true);

        assert!(matches!(
            result,
            Err(LocationError::IndexOutOfRange { index: 1, len: 1 })
        ));
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn corrupt_blob_is_backed_up_and_store_starts_empty() {
        let blobs = MemoryBlobStore::new();
        blobs.insert(STORAGE_KEY, "{not json");

        assert!(matches!(
            load_all(&blobs, STORAGE_KEY),
            Ok(StoredLocations::Corrupt { .. })
        ));

        let store = open_store(&blobs);

        assert!(store.list().is_empty());
        assert_eq!(
            blobs.get("savedLocations.corrupt").as_deref(),
            Some("{not json")
        );
    }

    #[test]
    fn failed_write_rolls_back_in_memory_list() {
        let blobs = MemoryBlobStore::new();
        let mut store = open_store(&blobs);
        store.save("Base", Position::ORIGIN).unwrap();
        blobs.fail_writes(true);

        assert!(matches!(
            store.save("Mine", Position::ORIGIN),
            Err(LocationError::Storage(_))
        ));
        assert!(matches!(
            store.delete(0, true),
            Err(LocationError::Storage(_))
        ));

        let names: Vec<&str> = store.list().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Base"]);
    }
}
