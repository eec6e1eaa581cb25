use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::ports::{BlobStore, Clock};

// Shared fixed time source for deterministic use-case tests.
#[derive(Clone)]
pub(crate) struct FixedClock(pub(crate) DateTime<Utc>);

impl FixedClock {
    pub(crate) fn epoch(seconds: i64) -> Self {
        Self(Utc.timestamp_opt(seconds, 0).unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// In-memory blob store; clones share the same table so tests can inspect writes.
#[derive(Clone, Default)]
pub(crate) struct MemoryBlobStore {
    blobs: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryBlobStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, key: &str, value: &str) {
        let mut guard = self.blobs.lock().expect("blobs mutex poisoned");
        guard.insert(key.to_string(), value.to_string());
    }

    pub(crate) fn get(&self, key: &str) -> Option<String> {
        let guard = self.blobs.lock().expect("blobs mutex poisoned");
        guard.get(key).cloned()
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl BlobStore for MemoryBlobStore {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.get(key))
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::other("write failed"));
        }
        self.insert(key, value);
        Ok(())
    }
}
