use crate::domain::{Day, Task};
use crate::persistence::atomic_write;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use thiserror::Error;

pub const SNAPSHOT_VERSION: u32 = 1;

/// The full persisted state: every day and every task, flat.
///
/// The engine owns the in-memory shape (sorted day list, task arena); the
/// store only sees this flat form. A save either fully replaces the previous
/// snapshot or fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub days: Vec<Day>,
    pub tasks: Vec<Task>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            days: Vec::new(),
            tasks: Vec::new(),
        }
    }
}

/// Errors from the storage substrate
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read store: {0}")]
    Io(#[from] std::io::Error),
    #[error("store data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("failed to write store: {0}")]
    Write(String),
}

/// The persistence collaborator the engine talks to.
///
/// Loading a missing store yields an empty snapshot, not an error.
pub trait Store {
    fn load(&self) -> Result<Snapshot, StoreError>;
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError>;
}

/// Production store: pretty JSON in the daybook directory, written
/// atomically (temp file + rename).
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Store for JsonStore {
    fn load(&self) -> Result<Snapshot, StoreError> {
        if !self.path.exists() {
            return Ok(Snapshot::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;
        Ok(snapshot)
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(snapshot)?;
        atomic_write(&self.path, &json).map_err(|e| StoreError::Write(e.to_string()))
    }
}

/// In-memory store for tests and debug tooling. Clones share the same cell,
/// so one instance can seed data that a later bootstrap reads back.
/// Single-threaded by design, like everything else in this crate.
#[derive(Clone, Default)]
pub struct MemoryStore {
    cell: Rc<RefCell<Snapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(snapshot: Snapshot) -> Self {
        Self {
            cell: Rc::new(RefCell::new(snapshot)),
        }
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Snapshot, StoreError> {
        Ok(self.cell.borrow().clone())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        *self.cell.borrow_mut() = snapshot.clone();
        Ok(())
    }
}
