use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::PermissionError;

const DECISIONS_FILE: &str = "permission_decisions.json";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Granted,
    Denied,
}

/// An explicit permission choice made by a user.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DecisionRecord {
    pub decision: Decision,
    pub decided_at: DateTime<Utc>,
}

/// Durable per-user flag: "has this user made an explicit permission decision".
pub trait DecisionStore: Send + Sync {
    fn get(&self, user_id: &str) -> Option<DecisionRecord>;
    fn record(&self, user_id: &str, decision: Decision) -> Result<DecisionRecord, PermissionError>;
    fn clear(&self, user_id: &str) -> Result<(), PermissionError>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
pub struct MemoryDecisionStore {
    records: Mutex<HashMap<String, DecisionRecord>>,
}

impl MemoryDecisionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DecisionStore for MemoryDecisionStore {
    fn get(&self, user_id: &str) -> Option<DecisionRecord> {
        lock(&self.records).get(user_id).cloned()
    }

    fn record(&self, user_id: &str, decision: Decision) -> Result<DecisionRecord, PermissionError> {
        let record = DecisionRecord {
            decision,
            decided_at: Utc::now(),
        };
        lock(&self.records).insert(user_id.to_string(), record.clone());
        Ok(record)
    }

    fn clear(&self, user_id: &str) -> Result<(), PermissionError> {
        lock(&self.records).remove(user_id);
        Ok(())
    }
}

/// JSON-file backed store, one file per data directory.
pub struct FileDecisionStore {
    records: Mutex<HashMap<String, DecisionRecord>>,
    file_path: PathBuf,
}

impl FileDecisionStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let file_path = data_dir.as_ref().join(DECISIONS_FILE);
        let records = Self::load(&file_path);
        Self {
            records: Mutex::new(records),
            file_path,
        }
    }

    fn load(path: &Path) -> HashMap<String, DecisionRecord> {
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("ignoring corrupt decision file {}: {e}", path.display());
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        }
    }

    fn save(&self, records: &HashMap<String, DecisionRecord>) -> Result<(), PermissionError> {
        if let Some(parent) = self.file_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PermissionError::Storage(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| PermissionError::Storage(e.to_string()))?;
        std::fs::write(&self.file_path, json).map_err(|e| PermissionError::Storage(e.to_string()))
    }
}

impl DecisionStore for FileDecisionStore {
    fn get(&self, user_id: &str) -> Option<DecisionRecord> {
        lock(&self.records).get(user_id).cloned()
    }

    fn record(&self, user_id: &str, decision: Decision) -> Result<DecisionRecord, PermissionError> {
        let record = DecisionRecord {
            decision,
            decided_at: Utc::now(),
        };
        let mut records = lock(&self.records);
        records.insert(user_id.to_string(), record.clone());
        self.save(&records)?;
        tracing::debug!("recorded permission decision {decision:?} for {user_id}");
        Ok(record)
    }

    fn clear(&self, user_id: &str) -> Result<(), PermissionError> {
        let mut records = lock(&self.records);
        if records.remove(user_id).is_some() {
            self.save(&records)?;
        }
        Ok(())
    }
}
