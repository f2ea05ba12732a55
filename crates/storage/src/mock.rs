//! In-memory index administration for testing

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use crate::{secondary_only, IndexAdmin, StorageError, PRIMARY_INDEX_NAME};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// A call received by the mock, recorded in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    CollectionExists(String),
    ListSecondaryIndexes(String),
    DropSecondaryIndexes(String),
}

#[derive(Debug, Default)]
struct MockData {
    collections: HashMap<String, Vec<String>>, // collection -> index names, primary included
    drop_failures: HashMap<String, String>,    // collection -> error message
    exists_failures: HashMap<String, String>,  // collection -> error message
    hanging_drops: HashSet<String>,
    calls: Vec<MockCall>,
}

/// Mock index admin holding collections and their indexes in memory
///
/// Clones share state, so a test can keep a handle for assertions while the
/// janitor owns another.
#[derive(Clone, Default)]
pub struct MockIndexAdmin {
    data: Arc<Mutex<MockData>>,
}

impl MockIndexAdmin {
    /// Create an empty mock database
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collection with the given secondary indexes
    pub fn with_collection(self, name: &str, secondary_indexes: &[&str]) -> Self {
        let mut indexes = vec![PRIMARY_INDEX_NAME.to_string()];
        indexes.extend(secondary_indexes.iter().map(|i| i.to_string()));
        self.data
            .lock()
            .unwrap()
            .collections
            .insert(name.to_string(), indexes);
        self
    }

    /// Make dropping indexes on `name` fail with a backend error
    pub fn failing_drop(self, name: &str, message: &str) -> Self {
        self.data
            .lock()
            .unwrap()
            .drop_failures
            .insert(name.to_string(), message.to_string());
        self
    }

    /// Make the existence check for `name` fail with a backend error
    pub fn failing_exists(self, name: &str, message: &str) -> Self {
        self.data
            .lock()
            .unwrap()
            .exists_failures
            .insert(name.to_string(), message.to_string());
        self
    }

    /// Make dropping indexes on `name` never complete
    pub fn hanging_drop(self, name: &str) -> Self {
        self.data
            .lock()
            .unwrap()
            .hanging_drops
            .insert(name.to_string());
        self
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<MockCall> {
        self.data.lock().unwrap().calls.clone()
    }

    /// Collections passed to `drop_secondary_indexes`, in order
    pub fn drop_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::DropSecondaryIndexes(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    /// Current indexes of a collection, primary included
    pub fn indexes(&self, name: &str) -> Option<Vec<String>> {
        self.data.lock().unwrap().collections.get(name).cloned()
    }

    /// Names of all collections, sorted
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .data
            .lock()
            .unwrap()
            .collections
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    fn record(&self, call: MockCall) {
        self.data.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl IndexAdmin for MockIndexAdmin {
    async fn collection_exists(&self, name: &str) -> Result<bool, StorageError> {
        self.record(MockCall::CollectionExists(name.to_string()));
        let data = self.data.lock().unwrap();
        if let Some(message) = data.exists_failures.get(name) {
            return Err(StorageError::BackendError(message.clone()));
        }
        Ok(data.collections.contains_key(name))
    }

    async fn list_secondary_indexes(&self, name: &str) -> Result<Vec<String>, StorageError> {
        self.record(MockCall::ListSecondaryIndexes(name.to_string()));
        let data = self.data.lock().unwrap();
        let indexes = data
            .collections
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::CollectionNotFound(name.to_string()))?;
        Ok(secondary_only(indexes))
    }

    async fn drop_secondary_indexes(&self, name: &str) -> Result<Vec<String>, StorageError> {
        self.record(MockCall::DropSecondaryIndexes(name.to_string()));

        let hangs = self.data.lock().unwrap().hanging_drops.contains(name);
        if hangs {
            std::future::pending::<()>().await;
        }

        let mut data = self.data.lock().unwrap();
        if let Some(message) = data.drop_failures.get(name) {
            return Err(StorageError::BackendError(message.clone()));
        }
        let indexes = data
            .collections
            .get_mut(name)
            .ok_or_else(|| StorageError::CollectionNotFound(name.to_string()))?;

        let dropped = secondary_only(indexes.clone());
        if dropped.is_empty() {
            return Err(StorageError::NoIndexesPresent(name.to_string()));
        }
        indexes.retain(|i| i == PRIMARY_INDEX_NAME);
        Ok(dropped)
    }
}
