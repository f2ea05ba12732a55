#![deny(warnings)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod error;
mod factory;
mod mock;

// Keep the driver adapter private
mod mongo;

pub use error::StorageError;
pub use factory::connect_index_admin;
pub use mock::{MockCall, MockIndexAdmin};

use async_trait::async_trait;

/// Name MongoDB gives the mandatory index on `_id`
pub const PRIMARY_INDEX_NAME: &str = "_id_";

// ==== Traits ====

/// Administrative index operations against a connected database
///
/// Implementations never create, rename or drop collections. The primary
/// index is never reported and never dropped.
#[async_trait]
pub trait IndexAdmin: Send + Sync {
    /// Check whether a collection exists in the target database
    async fn collection_exists(&self, name: &str) -> Result<bool, StorageError>;

    /// Names of every index on the collection except the primary one
    async fn list_secondary_indexes(&self, name: &str) -> Result<Vec<String>, StorageError>;

    /// Drop every secondary index on the collection
    ///
    /// Returns the names of the dropped indexes. Fails with
    /// [`StorageError::NoIndexesPresent`] when only the primary index exists.
    async fn drop_secondary_indexes(&self, name: &str) -> Result<Vec<String>, StorageError>;
}

/// Filter the primary index out of a full index listing
pub(crate) fn secondary_only(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .filter(|n| n != PRIMARY_INDEX_NAME)
        .collect()
}
