//! MongoDB implementation of the index administration operations

use crate::{secondary_only, IndexAdmin, StorageError};
use async_trait::async_trait;
use index_janitor_core::MongoConfig;
use mongodb::{
    bson::{doc, Document},
    error::{Error as MongoError, ErrorKind},
    options::ClientOptions,
    Client, Collection, Database,
};
use tracing::debug;

/// Server error code for a missing namespace (collection)
const NAMESPACE_NOT_FOUND: i32 = 26;

/// Server error code for dropping an index that does not exist
const INDEX_NOT_FOUND: i32 = 27;

const APP_NAME: &str = "index-janitor";

/// Index administration backed by a single MongoDB client
pub(crate) struct MongoIndexAdmin {
    database: Database,
}

impl MongoIndexAdmin {
    /// Build a client and confirm the deployment answers a `ping`
    pub(crate) async fn connect(config: &MongoConfig) -> Result<Self, StorageError> {
        let mut options = ClientOptions::parse(&config.uri).await.map_err(|e| {
            StorageError::InvalidConfig(format!(
                "Failed to parse MongoDB URI {}: {e}",
                config.redacted_uri()
            ))
        })?;
        let database_name = resolve_database(config, &options)?;
        options.server_selection_timeout = Some(config.server_selection_timeout());
        options.connect_timeout = Some(config.server_selection_timeout());
        options.app_name = Some(APP_NAME.to_string());

        let client = Client::with_options(options).map_err(|e| {
            StorageError::ConnectionFailed(format!("Failed to create MongoDB client: {e}"))
        })?;
        let database = client.database(&database_name);

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| {
                StorageError::ConnectionFailed(format!(
                    "MongoDB at {} did not respond: {e}",
                    config.redacted_uri()
                ))
            })?;

        debug!("Connected to MongoDB database '{database_name}'");
        Ok(Self { database })
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection::<Document>(name)
    }
}

/// An explicit `database` wins over the default database named in the URI
fn resolve_database(
    config: &MongoConfig,
    options: &ClientOptions,
) -> Result<String, StorageError> {
    config
        .explicit_database()
        .map(str::to_string)
        .or_else(|| options.default_database.clone())
        .ok_or_else(|| {
            StorageError::InvalidConfig(
                "No database configured: set mongodb.database or include it in the URI path"
                    .to_string(),
            )
        })
}

/// Extract the server error code from a command failure, if any
fn command_error_code(err: &MongoError) -> Option<i32> {
    match err.kind.as_ref() {
        ErrorKind::Command(command_error) => Some(command_error.code),
        _ => None,
    }
}

/// Translate driver errors into the tagged storage taxonomy
fn classify(collection: &str, err: MongoError) -> StorageError {
    match command_error_code(&err) {
        Some(NAMESPACE_NOT_FOUND) => StorageError::CollectionNotFound(collection.to_string()),
        Some(INDEX_NOT_FOUND) => StorageError::NoIndexesPresent(collection.to_string()),
        _ => StorageError::BackendError(format!("{collection}: {err}")),
    }
}

#[async_trait]
impl IndexAdmin for MongoIndexAdmin {
    async fn collection_exists(&self, name: &str) -> Result<bool, StorageError> {
        let names = self
            .database
            .list_collection_names()
            .filter(doc! { "name": name })
            .await
            .map_err(|e| {
                StorageError::BackendError(format!("Failed to list collections: {e}"))
            })?;

        Ok(names.iter().any(|n| n == name))
    }

    async fn list_secondary_indexes(&self, name: &str) -> Result<Vec<String>, StorageError> {
        let names = self
            .collection(name)
            .list_index_names()
            .await
            .map_err(|e| classify(name, e))?;

        Ok(secondary_only(names))
    }

    async fn drop_secondary_indexes(&self, name: &str) -> Result<Vec<String>, StorageError> {
        let secondary = self.list_secondary_indexes(name).await?;
        if secondary.is_empty() {
            return Err(StorageError::NoIndexesPresent(name.to_string()));
        }

        self.collection(name)
            .drop_indexes()
            .await
            .map_err(|e| classify(name, e))?;

        Ok(secondary)
    }
}
