use crate::mongo::MongoIndexAdmin;
use crate::{IndexAdmin, StorageError};
use index_janitor_core::MongoConfig;
use std::sync::Arc;

/// Opens a connection to the configured database and verifies it.
///
/// Server selection is bounded by `server_selection_timeout_ms`, so an
/// unreachable server fails here instead of hanging the first real call.
///
/// # Errors
/// Returns [`StorageError::InvalidConfig`] for an unusable URI or database
/// name, and [`StorageError::ConnectionFailed`] when the server cannot be
/// reached in time.
///
/// # Example
/// ```ignore
/// let admin = connect_index_admin(&config.mongodb).await?;
/// if admin.collection_exists("products").await? {
///     admin.drop_secondary_indexes("products").await?;
/// }
/// ```
pub async fn connect_index_admin(
    config: &MongoConfig,
) -> Result<Arc<dyn IndexAdmin>, StorageError> {
    let admin = MongoIndexAdmin::connect(config).await?;
    Ok(Arc::new(admin) as Arc<dyn IndexAdmin>)
}
