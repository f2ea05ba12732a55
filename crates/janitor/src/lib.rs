//! Idempotent removal of secondary indexes from a known set of collections
//!
//! The application declares its indexes in its schema and re-creates them on
//! startup, so this crate only removes them. Connection failures abort the
//! run; anything that goes wrong for a single collection is recorded and the
//! run continues with the next one.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod janitor;
pub mod report;

pub use janitor::IndexJanitor;
pub use report::{CollectionOutcome, RunReport};

use index_janitor_core::error::{Error, Result};
use index_janitor_core::{Config, MongoConfig};
use index_janitor_storage::{IndexAdmin, StorageError};
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info};

/// Exit status for a successful run, per-collection failures included
pub const EXIT_SUCCESS: u8 = 0;

/// Exit status for configuration, connection and interrupt failures
pub const EXIT_FAILURE: u8 = 1;

/// Connect, then clean every configured collection
///
/// `connect` opens the database handle; it is called exactly once. When it
/// fails the error is returned and no collection is touched.
///
/// # Errors
///
/// Returns [`Error::Connection`] (or [`Error::Config`]) when the connection
/// phase fails. Per-collection failures never surface here; they are part of
/// the returned [`RunReport`].
pub async fn execute<C, Fut, S>(config: &Config, connect: C, shutdown: S) -> Result<RunReport>
where
    C: FnOnce(MongoConfig) -> Fut,
    Fut: Future<Output = std::result::Result<Arc<dyn IndexAdmin>, StorageError>>,
    S: Future<Output = ()>,
{
    info!("Connecting to MongoDB at {}", config.mongodb.redacted_uri());
    let admin = match connect(config.mongodb.clone()).await {
        Ok(admin) => admin,
        Err(e) => {
            error!("Failed to connect to MongoDB: {e}");
            return Err(Error::from(e));
        }
    };
    info!(
        "Connected, cleaning {} collections",
        config.janitor.collections.len()
    );

    let janitor = IndexJanitor::new(admin, &config.janitor);
    Ok(janitor.run_until(shutdown).await)
}

/// Process exit status for the result of [`execute`]
///
/// Success regardless of per-collection failures; failure when the
/// connection phase failed or the run was interrupted.
pub fn exit_status(result: &Result<RunReport>) -> u8 {
    match result {
        Ok(report) if !report.interrupted() => EXIT_SUCCESS,
        _ => EXIT_FAILURE,
    }
}
