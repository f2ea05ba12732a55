//! Sequential removal of secondary indexes across a fixed collection list

use crate::report::{CollectionOutcome, RunReport};
use index_janitor_core::JanitorConfig;
use index_janitor_storage::{IndexAdmin, StorageError};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Failure of a single database call made for one collection
#[derive(Error, Debug)]
enum CallError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

impl From<CallError> for CollectionOutcome {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Storage(StorageError::NoIndexesPresent(_)) => Self::NoIndexesToClean,
            // Dropped between the existence check and the index call
            CallError::Storage(StorageError::CollectionNotFound(_)) => Self::SkippedNotFound,
            other => Self::Failed {
                reason: other.to_string(),
            },
        }
    }
}

/// Drops secondary indexes from a fixed, ordered list of collections
///
/// Collections are processed one after another over a single connection.
/// A failure on one collection is recorded and the loop moves on.
pub struct IndexJanitor {
    admin: Arc<dyn IndexAdmin>,
    collections: Vec<String>,
    operation_timeout: Option<Duration>,
    dry_run: bool,
}

impl IndexJanitor {
    pub fn new(admin: Arc<dyn IndexAdmin>, config: &JanitorConfig) -> Self {
        Self {
            admin,
            collections: config.collections.clone(),
            operation_timeout: config.operation_timeout(),
            dry_run: config.dry_run,
        }
    }

    /// Visit every collection and return the outcomes in list order
    pub async fn run(&self) -> RunReport {
        self.run_until(std::future::pending()).await
    }

    /// Like [`run`](Self::run), but stops early once `shutdown` resolves
    ///
    /// The call in flight when `shutdown` fires is abandoned and no further
    /// collections are visited. The report is marked interrupted.
    pub async fn run_until<S>(&self, shutdown: S) -> RunReport
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        if self.dry_run {
            info!("Dry run: no indexes will be dropped");
        }

        let mut report = RunReport::new(self.collections.len());
        for name in &self.collections {
            let outcome = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!("Interrupted while processing '{name}', stopping");
                    report.mark_interrupted();
                    break;
                }
                outcome = self.process(name) => outcome,
            };

            log_outcome(name, &outcome);
            report.push(name.as_str(), outcome);
        }

        if report.failed() > 0 || report.interrupted() {
            warn!("{}", report.summary());
        } else {
            info!("{}", report.summary());
        }
        report
    }

    async fn process(&self, name: &str) -> CollectionOutcome {
        debug!("Checking whether '{name}' exists");
        match self.bounded(self.admin.collection_exists(name)).await {
            Ok(true) => {}
            Ok(false) => return CollectionOutcome::SkippedNotFound,
            Err(e) => return e.into(),
        }

        if self.dry_run {
            return match self.bounded(self.admin.list_secondary_indexes(name)).await {
                Ok(indexes) if indexes.is_empty() => CollectionOutcome::NoIndexesToClean,
                Ok(indexes) => CollectionOutcome::WouldClean { indexes },
                Err(e) => e.into(),
            };
        }

        debug!("Dropping secondary indexes on '{name}'");
        match self.bounded(self.admin.drop_secondary_indexes(name)).await {
            Ok(dropped) => CollectionOutcome::Cleaned { dropped },
            Err(e) => e.into(),
        }
    }

    /// Apply the per-operation timeout, if one is configured
    async fn bounded<T, F>(&self, call: F) -> Result<T, CallError>
    where
        F: Future<Output = Result<T, StorageError>>,
    {
        match self.operation_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => Ok(result?),
                Err(_) => Err(CallError::TimedOut(limit)),
            },
            None => Ok(call.await?),
        }
    }
}

fn log_outcome(name: &str, outcome: &CollectionOutcome) {
    match outcome {
        CollectionOutcome::Failed { .. } => error!("{name}: {outcome}"),
        _ => info!("{name}: {outcome}"),
    }
}
