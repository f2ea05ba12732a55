//! Per-collection outcomes and the report of a whole run

use std::fmt;

/// What happened to one collection during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionOutcome {
    /// The collection does not exist; nothing was attempted
    SkippedNotFound,
    /// Secondary indexes were dropped
    Cleaned { dropped: Vec<String> },
    /// Only the primary index was present
    NoIndexesToClean,
    /// Dry run: these indexes would have been dropped
    WouldClean { indexes: Vec<String> },
    /// Any other failure, recovered locally
    Failed { reason: String },
}

impl CollectionOutcome {
    /// True for every outcome except `Failed`
    pub fn is_benign(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for CollectionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SkippedNotFound => write!(f, "collection not found, skipped"),
            Self::Cleaned { dropped } => write!(
                f,
                "dropped {} secondary index(es): {}",
                dropped.len(),
                dropped.join(", ")
            ),
            Self::NoIndexesToClean => write!(f, "no secondary indexes to drop"),
            Self::WouldClean { indexes } => write!(
                f,
                "would drop {} secondary index(es): {}",
                indexes.len(),
                indexes.join(", ")
            ),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Ordered outcomes of a run, in Target Collection List order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    outcomes: Vec<(String, CollectionOutcome)>,
    planned: usize,
    interrupted: bool,
}

impl RunReport {
    pub(crate) fn new(planned: usize) -> Self {
        Self {
            outcomes: Vec::with_capacity(planned),
            planned,
            interrupted: false,
        }
    }

    pub(crate) fn push(&mut self, collection: impl Into<String>, outcome: CollectionOutcome) {
        self.outcomes.push((collection.into(), outcome));
    }

    pub(crate) fn mark_interrupted(&mut self) {
        self.interrupted = true;
    }

    pub fn outcomes(&self) -> &[(String, CollectionOutcome)] {
        &self.outcomes
    }

    /// Outcome recorded for a collection, if it was visited
    pub fn outcome(&self, collection: &str) -> Option<&CollectionOutcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| name == collection)
            .map(|(_, outcome)| outcome)
    }

    /// Whether the run stopped before visiting every collection
    pub fn interrupted(&self) -> bool {
        self.interrupted
    }

    pub fn cleaned(&self) -> usize {
        self.count(|o| matches!(o, CollectionOutcome::Cleaned { .. }))
    }

    pub fn would_clean(&self) -> usize {
        self.count(|o| matches!(o, CollectionOutcome::WouldClean { .. }))
    }

    pub fn already_clean(&self) -> usize {
        self.count(|o| matches!(o, CollectionOutcome::NoIndexesToClean))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, CollectionOutcome::SkippedNotFound))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| !o.is_benign())
    }

    fn count(&self, predicate: impl Fn(&CollectionOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| predicate(o)).count()
    }

    /// One-line summary for the end of the log
    pub fn summary(&self) -> String {
        let head = if self.interrupted {
            format!(
                "Index cleanup interrupted after {} of {} collections",
                self.outcomes.len(),
                self.planned
            )
        } else {
            format!("Index cleanup finished for {} collections", self.planned)
        };
        let cleaned = if self.would_clean() > 0 {
            format!("{} would be cleaned", self.would_clean())
        } else {
            format!("{} cleaned", self.cleaned())
        };
        format!(
            "{head}: {cleaned}, {} already clean, {} not found, {} failed",
            self.already_clean(),
            self.skipped(),
            self.failed()
        )
    }
}
