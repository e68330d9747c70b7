//! Process-wide record store.
//!
//! Readers grab an `Arc` to the current [`RecordSnapshot`] and keep a
//! consistent view for as long as they hold it. A refresh builds a
//! complete new snapshot off to the side and publishes it with a single
//! atomic pointer swap, so nobody ever observes a half-loaded dataset.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use surveillance_map_records_models::{RawRecord, Record};

use crate::RecordsError;
use crate::sources::RecordSource;

/// An immutable, fully loaded view of the dataset.
#[derive(Debug, Clone)]
pub struct RecordSnapshot {
    /// Records in source order.
    pub records: Vec<Record>,
    /// When this snapshot was published.
    pub loaded_at: DateTime<Utc>,
}

impl RecordSnapshot {
    /// Creates a snapshot stamped with the current time.
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            loaded_at: Utc::now(),
        }
    }

    /// Coerces raw upstream rows into a snapshot.
    #[must_use]
    pub fn from_raw(rows: &[RawRecord]) -> Self {
        Self::new(rows.iter().map(Record::from_raw).collect())
    }

    /// Returns `true` if the snapshot holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Result of a [`RecordStore::refresh`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new snapshot with this many rows was published.
    Replaced {
        /// Rows in the new snapshot.
        rows: usize,
    },
    /// The source returned no rows; the previous snapshot was kept.
    Unchanged {
        /// Rows in the retained snapshot.
        rows: usize,
    },
    /// Another refresh was already running; this one did nothing.
    AlreadyRunning,
}

/// Atomically swappable holder of the current [`RecordSnapshot`].
pub struct RecordStore {
    inner: ArcSwap<RecordSnapshot>,
    refreshing: AtomicBool,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new(RecordSnapshot::new(Vec::new()))
    }
}

impl RecordStore {
    /// Creates a store holding `initial`.
    #[must_use]
    pub fn new(initial: RecordSnapshot) -> Self {
        Self {
            inner: ArcSwap::new(Arc::new(initial)),
            refreshing: AtomicBool::new(false),
        }
    }

    /// Returns the current snapshot. The returned `Arc` stays valid and
    /// unchanged even if a refresh publishes a newer snapshot meanwhile.
    #[must_use]
    pub fn snapshot(&self) -> Arc<RecordSnapshot> {
        self.inner.load_full()
    }

    /// Publishes `records` as the new snapshot.
    pub fn replace(&self, records: Vec<Record>) {
        let rows = records.len();
        self.inner.store(Arc::new(RecordSnapshot::new(records)));
        log::info!("Published record snapshot with {rows} rows");
    }

    /// Reloads every record from `source` and swaps it in.
    ///
    /// Only one refresh runs at a time; concurrent callers get
    /// [`RefreshOutcome::AlreadyRunning`]. If the source returns no rows the
    /// previous snapshot is kept.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError`] if the source fails. The previous snapshot
    /// stays published in that case.
    pub async fn refresh(&self, source: &dyn RecordSource) -> Result<RefreshOutcome, RecordsError> {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::info!("Record refresh already in progress, skipping");
            return Ok(RefreshOutcome::AlreadyRunning);
        }
        let _guard = RefreshGuard(&self.refreshing);

        log::info!("Refreshing records from {}", source.name());
        let rows = match source.fetch_all().await {
            Ok(rows) => rows,
            Err(e) => {
                log::error!(
                    "Failed to refresh records from {}, keeping stale data: {e}",
                    source.name()
                );
                return Err(e);
            }
        };

        if rows.is_empty() {
            let kept = self.snapshot().len();
            log::warn!(
                "{} returned no rows, keeping previous snapshot ({kept} rows)",
                source.name()
            );
            return Ok(RefreshOutcome::Unchanged { rows: kept });
        }

        let snapshot = RecordSnapshot::from_raw(&rows);
        let count = snapshot.len();
        self.inner.store(Arc::new(snapshot));
        log::info!("Loaded {count} records from {}", source.name());

        Ok(RefreshOutcome::Replaced { rows: count })
    }
}

/// Clears the in-progress flag when a refresh ends, however it ends.
struct RefreshGuard<'a>(&'a AtomicBool);

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
