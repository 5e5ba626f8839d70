//! Bootstrap status and operation counters
//!
//! One [`BootstrapState`] exists per process. The bootstrap task is its only
//! writer; request handlers read it concurrently. All fields are single-word
//! atomics, so readers need no lock and can never observe a torn value.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Global progress through the bootstrap phases
///
/// Advances monotonically during a normal run; `Error` is terminal and
/// reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum BootstrapStatus {
    NotStarted = 0,
    Started = 1,
    DeletingTables = 2,
    PurgingTables = 3,
    CreatingTables = 4,
    UpdatingTables = 5,
    SeedingTables = 6,
    Finished = 7,
    Error = 8,
}

impl BootstrapStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BootstrapStatus::NotStarted => "not_started",
            BootstrapStatus::Started => "started",
            BootstrapStatus::DeletingTables => "deleting_tables",
            BootstrapStatus::PurgingTables => "purging_tables",
            BootstrapStatus::CreatingTables => "creating_tables",
            BootstrapStatus::UpdatingTables => "updating_tables",
            BootstrapStatus::SeedingTables => "seeding_tables",
            BootstrapStatus::Finished => "finished",
            BootstrapStatus::Error => "error",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => BootstrapStatus::NotStarted,
            1 => BootstrapStatus::Started,
            2 => BootstrapStatus::DeletingTables,
            3 => BootstrapStatus::PurgingTables,
            4 => BootstrapStatus::CreatingTables,
            5 => BootstrapStatus::UpdatingTables,
            6 => BootstrapStatus::SeedingTables,
            7 => BootstrapStatus::Finished,
            _ => BootstrapStatus::Error,
        }
    }
}

impl std::fmt::Display for BootstrapStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-phase success counters, never reset during the process lifetime
#[derive(Debug, Default)]
pub struct TableStats {
    deleted: AtomicU64,
    purged: AtomicU64,
    created: AtomicU64,
    updated: AtomicU64,
    seeded: AtomicU64,
}

/// Point-in-time copy of the counters for the health document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub deleted: u64,
    pub purged: u64,
    pub created: u64,
    pub updated: u64,
    pub seeded: u64,
}

impl TableStats {
    pub fn record_deleted(&self) {
        self.deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_purged(&self) {
        self.purged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_created(&self) {
        self.created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_updated(&self) {
        self.updated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_seeded(&self) {
        self.seeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            deleted: self.deleted.load(Ordering::Relaxed),
            purged: self.purged.load(Ordering::Relaxed),
            created: self.created.load(Ordering::Relaxed),
            updated: self.updated.load(Ordering::Relaxed),
            seeded: self.seeded.load(Ordering::Relaxed),
        }
    }
}

/// Single-writer bootstrap progress shared with the observability surface
#[derive(Debug, Default)]
pub struct BootstrapState {
    status: AtomicU8,
    stats: TableStats,
}

impl BootstrapState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> BootstrapStatus {
        BootstrapStatus::from_u8(self.status.load(Ordering::Relaxed))
    }

    /// Advance the status; only the bootstrap task calls this
    pub(crate) fn set_status(&self, status: BootstrapStatus) {
        self.status.store(status as u8, Ordering::Relaxed);
    }

    pub fn stats(&self) -> &TableStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_not_started_with_zero_counters() {
        let state = BootstrapState::new();
        assert_eq!(state.status(), BootstrapStatus::NotStarted);
        assert_eq!(
            state.stats().snapshot(),
            StatsSnapshot {
                deleted: 0,
                purged: 0,
                created: 0,
                updated: 0,
                seeded: 0
            }
        );
    }

    #[test]
    fn phase_order_is_total() {
        use BootstrapStatus::*;
        let order = [
            NotStarted,
            Started,
            DeletingTables,
            PurgingTables,
            CreatingTables,
            UpdatingTables,
            SeedingTables,
            Finished,
        ];
        assert!(order.windows(2).all(|w| w[0] < w[1]));
        assert!(order.iter().all(|s| *s < Error));
    }

    #[test]
    fn status_round_trips_through_storage() {
        let state = BootstrapState::new();
        for status in [
            BootstrapStatus::Started,
            BootstrapStatus::SeedingTables,
            BootstrapStatus::Finished,
            BootstrapStatus::Error,
        ] {
            state.set_status(status);
            assert_eq!(state.status(), status);
        }
    }

    #[test]
    fn counters_accumulate_independently() {
        let state = BootstrapState::new();
        state.stats().record_created();
        state.stats().record_created();
        state.stats().record_seeded();
        let snapshot = state.stats().snapshot();
        assert_eq!(snapshot.created, 2);
        assert_eq!(snapshot.seeded, 1);
        assert_eq!(snapshot.deleted, 0);
    }

    #[test]
    fn status_serializes_as_snake_case() {
        let json = serde_json::to_value(BootstrapStatus::SeedingTables).unwrap();
        assert_eq!(json, "seeding_tables");
    }
}
