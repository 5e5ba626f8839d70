//! Table lifecycle orchestration
//!
//! Runs once per process start as a background task: delete, purge, create,
//! update and seed phases in that fixed order, each gated by its own
//! configuration flag. A failure scoped to one table or one file is logged
//! and skipped; failures with no single-unit scope (store unreachable,
//! broken data directory) abort the run and park the state machine in
//! `Error`. Progress is observable at any time through [`BootstrapState`].

mod status;

pub use status::{BootstrapState, BootstrapStatus, StatsSnapshot, TableStats};

use crate::datafiles::{classify, read_records};
use crate::error::Result;
use crate::state::AppState;
use std::path::Path;
use std::sync::Arc;
use tablesmith_store::{CreateOutcome, StoreError, TableStore, UpdateOutcome};
use tracing::{debug, error, info, warn};

/// Run the bootstrap sequence, recording progress and the final outcome
///
/// Never returns an error: the state machine is the caller-visible result.
pub async fn run_bootstrap(state: Arc<AppState>) {
    info!("starting table bootstrap");
    state.bootstrap.set_status(BootstrapStatus::Started);

    match run_phases(&state).await {
        Ok(()) => {
            state.bootstrap.set_status(BootstrapStatus::Finished);
            let stats = state.bootstrap.stats().snapshot();
            info!(
                deleted = stats.deleted,
                purged = stats.purged,
                created = stats.created,
                updated = stats.updated,
                seeded = stats.seeded,
                "finished table bootstrap"
            );
        }
        Err(e) => {
            error!(error = %e, "table bootstrap failed");
            state.bootstrap.set_status(BootstrapStatus::Error);
        }
    }
}

async fn run_phases(state: &AppState) -> Result<()> {
    let config = &state.config;

    if config.delete_tables_on_startup {
        info!("deleting tables");
        state.bootstrap.set_status(BootstrapStatus::DeletingTables);
        delete_all_tables(state).await?;
    }

    if config.purge_tables_on_startup {
        info!("purging tables");
        state.bootstrap.set_status(BootstrapStatus::PurgingTables);
        purge_all_tables(state).await?;
    }

    if config.create_tables_on_startup {
        info!("creating tables");
        state.bootstrap.set_status(BootstrapStatus::CreatingTables);
        create_tables(state).await?;
    }

    if config.update_tables_on_startup {
        info!("updating tables");
        state.bootstrap.set_status(BootstrapStatus::UpdatingTables);
        update_tables(state).await?;
    }

    if config.seed_tables_on_startup {
        info!("seeding tables");
        state.bootstrap.set_status(BootstrapStatus::SeedingTables);
        seed_tables(state).await?;
    }

    Ok(())
}

/// Delete every existing table; one table failing to delete skips it
async fn delete_all_tables(state: &AppState) -> Result<()> {
    for table in state.store.list_tables().await? {
        match state.store.delete_table(&table).await {
            Ok(()) => {
                info!(table = %table, "deleted table");
                state.bootstrap.stats().record_deleted();
            }
            Err(e @ StoreError::Unreachable(_)) => return Err(e.into()),
            Err(e) => warn!(table = %table, error = %e, "skipping table delete"),
        }
    }
    Ok(())
}

/// Empty every existing table via paginated key scans and batch deletes
async fn purge_all_tables(state: &AppState) -> Result<()> {
    for table in state.store.list_tables().await? {
        match purge_table(&state.store, &table).await {
            Ok(()) => {
                info!(table = %table, "purged table");
                state.bootstrap.stats().record_purged();
            }
            Err(e @ StoreError::Unreachable(_)) => return Err(e.into()),
            Err(e) => warn!(table = %table, error = %e, "skipping table purge"),
        }
    }
    Ok(())
}

async fn purge_table(store: &TableStore, table: &str) -> std::result::Result<(), StoreError> {
    let key_attributes = store.key_attributes(table).await?;
    let mut start_key = None;

    loop {
        let page = store
            .scan_key_page(table, &key_attributes, start_key.take())
            .await?;

        if !page.keys.is_empty() {
            debug!(table = %table, items = page.keys.len(), "deleting scanned page");
            store.batch_delete(table, page.keys).await?;
        }

        match page.next {
            Some(next) => start_key = Some(next),
            None => break,
        }
    }

    Ok(())
}

/// Create a table per schema document; an existing table is a logged no-op
async fn create_tables(state: &AppState) -> Result<()> {
    for path in state.data.create_schema_files()? {
        let schema = match state.data.read_schema(&path) {
            Ok(schema) => schema,
            Err(e) => {
                warn!(error = %e, "skipping unreadable schema document");
                continue;
            }
        };

        match state.store.create_table(&schema).await {
            Ok(CreateOutcome::Created) => {
                info!(table = %schema.table_name, "created table");
                state.bootstrap.stats().record_created();
            }
            Ok(CreateOutcome::AlreadyExists) => {
                warn!(table = %schema.table_name, "table already exists, skipping creation");
                state.bootstrap.stats().record_created();
            }
            Err(e @ StoreError::Unreachable(_)) => return Err(e.into()),
            Err(e) => warn!(table = %schema.table_name, error = %e, "failed to create table"),
        }
    }
    Ok(())
}

/// Apply a schema update per document; a no-op update is logged and counted
async fn update_tables(state: &AppState) -> Result<()> {
    for path in state.data.update_schema_files()? {
        let schema = match state.data.read_schema(&path) {
            Ok(schema) => schema,
            Err(e) => {
                warn!(error = %e, "skipping unreadable schema document");
                continue;
            }
        };

        match state.store.update_table(&schema).await {
            Ok(UpdateOutcome::Applied) => {
                info!(table = %schema.table_name, "updated table");
                state.bootstrap.stats().record_updated();
            }
            Ok(UpdateOutcome::NoOp) => {
                warn!(table = %schema.table_name, "table update already applied, skipping");
                state.bootstrap.stats().record_updated();
            }
            Err(e @ StoreError::Unreachable(_)) => return Err(e.into()),
            Err(e) => warn!(table = %schema.table_name, error = %e, "failed to update table"),
        }
    }
    Ok(())
}

/// Seed every (table, file) pair; one bad file never blocks the next
async fn seed_tables(state: &AppState) -> Result<()> {
    for (table, path) in state.data.seed_files()? {
        match seed_table(&state.store, &table, &path).await {
            Ok(()) => {
                info!(table = %table, file = %path.display(), "seeded table");
                state.bootstrap.stats().record_seeded();
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(table = %table, file = %path.display(), error = %e, "skipping seed file")
            }
        }
    }
    Ok(())
}

/// Classify, parse and write one data file into a table
///
/// Shared by the seed phase and the on-demand load endpoint. A record that
/// fails to parse or write is logged and skipped; the file as a whole fails
/// only if it cannot be classified or opened, or the store goes away.
pub async fn seed_table(store: &TableStore, table: &str, path: &Path) -> Result<()> {
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let kind = classify(file_name)?;
    debug!(table = %table, file = %path.display(), ?kind, "seeding table from file");

    for record in read_records(path, kind)? {
        match record {
            Ok(record) => {
                if let Err(e) = store.put_item(table, record).await {
                    if matches!(e, StoreError::Unreachable(_)) {
                        return Err(e.into());
                    }
                    warn!(table = %table, error = %e, "skipping item write");
                }
            }
            Err(e) => warn!(table = %table, error = %e, "skipping malformed record"),
        }
    }

    Ok(())
}
