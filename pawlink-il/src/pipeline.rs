//! Sequential pipeline orchestration
//!
//! One pass per configured source, sources in configuration order (the
//! first source seeds the master table). Within a pass each record's link
//! decision depends on the cumulative master table built by all prior
//! records, so rows are linked strictly in input row order. Single-threaded
//! by design; the database is touched only at the persistence boundary.

use sqlx::SqlitePool;

use pawlink_common::{PipelineConfig, Result, SourceConfig};

use crate::db;
use crate::ingest;
use crate::models::MasterTable;
use crate::services::{EnglishExpander, IdentityLinker, KeyBuilder, LinkOutcome};

/// Run the full pipeline: link every configured source into a fresh master
/// table, persisting normalized keys per source and the master table at
/// the end. Returns the in-memory master table.
pub async fn run(pool: &SqlitePool, config: &PipelineConfig) -> Result<MasterTable> {
    let expander = EnglishExpander::new();
    let linker = IdentityLinker::new();
    let mut master = MasterTable::new();

    for source in &config.sources {
        process_source(pool, source, &expander, &linker, &mut master).await?;
    }

    db::persist_master(pool, &master).await?;
    Ok(master)
}

/// One sequential pass over one source: ingest, validate the field map,
/// build match keys and link row by row, persist the normalized keys.
async fn process_source(
    pool: &SqlitePool,
    source: &SourceConfig,
    expander: &EnglishExpander,
    linker: &IdentityLinker,
    master: &mut MasterTable,
) -> Result<()> {
    tracing::info!(source = %source.name, path = %source.path.display(), "Processing source");

    let records = ingest::read_source(&source.path, source.encoding, source.drop_first_column)?;
    let builder = KeyBuilder::new(&source.field_map, expander);

    // Fail on a schema mismatch before any record is linked
    if let Some(first) = records.first() {
        builder.validate_field_map(first)?;
    }

    let mut rows = Vec::with_capacity(records.len());
    let mut created = 0usize;
    let mut matched = 0usize;
    for record in records {
        let keys = builder.build_match_keys(&record)?;
        match linker.link(keys.clone(), &source.name, record.row_id, master) {
            LinkOutcome::Created(_) => created += 1,
            LinkOutcome::Matched(_) => matched += 1,
        }
        rows.push((record, keys));
    }

    db::persist_source_keys(pool, &source.name, &rows).await?;

    tracing::info!(
        source = %source.name,
        rows = rows.len(),
        created,
        matched,
        total_identities = master.len(),
        "Source linked"
    );
    Ok(())
}
