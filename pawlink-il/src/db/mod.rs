//! Persistence boundary
//!
//! SQLite storage for normalized per-source match keys and the final master
//! identity table. Tables are replaced wholesale on each run (drop and
//! recreate), matching the pipeline's full-rebuild model. Address-variant
//! sequences are persisted as a self-describing JSON string.

use std::path::Path;

use sqlx::SqlitePool;

use pawlink_common::{Error, Result};

use crate::models::{MasterTable, MatchKeySet, SourceRecord};

/// Initialize database connection pool, creating the file if missing
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;
    Ok(pool)
}

fn variants_json(keys: &MatchKeySet) -> Result<String> {
    serde_json::to_string(&keys.address_variants)
        .map_err(|e| Error::Config(format!("Serialize address variants failed: {}", e)))
}

/// Replace a source's normalized-key table.
///
/// Table name is `{source}_keys`; one row per source record, keyed by the
/// source-local row id.
pub async fn persist_source_keys(
    pool: &SqlitePool,
    source_name: &str,
    rows: &[(SourceRecord, MatchKeySet)],
) -> Result<()> {
    let table = format!("{}_keys", source_name);
    let mut tx = pool.begin().await?;

    sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
        .execute(&mut *tx)
        .await?;
    sqlx::query(&format!(
        r#"
        CREATE TABLE {} (
            row_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            cell TEXT NOT NULL,
            phone TEXT NOT NULL,
            address_variants TEXT NOT NULL
        )
        "#,
        table
    ))
    .execute(&mut *tx)
    .await?;

    let insert = format!(
        "INSERT INTO {} (row_id, name, email, cell, phone, address_variants) VALUES (?, ?, ?, ?, ?, ?)",
        table
    );
    for (record, keys) in rows {
        sqlx::query(&insert)
            .bind(record.row_id as i64)
            .bind(&keys.name)
            .bind(&keys.email)
            .bind(&keys.cell)
            .bind(&keys.phone)
            .bind(variants_json(keys)?)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    tracing::info!(table = %table, rows = rows.len(), "Persisted normalized keys");
    Ok(())
}

/// Replace the master identity table and its link relation.
pub async fn persist_master(pool: &SqlitePool, master: &MasterTable) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DROP TABLE IF EXISTS identity_links")
        .execute(&mut *tx)
        .await?;
    sqlx::query("DROP TABLE IF EXISTS master_identities")
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        r#"
        CREATE TABLE master_identities (
            identity_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            cell TEXT NOT NULL,
            phone TEXT NOT NULL,
            address_variants TEXT NOT NULL
        )
        "#,
    )
    .execute(&mut *tx)
    .await?;
    sqlx::query(
        r#"
        CREATE TABLE identity_links (
            identity_id TEXT NOT NULL,
            source_name TEXT NOT NULL,
            source_row_id INTEGER NOT NULL,
            PRIMARY KEY (source_name, source_row_id),
            FOREIGN KEY (identity_id) REFERENCES master_identities(identity_id)
        )
        "#,
    )
    .execute(&mut *tx)
    .await?;

    for identity in master.identities() {
        sqlx::query(
            "INSERT INTO master_identities (identity_id, name, email, cell, phone, address_variants) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(identity.identity_id.to_string())
        .bind(&identity.keys.name)
        .bind(&identity.keys.email)
        .bind(&identity.keys.cell)
        .bind(&identity.keys.phone)
        .bind(variants_json(&identity.keys)?)
        .execute(&mut *tx)
        .await?;

        for link in &identity.links {
            sqlx::query(
                "INSERT INTO identity_links (identity_id, source_name, source_row_id) VALUES (?, ?, ?)",
            )
            .bind(identity.identity_id.to_string())
            .bind(&link.source_name)
            .bind(link.source_row_id as i64)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    tracing::info!(identities = master.len(), "Persisted master identity table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{IdentityLinker, LinkOutcome};

    fn sample_keys(email: &str) -> MatchKeySet {
        MatchKeySet {
            name: "doe jane".to_string(),
            email: email.to_string(),
            cell: String::new(),
            phone: String::new(),
            address_variants: vec!["123 main street".to_string()],
        }
    }

    #[tokio::test]
    async fn test_persist_source_keys_replaces_table() {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        let record = SourceRecord::new(0, vec![("email".to_string(), "jane@x.com".to_string())]);
        let rows = vec![(record, sample_keys("jane@x.com"))];

        persist_source_keys(&pool, "crm", &rows).await.unwrap();
        // second run replaces, not appends
        persist_source_keys(&pool, "crm", &rows).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM crm_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);

        let variants: String =
            sqlx::query_scalar("SELECT address_variants FROM crm_keys WHERE row_id = 0")
                .fetch_one(&pool)
                .await
                .unwrap();
        let parsed: Vec<String> = serde_json::from_str(&variants).unwrap();
        assert_eq!(parsed, vec!["123 main street"]);
    }

    #[tokio::test]
    async fn test_persist_master_writes_links() {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        let linker = IdentityLinker::new();
        let mut master = MasterTable::new();

        let outcome = linker.link(sample_keys("jane@x.com"), "crm", 0, &mut master);
        linker.link(sample_keys("jane@x.com"), "petpoint", 4, &mut master);
        assert!(matches!(outcome, LinkOutcome::Created(_)));

        persist_master(&pool, &master).await.unwrap();

        let identities: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM master_identities")
            .fetch_one(&pool)
            .await
            .unwrap();
        let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM identity_links")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(identities, 1);
        assert_eq!(links, 2);

        let linked_id: String = sqlx::query_scalar(
            "SELECT identity_id FROM identity_links WHERE source_name = 'petpoint' AND source_row_id = 4",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(linked_id, outcome.identity_id().to_string());
    }
}
