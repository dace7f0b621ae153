//! Database schema migrations for SQLite.
//!
//! Versioned: each migration moves the schema from version N to N+1 and is
//! recorded in `schema_migrations`.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema. Idempotent.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current, CURRENT_VERSION
        )));
    }

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
            tracing::debug!(version, "applied schema migration");
        }

        tx.commit()?;
    }

    Ok(())
}

fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Single row, written once at initialization
        CREATE TABLE registry_meta (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            administrator BLOB NOT NULL,      -- 32 bytes, Ed25519 public key
            initialized_at INTEGER NOT NULL   -- Unix ms
        );

        -- Current verifier set
        CREATE TABLE verifiers (
            identity BLOB PRIMARY KEY         -- 32 bytes
        );

        -- Registered documents, never deleted
        CREATE TABLE documents (
            fingerprint BLOB PRIMARY KEY,     -- 32 bytes, Blake3 of the hash string
            hash TEXT NOT NULL,               -- hash string as registered
            title TEXT NOT NULL,
            owner BLOB NOT NULL,              -- 32 bytes
            registered_at INTEGER NOT NULL,   -- Unix ms
            status INTEGER NOT NULL,          -- 0=pending, 1=approved, 2=rejected
            verifiers BLOB NOT NULL,          -- CBOR array of identities
            rejection_reason TEXT NOT NULL
        );

        -- Append-only notification log
        CREATE TABLE events (
            seq INTEGER PRIMARY KEY,
            at INTEGER NOT NULL,              -- Unix ms
            kind TEXT NOT NULL,
            fingerprint BLOB,                 -- null for verifier events
            body BLOB NOT NULL                -- CBOR-encoded event
        );

        -- Last accepted signed-call nonce per identity
        CREATE TABLE call_nonces (
            identity BLOB PRIMARY KEY,
            nonce INTEGER NOT NULL
        );

        CREATE INDEX idx_documents_owner ON documents(owner, registered_at);
        CREATE INDEX idx_events_fingerprint ON events(fingerprint);
        "#,
    )?;

    Ok(())
}

fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_creates_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        for table in [
            "call_nonces",
            "documents",
            "events",
            "registry_meta",
            "schema_migrations",
            "verifiers",
        ] {
            assert!(tables.contains(&table.to_string()), "missing {}", table);
        }
    }

    #[test]
    fn test_migration_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();

        let version: u32 = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_newer_schema_is_refused() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        conn.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (99, 0)",
            [],
        )
        .unwrap();

        assert!(matches!(migrate(&mut conn), Err(StoreError::Migration(_))));
    }

    #[test]
    fn test_meta_holds_single_row() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        conn.execute(
            "INSERT INTO registry_meta (id, administrator, initialized_at) VALUES (1, x'00', 0)",
            [],
        )
        .unwrap();
        assert!(conn
            .execute(
                "INSERT INTO registry_meta (id, administrator, initialized_at) VALUES (2, x'00', 0)",
                [],
            )
            .is_err());
    }
}
