//! SQLite implementation of the Store trait.
//!
//! The primary storage backend. Uses rusqlite with bundled SQLite, wrapped in
//! async via tokio::spawn_blocking. Each commit is one SQLite transaction.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use docreg_core::{
    DocumentRecord, Event, Fingerprint, Identity, LoggedEvent, Mutation, VerificationStatus,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{Commit, Snapshot, Store};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn run_blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| {
            StoreError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                Some(format!("spawn_blocking failed: {}", e)),
            ))
        })?
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Encoding helpers
// ─────────────────────────────────────────────────────────────────────────────

fn encode_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(buf)
}

fn decode_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    ciborium::from_reader(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn fixed32(bytes: Vec<u8>, column: &str) -> Result<[u8; 32]> {
    bytes.try_into().map_err(|b: Vec<u8>| {
        StoreError::InvalidData(format!("{} has {} bytes, expected 32", column, b.len()))
    })
}

/// SQLite integers are signed. Values above `i64::MAX` are refused rather
/// than clamped, so a stored nonce or sequence number is never lower than
/// the one spent.
fn to_sql_u64(value: u64, column: &str) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| StoreError::InvalidData(format!("{} {} exceeds i64::MAX", column, value)))
}

fn from_sql_u64(value: i64, column: &str) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| StoreError::InvalidData(format!("{} {} is negative", column, value)))
}

/// A `documents` row before blob decoding.
struct DocumentRow {
    fingerprint: Vec<u8>,
    hash: String,
    title: String,
    owner: Vec<u8>,
    registered_at: i64,
    status: u8,
    verifiers: Vec<u8>,
    rejection_reason: String,
}

impl DocumentRow {
    const COLUMNS: &'static str =
        "fingerprint, hash, title, owner, registered_at, status, verifiers, rejection_reason";

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            fingerprint: row.get("fingerprint")?,
            hash: row.get("hash")?,
            title: row.get("title")?,
            owner: row.get("owner")?,
            registered_at: row.get("registered_at")?,
            status: row.get("status")?,
            verifiers: row.get("verifiers")?,
            rejection_reason: row.get("rejection_reason")?,
        })
    }

    fn into_record(self) -> Result<DocumentRecord> {
        let status = VerificationStatus::from_u8(self.status)
            .ok_or_else(|| StoreError::InvalidData(format!("unknown status {}", self.status)))?;

        Ok(DocumentRecord {
            fingerprint: Fingerprint::from_bytes(fixed32(self.fingerprint, "fingerprint")?),
            hash: self.hash,
            title: self.title,
            owner: Identity::from_bytes(fixed32(self.owner, "owner")?),
            registered_at: self.registered_at,
            status,
            verifiers: decode_cbor(&self.verifiers)?,
            rejection_reason: self.rejection_reason,
            exists: true,
        })
    }
}

fn require_initialized(conn: &Connection) -> Result<()> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM registry_meta", [], |row| row.get(0))?;
    if count == 0 {
        return Err(StoreError::NotInitialized);
    }
    Ok(())
}

fn apply_mutation(conn: &Connection, mutation: &Mutation) -> Result<()> {
    match mutation {
        Mutation::InsertDocument(record) => {
            let changed = conn.execute(
                "INSERT OR IGNORE INTO documents (
                    fingerprint, hash, title, owner, registered_at,
                    status, verifiers, rejection_reason
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.fingerprint.as_bytes().as_slice(),
                    record.hash,
                    record.title,
                    record.owner.as_bytes().as_slice(),
                    record.registered_at,
                    record.status.to_u8(),
                    encode_cbor(&record.verifiers)?,
                    record.rejection_reason,
                ],
            )?;
            if changed == 0 {
                return Err(StoreError::InvalidData(format!(
                    "document {} already stored",
                    record.fingerprint
                )));
            }
        }
        Mutation::UpdateDocument(record) => {
            let changed = conn.execute(
                "UPDATE documents
                 SET status = ?2, verifiers = ?3, rejection_reason = ?4
                 WHERE fingerprint = ?1",
                params![
                    record.fingerprint.as_bytes().as_slice(),
                    record.status.to_u8(),
                    encode_cbor(&record.verifiers)?,
                    record.rejection_reason,
                ],
            )?;
            if changed == 0 {
                return Err(StoreError::InvalidData(format!(
                    "document {} not stored",
                    record.fingerprint
                )));
            }
        }
        Mutation::AddVerifier(identity) => {
            let changed = conn.execute(
                "INSERT OR IGNORE INTO verifiers (identity) VALUES (?1)",
                params![identity.as_bytes().as_slice()],
            )?;
            if changed == 0 {
                return Err(StoreError::InvalidData(format!(
                    "verifier {} already stored",
                    identity
                )));
            }
        }
        Mutation::RemoveVerifier(identity) => {
            let changed = conn.execute(
                "DELETE FROM verifiers WHERE identity = ?1",
                params![identity.as_bytes().as_slice()],
            )?;
            if changed == 0 {
                return Err(StoreError::InvalidData(format!(
                    "verifier {} not stored",
                    identity
                )));
            }
        }
    }
    Ok(())
}

fn insert_event(conn: &Connection, logged: &LoggedEvent) -> Result<()> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO events (seq, at, kind, fingerprint, body)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            to_sql_u64(logged.seq, "event seq")?,
            logged.at,
            logged.event.name(),
            logged.event.fingerprint().map(|fp| fp.as_bytes().to_vec()),
            encode_cbor(&logged.event)?,
        ],
    )?;
    if changed == 0 {
        return Err(StoreError::InvalidData(format!(
            "event seq {} already stored",
            logged.seq
        )));
    }
    Ok(())
}

#[async_trait]
impl Store for SqliteStore {
    async fn initialize(&self, administrator: &Identity, at: i64) -> Result<()> {
        let administrator = *administrator;

        self.run_blocking(move |conn| {
            let tx = conn.transaction()?;

            let count: i64 =
                tx.query_row("SELECT COUNT(*) FROM registry_meta", [], |row| row.get(0))?;
            if count > 0 {
                return Err(StoreError::AlreadyInitialized);
            }

            tx.execute(
                "INSERT INTO registry_meta (id, administrator, initialized_at) VALUES (1, ?1, ?2)",
                params![administrator.as_bytes().as_slice(), at],
            )?;
            tx.execute(
                "INSERT INTO verifiers (identity) VALUES (?1)",
                params![administrator.as_bytes().as_slice()],
            )?;

            tx.commit()?;
            tracing::debug!(%administrator, "initialized registry store");
            Ok(())
        })
        .await
    }

    async fn load(&self) -> Result<Option<Snapshot>> {
        self.run_blocking(|conn| {
            let admin_bytes: Option<Vec<u8>> = conn
                .query_row("SELECT administrator FROM registry_meta WHERE id = 1", [], |row| {
                    row.get(0)
                })
                .optional()?;
            let Some(admin_bytes) = admin_bytes else {
                return Ok(None);
            };
            let administrator = Identity::from_bytes(fixed32(admin_bytes, "administrator")?);

            let verifier_rows: Vec<Vec<u8>> = conn
                .prepare("SELECT identity FROM verifiers ORDER BY identity")?
                .query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<_>>()?;
            let verifiers = verifier_rows
                .into_iter()
                .map(|b| fixed32(b, "identity").map(Identity::from_bytes))
                .collect::<Result<Vec<_>>>()?;

            let document_rows: Vec<DocumentRow> = conn
                .prepare(&format!("SELECT {} FROM documents", DocumentRow::COLUMNS))?
                .query_map([], DocumentRow::from_row)?
                .collect::<rusqlite::Result<_>>()?;
            let documents = document_rows
                .into_iter()
                .map(DocumentRow::into_record)
                .collect::<Result<Vec<_>>>()?;

            let nonce_rows: Vec<(Vec<u8>, i64)> = conn
                .prepare("SELECT identity, nonce FROM call_nonces ORDER BY identity")?
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<rusqlite::Result<_>>()?;
            let nonces = nonce_rows
                .into_iter()
                .map(|(b, n)| -> Result<(Identity, u64)> {
                    Ok((
                        Identity::from_bytes(fixed32(b, "identity")?),
                        from_sql_u64(n, "nonce")?,
                    ))
                })
                .collect::<Result<Vec<_>>>()?;

            let last_event_seq: i64 =
                conn.query_row("SELECT COALESCE(MAX(seq), 0) FROM events", [], |row| row.get(0))?;

            Ok(Some(Snapshot {
                administrator,
                verifiers,
                documents,
                nonces,
                last_event_seq: from_sql_u64(last_event_seq, "event seq")?,
            }))
        })
        .await
    }

    async fn commit(&self, commit: &Commit) -> Result<()> {
        let commit = commit.clone();

        self.run_blocking(move |conn| {
            let tx = conn.transaction()?;
            require_initialized(&tx)?;

            if let Some(mutation) = &commit.mutation {
                apply_mutation(&tx, mutation)?;
            }

            if let Some(event) = &commit.event {
                insert_event(&tx, event)?;
            }

            if let Some((identity, nonce)) = commit.nonce {
                tx.execute(
                    "INSERT INTO call_nonces (identity, nonce) VALUES (?1, ?2)
                     ON CONFLICT(identity) DO UPDATE SET nonce = excluded.nonce",
                    params![identity.as_bytes().as_slice(), to_sql_u64(nonce, "nonce")?],
                )?;
            }

            tx.commit()?;
            tracing::debug!(
                seq = ?commit.event.as_ref().map(|e| e.seq),
                kind = ?commit.event.as_ref().map(|e| e.event.name()),
                "committed"
            );
            Ok(())
        })
        .await
    }

    async fn events_since(&self, after_seq: u64) -> Result<Vec<LoggedEvent>> {
        self.run_blocking(move |conn| {
            require_initialized(conn)?;
            let rows: Vec<(i64, i64, Vec<u8>)> = conn
                .prepare("SELECT seq, at, body FROM events WHERE seq > ?1 ORDER BY seq")?
                .query_map(params![i64::try_from(after_seq).unwrap_or(i64::MAX)], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
                })?
                .collect::<rusqlite::Result<_>>()?;

            rows.into_iter()
                .map(|(seq, at, body)| -> Result<LoggedEvent> {
                    let event: Event = decode_cbor(&body)?;
                    Ok(LoggedEvent {
                        seq: from_sql_u64(seq, "event seq")?,
                        at,
                        event,
                    })
                })
                .collect()
        })
        .await
    }
}
