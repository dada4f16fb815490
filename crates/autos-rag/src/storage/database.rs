//! SQLite record store for temp documents, documents, prompts and the
//! per-context token ledger

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::document::{Document, TempDocument};
use crate::types::llm::TokenUsage;

/// SQLite-backed record store.
///
/// The connection sits behind a mutex; every write path, including the
/// shared deletion path the review fan-out hits, is serialized through it.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Create or open the database at the given path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| Error::storage(format!("failed to open database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::storage(format!("failed to open in-memory database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        Ok(db)
    }

    /// Run database migrations
    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA temp_store=MEMORY;
        "#,
        )
        .map_err(|e| Error::storage(format!("failed to set pragmas: {}", e)))?;

        conn.execute_batch(
            r#"
            -- Segmented documents awaiting classification/structuring
            CREATE TABLE IF NOT EXISTS autos_temp (
                id TEXT PRIMARY KEY,
                id_ctxt INTEGER NOT NULL,
                id_natu INTEGER NOT NULL,
                id_pje TEXT NOT NULL,
                doc TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_autos_temp_ctxt ON autos_temp(id_ctxt);
            CREATE INDEX IF NOT EXISTS idx_autos_temp_created_at ON autos_temp(created_at);

            -- Durable classified documents; one per (context, PJe id)
            CREATE TABLE IF NOT EXISTS autos (
                id TEXT PRIMARY KEY,
                id_ctxt INTEGER NOT NULL,
                id_natu INTEGER NOT NULL,
                id_pje TEXT NOT NULL,
                doc TEXT NOT NULL,
                doc_json TEXT,
                created_at TEXT NOT NULL,
                UNIQUE(id_ctxt, id_pje)
            );

            CREATE INDEX IF NOT EXISTS idx_autos_ctxt ON autos(id_ctxt);
            CREATE INDEX IF NOT EXISTS idx_autos_ctxt_natu ON autos(id_ctxt, id_natu);

            -- Extraction prompt per natureza family
            CREATE TABLE IF NOT EXISTS prompts (
                natureza INTEGER PRIMARY KEY,
                txt_prompt TEXT NOT NULL
            );

            -- Case contexts with their token ledger
            CREATE TABLE IF NOT EXISTS contextos (
                id INTEGER PRIMARY KEY,
                prompt_tokens INTEGER NOT NULL DEFAULT 0,
                completion_tokens INTEGER NOT NULL DEFAULT 0,
                total_tokens INTEGER NOT NULL DEFAULT 0
            );

            -- Embedding store for cause-defining documents
            CREATE TABLE IF NOT EXISTS autos_embedding (
                id TEXT PRIMARY KEY,
                autos_id TEXT NOT NULL,
                id_ctxt INTEGER NOT NULL,
                id_natu INTEGER NOT NULL,
                id_pje TEXT NOT NULL,
                embedding BLOB NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_autos_embedding_ctxt ON autos_embedding(id_ctxt);
            CREATE UNIQUE INDEX IF NOT EXISTS idx_autos_embedding_pje
                ON autos_embedding(id_ctxt, id_pje);
        "#,
        )
        .map_err(|e| Error::storage(format!("failed to run migrations: {}", e)))?;

        tracing::info!("database migrations complete");
        Ok(())
    }

    pub(crate) fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    // ==================== Temp Document Operations ====================

    /// Insert a segmented document awaiting structuring
    pub fn insert_temp_document(
        &self,
        context_id: i64,
        natureza: i32,
        pje_id: &str,
        text: &str,
    ) -> Result<TempDocument> {
        let conn = self.conn.lock();
        let record = TempDocument {
            id: Uuid::new_v4().to_string(),
            context_id,
            natureza,
            pje_id: pje_id.to_string(),
            text: text.to_string(),
            created_at: Utc::now(),
        };

        conn.execute(
            r#"
            INSERT INTO autos_temp (id, id_ctxt, id_natu, id_pje, doc, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.id,
                record.context_id,
                record.natureza,
                record.pje_id,
                record.text,
                record.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| Error::storage(format!("failed to insert temp document: {}", e)))?;

        Ok(record)
    }

    /// Get a temp document by id
    pub fn get_temp_document(&self, id: &str) -> Result<Option<TempDocument>> {
        let conn = self.conn.lock();

        let record = conn
            .prepare("SELECT id, id_ctxt, id_natu, id_pje, doc, created_at FROM autos_temp WHERE id = ?1")?
            .query_row(params![id], row_to_temp_document)
            .optional()
            .map_err(|e| Error::storage(format!("failed to get temp document: {}", e)))?;

        Ok(record)
    }

    /// List the temp documents of a context, oldest first
    pub fn list_temp_documents(&self, context_id: i64) -> Result<Vec<TempDocument>> {
        let conn = self.conn.lock();

        let records = conn
            .prepare(
                "SELECT id, id_ctxt, id_natu, id_pje, doc, created_at FROM autos_temp
                 WHERE id_ctxt = ?1 ORDER BY created_at ASC",
            )?
            .query_map(params![context_id], row_to_temp_document)
            .map_err(|e| Error::storage(format!("failed to list temp documents: {}", e)))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(records)
    }

    /// Delete a temp document; returns whether a row existed
    pub fn delete_temp_document(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock();

        let count = conn
            .execute("DELETE FROM autos_temp WHERE id = ?1", params![id])
            .map_err(|e| Error::storage(format!("failed to delete temp document: {}", e)))?;

        Ok(count > 0)
    }

    /// Delete temp documents created before the cutoff; returns how many
    pub fn delete_temp_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let conn = self.conn.lock();

        let count = conn
            .execute(
                "DELETE FROM autos_temp WHERE created_at < ?1",
                params![cutoff.to_rfc3339()],
            )
            .map_err(|e| Error::storage(format!("failed to sweep temp documents: {}", e)))?;

        Ok(count)
    }

    /// Rewrite a temp document's creation timestamp (test scaffolding)
    #[cfg(test)]
    pub fn backdate_temp_document(&self, id: &str, hours: i64) -> Result<()> {
        let conn = self.conn.lock();
        let backdated = Utc::now() - chrono::Duration::hours(hours);
        conn.execute(
            "UPDATE autos_temp SET created_at = ?2 WHERE id = ?1",
            params![id, backdated.to_rfc3339()],
        )?;
        Ok(())
    }

    // ==================== Document Operations ====================

    /// Persist a classified document
    pub fn insert_document(
        &self,
        context_id: i64,
        natureza: i32,
        pje_id: &str,
        raw_text: &str,
        structured_json: Option<&serde_json::Value>,
    ) -> Result<Document> {
        let conn = self.conn.lock();
        let record = Document {
            id: Uuid::new_v4().to_string(),
            context_id,
            natureza,
            pje_id: pje_id.to_string(),
            raw_text: raw_text.to_string(),
            structured_json: structured_json.cloned(),
            created_at: Utc::now(),
        };

        let json_text = record
            .structured_json
            .as_ref()
            .map(|v| serde_json::to_string(v))
            .transpose()?;

        conn.execute(
            r#"
            INSERT INTO autos (id, id_ctxt, id_natu, id_pje, doc, doc_json, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                record.id,
                record.context_id,
                record.natureza,
                record.pje_id,
                record.raw_text,
                json_text,
                record.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(inner, _)
                if inner.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Error::Duplicate {
                    context_id,
                    pje_id: pje_id.to_string(),
                }
            }
            other => Error::storage(format!("failed to insert document: {}", other)),
        })?;

        Ok(record)
    }

    /// Whether a document already exists for this (context, PJe id) pair
    pub fn document_exists(&self, context_id: i64, pje_id: &str) -> Result<bool> {
        let conn = self.conn.lock();

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM autos WHERE id_ctxt = ?1 AND id_pje = ?2",
            params![context_id, pje_id],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    /// Get a document by id
    pub fn get_document(&self, id: &str) -> Result<Option<Document>> {
        let conn = self.conn.lock();

        let record = conn
            .prepare(
                "SELECT id, id_ctxt, id_natu, id_pje, doc, doc_json, created_at FROM autos WHERE id = ?1",
            )?
            .query_row(params![id], row_to_document)
            .optional()
            .map_err(|e| Error::storage(format!("failed to get document: {}", e)))?;

        Ok(record)
    }

    /// List the documents of a context, newest first
    pub fn list_documents(&self, context_id: i64) -> Result<Vec<Document>> {
        let conn = self.conn.lock();

        let records = conn
            .prepare(
                "SELECT id, id_ctxt, id_natu, id_pje, doc, doc_json, created_at FROM autos
                 WHERE id_ctxt = ?1 ORDER BY created_at DESC, id DESC",
            )?
            .query_map(params![context_id], row_to_document)
            .map_err(|e| Error::storage(format!("failed to list documents: {}", e)))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(records)
    }

    /// Newest document of the given natureza within a context
    pub fn first_document_by_natureza(
        &self,
        context_id: i64,
        natureza: i32,
    ) -> Result<Option<Document>> {
        let conn = self.conn.lock();

        let record = conn
            .prepare(
                "SELECT id, id_ctxt, id_natu, id_pje, doc, doc_json, created_at FROM autos
                 WHERE id_ctxt = ?1 AND id_natu = ?2 ORDER BY created_at DESC, id DESC LIMIT 1",
            )?
            .query_row(params![context_id, natureza], row_to_document)
            .optional()
            .map_err(|e| Error::storage(format!("failed to query by natureza: {}", e)))?;

        Ok(record)
    }

    // ==================== Prompt Operations ====================

    /// Get the extraction prompt for a natureza family
    pub fn get_prompt(&self, natureza: i32) -> Result<Option<String>> {
        let conn = self.conn.lock();

        let prompt = conn
            .query_row(
                "SELECT txt_prompt FROM prompts WHERE natureza = ?1",
                params![natureza],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| Error::storage(format!("failed to get prompt: {}", e)))?;

        Ok(prompt)
    }

    /// Insert or replace the prompt for a natureza family
    pub fn upsert_prompt(&self, natureza: i32, text: &str) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute(
            "INSERT INTO prompts (natureza, txt_prompt) VALUES (?1, ?2)
             ON CONFLICT(natureza) DO UPDATE SET txt_prompt = excluded.txt_prompt",
            params![natureza, text],
        )
        .map_err(|e| Error::storage(format!("failed to upsert prompt: {}", e)))?;

        Ok(())
    }

    /// Insert the prompt only if the family has none yet
    pub fn seed_prompt(&self, natureza: i32, text: &str) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute(
            "INSERT OR IGNORE INTO prompts (natureza, txt_prompt) VALUES (?1, ?2)",
            params![natureza, text],
        )
        .map_err(|e| Error::storage(format!("failed to seed prompt: {}", e)))?;

        Ok(())
    }

    // ==================== Token Ledger Operations ====================

    /// Charge one call's token usage to a context.
    ///
    /// The increment is a single UPDATE so concurrent callers never
    /// read-modify-write the counters.
    pub fn add_token_usage(&self, context_id: i64, usage: TokenUsage) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute(
            "INSERT OR IGNORE INTO contextos (id) VALUES (?1)",
            params![context_id],
        )?;
        conn.execute(
            r#"
            UPDATE contextos SET
                prompt_tokens = prompt_tokens + ?2,
                completion_tokens = completion_tokens + ?3,
                total_tokens = total_tokens + ?2 + ?3
            WHERE id = ?1
            "#,
            params![context_id, usage.prompt_tokens, usage.completion_tokens],
        )
        .map_err(|e| Error::storage(format!("failed to update token ledger: {}", e)))?;

        Ok(())
    }

    /// Current ledger totals for a context
    pub fn get_token_usage(&self, context_id: i64) -> Result<TokenUsage> {
        let conn = self.conn.lock();

        let usage = conn
            .query_row(
                "SELECT prompt_tokens, completion_tokens FROM contextos WHERE id = ?1",
                params![context_id],
                |row| {
                    Ok(TokenUsage {
                        prompt_tokens: row.get(0)?,
                        completion_tokens: row.get(1)?,
                    })
                },
            )
            .optional()?
            .unwrap_or_default();

        Ok(usage)
    }
}

fn row_to_temp_document(row: &rusqlite::Row) -> rusqlite::Result<TempDocument> {
    let created_at_str: String = row.get(5)?;
    Ok(TempDocument {
        id: row.get(0)?,
        context_id: row.get(1)?,
        natureza: row.get(2)?,
        pje_id: row.get(3)?,
        text: row.get(4)?,
        created_at: parse_timestamp(&created_at_str),
    })
}

fn row_to_document(row: &rusqlite::Row) -> rusqlite::Result<Document> {
    let json_text: Option<String> = row.get(5)?;
    let created_at_str: String = row.get(6)?;
    Ok(Document {
        id: row.get(0)?,
        context_id: row.get(1)?,
        natureza: row.get(2)?,
        pje_id: row.get(3)?,
        raw_text: row.get(4)?,
        structured_json: json_text.and_then(|j| serde_json::from_str(&j).ok()),
        created_at: parse_timestamp(&created_at_str),
    })
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
