//! SQLite-backed embedding store
//!
//! Implements the embedding-index contract over the record store's
//! connection. Vectors live as little-endian f32 blobs; semantic search is
//! a cosine scan over the filtered rows, which is plenty for per-case
//! volumes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::providers::embedding_index::{
    EmbeddingIndex, EmbeddingRecord, ScoredRecord, SearchFilter,
};
use crate::storage::Database;

/// Embedding store sharing the record store's SQLite connection
pub struct SqliteEmbeddingStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteEmbeddingStore {
    pub fn new(db: &Database) -> Self {
        Self {
            conn: db.connection(),
        }
    }
}

fn vector_to_blob(vector: &[f32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(vector.len() * 4);
    for value in vector {
        blob.extend_from_slice(&value.to_le_bytes());
    }
    blob
}

fn blob_to_vector(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<EmbeddingRecord> {
    let blob: Vec<u8> = row.get(5)?;
    let created_at_str: String = row.get(6)?;
    Ok(EmbeddingRecord {
        id: row.get(0)?,
        document_id: row.get(1)?,
        context_id: row.get(2)?,
        natureza: row.get(3)?,
        pje_id: row.get(4)?,
        vector: blob_to_vector(&blob),
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

const SELECT_COLUMNS: &str =
    "id, autos_id, id_ctxt, id_natu, id_pje, embedding, created_at";

#[async_trait]
impl EmbeddingIndex for SqliteEmbeddingStore {
    async fn index(&self, record: EmbeddingRecord) -> Result<String> {
        let conn = self.conn.lock();
        let id = if record.id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            record.id.clone()
        };

        conn.execute(
            r#"
            INSERT INTO autos_embedding (id, autos_id, id_ctxt, id_natu, id_pje, embedding, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                id,
                record.document_id,
                record.context_id,
                record.natureza,
                record.pje_id,
                vector_to_blob(&record.vector),
                record.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| Error::EmbeddingIndex(format!("failed to index embedding: {}", e)))?;

        Ok(id)
    }

    async fn update(&self, id: &str, vector: Vec<f32>) -> Result<()> {
        let conn = self.conn.lock();

        let count = conn
            .execute(
                "UPDATE autos_embedding SET embedding = ?2 WHERE id = ?1",
                params![id, vector_to_blob(&vector)],
            )
            .map_err(|e| Error::EmbeddingIndex(format!("failed to update embedding: {}", e)))?;

        if count == 0 {
            return Err(Error::not_found(format!("embedding {}", id)));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute("DELETE FROM autos_embedding WHERE id = ?1", params![id])
            .map_err(|e| Error::EmbeddingIndex(format!("failed to delete embedding: {}", e)))?;

        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<EmbeddingRecord>> {
        let conn = self.conn.lock();

        let record = conn
            .prepare(&format!(
                "SELECT {} FROM autos_embedding WHERE id = ?1",
                SELECT_COLUMNS
            ))?
            .query_row(params![id], row_to_record)
            .optional()
            .map_err(|e| Error::EmbeddingIndex(format!("failed to get embedding: {}", e)))?;

        Ok(record)
    }

    async fn semantic_search(
        &self,
        vector: &[f32],
        filter: SearchFilter,
        limit: usize,
    ) -> Result<Vec<ScoredRecord>> {
        let conn = self.conn.lock();

        let mut sql = format!("SELECT {} FROM autos_embedding WHERE 1=1", SELECT_COLUMNS);
        let mut bind: Vec<i64> = Vec::new();
        if let Some(context_id) = filter.context_id {
            sql.push_str(&format!(" AND id_ctxt = ?{}", bind.len() + 1));
            bind.push(context_id);
        }
        if let Some(natureza) = filter.natureza {
            sql.push_str(&format!(" AND id_natu = ?{}", bind.len() + 1));
            bind.push(natureza as i64);
        }

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(bind.iter()), row_to_record)
            .map_err(|e| Error::EmbeddingIndex(format!("failed to search embeddings: {}", e)))?;

        let mut scored: Vec<ScoredRecord> = rows
            .filter_map(|r| r.ok())
            .map(|record| ScoredRecord {
                score: cosine_similarity(vector, &record.vector),
                record,
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn exists(&self, context_id: i64, pje_id: &str) -> Result<bool> {
        let conn = self.conn.lock();

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM autos_embedding WHERE id_ctxt = ?1 AND id_pje = ?2",
            params![context_id, pje_id],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(context_id: i64, pje_id: &str, natureza: i32, vector: Vec<f32>) -> EmbeddingRecord {
        EmbeddingRecord {
            id: String::new(),
            document_id: Uuid::new_v4().to_string(),
            context_id,
            natureza,
            pje_id: pje_id.to_string(),
            vector,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn vectors_round_trip_through_the_blob_encoding() {
        let db = Database::in_memory().unwrap();
        let store = SqliteEmbeddingStore::new(&db);

        let vector = vec![0.25f32, -1.5, 3.0, 0.0];
        let id = store.index(record(1, "100", 1, vector.clone())).await.unwrap();

        let fetched = store.get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(fetched.vector, vector);
        assert_eq!(fetched.pje_id, "100");
    }

    #[tokio::test]
    async fn search_orders_by_cosine_similarity_and_honors_filters() {
        let db = Database::in_memory().unwrap();
        let store = SqliteEmbeddingStore::new(&db);

        store.index(record(1, "a", 1, vec![1.0, 0.0, 0.0])).await.unwrap();
        store.index(record(1, "b", 2, vec![0.0, 1.0, 0.0])).await.unwrap();
        store.index(record(2, "c", 1, vec![1.0, 0.1, 0.0])).await.unwrap();

        let hits = store
            .semantic_search(
                &[1.0, 0.05, 0.0],
                SearchFilter {
                    context_id: Some(1),
                    natureza: None,
                },
                10,
            )
            .await
            .unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].record.pje_id, "a");
        assert!(hits[0].score > hits[1].score);

        let filtered = store
            .semantic_search(
                &[1.0, 0.0, 0.0],
                SearchFilter {
                    context_id: Some(1),
                    natureza: Some(2),
                },
                10,
            )
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].record.pje_id, "b");
    }

    #[tokio::test]
    async fn update_replaces_the_vector_and_delete_removes_it() {
        let db = Database::in_memory().unwrap();
        let store = SqliteEmbeddingStore::new(&db);

        let id = store.index(record(1, "a", 1, vec![1.0, 0.0])).await.unwrap();
        store.update(&id, vec![0.0, 1.0]).await.unwrap();
        assert_eq!(
            store.get_by_id(&id).await.unwrap().unwrap().vector,
            vec![0.0, 1.0]
        );

        store.delete(&id).await.unwrap();
        assert!(store.get_by_id(&id).await.unwrap().is_none());

        let err = store.update(&id, vec![1.0]).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn exists_is_keyed_by_context_and_pje_id() {
        let db = Database::in_memory().unwrap();
        let store = SqliteEmbeddingStore::new(&db);

        store.index(record(1, "100", 1, vec![1.0])).await.unwrap();
        assert!(store.exists(1, "100").await.unwrap());
        assert!(!store.exists(1, "200").await.unwrap());
        assert!(!store.exists(2, "100").await.unwrap());
    }
}
