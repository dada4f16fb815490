//! Persistent storage: record store and embedding store

pub mod database;
pub mod embedding_store;

pub use database::Database;
pub use embedding_store::SqliteEmbeddingStore;
