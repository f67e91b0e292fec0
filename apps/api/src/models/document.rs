use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DocumentRow {
    pub id: i32,
    pub filename: String,
    pub text_content: String,
    pub uploaded_at: DateTime<Utc>,
}

/// A chunk returned by a similarity lookup, with its cosine distance to the query.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChunkMatch {
    pub id: i32,
    pub document_id: i32,
    pub chunk: String,
    pub created_at: DateTime<Utc>,
    pub distance: f64,
}

/// A chunk waiting to be persisted alongside its document.
#[derive(Debug, Clone)]
pub struct NewChunk {
    pub text: String,
    pub embedding: Vec<f32>,
}
