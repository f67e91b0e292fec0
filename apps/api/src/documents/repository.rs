use async_trait::async_trait;
use pgvector::Vector;
use sqlx::PgPool;
use tracing::info;

use crate::models::document::{ChunkMatch, DocumentRow, NewChunk};

/// Persistence for documents and their embedded chunks.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn list_documents(&self) -> Result<Vec<DocumentRow>, sqlx::Error>;

    async fn get_document(&self, id: i32) -> Result<Option<DocumentRow>, sqlx::Error>;

    /// Inserts the document and all of its chunks atomically.
    async fn create_document(
        &self,
        filename: &str,
        text_content: &str,
        chunks: &[NewChunk],
    ) -> Result<DocumentRow, sqlx::Error>;

    /// Returns `false` when no document had that id. Chunks go with it.
    async fn delete_document(&self, id: i32) -> Result<bool, sqlx::Error>;

    /// Chunks of one document ordered by cosine distance to `embedding`.
    async fn nearest_chunks(
        &self,
        document_id: i32,
        embedding: &[f32],
        limit: i64,
    ) -> Result<Vec<ChunkMatch>, sqlx::Error>;
}

pub struct PgDocumentRepository {
    pool: PgPool,
}

impl PgDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn list_documents(&self) -> Result<Vec<DocumentRow>, sqlx::Error> {
        sqlx::query_as::<_, DocumentRow>(
            "SELECT id, filename, text_content, uploaded_at FROM documents ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn get_document(&self, id: i32) -> Result<Option<DocumentRow>, sqlx::Error> {
        sqlx::query_as::<_, DocumentRow>(
            "SELECT id, filename, text_content, uploaded_at FROM documents WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_document(
        &self,
        filename: &str,
        text_content: &str,
        chunks: &[NewChunk],
    ) -> Result<DocumentRow, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let document = sqlx::query_as::<_, DocumentRow>(
            r#"
            INSERT INTO documents (filename, text_content)
            VALUES ($1, $2)
            RETURNING id, filename, text_content, uploaded_at
            "#,
        )
        .bind(filename)
        .bind(text_content)
        .fetch_one(&mut *tx)
        .await?;

        for chunk in chunks {
            sqlx::query(
                "INSERT INTO document_chunks (document_id, chunk, embedding) VALUES ($1, $2, $3)",
            )
            .bind(document.id)
            .bind(&chunk.text)
            .bind(Vector::from(chunk.embedding.clone()))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            "Inserted document {} ({}) with {} chunks",
            document.id,
            document.filename,
            chunks.len()
        );
        Ok(document)
    }

    async fn delete_document(&self, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn nearest_chunks(
        &self,
        document_id: i32,
        embedding: &[f32],
        limit: i64,
    ) -> Result<Vec<ChunkMatch>, sqlx::Error> {
        sqlx::query_as::<_, ChunkMatch>(
            r#"
            SELECT id, document_id, chunk, created_at, (embedding <=> $2) AS distance
            FROM document_chunks
            WHERE document_id = $1
            ORDER BY embedding <=> $2
            LIMIT $3
            "#,
        )
        .bind(document_id)
        .bind(Vector::from(embedding.to_vec()))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}

#[cfg(test)]
pub(crate) use memory::InMemoryDocumentRepository;
