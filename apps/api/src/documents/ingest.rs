use serde::Serialize;
use tracing::info;

use crate::documents::repository::DocumentRepository;
use crate::embedding::OllamaEmbedder;
use crate::errors::AppError;
use crate::extraction::extract_text;
use crate::models::document::{DocumentRow, NewChunk};
use crate::routes::multipart::UploadedFile;
use crate::text_splitter::RecursiveCharacterSplitter;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub document_id: i32,
    pub chunk_count: usize,
}

pub struct IngestOutcome {
    pub document: DocumentRow,
    pub chunk_count: usize,
}

/// Extracts, chunks and embeds an uploaded file, then stores the document and
/// its chunks in one transaction. Nothing is persisted if any step fails.
pub async fn ingest_document(
    file: UploadedFile,
    documents: &dyn DocumentRepository,
    splitter: &RecursiveCharacterSplitter,
    embedder: &OllamaEmbedder,
) -> Result<IngestOutcome, AppError> {
    let UploadedFile { filename, data } = file;

    let text = extract_text(&filename, data).await?;
    if text.trim().is_empty() {
        return Err(AppError::UnprocessableEntity(format!(
            "No extractable text found in {filename}"
        )));
    }

    let chunk_texts = splitter.split_text(&text);
    let embeddings = embedder.embed_documents(&chunk_texts).await?;
    let chunks: Vec<NewChunk> = chunk_texts
        .into_iter()
        .zip(embeddings)
        .map(|(text, embedding)| NewChunk { text, embedding })
        .collect();

    let document = documents.create_document(&filename, &text, &chunks).await?;

    info!(
        "Ingested document {} ({filename}): {} chars, {} chunks",
        document.id,
        text.chars().count(),
        chunks.len()
    );

    Ok(IngestOutcome {
        document,
        chunk_count: chunks.len(),
    })
}
