use tracing::{debug, info};

use crate::documents::prompts::{answer_prompt, summary_prompt};
use crate::documents::repository::DocumentRepository;
use crate::embedding::OllamaEmbedder;
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::document::DocumentRow;

async fn load_document(
    documents: &dyn DocumentRepository,
    document_id: i32,
) -> Result<DocumentRow, AppError> {
    documents
        .get_document(document_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))
}

/// Answers `question` about a stored document.
///
/// Without `top_k` the whole document text is the context. With `top_k`,
/// only the closest chunks are sent, falling back to the full text when the
/// document has no chunks.
pub async fn answer_question(
    documents: &dyn DocumentRepository,
    llm: &LlmClient,
    embedder: &OllamaEmbedder,
    document_id: i32,
    question: &str,
    top_k: Option<usize>,
) -> Result<String, AppError> {
    if question.trim().is_empty() {
        return Err(AppError::UnprocessableEntity(
            "question cannot be empty".to_string(),
        ));
    }

    let document = load_document(documents, document_id).await?;

    let context = match top_k.filter(|k| *k > 0) {
        Some(k) => {
            let query = embedder.embed_query(question).await?;
            let limit = i64::try_from(k).unwrap_or(i64::MAX);
            let matches = documents.nearest_chunks(document_id, &query, limit).await?;
            debug!(
                "Retrieved {} of top {k} chunks for document {document_id}",
                matches.len()
            );
            if matches.is_empty() {
                document.text_content
            } else {
                matches
                    .into_iter()
                    .map(|m| m.chunk)
                    .collect::<Vec<_>>()
                    .join("\n\n")
            }
        }
        None => document.text_content,
    };

    info!("Answering question about document {document_id} with {}", llm.model());
    Ok(llm.complete(&answer_prompt(question, &context)).await?)
}

/// Summarises the full text of a stored document.
pub async fn summarise_document(
    documents: &dyn DocumentRepository,
    llm: &LlmClient,
    document_id: i32,
) -> Result<String, AppError> {
    let document = load_document(documents, document_id).await?;
    info!("Summarising document {document_id} with {}", llm.model());
    Ok(llm.complete(&summary_prompt(&document.text_content)).await?)
}
