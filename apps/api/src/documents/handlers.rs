use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::documents::ingest::{ingest_document, UploadResponse};
use crate::documents::qa::{answer_question, summarise_document};
use crate::errors::AppError;
use crate::models::document::DocumentRow;
use crate::routes::extract::{AppJson, AppPath};
use crate::routes::multipart::UploadForm;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AskQuestionInput {
    pub question: String,
    /// Restrict the context to the `top_k` most similar chunks.
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct AskQuestionOutput {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryOutput {
    pub summary: String,
}

/// GET /documents/
pub async fn handle_list_documents(
    State(state): State<AppState>,
) -> Result<Json<Vec<DocumentRow>>, AppError> {
    Ok(Json(state.documents.list_documents().await?))
}

/// POST /documents/
pub async fn handle_upload_document(
    State(state): State<AppState>,
    mut form: UploadForm,
) -> Result<Json<UploadResponse>, AppError> {
    let file = form.take_file()?;

    let outcome = ingest_document(
        file,
        state.documents.as_ref(),
        &state.splitter,
        &state.embedder,
    )
    .await?;

    Ok(Json(UploadResponse {
        message: "Document created".to_string(),
        document_id: outcome.document.id,
        chunk_count: outcome.chunk_count,
    }))
}

/// GET /documents/:document_id
pub async fn handle_get_document(
    State(state): State<AppState>,
    AppPath(document_id): AppPath<i32>,
) -> Result<Json<DocumentRow>, AppError> {
    state
        .documents
        .get_document(document_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))
}

/// DELETE /documents/:document_id
pub async fn handle_delete_document(
    State(state): State<AppState>,
    AppPath(document_id): AppPath<i32>,
) -> Result<StatusCode, AppError> {
    if state.documents.delete_document(document_id).await? {
        tracing::info!("Deleted document {document_id}");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Document not found".to_string()))
    }
}

/// POST /documents/:document_id/question
pub async fn handle_ask_question(
    State(state): State<AppState>,
    AppPath(document_id): AppPath<i32>,
    AppJson(input): AppJson<AskQuestionInput>,
) -> Result<Json<AskQuestionOutput>, AppError> {
    let answer = answer_question(
        state.documents.as_ref(),
        &state.llm,
        &state.embedder,
        document_id,
        &input.question,
        input.top_k,
    )
    .await?;

    Ok(Json(AskQuestionOutput { answer }))
}

/// GET /documents/:document_id/summarise
pub async fn handle_summarise(
    State(state): State<AppState>,
    AppPath(document_id): AppPath<i32>,
) -> Result<Json<SummaryOutput>, AppError> {
    let summary = summarise_document(state.documents.as_ref(), &state.llm, document_id).await?;
    Ok(Json(SummaryOutput { summary }))
}
