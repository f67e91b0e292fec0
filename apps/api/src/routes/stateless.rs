//! One-shot endpoints that work on the uploaded file directly and persist nothing.

use axum::extract::State;
use axum::Json;

use crate::documents::handlers::{AskQuestionOutput, SummaryOutput};
use crate::documents::prompts::{answer_prompt, summary_prompt};
use crate::errors::AppError;
use crate::extraction::extract_text;
use crate::routes::multipart::UploadForm;
use crate::state::AppState;

/// POST /upload/
pub async fn handle_summarise_upload(
    State(state): State<AppState>,
    mut form: UploadForm,
) -> Result<Json<SummaryOutput>, AppError> {
    let file = form.take_file()?;
    let text = extract_text(&file.filename, file.data).await?;

    let summary = state.llm.complete(&summary_prompt(&text)).await?;
    Ok(Json(SummaryOutput { summary }))
}

/// POST /ask/
pub async fn handle_ask_upload(
    State(state): State<AppState>,
    mut form: UploadForm,
) -> Result<Json<AskQuestionOutput>, AppError> {
    let question = form.take_field("question")?;
    let file = form.take_file()?;
    let text = extract_text(&file.filename, file.data).await?;

    let answer = state.llm.complete(&answer_prompt(&question, &text)).await?;
    Ok(Json(AskQuestionOutput { answer }))
}
