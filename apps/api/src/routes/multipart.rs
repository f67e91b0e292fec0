use std::collections::HashMap;

use axum::async_trait;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use bytes::Bytes;

use crate::errors::AppError;

/// The multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Bytes,
}

/// A parsed multipart form: at most one file plus plain text fields.
#[derive(Debug, Default)]
pub struct UploadForm {
    file: Option<UploadedFile>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            if name == FILE_FIELD {
                let filename = field.file_name().unwrap_or("unknown").to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                tracing::debug!("Received file {filename} ({} bytes)", data.len());
                form.file = Some(UploadedFile { filename, data });
            } else {
                let value = field.text().await.map_err(multipart_error)?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    pub fn take_file(&mut self) -> Result<UploadedFile, AppError> {
        self.file.take().ok_or_else(|| {
            AppError::UnprocessableEntity(format!("Missing required form field '{FILE_FIELD}'"))
        })
    }

    pub fn take_field(&mut self, name: &str) -> Result<String, AppError> {
        self.fields.remove(name).ok_or_else(|| {
            AppError::UnprocessableEntity(format!("Missing required form field '{name}'"))
        })
    }
}

#[async_trait]
impl<S> FromRequest<S> for UploadForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state).await?;
        UploadForm::read(multipart).await
    }
}

fn multipart_error(error: MultipartError) -> AppError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Upload too large: {}", error.body_text()))
    } else {
        AppError::Validation(format!("Failed to read multipart: {}", error.body_text()))
    }
}
