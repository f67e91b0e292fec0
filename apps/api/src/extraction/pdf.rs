use super::ExtractionError;

/// Reads the text of every page of a PDF held in memory.
pub fn read_pdf(data: &[u8]) -> Result<String, ExtractionError> {
    pdf_extract::extract_text_from_mem(data).map_err(|e| ExtractionError::Pdf(e.to_string()))
}
