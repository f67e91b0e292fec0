// Document prompt templates.
// Both are sent as a single user message to the generation model.

pub fn summary_prompt(text: &str) -> String {
    format!("Summarize the following text:\n\n{text}")
}

pub fn answer_prompt(question: &str, document_text: &str) -> String {
    format!(
        "Answer the following question based on the document: {document_text}\n\nQuestion: {question}\nAnswer:"
    )
}
