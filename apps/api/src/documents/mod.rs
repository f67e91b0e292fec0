// Stored documents: upload + ingest, question answering, summaries.
// All generation goes through llm_client; all persistence through the repository.

pub mod handlers;
pub mod ingest;
pub mod prompts;
pub mod qa;
pub mod repository;
