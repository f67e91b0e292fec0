use std::sync::Arc;

use crate::config::Config;
use crate::documents::repository::DocumentRepository;
use crate::embedding::OllamaEmbedder;
use crate::llm_client::LlmClient;
use crate::text_splitter::RecursiveCharacterSplitter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Documents and chunks. PostgreSQL in production, in-memory in tests.
    pub documents: Arc<dyn DocumentRepository>,
    pub llm: LlmClient,
    pub embedder: OllamaEmbedder,
    pub splitter: RecursiveCharacterSplitter,
    pub config: Config,
}

impl AppState {
    /// State pointing every Ollama call at `ollama_url`, with 3-dimensional embeddings.
    #[cfg(test)]
    pub(crate) fn for_tests(ollama_url: &str, documents: Arc<dyn DocumentRepository>) -> Self {
        use std::time::Duration;

        let config = Config::from_lookup(|key| {
            let value = match key {
                "DATABASE_URL" => Some("postgres://test@localhost/test"),
                "OLLAMA_URL" => Some(ollama_url),
                "GENERATION_MODEL_NAME" => Some("llama3.2"),
                "EMBEDDINGS_MODEL_NAME" => Some("nomic-embed-text"),
                "EMBEDDINGS_DIMENSIONS" => Some("3"),
                "MAX_UPLOAD_BYTES" => Some("65536"),
                _ => None,
            };
            value.map(str::to_string)
        })
        .expect("test config");

        AppState {
            documents,
            llm: LlmClient::new(
                &config.ollama_url,
                &config.generation_model_name,
                Duration::from_secs(5),
                config.llm_max_retries,
            )
            .expect("llm client"),
            embedder: OllamaEmbedder::new(
                reqwest::Client::new(),
                &config.ollama_url,
                &config.embeddings_model_name,
                config.embeddings_dimensions,
            ),
            splitter: RecursiveCharacterSplitter::new(config.chunk_size, config.chunk_overlap),
            config,
        }
    }
}
