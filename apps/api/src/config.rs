use anyhow::{bail, Context, Result};
use std::str::FromStr;

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Where the PostgreSQL connection comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseConfig {
    /// A full connection string from `DATABASE_URL`.
    Url(String),
    /// Individual `DATABASE_*` parts.
    Parts {
        user: String,
        password: String,
        host: String,
        port: u16,
        name: String,
    },
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub database_max_connections: u32,
    pub ollama_url: String,
    pub generation_model_name: String,
    pub embeddings_model_name: String,
    pub embeddings_dimensions: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub max_upload_bytes: usize,
    pub llm_timeout_secs: u64,
    pub llm_max_retries: u32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = match lookup("DATABASE_URL") {
            Some(url) => DatabaseConfig::Url(url),
            None => DatabaseConfig::Parts {
                user: require(&lookup, "DATABASE_USER")?,
                password: require(&lookup, "DATABASE_PASSWORD")?,
                host: require(&lookup, "DATABASE_HOST")?,
                port: parse(&lookup, "DATABASE_PORT", None)?,
                name: require(&lookup, "DATABASE_NAME")?,
            },
        };

        let config = Config {
            database,
            database_max_connections: parse(&lookup, "DATABASE_MAX_CONNECTIONS", Some(10))?,
            ollama_url: lookup("OLLAMA_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            generation_model_name: require(&lookup, "GENERATION_MODEL_NAME")?,
            embeddings_model_name: require(&lookup, "EMBEDDINGS_MODEL_NAME")?,
            embeddings_dimensions: parse(&lookup, "EMBEDDINGS_DIMENSIONS", None)?,
            chunk_size: parse(&lookup, "CHUNK_SIZE", Some(500))?,
            chunk_overlap: parse(&lookup, "CHUNK_OVERLAP", Some(100))?,
            max_upload_bytes: parse(&lookup, "MAX_UPLOAD_BYTES", Some(DEFAULT_MAX_UPLOAD_BYTES))?,
            llm_timeout_secs: parse(&lookup, "LLM_TIMEOUT_SECS", Some(300))?,
            llm_max_retries: parse(&lookup, "LLM_MAX_RETRIES", Some(0))?,
            port: parse(&lookup, "PORT", Some(8080))?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        };

        if config.embeddings_dimensions == 0 {
            bail!("EMBEDDINGS_DIMENSIONS must be greater than zero");
        }
        if config.chunk_size == 0 {
            bail!("CHUNK_SIZE must be greater than zero");
        }
        if config.chunk_overlap >= config.chunk_size {
            bail!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                config.chunk_overlap,
                config.chunk_size
            );
        }

        Ok(config)
    }
}

fn require<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse<F, T>(lookup: &F, key: &str, default: Option<T>) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match (lookup(key), default) {
        (Some(raw), _) => raw
            .trim()
            .parse::<T>()
            .ok()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        (None, Some(default)) => Ok(default),
        (None, None) => bail!("Required environment variable '{key}' is not set"),
    }
}
