use thiserror::Error;

/// Unified client error.
///
/// Only construction (`Config`) and the single-page fetcher
/// (`ExhaustedRetries`) surface these to callers; every other
/// operation logs the error and degrades to an empty result.
#[derive(Error, Debug)]
pub enum CatalogueError {
    #[error("Config error: {message}")]
    Config { message: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Service Catalogue returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Exceeded retries for {url} after {attempts} attempts (last error: {last_error})")]
    ExhaustedRetries {
        url: String,
        attempts: u32,
        last_error: String,
    },
}

impl CatalogueError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse { message: message.into() }
    }
}

pub type CatalogueResult<T> = Result<T, CatalogueError>;
