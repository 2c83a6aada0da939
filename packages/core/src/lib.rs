// The catalogue client lives under `services::catalogue`.
// The binary entry point is `src/main.rs`.

pub mod error;
pub mod services;

// Composition helpers used by the binary.
pub mod cli;
pub mod config;
pub mod logging;

pub use config::ClientConfig;
pub use error::{CatalogueError, CatalogueResult};
pub use services::catalogue::CatalogueClient;
