use clap::{Parser, Subcommand};

use crate::config::{ClientConfig, ENV_ENDPOINT, ENV_FILTER, ENV_TIMEOUT};
use crate::error::CatalogueResult;

/// Service Catalogue CLI arguments
///
/// Flags override the matching environment variables; the API key is only
/// read from `SERVICE_CATALOGUE_API_KEY`.
#[derive(Debug, Parser)]
#[command(
    name = "service-catalogue",
    version,
    about = "Query and update records in the Service Catalogue"
)]
pub struct Cli {
    /// Service Catalogue base URL
    #[arg(long)]
    pub url: Option<String>,

    /// Extra filter appended to component queries
    #[arg(long)]
    pub filter: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the Service Catalogue is reachable
    Probe,

    /// List every GitHub team referenced by a component
    Teams,

    /// Print the first record of TABLE whose FIELD equals VALUE
    Get {
        table: String,
        field: String,
        value: String,
    },

    /// Print the documentId of the first record of TABLE whose FIELD equals VALUE
    Id {
        table: String,
        field: String,
        value: String,
    },

    /// Record the outcome of a scheduled job
    JobStatus {
        /// Result to store, e.g. Succeeded or Failed
        status: String,

        /// Job name (defaults to JOB_NAME)
        #[arg(long)]
        job_name: Option<String>,

        /// Error detail to attach; may be repeated
        #[arg(long = "error")]
        errors: Vec<String>,
    },
}

impl Cli {
    /// Configuration from flags, falling back to `lookup` (the environment
    /// in the binary).
    pub fn client_config<F>(&self, lookup: F) -> CatalogueResult<ClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        ClientConfig::from_lookup(|key| {
            let flag = match key {
                ENV_ENDPOINT => self.url.clone(),
                ENV_FILTER => self.filter.clone(),
                ENV_TIMEOUT => self.timeout.map(|secs| secs.to_string()),
                _ => None,
            };
            flag.or_else(|| lookup(key))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn env(key: &str) -> Option<String> {
        match key {
            "SERVICE_CATALOGUE_API_ENDPOINT" => Some("https://env.example.com".into()),
            "SERVICE_CATALOGUE_API_KEY" => Some("env-key".into()),
            "SERVICE_CATALOGUE_TIMEOUT_SECONDS" => Some("5".into()),
            _ => None,
        }
    }

    #[test]
    fn flags_override_environment() {
        let cli = Cli::parse_from([
            "service-catalogue",
            "--url",
            "https://flag.example.com",
            "--timeout",
            "20",
            "probe",
        ]);
        let config = cli.client_config(env).unwrap();

        assert_eq!(config.base_url, "https://flag.example.com");
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.timeout, Duration::from_secs(20));
    }

    #[test]
    fn environment_fills_missing_flags() {
        let cli = Cli::parse_from(["service-catalogue", "teams"]);
        let config = cli.client_config(env).unwrap();

        assert_eq!(config.base_url, "https://env.example.com");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.filter, "");
    }

    #[test]
    fn job_status_collects_repeated_errors() {
        let cli = Cli::parse_from([
            "service-catalogue",
            "job-status",
            "Failed",
            "--job-name",
            "nightly",
            "--error",
            "one",
            "--error",
            "two",
        ]);
        match cli.command {
            Command::JobStatus {
                status,
                job_name,
                errors,
            } => {
                assert_eq!(status, "Failed");
                assert_eq!(job_name.as_deref(), Some("nightly"));
                assert_eq!(errors, vec!["one", "two"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
