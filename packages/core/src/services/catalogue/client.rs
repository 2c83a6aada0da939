use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Client;

use crate::config::ClientConfig;
use crate::error::CatalogueResult;

use super::retry::RetryPolicy;

/// Page size requested by the preset collection queries.
pub const PAGE_SIZE: u32 = 10;

pub const COMPONENTS: &str = "components";
pub const PRODUCTS: &str = "products";
pub const ENVIRONMENTS: &str = "environments";
pub const GITHUB_TEAMS: &str = "github-teams";
pub const SCHEDULED_JOBS: &str = "scheduled-jobs";

const PRODUCT_FIELDS: &str =
    "&fields[0]=slack_channel_id&fields[1]=slack_channel_name&fields[2]=p_id&fields[3]=name";

/// Client for the Service Catalogue REST API.
///
/// Holds one HTTP transport for its whole life. The connection probe runs
/// once during construction; its result is kept in `connection_ok` and only
/// changes through [`CatalogueClient::refresh_connection`].
#[derive(Clone)]
pub struct CatalogueClient {
    pub(super) config: ClientConfig,
    pub(super) http: Client,
    pub(super) headers: HeaderMap,
    pub(super) retry: RetryPolicy,
    connection_ok: bool,
}

impl CatalogueClient {
    /// Validate `config`, build a transport and probe the backend.
    pub async fn connect(config: ClientConfig) -> CatalogueResult<Self> {
        Self::with_http_client(config, Client::new()).await
    }

    /// Same as [`CatalogueClient::connect`] with a caller-supplied transport.
    pub async fn with_http_client(config: ClientConfig, http: Client) -> CatalogueResult<Self> {
        config.validate()?;
        let headers = config.api_headers()?;

        let mut client = Self {
            config,
            http,
            headers,
            retry: RetryPolicy::default(),
            connection_ok: false,
        };
        client.connection_ok = client.test_connection().await;
        Ok(client)
    }

    /// Replace the backoff schedule used by retried reads.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Outcome of the probe made at construction (or the last refresh).
    pub fn connection_ok(&self) -> bool {
        self.connection_ok
    }

    /// Probe the backend again and store the result.
    pub async fn refresh_connection(&mut self) -> bool {
        self.connection_ok = self.test_connection().await;
        self.connection_ok
    }

    /// HEAD the base URL. `true` only for a 2xx answer; failures are logged,
    /// never returned.
    pub async fn test_connection(&self) -> bool {
        let url = self.config.trimmed_base_url();
        tracing::info!("Testing connection to the Service Catalogue - {}", url);

        let response = self
            .http
            .head(url)
            .headers(self.headers.clone())
            .timeout(self.config.timeout)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                tracing::info!(
                    "Successfully connected to the Service Catalogue - {}. {}",
                    url,
                    response.status()
                );
                true
            }
            Ok(response) => {
                tracing::error!(
                    "Service Catalogue answered the connection test with HTTP {}",
                    response.status()
                );
                false
            }
            Err(err) => {
                tracing::error!("Unable to connect to the Service Catalogue - {}", err);
                false
            }
        }
    }

    /// `{base_url}/v1/{uri}`, tolerant of stray slashes on either side.
    pub fn resource_url(&self, uri: &str) -> String {
        format!(
            "{}/v1/{}",
            self.config.trimmed_base_url(),
            uri.trim_start_matches('/')
        )
    }

    /// Components with their latest commit, product and environments.
    pub fn components_query(&self) -> String {
        format!(
            "{}?populate[latest_commit]=true&populate[product]=true&populate[envs]=true{}&pagination[pageSize]={}",
            COMPONENTS, self.config.filter, PAGE_SIZE
        )
    }

    /// Products with their hierarchy and team, limited to the Slack fields.
    pub fn products_query(&self) -> String {
        format!(
            "{}?populate[parent]=true&populate[children]=true&populate[product_set]=true&populate[service_area]=true&populate[team]=true{}&pagination[pageSize]={}",
            PRODUCTS, PRODUCT_FIELDS, PAGE_SIZE
        )
    }

    pub fn environments_query(&self) -> String {
        format!(
            "{}?populate[component]=true&pagination[pageSize]={}",
            ENVIRONMENTS, PAGE_SIZE
        )
    }

    pub fn github_teams_query(&self) -> String {
        format!("{}?pagination[pageSize]={}", GITHUB_TEAMS, PAGE_SIZE)
    }
}

/// Last segment of a table path, for log lines.
pub(super) fn table_name(table: &str) -> &str {
    let path = table.split_once('?').map_or(table, |(path, _)| path);
    path.rsplit('/').next().unwrap_or(path)
}
