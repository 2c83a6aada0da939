//! Multi-page aggregation over collection endpoints.

use std::time::Duration;

use serde_json::Value;

use super::client::CatalogueClient;
use super::fetch::FetchOutcome;
use super::query::set_page;
use super::types::{PageMeta, Pagination, Record};

/// Records and pagination metadata pulled out of one page body.
fn split_page(body: Value) -> (Vec<Record>, Option<Pagination>) {
    let Value::Object(mut envelope) = body else {
        return (Vec::new(), None);
    };

    let pagination = envelope
        .remove("meta")
        .and_then(|meta| serde_json::from_value::<PageMeta>(meta).ok())
        .and_then(|meta| meta.pagination);

    let records = match envelope.remove("data") {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(record) => Some(record),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };

    (records, pagination)
}

impl CatalogueClient {
    /// Fetch every page of `uri` and concatenate their `data` arrays.
    ///
    /// Query parameters already on `uri` are kept on every page request.
    /// Pages are requested in order until one comes back empty. If page 1
    /// cannot be fetched the result is empty; a later page that cannot be
    /// fetched ends aggregation with the records collected so far.
    pub async fn get_with_retry(&self, uri: &str, max_retries: u32, timeout: Duration) -> Vec<Record> {
        let base_url = self.resource_url(uri);
        let mut records: Vec<Record> = Vec::new();
        let mut page: u32 = 1;

        loop {
            let page_url = set_page(&base_url, page);
            let body = match self.fetch_page(&page_url, max_retries, timeout).await {
                FetchOutcome::Success(body) => body,
                FetchOutcome::ExhaustedRetries { last_error, .. } if page == 1 => {
                    tracing::error!(
                        "Failed to get page data from Service Catalogue: {}",
                        last_error
                    );
                    return Vec::new();
                }
                FetchOutcome::ExhaustedRetries { last_error, .. } => {
                    tracing::error!(
                        "Stopping at page {} of {}, keeping {} records: {}",
                        page,
                        uri,
                        records.len(),
                        last_error
                    );
                    break;
                }
            };

            let (page_records, pagination) = split_page(body);
            if let Some(reported) = pagination.as_ref().and_then(|p| p.page) {
                if reported != page {
                    tracing::warn!(
                        "Requested page {} of {} but the backend returned page {}; stopping",
                        page,
                        uri,
                        reported
                    );
                    break;
                }
            }

            if page_records.is_empty() {
                break;
            }

            tracing::debug!(
                "Got result page: {} of {} from Service Catalogue ({} records)",
                page,
                pagination
                    .and_then(|p| p.page_count)
                    .map_or_else(|| "?".to_string(), |count| count.to_string()),
                page_records.len()
            );
            records.extend(page_records);

            page = match page.checked_add(1) {
                Some(next) => next,
                None => break,
            };
        }

        records
    }

    /// Every record of `table`, using the client's retry policy and timeout.
    pub async fn get_all_records(&self, table: &str) -> Vec<Record> {
        tracing::info!(
            "Getting all records from table {} in Service Catalogue using URL: {}",
            table,
            self.resource_url(table)
        );
        self.get_with_retry(table, self.retry.max_retries, self.config.timeout)
            .await
    }

    /// Fetch a singular resource such as `table/id`.
    ///
    /// Returns an empty record when the fetch is exhausted or `data` is not
    /// a single object.
    pub async fn get_single_record_with_retry(
        &self,
        uri: &str,
        max_retries: u32,
        timeout: Duration,
    ) -> Record {
        let url = self.resource_url(uri);
        match self.fetch_page(&url, max_retries, timeout).await {
            FetchOutcome::Success(Value::Object(mut body)) => match body.remove("data") {
                Some(Value::Object(record)) => record,
                other => {
                    tracing::warn!(
                        "Unexpected data format for single record: {}",
                        json_kind(other.as_ref())
                    );
                    Record::new()
                }
            },
            FetchOutcome::Success(_) => {
                tracing::warn!("Unexpected response body for single record {}", uri);
                Record::new()
            }
            FetchOutcome::ExhaustedRetries { last_error, .. } => {
                tracing::error!("Failed to get data from Service Catalogue: {}", last_error);
                Record::new()
            }
        }
    }
}

fn json_kind(value: Option<&Value>) -> &'static str {
    match value {
        None | Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "bool",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn split_page_reads_records_and_pagination() {
        let (records, pagination) = split_page(json!({
            "data": [{"id": 1}, {"id": 2}],
            "meta": {"pagination": {"page": 1, "pageCount": 2}}
        }));
        assert_eq!(records.len(), 2);
        assert_eq!(pagination.unwrap().page_count, Some(2));
    }

    #[test]
    fn split_page_without_meta_still_yields_records() {
        let (records, pagination) = split_page(json!({"data": [{"id": 1}]}));
        assert_eq!(records.len(), 1);
        assert!(pagination.is_none());
    }

    #[test]
    fn split_page_treats_non_list_data_as_empty() {
        let (records, _) = split_page(json!({"data": {"id": 1}}));
        assert!(records.is_empty());

        let (records, _) = split_page(json!([1, 2, 3]));
        assert!(records.is_empty());
    }

    #[test]
    fn json_kind_names_shapes() {
        assert_eq!(json_kind(None), "null");
        assert_eq!(json_kind(Some(&json!([]))), "array");
        assert_eq!(json_kind(Some(&json!("x"))), "string");
    }
}
