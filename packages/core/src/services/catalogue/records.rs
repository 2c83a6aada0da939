//! Record-level reads and writes.
//!
//! None of these return errors. Reads degrade to `None` or an empty record,
//! writes to `false`/`None`, and every write is a single attempt.

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};

use super::client::{table_name, CatalogueClient};
use super::query::{eq_filter, join_query};
use super::types::{Component, Record, DOCUMENT_ID};

/// Request body shape expected by the backend for writes.
#[derive(Serialize)]
struct DataEnvelope<'a, T: ?Sized> {
    data: &'a T,
}

fn pretty<T: Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|err| format!("<unserialisable: {}>", err))
}

impl CatalogueClient {
    /// First record of `table` whose `label` equals `parameter`.
    ///
    /// "First" is whatever order the backend returns; when several records
    /// match a warning is logged and the first one is used.
    pub async fn get_record(&self, table: &str, label: &str, parameter: &str) -> Option<Record> {
        let uri = eq_filter(table, label, parameter);
        let mut records = self
            .get_with_retry(&uri, self.retry.max_retries, self.config.timeout)
            .await;

        if records.len() > 1 {
            tracing::warn!(
                "{} records in {} match {}={}; using the first",
                records.len(),
                table_name(table),
                label,
                parameter
            );
        }

        if records.is_empty() {
            None
        } else {
            Some(records.swap_remove(0))
        }
    }

    /// One unretried GET of `table` narrowed by `filter`.
    ///
    /// Transport errors, non-2xx answers and empty results all yield `None`.
    pub async fn get_filtered_records(&self, table: &str, filter: &str) -> Option<Vec<Record>> {
        let url = self.resource_url(&join_query(table, filter));

        let response = match self
            .http
            .get(&url)
            .headers(self.headers.clone())
            .timeout(self.config.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(
                    "Error getting records for {} in {}: {}",
                    filter,
                    table_name(table),
                    err
                );
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(
                "Could not find records for {} in {}: HTTP {}",
                filter,
                table_name(table),
                response.status()
            );
            return None;
        }

        let records: Vec<Record> = match response.json::<Value>().await {
            Ok(Value::Object(mut body)) => match body.remove("data") {
                Some(Value::Array(items)) => items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::Object(record) => Some(record),
                        _ => None,
                    })
                    .collect(),
                _ => Vec::new(),
            },
            Ok(_) => Vec::new(),
            Err(err) => {
                tracing::error!(
                    "Unreadable response for {} in {}: {}",
                    filter,
                    table_name(table),
                    err
                );
                return None;
            }
        };

        if records.is_empty() {
            tracing::warn!("Could not find records for {} in {}", filter, table_name(table));
            return None;
        }

        tracing::debug!(
            "Found {} records for {} in {}",
            records.len(),
            filter,
            table_name(table)
        );
        Some(records)
    }

    /// `table/id` as a single record, or `None` when nothing usable came back.
    pub async fn get_record_by_id(&self, table: &str, id: &str) -> Option<Record> {
        let record = self
            .get_single_record_with_retry(
                &format!("{}/{}", table, id),
                self.retry.max_retries,
                self.config.timeout,
            )
            .await;
        if record.is_empty() {
            None
        } else {
            Some(record)
        }
    }

    /// PUT `{data: data}` to `table/id`; `true` only on HTTP 200.
    pub async fn update<T: Serialize + ?Sized>(&self, table: &str, id: &str, data: &T) -> bool {
        tracing::debug!("data to be uploaded: {}", pretty(data));
        self.put_data(table, id, data, "updated").await
    }

    /// Clear `publishedAt` on `table/id`; `true` only on HTTP 200.
    pub async fn unpublish(&self, table: &str, id: &str) -> bool {
        let data = json!({ "publishedAt": null });
        self.put_data(table, id, &data, "unpublished").await
    }

    async fn put_data<T: Serialize + ?Sized>(&self, table: &str, id: &str, data: &T, action: &str) -> bool {
        let url = self.resource_url(&format!("{}/{}", table, id));
        let response = self
            .http
            .put(&url)
            .headers(self.headers.clone())
            .timeout(self.config.timeout)
            .json(&DataEnvelope { data })
            .send()
            .await;

        match response {
            Ok(response) if response.status() == StatusCode::OK => {
                tracing::info!(
                    "Successfully {} record {} in {}: {}",
                    action,
                    id,
                    table_name(table),
                    response.status()
                );
                true
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::error!(
                    "Received non-200 response from service catalogue for record id {} in {}: {} {}",
                    id,
                    table_name(table),
                    status,
                    body
                );
                false
            }
            Err(err) => {
                tracing::error!(
                    "Error updating service catalogue for record id {} in {}: {}",
                    id,
                    table_name(table),
                    err
                );
                false
            }
        }
    }

    /// POST `{data: data}` to `table`; the parsed body on HTTP 201.
    pub async fn add<T: Serialize + ?Sized>(&self, table: &str, data: &T) -> Option<Value> {
        tracing::debug!("Data to be added: {}", pretty(data));
        let url = self.resource_url(table);
        let response = self
            .http
            .post(&url)
            .headers(self.headers.clone())
            .timeout(self.config.timeout)
            .json(&DataEnvelope { data })
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(
                    "Error adding a record to {} in service catalogue: {}",
                    table_name(table),
                    err
                );
                return None;
            }
        };

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                "Received non-201 response from service catalogue to add a record to {}: {} {}",
                table_name(table),
                status,
                body
            );
            return None;
        }

        match response.json::<Value>().await {
            Ok(created) => {
                tracing::info!(
                    "Successfully added {} to {}: {}",
                    created_label(&created),
                    table_name(table),
                    status
                );
                Some(created)
            }
            Err(err) => {
                tracing::error!(
                    "Record added to {} but the response was unreadable: {}",
                    table_name(table),
                    err
                );
                None
            }
        }
    }

    /// DELETE `table/id`; `true` on HTTP 200 or 204.
    pub async fn delete(&self, table: &str, id: &str) -> bool {
        tracing::debug!("Deleting record {} from {}", id, table_name(table));
        let url = self.resource_url(&format!("{}/{}", table, id));
        let response = self
            .http
            .delete(&url)
            .headers(self.headers.clone())
            .timeout(self.config.timeout)
            .send()
            .await;

        match response {
            Ok(response)
                if response.status() == StatusCode::OK
                    || response.status() == StatusCode::NO_CONTENT =>
            {
                tracing::info!(
                    "Successfully deleted record {} from {}: {}",
                    id,
                    table_name(table),
                    response.status()
                );
                true
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::error!(
                    "Received non-2xx response from service catalogue deleting record id {} in {}: {} {}",
                    id,
                    table_name(table),
                    status,
                    body
                );
                false
            }
            Err(err) => {
                tracing::error!(
                    "Error deleting record {} from {} in service catalogue: {}",
                    id,
                    table_name(table),
                    err
                );
                false
            }
        }
    }

    /// `documentId` of the first record of `table` whose `field` equals `value`.
    pub async fn get_id(&self, table: &str, field: &str, value: &str) -> Option<String> {
        let record = self.get_record(table, field, value).await?;
        match record.get(DOCUMENT_ID).and_then(Value::as_str) {
            Some(id) => {
                tracing::debug!(
                    "Successfully found Service Catalogue documentID for {}={} in {}: {}",
                    field,
                    value,
                    table_name(table),
                    id
                );
                Some(id.to_string())
            }
            None => {
                tracing::warn!(
                    "Could not find Service Catalogue documentID for {}={} in {}",
                    field,
                    value,
                    table_name(table)
                );
                None
            }
        }
    }

    /// `documentId` of the environment called `env_name` in `component`.
    pub fn get_component_env_id(&self, component: &Component, env_name: &str) -> Option<String> {
        let found = component
            .envs
            .iter()
            .flatten()
            .find(|candidate| candidate.name.as_deref() == Some(env_name))
            .and_then(|candidate| candidate.document_id.clone());

        let component_name = component.name.as_deref().unwrap_or("<unnamed>");
        match &found {
            Some(id) => tracing::debug!(
                "Found existing environment ID for {} in component {}: {}",
                env_name,
                component_name,
                id
            ),
            None => tracing::debug!(
                "No existing environment ID found for {} in component {}",
                env_name,
                component_name
            ),
        }
        found
    }
}

fn created_label(created: &Value) -> &str {
    let data = created.get("data").unwrap_or(created);
    data.get("team_name")
        .or_else(|| data.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("record")
}
