//! Record shapes returned by the Service Catalogue.
//!
//! Records are handled as untyped JSON objects by the CRUD layer; the typed
//! views here only cover the fields the client itself reads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A catalogue record: field name to JSON value.
pub type Record = Map<String, Value>;

/// Identifier field the backend assigns to every persisted record.
pub const DOCUMENT_ID: &str = "documentId";

/// `meta.pagination` block of a collection response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: Option<u32>,
    pub page_count: Option<u32>,
    pub page_size: Option<u32>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// An environment entry inside a component's `envs` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Env {
    #[serde(rename = "documentId", default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// The parts of a component record the client works with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Component {
    #[serde(rename = "documentId", default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub envs: Option<Vec<Env>>,
    #[serde(default)]
    pub github_project_teams_write: Option<Vec<String>>,
    #[serde(default)]
    pub github_project_teams_admin: Option<Vec<String>>,
    #[serde(default)]
    pub github_project_teams_maintain: Option<Vec<String>>,
}

impl Component {
    /// Typed view of a raw record; unknown fields are ignored.
    pub fn from_record(record: &Record) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(record.clone()))
    }
}

/// A scheduled-job status record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduledJob {
    #[serde(rename = "documentId", default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub last_successful_run: Option<String>,
    #[serde(default)]
    pub last_scheduled_run: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error_details: Option<Value>,
}

impl ScheduledJob {
    pub fn from_record(record: &Record) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(record.clone()))
    }
}

/// Fields written back to a scheduled-job record after a run.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledJobUpdate {
    pub result: String,
    pub last_scheduled_run: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_successful_run: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn component_tolerates_null_and_missing_fields() {
        let component = Component::from_record(&record(json!({
            "name": "api",
            "envs": null,
            "github_project_teams_write": null,
            "github_project_teams_admin": ["admins"],
            "unrelated": {"nested": true}
        })))
        .unwrap();

        assert_eq!(component.name.as_deref(), Some("api"));
        assert!(component.envs.is_none());
        assert!(component.github_project_teams_write.is_none());
        assert_eq!(component.github_project_teams_admin, Some(vec!["admins".to_string()]));
    }

    #[test]
    fn scheduled_job_reads_status_fields() {
        let job = ScheduledJob::from_record(&record(json!({
            "documentId": "job-doc-1",
            "name": "nightly-sync",
            "result": "Failed",
            "error_details": ["boom"]
        })))
        .unwrap();

        assert_eq!(job.document_id.as_deref(), Some("job-doc-1"));
        assert_eq!(job.result.as_deref(), Some("Failed"));
        assert!(job.last_successful_run.is_none());
        assert_eq!(job.error_details, Some(json!(["boom"])));
    }

    #[test]
    fn job_update_omits_unset_fields() {
        let update = ScheduledJobUpdate {
            result: "Failed".into(),
            last_scheduled_run: "2026-01-01T00:00:00Z".into(),
            last_successful_run: None,
            error_details: None,
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value["result"], "Failed");
        assert!(value.get("last_successful_run").is_none());
        assert!(value.get("error_details").is_none());
    }

    #[test]
    fn page_meta_reads_camel_case_pagination() {
        let meta: PageMeta = serde_json::from_value(json!({
            "pagination": {"page": 2, "pageSize": 10, "pageCount": 3, "total": 25}
        }))
        .unwrap();
        let pagination = meta.pagination.unwrap();
        assert_eq!(pagination.page, Some(2));
        assert_eq!(pagination.page_count, Some(3));
    }
}
