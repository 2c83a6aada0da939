use std::collections::HashSet;

use serde_json::Value;

use super::client::CatalogueClient;
use super::types::Record;

/// Component fields holding GitHub team references, one per role.
pub const TEAM_ROLE_FIELDS: [&str; 3] = [
    "github_project_teams_write",
    "github_project_teams_admin",
    "github_project_teams_maintain",
];

/// Union of every team referenced by the write, admin and maintain roles
/// of `components`.
///
/// Role fields are read straight from each record: missing, null or
/// non-list roles add nothing, and non-string entries are skipped without
/// losing their neighbours.
pub fn collect_team_refs<'a>(components: impl IntoIterator<Item = &'a Record>) -> HashSet<String> {
    let mut teams = HashSet::new();
    for record in components {
        for field in TEAM_ROLE_FIELDS {
            let Some(entries) = record.get(field).and_then(Value::as_array) else {
                continue;
            };
            teams.extend(entries.iter().filter_map(Value::as_str).map(str::to_string));
        }
    }
    teams
}

impl CatalogueClient {
    /// Find all GitHub team references across all components.
    pub async fn find_all_teams_ref_in_sc(&self) -> HashSet<String> {
        let components = self.get_all_records(&self.components_query()).await;
        let teams = collect_team_refs(&components);
        tracing::info!(
            "Found {} team references across {} components",
            teams.len(),
            components.len()
        );
        teams
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: Value) -> Vec<Record> {
        serde_json::from_value(value).unwrap()
    }

    fn set(teams: &[&str]) -> HashSet<String> {
        teams.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn unions_and_deduplicates_all_roles() {
        let components = records(json!([
            {
                "name": "a",
                "github_project_teams_write": ["dev", "ops"],
                "github_project_teams_admin": ["admins"],
                "github_project_teams_maintain": ["ops"]
            },
            {
                "name": "b",
                "github_project_teams_write": ["dev"],
                "github_project_teams_admin": null,
                "github_project_teams_maintain": []
            },
            { "name": "c" }
        ]));

        assert_eq!(collect_team_refs(&components), set(&["dev", "ops", "admins"]));
    }

    #[test]
    fn bad_entries_do_not_discard_valid_teams() {
        let components = records(json!([
            {
                "github_project_teams_write": ["dev", null],
                "github_project_teams_admin": ["admins"]
            },
            {
                "documentId": 42,
                "envs": "oops",
                "github_project_teams_maintain": ["ops", 7]
            }
        ]));

        assert_eq!(collect_team_refs(&components), set(&["dev", "admins", "ops"]));
    }

    #[test]
    fn non_list_role_contributes_nothing() {
        let components = records(json!([
            { "github_project_teams_write": "not-a-list" },
            { "github_project_teams_admin": ["admins"] }
        ]));
        assert_eq!(collect_team_refs(&components), set(&["admins"]));
    }

    #[test]
    fn no_components_yield_no_teams() {
        assert!(collect_team_refs(&Vec::new()).is_empty());
    }
}
