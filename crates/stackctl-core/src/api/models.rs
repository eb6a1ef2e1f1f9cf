//! Request and response bodies of the management API
//!
//! Only the fields the CLI reads are typed; everything else is kept in
//! `extra` so JSON/YAML output shows the full server response.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// SKCF clusters
// ---------------------------------------------------------------------------

/// A Cloud Foundry cluster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ClusterStatus>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Cluster {
    /// Aggregated state string, if the server reported one
    pub fn aggregated_state(&self) -> Option<&str> {
        self.status.as_ref()?.aggregated.as_deref()
    }
}

/// Status block of a cluster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregated: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ClusterStatusError>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Error reported inside a cluster status
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterStatusError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Aggregated cluster state as reported by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterState {
    Unspecified,
    Pending,
    Progressing,
    Healthy,
    Hibernated,
    Deleting,
    Failed,
    Other(String),
}

impl From<&str> for ClusterState {
    fn from(value: &str) -> Self {
        match value {
            "STATE_UNSPECIFIED" | "" => ClusterState::Unspecified,
            "STATE_PENDING" => ClusterState::Pending,
            "STATE_PROGRESSING" | "STATE_CREATING" | "STATE_RECONCILING" => {
                ClusterState::Progressing
            }
            "STATE_HEALTHY" => ClusterState::Healthy,
            "STATE_HIBERNATED" => ClusterState::Hibernated,
            "STATE_DELETING" => ClusterState::Deleting,
            "STATE_FAILED" | "STATE_ERROR" => ClusterState::Failed,
            other => ClusterState::Other(other.to_string()),
        }
    }
}

/// Response of the list clusters call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListClustersResponse {
    #[serde(default)]
    pub items: Vec<Cluster>,
}

/// Body of a create-or-update cluster request
///
/// Passed through to the service untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateOrUpdateClusterPayload {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Body of a create kubeconfig request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKubeconfigPayload {
    /// Lifetime in seconds, sent as a decimal string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_seconds: Option<String>,
}

/// A kubeconfig issued for a cluster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kubeconfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_timestamp: Option<String>,
}

// ---------------------------------------------------------------------------
// Argus credentials
// ---------------------------------------------------------------------------

/// Response of the create credentials call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateCredentialsResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

// ---------------------------------------------------------------------------
// SQLServer Flex instances
// ---------------------------------------------------------------------------

/// Response of the get instance call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetInstanceResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Instance>,
}

/// A SQLServer Flex instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<Storage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acl: Option<Acl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor: Option<Flavor>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Storage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Acl {
    #[serde(default)]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flavor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cluster_keeps_unknown_fields() {
        let raw = json!({
            "name": "my-cluster",
            "status": {"aggregated": "STATE_HEALTHY", "lastUpdate": "2024-05-01T10:00:00Z"},
            "region": "eu01"
        });
        let cluster: Cluster = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(cluster.name.as_deref(), Some("my-cluster"));
        assert_eq!(cluster.aggregated_state(), Some("STATE_HEALTHY"));
        assert_eq!(serde_json::to_value(&cluster).unwrap(), raw);
    }

    #[test]
    fn test_cluster_state_parsing() {
        assert_eq!(ClusterState::from("STATE_HEALTHY"), ClusterState::Healthy);
        assert_eq!(ClusterState::from("STATE_ERROR"), ClusterState::Failed);
        assert_eq!(ClusterState::from(""), ClusterState::Unspecified);
        assert_eq!(
            ClusterState::from("STATE_SOMETHING_NEW"),
            ClusterState::Other("STATE_SOMETHING_NEW".to_string())
        );
    }

    #[test]
    fn test_kubeconfig_payload_serialization() {
        let payload = CreateKubeconfigPayload {
            expiration_seconds: Some("3600".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"expirationSeconds": "3600"})
        );
    }

    #[test]
    fn test_instance_deserialization() {
        let raw = json!({
            "item": {
                "id": "5b0f7c7a-2d6c-4b6e-9d43-9a3d0f5d9a11",
                "name": "orders",
                "status": "Ready",
                "backupSchedule": "0 0 * * *",
                "storage": {"class": "premium-perf2", "size": 20},
                "acl": {"items": ["10.0.0.0/24", "192.168.1.0/24"]},
                "flavor": {"id": "4.16", "description": "Standard", "cpu": 4, "memory": 16}
            }
        });
        let resp: GetInstanceResponse = serde_json::from_value(raw).unwrap();
        let instance = resp.item.unwrap();
        assert_eq!(instance.backup_schedule.as_deref(), Some("0 0 * * *"));
        assert_eq!(instance.acl.unwrap().items.len(), 2);
        assert_eq!(instance.flavor.unwrap().memory, Some(16));
    }
}
