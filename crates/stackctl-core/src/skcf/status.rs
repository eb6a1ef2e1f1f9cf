//! Status collaborators for cluster operations
//!
//! Each collaborator pairs a cluster GET with a pure classifier. The
//! classifiers are public so their state tables can be tested without HTTP.

use async_trait::async_trait;

use crate::api::{ApiClient, Cluster, ClusterState};
use crate::error::BoxError;
use crate::wait::{OperationHandle, OperationStatus, StatusClient};

/// Waits for a created or updated cluster to become usable
#[derive(Debug, Clone, Copy)]
pub struct ClusterReadiness<'a> {
    client: &'a ApiClient,
}

impl<'a> ClusterReadiness<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatusClient for ClusterReadiness<'_> {
    type Output = Cluster;

    async fn get_status(
        &self,
        handle: &OperationHandle,
    ) -> Result<OperationStatus<Cluster>, BoxError> {
        let cluster = self
            .client
            .get_cluster(handle.project_id(), handle.name())
            .await?;
        Ok(classify_readiness(cluster))
    }
}

/// Waits for a deleted cluster to disappear
#[derive(Debug, Clone, Copy)]
pub struct ClusterDeletion<'a> {
    client: &'a ApiClient,
}

impl<'a> ClusterDeletion<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatusClient for ClusterDeletion<'_> {
    type Output = ();

    async fn get_status(&self, handle: &OperationHandle) -> Result<OperationStatus<()>, BoxError> {
        match self
            .client
            .get_cluster(handle.project_id(), handle.name())
            .await
        {
            Ok(cluster) => Ok(classify_deletion(&cluster)),
            Err(e) if e.is_not_found() => Ok(OperationStatus::Succeeded(())),
            Err(e) => Err(e.into()),
        }
    }
}

/// Map a cluster to the status of a create or update
///
/// Unknown states are treated as still in progress.
pub fn classify_readiness(cluster: Cluster) -> OperationStatus<Cluster> {
    let state = cluster.aggregated_state().map(ClusterState::from);
    match state {
        None | Some(ClusterState::Unspecified) | Some(ClusterState::Pending) => {
            OperationStatus::Pending
        }
        Some(ClusterState::Healthy) | Some(ClusterState::Hibernated) => {
            OperationStatus::Succeeded(cluster)
        }
        Some(ClusterState::Failed) => OperationStatus::Failed(failure_reason(&cluster)),
        Some(_) => OperationStatus::InProgress,
    }
}

/// Map a cluster that still exists to the status of a delete
pub fn classify_deletion(cluster: &Cluster) -> OperationStatus<()> {
    match cluster.aggregated_state().map(ClusterState::from) {
        Some(ClusterState::Failed) => OperationStatus::Failed(failure_reason(cluster)),
        _ => OperationStatus::InProgress,
    }
}

fn failure_reason(cluster: &Cluster) -> String {
    let reported = cluster
        .status
        .as_ref()
        .and_then(|status| status.errors.first())
        .and_then(|error| error.message.clone().or_else(|| error.code.clone()));

    reported.unwrap_or_else(|| {
        format!(
            "cluster is in state {}",
            cluster.aggregated_state().unwrap_or("unknown")
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ClusterStatus, ClusterStatusError};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cluster(state: Option<&str>) -> Cluster {
        Cluster {
            name: Some("c1".to_string()),
            status: state.map(|s| ClusterStatus {
                aggregated: Some(s.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_readiness_states() {
        assert_eq!(classify_readiness(cluster(None)), OperationStatus::Pending);
        assert_eq!(
            classify_readiness(cluster(Some("STATE_PENDING"))),
            OperationStatus::Pending
        );
        assert_eq!(
            classify_readiness(cluster(Some("STATE_PROGRESSING"))),
            OperationStatus::InProgress
        );
        assert_eq!(
            classify_readiness(cluster(Some("STATE_SOMETHING_NEW"))),
            OperationStatus::InProgress
        );
        assert!(matches!(
            classify_readiness(cluster(Some("STATE_HEALTHY"))),
            OperationStatus::Succeeded(_)
        ));
        assert!(matches!(
            classify_readiness(cluster(Some("STATE_HIBERNATED"))),
            OperationStatus::Succeeded(_)
        ));
    }

    #[test]
    fn test_failure_reason_prefers_reported_error() {
        let mut failed = cluster(Some("STATE_FAILED"));
        if let Some(status) = failed.status.as_mut() {
            status.errors.push(ClusterStatusError {
                code: Some("QUOTA".to_string()),
                message: Some("quota exceeded".to_string()),
            });
        }
        assert_eq!(
            classify_readiness(failed),
            OperationStatus::Failed("quota exceeded".to_string())
        );

        assert_eq!(
            classify_readiness(cluster(Some("STATE_ERROR"))),
            OperationStatus::Failed("cluster is in state STATE_ERROR".to_string())
        );
    }

    #[test]
    fn test_deletion_states() {
        assert_eq!(
            classify_deletion(&cluster(Some("STATE_DELETING"))),
            OperationStatus::InProgress
        );
        assert_eq!(
            classify_deletion(&cluster(Some("STATE_HEALTHY"))),
            OperationStatus::InProgress
        );
        assert!(matches!(
            classify_deletion(&cluster(Some("STATE_FAILED"))),
            OperationStatus::Failed(_)
        ));
    }

    #[tokio::test]
    async fn test_deletion_treats_not_found_as_done() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1alpha1/projects/p/clusters/gone"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "not found"})))
            .mount(&server)
            .await;

        let client = ApiClient::builder().api_url(server.uri()).build().unwrap();
        let status = ClusterDeletion::new(&client)
            .get_status(&OperationHandle::new("p", "gone"))
            .await
            .unwrap();
        assert_eq!(status, OperationStatus::Succeeded(()));
    }

    #[tokio::test]
    async fn test_readiness_propagates_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1alpha1/projects/p/clusters/c1"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = ApiClient::builder().api_url(server.uri()).build().unwrap();
        let err = ClusterReadiness::new(&client)
            .get_status(&OperationHandle::new("p", "c1"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("500"));
    }
}
