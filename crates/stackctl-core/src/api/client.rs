//! HTTP client for the management API
//!
//! Every service lives on its own host. The base URL is derived from a
//! template where `{service}` is replaced by the service name, e.g.
//! `https://{service}.api.stackit.cloud` becomes
//! `https://skcf.api.stackit.cloud`. A template without the placeholder
//! sends every service to the same host, which is what tests do.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use super::error::ApiError;
use super::models::{
    Cluster, CreateCredentialsResponse, CreateKubeconfigPayload, CreateOrUpdateClusterPayload,
    GetInstanceResponse, Kubeconfig, ListClustersResponse,
};

/// Default URL template for the public cloud
pub const DEFAULT_API_URL: &str = "https://{service}.api.stackit.cloud";

/// User agent string for stackctl HTTP requests
pub const USER_AGENT: &str = concat!("stackctl/", env!("CARGO_PKG_VERSION"));

const SKCF: &str = "skcf";
const ARGUS: &str = "argus";
const SQLSERVERFLEX: &str = "sqlserverflex";

type Result<T> = std::result::Result<T, ApiError>;

/// Builder for [`ApiClient`]
#[derive(Debug, Clone)]
pub struct ApiClientBuilder {
    api_url: String,
    token: Option<String>,
    timeout: Duration,
    user_agent: String,
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            timeout: Duration::from_secs(60),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl ApiClientBuilder {
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Upper bound for a single request, including status queries
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> Result<ApiClient> {
        // Fail early on a template that can never produce a valid URL
        service_base(&self.api_url, SKCF)?;

        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .build()?;

        Ok(ApiClient {
            http,
            api_url: self.api_url,
            token: self.token,
        })
    }
}

/// Client for the SKCF, Argus and SQLServer Flex APIs
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// The URL template this client was built with
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    // -----------------------------------------------------------------------
    // SKCF clusters
    // -----------------------------------------------------------------------

    pub async fn list_clusters(&self, project_id: &str) -> Result<ListClustersResponse> {
        let url = self.url(SKCF, &["v1alpha1", "projects", project_id, "clusters"])?;
        self.execute(self.request(Method::GET, url)).await
    }

    pub async fn get_cluster(&self, project_id: &str, name: &str) -> Result<Cluster> {
        let url = self.url(
            SKCF,
            &["v1alpha1", "projects", project_id, "clusters", name],
        )?;
        self.execute(self.request(Method::GET, url)).await
    }

    pub async fn create_or_update_cluster(
        &self,
        project_id: &str,
        name: &str,
        payload: &CreateOrUpdateClusterPayload,
    ) -> Result<Cluster> {
        let url = self.url(
            SKCF,
            &["v1alpha1", "projects", project_id, "clusters", name],
        )?;
        self.execute(self.request(Method::PUT, url).json(payload))
            .await
    }

    pub async fn delete_cluster(&self, project_id: &str, name: &str) -> Result<()> {
        let url = self.url(
            SKCF,
            &["v1alpha1", "projects", project_id, "clusters", name],
        )?;
        self.execute_empty(self.request(Method::DELETE, url)).await
    }

    pub async fn create_kubeconfig(
        &self,
        project_id: &str,
        cluster_name: &str,
        payload: &CreateKubeconfigPayload,
    ) -> Result<Kubeconfig> {
        let url = self.url(
            SKCF,
            &[
                "v1alpha1",
                "projects",
                project_id,
                "clusters",
                cluster_name,
                "kubeconfig",
            ],
        )?;
        self.execute(self.request(Method::POST, url).json(payload))
            .await
    }

    // -----------------------------------------------------------------------
    // Argus
    // -----------------------------------------------------------------------

    pub async fn create_credentials(
        &self,
        project_id: &str,
        instance_id: &str,
    ) -> Result<CreateCredentialsResponse> {
        let url = self.url(
            ARGUS,
            &[
                "v1",
                "projects",
                project_id,
                "instances",
                instance_id,
                "credentials",
            ],
        )?;
        self.execute(self.request(Method::POST, url)).await
    }

    // -----------------------------------------------------------------------
    // SQLServer Flex
    // -----------------------------------------------------------------------

    pub async fn get_instance(
        &self,
        project_id: &str,
        instance_id: &str,
    ) -> Result<GetInstanceResponse> {
        let url = self.url(
            SQLSERVERFLEX,
            &["v1", "projects", project_id, "instances", instance_id],
        )?;
        self.execute(self.request(Method::GET, url)).await
    }

    // -----------------------------------------------------------------------
    // plumbing
    // -----------------------------------------------------------------------

    fn url(&self, service: &str, segments: &[&str]) -> Result<Url> {
        let mut url = service_base(&self.api_url, service)?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl {
                url: self.api_url.clone(),
                message: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("{} {}", method, url);
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = check_status(request.send().await?).await?;
        let body = response.text().await?;
        trace!("Response body: {}", body);
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn execute_empty(&self, request: RequestBuilder) -> Result<()> {
        check_status(request.send().await?).await?;
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    trace!("Response status: {}", status);
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::from_status(status, body))
}

fn service_base(template: &str, service: &str) -> Result<Url> {
    let raw = template.replace("{service}", service);
    Url::parse(&raw).map_err(|e| ApiError::InvalidUrl {
        url: template.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::builder()
            .api_url(server.uri())
            .token("test-token")
            .build()
            .unwrap()
    }

    #[test]
    fn test_service_base_substitutes_placeholder() {
        let url = service_base(DEFAULT_API_URL, "argus").unwrap();
        assert_eq!(url.as_str(), "https://argus.api.stackit.cloud/");
    }

    #[test]
    fn test_invalid_template_is_rejected() {
        let err = ApiClient::builder().api_url("not a url").build().unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl { .. }));
    }

    #[test]
    fn test_path_segments_are_encoded() {
        let client = ApiClient::builder()
            .api_url("https://{service}.example.com/base/")
            .build()
            .unwrap();
        let url = client
            .url(SKCF, &["v1alpha1", "projects", "p 1", "clusters", "a/b"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://skcf.example.com/base/v1alpha1/projects/p%201/clusters/a%2Fb"
        );
    }

    #[tokio::test]
    async fn test_get_cluster_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1alpha1/projects/proj/clusters/my-cluster"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "my-cluster",
                "status": {"aggregated": "STATE_PROGRESSING"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let cluster = client_for(&server)
            .get_cluster("proj", "my-cluster")
            .await
            .unwrap();
        assert_eq!(cluster.aggregated_state(), Some("STATE_PROGRESSING"));
    }

    #[tokio::test]
    async fn test_create_kubeconfig_sends_expiration() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1alpha1/projects/proj/clusters/c1/kubeconfig"))
            .and(body_json(json!({"expirationSeconds": "1800"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "kubeconfig": "apiVersion: v1\nkind: Config\n"
            })))
            .mount(&server)
            .await;

        let payload = CreateKubeconfigPayload {
            expiration_seconds: Some("1800".to_string()),
        };
        let kubeconfig = client_for(&server)
            .create_kubeconfig("proj", "c1", &payload)
            .await
            .unwrap();
        assert!(kubeconfig.kubeconfig.unwrap().contains("kind: Config"));
    }

    #[tokio::test]
    async fn test_not_found_maps_to_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1alpha1/projects/proj/clusters/missing"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "cluster not found"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_cluster("proj", "missing")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("cluster not found"));
    }

    #[tokio::test]
    async fn test_delete_accepts_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1alpha1/projects/proj/clusters/c1"))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).delete_cluster("proj", "c1").await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1alpha1/projects/proj/clusters"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_clusters("proj").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
