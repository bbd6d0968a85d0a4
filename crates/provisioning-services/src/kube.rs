//! Kubernetes core/v1 Secrets client.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use provisioning_types::config::StoreConfig;
use provisioning_types::{ProvisionError, Result, SecretRecord, SecretsStore, StoreError};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use url::Url;

/// Directory where the service account credentials are mounted in a pod.
pub const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

/// Kubernetes client configuration.
#[derive(Debug, Clone)]
pub struct KubeConfig {
    /// API server URL
    pub api_server: String,
    /// Bearer token
    pub token: Option<String>,
    /// File holding the bearer token, re-read on every request
    pub token_file: Option<PathBuf>,
    /// PEM bundle used to verify the API server
    pub ca_file: Option<PathBuf>,
    /// Skip TLS verification
    pub insecure: bool,
}

impl Default for KubeConfig {
    fn default() -> Self {
        Self {
            api_server: "https://kubernetes.default.svc".to_string(),
            token: None,
            token_file: None,
            ca_file: None,
            insecure: false,
        }
    }
}

impl KubeConfig {
    /// Configuration for a client running inside a pod.
    ///
    /// Uses `KUBERNETES_SERVICE_HOST`/`KUBERNETES_SERVICE_PORT` and the mounted
    /// service account token and CA bundle.
    pub fn in_cluster() -> Result<Self> {
        Self::in_cluster_from(
            std::env::var("KUBERNETES_SERVICE_HOST").ok(),
            std::env::var("KUBERNETES_SERVICE_PORT").ok(),
        )
    }

    fn in_cluster_from(host: Option<String>, port: Option<String>) -> Result<Self> {
        let host = host.filter(|h| !h.is_empty()).ok_or_else(|| {
            ProvisionError::Config(
                "KUBERNETES_SERVICE_HOST is not set; not running in a cluster?".to_string(),
            )
        })?;
        let port = port.filter(|p| !p.is_empty()).unwrap_or_else(|| "443".to_string());

        let host = if host.contains(':') {
            format!("[{}]", host)
        } else {
            host
        };

        let account = Path::new(SERVICE_ACCOUNT_DIR);
        let ca_file = account.join("ca.crt");

        Ok(Self {
            api_server: format!("https://{}:{}", host, port),
            token_file: Some(account.join("token")),
            ca_file: ca_file.exists().then_some(ca_file),
            ..Default::default()
        })
    }

    /// Build a client configuration from the stored settings.
    ///
    /// Without an explicit API server the in-cluster environment is used,
    /// including the mounted service account token. An explicit API server
    /// only gets the credentials that are configured for it.
    pub fn from_store_config(config: &StoreConfig) -> Result<Self> {
        let mut kube = match &config.api_server {
            Some(api_server) => Self {
                api_server: api_server.clone(),
                ..Default::default()
            },
            None => Self::in_cluster()?,
        };

        if config.token.is_some() {
            kube.token = config.token.clone();
        }
        if config.token_file.is_some() {
            kube.token_file = config.token_file.clone();
        }
        if config.ca_file.is_some() {
            kube.ca_file = config.ca_file.clone();
        }
        kube.insecure = config.insecure;

        Ok(kube)
    }
}

#[derive(Deserialize)]
struct Secret {
    #[serde(default)]
    data: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct Status {
    #[serde(default)]
    message: String,
}

/// Client for the Secrets resource of a Kubernetes API server.
#[derive(Clone)]
pub struct KubeSecretsClient {
    config: KubeConfig,
    client: Client,
    base_url: Url,
}

impl KubeSecretsClient {
    /// Create a new client.
    pub fn new(config: KubeConfig) -> Result<Self> {
        let mut base_url = Url::parse(&config.api_server)
            .map_err(|e| ProvisionError::Config(format!("Invalid API server URL: {}", e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = Client::builder();

        if config.insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(ca_file) = &config.ca_file {
            let pem = std::fs::read(ca_file).map_err(|e| {
                ProvisionError::Config(format!(
                    "Failed to read CA bundle {}: {}",
                    ca_file.display(),
                    e
                ))
            })?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .map_err(|e| ProvisionError::Config(format!("Invalid CA bundle: {}", e)))?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder.build()
            .map_err(|e| ProvisionError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            client,
            base_url,
        })
    }

    /// The API server this client talks to.
    pub fn api_server(&self) -> &str {
        &self.config.api_server
    }

    /// Get the bearer token from config or the token file.
    fn token(&self) -> std::result::Result<Option<String>, StoreError> {
        if let Some(token) = &self.config.token {
            return Ok(Some(token.clone()));
        }

        match &self.config.token_file {
            Some(path) => std::fs::read_to_string(path)
                .map(|token| Some(token.trim().to_string()))
                .map_err(|e| {
                    StoreError::Unauthorized(format!(
                        "cannot read token file {}: {}",
                        path.display(),
                        e
                    ))
                }),
            None => Ok(None),
        }
    }

    fn collection_url(&self, namespace: &str) -> std::result::Result<Url, StoreError> {
        self.base_url
            .join(&format!("api/v1/namespaces/{}/secrets", namespace))
            .map_err(|e| StoreError::Transport(format!("Invalid path: {}", e)))
    }

    fn secret_url(&self, namespace: &str, name: &str) -> std::result::Result<Url, StoreError> {
        self.base_url
            .join(&format!("api/v1/namespaces/{}/secrets/{}", namespace, name))
            .map_err(|e| StoreError::Transport(format!("Invalid path: {}", e)))
    }

    async fn send(&self, mut req: RequestBuilder) -> std::result::Result<Response, StoreError> {
        if let Some(token) = self.token()? {
            req = req.bearer_auth(token);
        }

        req.header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| StoreError::Transport(format!("Request failed: {}", e)))
    }
}

/// Map a non-success response to a store error.
async fn error_from_response(resp: Response, namespace: &str, name: &str) -> StoreError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Status>(&body)
        .map(|s| s.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or(body);

    classify(status, namespace, name, message)
}

fn classify(status: StatusCode, namespace: &str, name: &str, message: String) -> StoreError {
    match status {
        StatusCode::NOT_FOUND => StoreError::NotFound {
            namespace: namespace.to_string(),
            name: name.to_string(),
        },
        StatusCode::CONFLICT => StoreError::Conflict {
            namespace: namespace.to_string(),
            name: name.to_string(),
        },
        StatusCode::UNAUTHORIZED => StoreError::Unauthorized(message),
        StatusCode::FORBIDDEN => StoreError::Forbidden(message),
        _ => StoreError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// Build a record from a successful GET body.
///
/// A 200 response means the secret exists, so nothing in the body can turn it
/// into an error. Values that are not base64 are skipped and invalid UTF-8 is
/// replaced.
fn decode_secret(namespace: &str, name: &str, body: &str) -> SecretRecord {
    let mut record = SecretRecord::new(namespace, name);

    let secret = match serde_json::from_str::<Secret>(body) {
        Ok(secret) => secret,
        Err(e) => {
            tracing::debug!(namespace, secret = name, "Unparseable secret body: {}", e);
            return record;
        }
    };

    for (key, encoded) in secret.data {
        match STANDARD.decode(encoded.as_bytes()) {
            Ok(bytes) => {
                let value = String::from_utf8_lossy(&bytes).into_owned();
                record.data.insert(key, value);
            }
            Err(e) => {
                tracing::debug!(
                    namespace,
                    secret = name,
                    key = %key,
                    "Skipping undecodable field: {}",
                    e
                );
            }
        }
    }

    record
}

#[async_trait]
impl SecretsStore for KubeSecretsClient {
    async fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> std::result::Result<SecretRecord, StoreError> {
        let url = self.secret_url(namespace, name)?;
        tracing::trace!(%url, "GET secret");

        let resp = self.send(self.client.get(url)).await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp, namespace, name).await);
        }

        let body = resp
            .text()
            .await
            .map_err(|e| StoreError::Transport(format!("Failed to read response: {}", e)))?;
        Ok(decode_secret(namespace, name, &body))
    }

    async fn create(&self, record: &SecretRecord) -> std::result::Result<(), StoreError> {
        let url = self.collection_url(&record.namespace)?;
        tracing::trace!(%url, secret = %record.name, "POST secret");

        let body = serde_json::json!({
            "apiVersion": "v1",
            "kind": "Secret",
            "metadata": {
                "name": record.name,
                "namespace": record.namespace,
            },
            "type": "Opaque",
            "stringData": record.data,
        });

        let resp = self.send(self.client.post(url).json(&body)).await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp, &record.namespace, &record.name).await);
        }

        Ok(())
    }

    fn backend(&self) -> &'static str {
        "kubernetes"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::io::Write;

    fn client_for(server: &mockito::Server) -> KubeSecretsClient {
        KubeSecretsClient::new(KubeConfig {
            api_server: server.url(),
            token: Some("t0ken".to_string()),
            token_file: None,
            ca_file: None,
            insecure: false,
        })
        .unwrap()
    }

    #[test]
    fn test_urls() {
        let client = KubeSecretsClient::new(KubeConfig {
            api_server: "https://10.0.0.1:6443/proxy".to_string(),
            token_file: None,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            client.secret_url("metal3", "db").unwrap().as_str(),
            "https://10.0.0.1:6443/proxy/api/v1/namespaces/metal3/secrets/db"
        );
        assert_eq!(
            client.collection_url("metal3").unwrap().as_str(),
            "https://10.0.0.1:6443/proxy/api/v1/namespaces/metal3/secrets"
        );
    }

    #[test]
    fn test_classify() {
        assert!(classify(StatusCode::NOT_FOUND, "ns", "s", String::new()).is_not_found());
        assert!(classify(StatusCode::CONFLICT, "ns", "s", String::new()).is_conflict());
        assert_eq!(
            classify(StatusCode::FORBIDDEN, "ns", "s", "denied".to_string()),
            StoreError::Forbidden("denied".to_string())
        );
        assert_eq!(
            classify(StatusCode::UNAUTHORIZED, "ns", "s", "who".to_string()),
            StoreError::Unauthorized("who".to_string())
        );
        assert_eq!(
            classify(StatusCode::SERVICE_UNAVAILABLE, "ns", "s", "later".to_string()),
            StoreError::Api { status: 503, message: "later".to_string() }
        );
    }

    #[test]
    fn test_in_cluster_from_env_values() {
        let config = KubeConfig::in_cluster_from(Some("10.96.0.1".to_string()), Some("443".to_string())).unwrap();
        assert_eq!(config.api_server, "https://10.96.0.1:443");
        assert_eq!(config.token_file, Some(Path::new(SERVICE_ACCOUNT_DIR).join("token")));

        let v6 = KubeConfig::in_cluster_from(Some("fd00::1".to_string()), None).unwrap();
        assert_eq!(v6.api_server, "https://[fd00::1]:443");

        assert!(KubeConfig::in_cluster_from(None, None).is_err());
    }

    #[test]
    fn test_from_store_config_overrides() {
        let store = StoreConfig {
            api_server: Some("https://api.example:6443".to_string()),
            token: None,
            token_file: Some(PathBuf::from("/tmp/token")),
            ca_file: None,
            insecure: true,
        };

        let config = KubeConfig::from_store_config(&store).unwrap();
        assert_eq!(config.api_server, "https://api.example:6443");
        assert_eq!(config.token_file, Some(PathBuf::from("/tmp/token")));
        assert!(config.insecure);
    }

    #[tokio::test]
    async fn test_explicit_api_server_sends_no_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/namespaces/metal3/secrets/db")
            .match_header("authorization", Matcher::Missing)
            .with_status(404)
            .create_async()
            .await;

        let store = StoreConfig {
            api_server: Some(server.url()),
            ..Default::default()
        };
        let config = KubeConfig::from_store_config(&store).unwrap();
        assert_eq!(config.token_file, None);
        assert_eq!(config.ca_file, None);

        let client = KubeSecretsClient::new(config).unwrap();
        assert!(client.get("metal3", "db").await.unwrap_err().is_not_found());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_decodes_data() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/namespaces/metal3/secrets/metal3-mariadb-password")
            .match_header("authorization", "Bearer t0ken")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"apiVersion":"v1","kind":"Secret",
                    "metadata":{"name":"metal3-mariadb-password","namespace":"metal3"},
                    "type":"Opaque","data":{"password":"czNjcmV0"}}"#,
            )
            .create_async()
            .await;

        let record = client_for(&server)
            .get("metal3", "metal3-mariadb-password")
            .await
            .unwrap();

        assert_eq!(record.name, "metal3-mariadb-password");
        assert_eq!(record.namespace, "metal3");
        assert_eq!(record.get("password"), Some("s3cret"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/namespaces/metal3/secrets/missing")
            .with_status(404)
            .with_body(r#"{"kind":"Status","message":"secrets \"missing\" not found","reason":"NotFound","code":404}"#)
            .create_async()
            .await;

        let err = client_for(&server).get("metal3", "missing").await.unwrap_err();
        assert_eq!(
            err,
            StoreError::NotFound {
                namespace: "metal3".to_string(),
                name: "missing".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_get_forbidden_keeps_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/namespaces/metal3/secrets/db")
            .with_status(403)
            .with_body(r#"{"kind":"Status","message":"secrets \"db\" is forbidden","reason":"Forbidden","code":403}"#)
            .create_async()
            .await;

        let err = client_for(&server).get("metal3", "db").await.unwrap_err();
        assert_eq!(err, StoreError::Forbidden("secrets \"db\" is forbidden".to_string()));
    }

    #[tokio::test]
    async fn test_get_tolerates_any_stored_content() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/namespaces/metal3/secrets/metal3-mariadb-password")
            .with_status(200)
            .with_body(
                r#"{"metadata":{"name":"metal3-mariadb-password","namespace":"metal3"},
                    "data":{"password":"czNjcmV0","blob":"/w==","junk":"***"}}"#,
            )
            .create_async()
            .await;

        let record = client_for(&server)
            .get("metal3", "metal3-mariadb-password")
            .await
            .unwrap();

        assert_eq!(record.get("password"), Some("s3cret"));
        assert_eq!(record.get("blob"), Some("\u{FFFD}"));
        assert_eq!(record.get("junk"), None);
    }

    #[tokio::test]
    async fn test_get_with_unparseable_body_still_exists() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/namespaces/metal3/secrets/db")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let record = client_for(&server).get("metal3", "db").await.unwrap();
        assert_eq!(record.name, "db");
        assert_eq!(record.namespace, "metal3");
        assert!(record.data.is_empty());
    }

    #[tokio::test]
    async fn test_create_posts_string_data() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/namespaces/metal3/secrets")
            .match_header("authorization", "Bearer t0ken")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "kind": "Secret",
                "metadata": {"name": "db", "namespace": "metal3"},
                "type": "Opaque",
                "stringData": {"password": "s3cret"},
            })))
            .with_status(201)
            .with_body("{}")
            .create_async()
            .await;

        let record = SecretRecord::new("metal3", "db").with_field("password", "s3cret");
        client_for(&server).create(&record).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_conflict() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/namespaces/metal3/secrets")
            .with_status(409)
            .with_body(r#"{"kind":"Status","message":"secrets \"db\" already exists","reason":"AlreadyExists","code":409}"#)
            .create_async()
            .await;

        let record = SecretRecord::new("metal3", "db").with_field("password", "s3cret");
        let err = client_for(&server).create(&record).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_create_server_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/namespaces/metal3/secrets")
            .with_status(500)
            .with_body("etcd unavailable")
            .create_async()
            .await;

        let record = SecretRecord::new("metal3", "db").with_field("password", "s3cret");
        let err = client_for(&server).create(&record).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::Api { status: 500, message: "etcd unavailable".to_string() }
        );
    }

    #[tokio::test]
    async fn test_token_file_is_used() {
        let mut token_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(token_file, "from-file").unwrap();

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/namespaces/metal3/secrets/db")
            .match_header("authorization", "Bearer from-file")
            .with_status(404)
            .create_async()
            .await;

        let client = KubeSecretsClient::new(KubeConfig {
            api_server: server.url(),
            token: None,
            token_file: Some(token_file.path().to_path_buf()),
            ca_file: None,
            insecure: false,
        })
        .unwrap();

        assert!(client.get("metal3", "db").await.unwrap_err().is_not_found());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_token_file_is_unauthorized() {
        let client = KubeSecretsClient::new(KubeConfig {
            api_server: "http://127.0.0.1:9".to_string(),
            token: None,
            token_file: Some(PathBuf::from("/nonexistent/token")),
            ca_file: None,
            insecure: false,
        })
        .unwrap();

        let err = client.get("metal3", "db").await.unwrap_err();
        assert!(matches!(err, StoreError::Unauthorized(_)));
    }
}
