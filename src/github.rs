use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::config::Config;

pub const ACCEPT_V3_JSON: &str = "application/vnd.github.v3+json";

/// Page size for the repository listing. Only the first page is fetched.
pub const REPOS_PER_PAGE: u32 = 100;

/// Bearer token attached to every request. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Returns `None` for blank tokens so an empty env var means anonymous.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// The five logical GitHub REST endpoints a snapshot is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Profile,
    Repos,
    Stars,
    PullRequests,
    Events,
}

impl Endpoint {
    pub const ALL: [Endpoint; 5] = [
        Endpoint::Profile,
        Endpoint::Repos,
        Endpoint::Stars,
        Endpoint::PullRequests,
        Endpoint::Events,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Endpoint::Profile => "profile",
            Endpoint::Repos => "repositories",
            Endpoint::Stars => "starred repositories",
            Endpoint::PullRequests => "pull requests",
            Endpoint::Events => "events",
        }
    }

    /// Build the request descriptor for `username`, which must already be trimmed.
    pub fn request(self, username: &str) -> EndpointRequest {
        let user = urlencoding::encode(username);
        let (path, query) = match self {
            Endpoint::Profile => (format!("/users/{user}"), Vec::new()),
            Endpoint::Repos => (
                format!("/users/{user}/repos"),
                vec![("per_page", REPOS_PER_PAGE.to_string())],
            ),
            Endpoint::Stars => (
                "/search/repositories".to_string(),
                vec![("q", format!("user:{username}"))],
            ),
            Endpoint::PullRequests => (
                "/search/issues".to_string(),
                vec![("q", format!("author:{username} type:pr"))],
            ),
            Endpoint::Events => (format!("/users/{user}/events"), Vec::new()),
        };

        EndpointRequest {
            endpoint: self,
            path,
            query,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRequest {
    pub endpoint: Endpoint,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
}

/// Fetches one endpoint and hands back its body as untyped JSON.
///
/// Implementations must treat non-success statuses as errors and must not
/// retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(
        &self,
        request: &EndpointRequest,
        credential: Option<&Credential>,
    ) -> Result<Value>;
}

#[derive(Clone)]
pub struct GithubClient {
    base_url: Arc<String>,
    user_agent: Arc<String>,
    http: Arc<Client>,
}

impl GithubClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: Arc::new(config.api_base.trim_end_matches('/').to_string()),
            user_agent: Arc::new(config.user_agent.clone()),
            http: Arc::new(http),
        })
    }

    /// Prepare a GET for `request` with the headers every endpoint shares.
    pub fn request(
        &self,
        request: &EndpointRequest,
        credential: Option<&Credential>,
    ) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, request.path);

        let mut req = self
            .http
            .get(url)
            .header(ACCEPT, ACCEPT_V3_JSON)
            .header(USER_AGENT, self.user_agent.as_str());

        if !request.query.is_empty() {
            req = req.query(&request.query);
        }

        if let Some(credential) = credential {
            req = req.bearer_auth(credential.expose());
        }

        req
    }
}

#[async_trait]
impl Transport for GithubClient {
    async fn get_json(
        &self,
        request: &EndpointRequest,
        credential: Option<&Credential>,
    ) -> Result<Value> {
        debug!(endpoint = %request.endpoint, path = %request.path, "sending request");

        let resp = self
            .request(request, credential)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Network error requesting {}: {e}", request.path))?;

        let status = resp.status();
        if !status.is_success() {
            // GitHub error bodies carry a `message`; fall back to raw text.
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or(body);
            anyhow::bail!(
                "GitHub API returned HTTP {} for {}: {message}",
                status.as_u16(),
                request.path
            );
        }

        let json: Value = resp
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON from {}", request.path))?;

        debug!(endpoint = %request.endpoint, status = status.as_u16(), "response received");
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::AUTHORIZATION;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn client_for(base: &str) -> GithubClient {
        let config = Config {
            api_base: base.to_string(),
            ..Config::default()
        };
        GithubClient::new(&config).unwrap()
    }

    #[test]
    fn builds_paths_and_queries() {
        let repos = Endpoint::Repos.request("octocat");
        assert_eq!(repos.path, "/users/octocat/repos");
        assert_eq!(repos.query, vec![("per_page", "100".to_string())]);

        let prs = Endpoint::PullRequests.request("octocat");
        assert_eq!(prs.path, "/search/issues");
        assert_eq!(prs.query, vec![("q", "author:octocat type:pr".to_string())]);

        let stars = Endpoint::Stars.request("octocat");
        assert_eq!(stars.query, vec![("q", "user:octocat".to_string())]);

        assert_eq!(Endpoint::Profile.request("octocat").path, "/users/octocat");
        assert_eq!(Endpoint::Events.request("octocat").path, "/users/octocat/events");
    }

    #[test]
    fn encodes_username_in_path() {
        let req = Endpoint::Profile.request("a b/c");
        assert_eq!(req.path, "/users/a%20b%2Fc");
    }

    #[test]
    fn blank_credential_is_anonymous() {
        assert!(Credential::new("").is_none());
        assert!(Credential::new("  \n").is_none());
        assert_eq!(Credential::new(" tok ").unwrap().expose(), "tok");
        assert_eq!(
            format!("{:?}", Credential::new("secret").unwrap()),
            "Credential(<redacted>)"
        );
    }

    #[test]
    fn every_request_carries_the_same_headers() {
        let client = client_for("https://api.github.com/");
        let cred = Credential::new("abc123");

        for endpoint in Endpoint::ALL {
            let req = client
                .request(&endpoint.request("octocat"), cred.as_ref())
                .build()
                .unwrap();
            let headers = req.headers();
            assert_eq!(headers[ACCEPT], ACCEPT_V3_JSON);
            assert_eq!(headers[AUTHORIZATION], "Bearer abc123");
            assert!(headers.contains_key(USER_AGENT));
            assert!(req.url().as_str().starts_with("https://api.github.com/"));
        }
    }

    #[test]
    fn anonymous_requests_omit_authorization() {
        let client = client_for("https://api.github.com");
        let req = client
            .request(&Endpoint::Profile.request("octocat"), None)
            .build()
            .unwrap();
        assert!(!req.headers().contains_key(AUTHORIZATION));
        assert_eq!(req.url().as_str(), "https://api.github.com/users/octocat");
    }

    #[test]
    fn search_query_is_form_encoded() {
        let client = client_for("https://api.github.com");
        let req = client
            .request(&Endpoint::PullRequests.request("octocat"), None)
            .build()
            .unwrap();
        assert_eq!(req.url().query(), Some("q=author%3Aoctocat+type%3Apr"));
    }

    /// Serve exactly one canned HTTP response on a local port.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "{status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{addr}")
    }

    #[tokio::test]
    async fn success_status_yields_json() {
        let base = serve_once("HTTP/1.1 200 OK", r#"{"login":"octocat"}"#).await;
        let client = client_for(&base);

        let json = client
            .get_json(&Endpoint::Profile.request("octocat"), None)
            .await
            .unwrap();
        assert_eq!(json["login"], "octocat");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let base = serve_once("HTTP/1.1 404 Not Found", r#"{"message":"Not Found"}"#).await;
        let client = client_for(&base);

        let err = client
            .get_json(&Endpoint::Profile.request("ghost"), None)
            .await
            .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("HTTP 404"), "{msg}");
        assert!(msg.contains("Not Found"), "{msg}");
    }

    #[tokio::test]
    async fn non_json_body_is_an_error() {
        let base = serve_once("HTTP/1.1 200 OK", "<html>oops</html>").await;
        let client = client_for(&base);

        let err = client
            .get_json(&Endpoint::Events.request("octocat"), None)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse JSON"));
    }
}
