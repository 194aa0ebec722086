//! GitHub REST client.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::{Response, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::GithubConfig;
use crate::constants::USER_AGENT;
use crate::models::{FileDescriptor, RepoId};

use super::{ContentProvider, FileContent, GithubError, RepoTree, TreeProvider};

#[derive(Deserialize)]
struct RepoInfo {
    default_branch: String,
}

#[derive(Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    size: u64,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

/// Client for the GitHub REST API.
#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_base: Url,
    token: Option<String>,
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("api_base", &self.api_base.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl GithubClient {
    /// Build a client from the `[github]` config section.
    pub fn new(config: &GithubConfig) -> Result<Self, GithubError> {
        let api_base = Url::parse(&config.api_base)
            .map_err(|e| GithubError::Api(format!("invalid API base {}: {e}", config.api_base)))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| GithubError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            api_base,
            token: config.token.clone().filter(|t| !t.trim().is_empty()),
        })
    }

    /// Default branch name of the repository.
    pub async fn default_branch(&self, repo: &RepoId) -> Result<String, GithubError> {
        let url = self.endpoint(repo, &[], None)?;
        let resp = self.get(url).await?;
        let resp = check_status(resp, || format!("repository {repo}")).await?;
        let info: RepoInfo = resp
            .json()
            .await
            .map_err(|e| GithubError::Api(format!("failed to parse repository info: {e}")))?;
        Ok(info.default_branch)
    }

    fn endpoint(
        &self,
        repo: &RepoId,
        tail: &[&str],
        query: Option<(&str, &str)>,
    ) -> Result<Url, GithubError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| GithubError::Api(format!("invalid API base {}", self.api_base)))?
            .pop_if_empty()
            .extend(["repos", repo.owner.as_str(), repo.repo.as_str()])
            .extend(tail);
        if let Some((key, value)) = query {
            url.query_pairs_mut().append_pair(key, value);
        }
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<Response, GithubError> {
        debug!("GET {url}");
        let mut req = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            req = req.header("Authorization", format!("token {token}"));
        }
        req.send().await.map_err(|e| {
            if e.is_timeout() {
                GithubError::Network(format!("request timed out: {e}"))
            } else {
                GithubError::Network(e.to_string())
            }
        })
    }
}

/// Map non-success statuses to [`GithubError`] variants.
async fn check_status(
    resp: Response,
    what: impl FnOnce() -> String,
) -> Result<Response, GithubError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let rate_limited = resp
        .headers()
        .get("x-ratelimit-remaining")
        .is_some_and(|v| v.as_bytes() == b"0");
    let body = resp.text().await.unwrap_or_default();

    Err(match status {
        StatusCode::NOT_FOUND => GithubError::NotFound(what()),
        StatusCode::TOO_MANY_REQUESTS => GithubError::RateLimited,
        StatusCode::FORBIDDEN if rate_limited || body.to_lowercase().contains("rate limit") => {
            GithubError::RateLimited
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            GithubError::AccessDenied(format!("{} ({status})", what()))
        }
        _ => GithubError::Api(format!("{} returned {status}", what())),
    })
}

/// Decode a contents-API payload. Non-UTF-8 bytes yield [`FileContent::Binary`].
fn decode_content(payload: ContentResponse, path: &str) -> Result<FileContent, GithubError> {
    if payload.encoding != "base64" {
        return Err(GithubError::Api(format!(
            "{path}: unsupported content encoding '{}'",
            payload.encoding
        )));
    }
    let compact: String = payload
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| GithubError::Api(format!("{path}: invalid base64 content: {e}")))?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => FileContent::Text(text),
        Err(_) => FileContent::Binary,
    })
}

#[async_trait]
impl TreeProvider for GithubClient {
    async fn tree(&self, repo: &RepoId) -> Result<RepoTree, GithubError> {
        let branch = self.default_branch(repo).await?;
        let url = self.endpoint(repo, &["git", "trees", branch.as_str()], Some(("recursive", "1")))?;
        let resp = self.get(url).await?;
        let resp = check_status(resp, || format!("tree for {repo}@{branch}")).await?;
        let body: TreeResponse = resp
            .json()
            .await
            .map_err(|e| GithubError::Api(format!("failed to parse tree: {e}")))?;

        if body.truncated {
            warn!("tree for {repo} was truncated by GitHub; some files are missing");
        }

        let files = body
            .tree
            .into_iter()
            .filter_map(|entry| match entry.kind.as_str() {
                "blob" => Some(FileDescriptor::file(entry.path, entry.size)),
                "tree" => Some(FileDescriptor::dir(entry.path)),
                _ => None,
            })
            .collect();

        Ok(RepoTree {
            files,
            truncated: body.truncated,
        })
    }
}

#[async_trait]
impl ContentProvider for GithubClient {
    async fn content(&self, repo: &RepoId, path: &str) -> Result<FileContent, GithubError> {
        let mut tail = vec!["contents"];
        tail.extend(path.split('/'));
        let url = self.endpoint(repo, &tail, None)?;
        let resp = self.get(url).await?;
        let resp = check_status(resp, || format!("{repo}/{path}")).await?;
        let payload: ContentResponse = resp
            .json()
            .await
            .map_err(|e| GithubError::Api(format!("{path}: failed to parse content: {e}")))?;
        decode_content(payload, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileKind;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, token: Option<&str>) -> GithubClient {
        GithubClient::new(&GithubConfig {
            token: token.map(String::from),
            api_base: server.uri(),
            request_timeout_secs: 5,
        })
        .unwrap()
    }

    fn b64(s: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(s)
    }

    fn repo() -> RepoId {
        RepoId::new("octo", "demo")
    }

    #[tokio::test]
    async fn tree_uses_default_branch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/demo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"default_branch": "trunk"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/demo/git/trees/trunk"))
            .and(query_param("recursive", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sha": "abc",
                "truncated": false,
                "tree": [
                    {"path": "src", "type": "tree"},
                    {"path": "src/main.rs", "type": "blob", "size": 42},
                    {"path": "vendor/sub", "type": "commit"}
                ]
            })))
            .mount(&server)
            .await;

        let tree = client_for(&server, None).tree(&repo()).await.unwrap();
        assert!(!tree.truncated);
        assert_eq!(tree.files.len(), 2);
        assert_eq!(tree.files[0].kind, FileKind::Dir);
        assert_eq!(tree.files[1], FileDescriptor::file("src/main.rs", 42));
    }

    #[tokio::test]
    async fn missing_repo_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/demo"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
            .mount(&server)
            .await;

        let err = client_for(&server, None).tree(&repo()).await.unwrap_err();
        assert!(matches!(err, GithubError::NotFound(_)));
    }

    #[tokio::test]
    async fn exhausted_quota_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("x-ratelimit-remaining", "0")
                    .set_body_json(json!({"message": "API rate limit exceeded"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server, None).tree(&repo()).await.unwrap_err();
        assert_eq!(err, GithubError::RateLimited);
    }

    #[tokio::test]
    async fn plain_forbidden_is_access_denied() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "Forbidden"})))
            .mount(&server)
            .await;

        let err = client_for(&server, None).tree(&repo()).await.unwrap_err();
        assert!(matches!(err, GithubError::AccessDenied(_)));
    }

    #[tokio::test]
    async fn content_decodes_wrapped_base64_and_sends_token() {
        let server = MockServer::start().await;
        let encoded = b64(b"fn main() {}\n");
        let wrapped = format!("{}\n{}", &encoded[..8], &encoded[8..]);
        Mock::given(method("GET"))
            .and(path("/repos/octo/demo/contents/src/main.rs"))
            .and(header("Authorization", "token secret"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"content": wrapped, "encoding": "base64"})),
            )
            .mount(&server)
            .await;

        let content = client_for(&server, Some("secret"))
            .content(&repo(), "src/main.rs")
            .await
            .unwrap();
        assert_eq!(content, FileContent::Text("fn main() {}\n".into()));
    }

    #[tokio::test]
    async fn non_utf8_content_is_binary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/demo/contents/blob.dat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"content": b64(&[0xff, 0xfe, 0x00]), "encoding": "base64"})),
            )
            .mount(&server)
            .await;

        let content = client_for(&server, None)
            .content(&repo(), "blob.dat")
            .await
            .unwrap();
        assert_eq!(content, FileContent::Binary);
    }

    #[tokio::test]
    async fn server_error_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server, None)
            .content(&repo(), "README.md")
            .await
            .unwrap_err();
        assert!(matches!(err, GithubError::Api(_)));
    }

    #[test]
    fn oversized_files_have_no_inline_content() {
        let payload = ContentResponse {
            content: String::new(),
            encoding: "none".into(),
        };
        assert!(matches!(
            decode_content(payload, "big.bin"),
            Err(GithubError::Api(_))
        ));
    }

    #[test]
    fn blank_token_is_ignored() {
        let client = GithubClient::new(&GithubConfig {
            token: Some("  ".into()),
            api_base: "https://api.github.com".into(),
            request_timeout_secs: 5,
        })
        .unwrap();
        assert!(client.token.is_none());
    }
}
