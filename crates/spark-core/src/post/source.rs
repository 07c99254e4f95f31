use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use super::api::ApiPost;
use super::models::Post;
use crate::config::ApiConfig;
use crate::content::{IdGenerator, UuidIds};
use crate::{Error, Result};

/// Where posts come from
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Up to `limit` posts in feed order
    async fn fetch_posts(&self, limit: usize) -> Result<Vec<Post>>;

    async fn fetch_post(&self, id: &str) -> Result<Post>;

    /// Short label for logs and the status bar
    fn name(&self) -> String;
}

/// Posts stored locally as a JSON array or JSONL, one API post per line
pub struct FileSource {
    path: PathBuf,
    ids: Arc<dyn IdGenerator>,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ids: Arc::new(UuidIds),
        }
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<ApiPost>> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        parse_post_file(&raw)
    }
}

/// Parse either a JSON array of posts or JSONL. Malformed JSONL lines are skipped.
pub fn parse_post_file(raw: &str) -> Result<Vec<ApiPost>> {
    let trimmed = raw.trim_start();
    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }

    let mut posts = Vec::new();
    for (line_no, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<ApiPost>(line) {
            Ok(post) => posts.push(post),
            Err(e) => tracing::warn!(line = line_no + 1, error = %e, "Skipping malformed post line"),
        }
    }
    Ok(posts)
}

#[async_trait]
impl ContentSource for FileSource {
    async fn fetch_posts(&self, limit: usize) -> Result<Vec<Post>> {
        let posts = self.load().await?;
        tracing::info!(path = %self.path.display(), total = posts.len(), "Loaded posts from file");
        Ok(posts
            .into_iter()
            .take(limit)
            .map(|p| p.into_post(self.ids.as_ref()))
            .collect())
    }

    async fn fetch_post(&self, id: &str) -> Result<Post> {
        self.load()
            .await?
            .into_iter()
            .find(|p| p.uid == id)
            .map(|p| p.into_post(self.ids.as_ref()))
            .ok_or_else(|| Error::PostNotFound(id.to_string()))
    }

    fn name(&self) -> String {
        self.path.display().to_string()
    }
}

/// Posts served by the Spark API
pub struct HttpSource {
    client: Client,
    base_url: String,
    prefix: String,
    ids: Arc<dyn IdGenerator>,
}

impl HttpSource {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()
            .map_err(Error::Http)?;

        // validate early so a typo shows up at startup
        Url::parse(&config.base_url)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            prefix: config.prefix.clone(),
            ids: Arc::new(UuidIds),
        })
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Full URL of an API path such as `/posts`
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!("{}{}{}", self.base_url, self.prefix, path))?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: api_error_message(status.as_u16(), &body),
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ContentSource for HttpSource {
    async fn fetch_posts(&self, limit: usize) -> Result<Vec<Post>> {
        let mut url = self.endpoint("/posts")?;
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        let posts: Vec<ApiPost> = self.get_json(url).await?;
        tracing::info!(count = posts.len(), limit, "Fetched posts");
        Ok(posts
            .into_iter()
            .map(|p| p.into_post(self.ids.as_ref()))
            .collect())
    }

    async fn fetch_post(&self, id: &str) -> Result<Post> {
        let mut url = self.endpoint("/posts")?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Invalid API base URL: {}", self.base_url)))?
            .push(id);
        match self.get_json::<ApiPost>(url).await {
            Ok(post) => Ok(post.into_post(self.ids.as_ref())),
            Err(Error::Api { status: 404, .. }) => Err(Error::PostNotFound(id.to_string())),
            Err(e) => Err(e),
        }
    }

    fn name(&self) -> String {
        self.base_url.clone()
    }
}

/// Human-readable message from an API error body.
///
/// Understands validation errors (`detail` as a list of `{msg}`), plain
/// `detail` strings and `message` fields.
pub fn api_error_message(status: u16, body: &str) -> String {
    let fallback = format!("HTTP error: {}", status);
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return fallback;
    };

    if let Some(details) = value.get("detail").and_then(|d| d.as_array()) {
        return details
            .iter()
            .map(|d| {
                d.get("msg")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| d.to_string())
            })
            .collect::<Vec<_>>()
            .join("\n");
    }
    if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
        return message.to_string();
    }
    if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
        return detail.to_string();
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("spark-posts-{}.jsonl", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_parse_json_array_and_jsonl() {
        let array = r#"[{"uid": "a", "title": "A"}, {"uid": "b", "title": "B"}]"#;
        assert_eq!(parse_post_file(array).unwrap().len(), 2);

        let jsonl = "{\"uid\": \"a\", \"title\": \"A\"}\n\nnot json\n{\"uid\": \"b\", \"title\": \"B\"}\n";
        let posts = parse_post_file(jsonl).unwrap();
        assert_eq!(posts.iter().map(|p| p.uid.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);

        assert!(parse_post_file("[{\"uid\": 1").is_err());
    }

    #[tokio::test]
    async fn test_file_source_fetches() {
        let path = temp_file(
            "{\"uid\": \"a\", \"title\": \"A\"}\n{\"uid\": \"b\", \"title\": \"B\"}\n{\"uid\": \"c\", \"title\": \"C\"}\n",
        );
        let source = FileSource::new(&path);

        let posts = source.fetch_posts(2).await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[1].id, "b");

        let post = source.fetch_post("c").await.unwrap();
        assert_eq!(post.title, "C");
        assert!(matches!(
            source.fetch_post("zzz").await,
            Err(Error::PostNotFound(id)) if id == "zzz"
        ));

        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let source = FileSource::new("/definitely/not/here.jsonl");
        assert!(matches!(source.fetch_posts(5).await, Err(Error::Io(_))));
    }

    #[test]
    fn test_http_endpoints() {
        let config = ApiConfig {
            base_url: "https://api.example.com/".into(),
            prefix: "/v1".into(),
            ..ApiConfig::default()
        };
        let source = HttpSource::new(&config).unwrap();
        assert_eq!(
            source.endpoint("/posts").unwrap().as_str(),
            "https://api.example.com/v1/posts"
        );

        let bad = ApiConfig {
            base_url: "not a url".into(),
            ..ApiConfig::default()
        };
        assert!(matches!(HttpSource::new(&bad), Err(Error::UrlParse(_))));
    }

    #[test]
    fn test_api_error_messages() {
        assert_eq!(
            api_error_message(422, r#"{"detail": [{"msg": "field required"}, {"msg": "too short"}]}"#),
            "field required\ntoo short"
        );
        assert_eq!(api_error_message(400, r#"{"message": "bad"}"#), "bad");
        assert_eq!(api_error_message(404, r#"{"detail": "Post not found"}"#), "Post not found");
        assert_eq!(api_error_message(500, "<html>"), "HTTP error: 500");
    }
}
