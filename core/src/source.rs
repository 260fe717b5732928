//! Status sources — the capability that performs the external fetch.
//!
//! Two concrete sources exist: a Minecraft-style service-status API
//! and a source-hosting repository API. Which one a board polls is
//! fixed by configuration; everything downstream is polymorphic over
//! the trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{BoardError, BoardResult};

pub const SERVICE_API_BASE: &str = "https://api.mcsrvstat.us";
pub const REPOSITORY_API_BASE: &str = "https://api.github.com";

/// Cap on the error-body excerpt carried in failure messages.
const BODY_EXCERPT_MAX: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceVariant {
    Service,
    Repository,
}

/// The contract every status source must fulfill.
#[async_trait]
pub trait StatusSource: Send + Sync {
    fn variant(&self) -> SourceVariant;

    /// Identifier shown next to the status-block heading,
    /// e.g. "(play.example.org)".
    fn label(&self) -> String;

    /// The provider's human-facing page for this source.
    fn display_url(&self) -> String;

    /// Perform one fetch and return the raw JSON body.
    ///
    /// `credential` is a bearer credential for sources that accept
    /// one; others ignore it. Fails fast when the source identifier
    /// is unset — no network call is attempted.
    async fn fetch(&self, credential: Option<&str>) -> BoardResult<Value>;
}

pub struct ServiceStatusSource {
    host:     String,
    api_base: String,
    client:   reqwest::Client,
}

impl ServiceStatusSource {
    pub fn new(host: impl Into<String>) -> Self {
        Self::with_api_base(host, SERVICE_API_BASE)
    }

    pub fn with_api_base(host: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            host:     host.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client:   reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl StatusSource for ServiceStatusSource {
    fn variant(&self) -> SourceVariant {
        SourceVariant::Service
    }

    fn label(&self) -> String {
        format!("({})", self.host)
    }

    fn display_url(&self) -> String {
        format!("https://mcsrvstat.us/server/{}", self.host)
    }

    async fn fetch(&self, _credential: Option<&str>) -> BoardResult<Value> {
        if self.host.is_empty() {
            return Err(BoardError::SourceNotConfigured(
                "service host is empty".to_string(),
            ));
        }
        let url = format!("{}/2/{}", self.api_base, self.host);
        let res = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;
        read_json_body(res).await
    }
}

pub struct RepositorySource {
    slug:     String, // "owner/repo"
    api_base: String,
    client:   reqwest::Client,
}

impl RepositorySource {
    pub fn new(slug: impl Into<String>) -> Self {
        Self::with_api_base(slug, REPOSITORY_API_BASE)
    }

    pub fn with_api_base(slug: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            slug:     slug.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client:   reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl StatusSource for RepositorySource {
    fn variant(&self) -> SourceVariant {
        SourceVariant::Repository
    }

    fn label(&self) -> String {
        format!("({})", self.slug)
    }

    fn display_url(&self) -> String {
        format!("https://github.com/{}", self.slug)
    }

    async fn fetch(&self, credential: Option<&str>) -> BoardResult<Value> {
        if self.slug.is_empty() {
            return Err(BoardError::SourceNotConfigured(
                "repository slug is empty".to_string(),
            ));
        }
        let url = format!("{}/repos/{}", self.api_base, self.slug);
        let mut req = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github.v3+json")
            // The API rejects requests without a user agent.
            .header("User-Agent", "statusboard");
        if let Some(token) = credential {
            req = req.header("Authorization", format!("token {token}"));
        }
        read_json_body(req.send().await?).await
    }
}

/// Shared tail of both fetch paths: non-2xx becomes an Http error
/// carrying a bounded body excerpt, 2xx parses as JSON.
async fn read_json_body(res: reqwest::Response) -> BoardResult<Value> {
    let status = res.status();
    if !status.is_success() {
        let status_text = status
            .canonical_reason()
            .unwrap_or("Unknown Status")
            .to_string();
        // Best effort — a body that fails to read falls back to the
        // status text.
        let body = res.text().await.unwrap_or_else(|_| status_text.clone());
        return Err(BoardError::Http {
            status: status.as_u16(),
            status_text,
            body: excerpt(&body),
        });
    }
    let body = res
        .json::<Value>()
        .await
        .map_err(|e| BoardError::Malformed(e.to_string()))?;
    Ok(body)
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= BODY_EXCERPT_MAX {
        return trimmed.to_string();
    }
    let mut cut = BODY_EXCERPT_MAX;
    while !trimmed.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…", &trimmed[..cut])
}
