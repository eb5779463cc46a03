//! Airtable-backed [`DataSource`].
//!
//! Lists a table with `GET /v0/{base}/{table}`, following the `offset`
//! token Airtable returns until the last page. Each learner's decks live in
//! their own base; users without an explicit mapping read the default base.

use async_trait::async_trait;
use duedeck_core::schema::Page;
use duedeck_core::{Collection, CoreError, DataSource, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.airtable.com";
const USER_AGENT: &str = concat!("duedeck/", env!("CARGO_PKG_VERSION"));
/// Airtable rejects larger page sizes.
pub const MAX_PAGE_SIZE: u32 = 100;

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AirtableConfig {
    pub api_key: String,
    pub base_id: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// User id -> base id.
    #[serde(default)]
    pub user_bases: HashMap<String, String>,
}

impl AirtableConfig {
    pub fn new(api_key: impl Into<String>, base_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_id: base_id.into(),
            base_url: default_base_url(),
            page_size: None,
            timeout_secs: default_timeout_secs(),
            user_bases: HashMap::new(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_page_size(mut self, n: u32) -> Self {
        self.page_size = Some(n);
        self
    }

    pub fn with_user_base(mut self, user: impl Into<String>, base: impl Into<String>) -> Self {
        self.user_bases.insert(user.into(), base.into());
        self
    }

    pub fn base_for(&self, user: &UserId) -> &str {
        self.user_bases
            .get(user.as_str())
            .map(String::as_str)
            .unwrap_or(&self.base_id)
    }
}

impl fmt::Debug for AirtableConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AirtableConfig")
            .field("api_key", &"<redacted>")
            .field("base_id", &self.base_id)
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_bases", &self.user_bases.len())
            .finish()
    }
}

pub struct AirtableSource {
    config: AirtableConfig,
    http: reqwest::Client,
}

impl AirtableSource {
    pub fn new(config: AirtableConfig) -> Result<Self, CoreError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "failed to build http client");
                CoreError::Invalid("http client configuration")
            })?;
        Ok(Self::with_client(config, http))
    }

    /// Shares an already configured client.
    pub fn with_client(config: AirtableConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &AirtableConfig {
        &self.config
    }

    fn table_url(&self, user: &UserId, collection: Collection) -> String {
        format!(
            "{}/v0/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.base_for(user),
            collection.table_name()
        )
    }
}

#[async_trait]
impl DataSource for AirtableSource {
    async fn fetch_page(
        &self,
        user: &UserId,
        collection: Collection,
        cursor: Option<&str>,
    ) -> Result<Page, CoreError> {
        let url = self.table_url(user, collection);
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(n) = self.config.page_size {
            query.push(("pageSize", n.clamp(1, MAX_PAGE_SIZE).to_string()));
        }
        if let Some(c) = cursor {
            query.push(("offset", c.to_string()));
        }

        tracing::debug!(%user, url = %url, offset = ?cursor, "listing records");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .query(&query)
            .send()
            .await
            .map_err(|e| CoreError::fetch(collection, format!("network error: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let cause = match status.as_u16() {
                401 | 403 => format!("not authorized ({status})"),
                404 => format!("table or base not found ({status}): {body}"),
                429 => format!("rate limited ({status})"),
                _ => format!("api error {status}: {body}"),
            };
            tracing::warn!(%user, %collection, %status, "airtable request failed");
            return Err(CoreError::fetch(collection, cause));
        }

        response
            .json::<Page>()
            .await
            .map_err(|e| CoreError::fetch(collection, format!("unreadable response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_api_key() {
        let cfg = AirtableConfig::new("keySECRET", "appBASE");
        let s = format!("{cfg:?}");
        assert!(!s.contains("keySECRET"));
        assert!(s.contains("appBASE"));
    }

    #[test]
    fn users_map_to_their_base() {
        let cfg = AirtableConfig::new("k", "appDefault").with_user_base("auth0|1", "appOne");
        assert_eq!(cfg.base_for(&UserId::new("auth0|1")), "appOne");
        assert_eq!(cfg.base_for(&UserId::new("auth0|2")), "appDefault");
    }

    #[test]
    fn table_url_joins_cleanly() {
        let cfg = AirtableConfig::new("k", "appX").with_base_url("http://localhost:9/");
        let src = AirtableSource::new(cfg).unwrap();
        assert_eq!(
            src.table_url(&UserId::new("u"), Collection::Scores),
            "http://localhost:9/v0/appX/Scores"
        );
    }

    #[test]
    fn config_defaults_fill_in() {
        let cfg: AirtableConfig =
            serde_json::from_str(r#"{ "api_key": "k", "base_id": "appX" }"#).unwrap();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.timeout_secs, 30);
        assert!(cfg.page_size.is_none());
    }
}
