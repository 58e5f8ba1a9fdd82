//! Pure REST client for a headless CMS admin API.
//!
//! Covers the four surfaces the sync engine consumes: the schema-descriptor
//! endpoints (content types and components), the per-type entry endpoints
//! with offset/limit pagination, the optional identifier/password login that
//! yields a bearer token, and streaming asset downloads.
//!
//! # Example
//!
//! ```rust,ignore
//! use cms_client::CmsClient;
//!
//! let mut client = CmsClient::new("http://localhost:1337")?;
//! client.login("build@example.com", "secret").await?;
//!
//! let types = client.content_types().await?;
//! let articles = client.entries("articles", 100).await?;
//! ```

pub mod error;
pub mod types;

pub use error::{ClientError, Result};
pub use types::{Attribute, AuthResponse, ContentKind, ContentType, DescriptorResponse, Entry};

use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use url::Url;

use types::LoginRequest;

/// Descriptor endpoint for content types.
const CONTENT_TYPES_PATH: &str = "content-manager/content-types";

/// Descriptor endpoint for components.
const COMPONENTS_PATH: &str = "content-manager/components";

/// Login endpoint for the identifier/password handshake.
const LOGIN_PATH: &str = "auth/local";

pub struct CmsClient {
    client: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl CmsClient {
    /// Create a client for the given API base URL.
    pub fn new(api_url: &str) -> Result<Self> {
        let mut base = Url::parse(api_url).map_err(|_| ClientError::InvalidUrl {
            url: api_url.to_string(),
        })?;

        // A trailing slash keeps joined endpoint paths under the base path.
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base,
            token: None,
        })
    }

    /// Use a custom HTTP client (timeouts, proxies).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Attach a pre-obtained bearer token to all requests.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Whether a bearer token is currently attached.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Log in with identifier/password credentials and keep the returned
    /// token for all subsequent requests.
    pub async fn login(&mut self, identifier: &str, password: &str) -> Result<()> {
        let url = self.endpoint(LOGIN_PATH)?;
        let resp = self
            .client
            .post(url)
            .json(&LoginRequest {
                identifier,
                password,
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let auth: AuthResponse = resp.json().await?;
        self.token = Some(auth.jwt);
        tracing::debug!("Obtained bearer token from login endpoint");
        Ok(())
    }

    /// Fetch the content-type descriptors.
    pub async fn content_types(&self) -> Result<Vec<ContentType>> {
        let resp: DescriptorResponse = self.get_json(CONTENT_TYPES_PATH, &[]).await?;
        Ok(resp.data)
    }

    /// Fetch the component descriptors.
    pub async fn components(&self) -> Result<Vec<ContentType>> {
        let resp: DescriptorResponse = self.get_json(COMPONENTS_PATH, &[]).await?;
        Ok(resp.data)
    }

    /// Fetch every entry of a collection-type endpoint.
    ///
    /// Pages through `_start`/`_limit` offsets until the API returns fewer
    /// entries than the requested page size.
    pub async fn entries(&self, endpoint: &str, page_size: usize) -> Result<Vec<Entry>> {
        let mut all: Vec<Entry> = Vec::new();

        loop {
            let query = [
                ("_limit", page_size.to_string()),
                ("_start", all.len().to_string()),
            ];
            let page: Vec<Entry> = self.get_json(endpoint, &query).await?;
            let short_page = page.len() < page_size;
            all.extend(page);

            if short_page {
                break;
            }
        }

        tracing::debug!(endpoint, count = all.len(), "Fetched collection entries");
        Ok(all)
    }

    /// Fetch the sole entry of a single-type endpoint.
    pub async fn singleton(&self, endpoint: &str) -> Result<Entry> {
        self.get_json(endpoint, &[]).await
    }

    /// Stream a file to `dest`, overwriting any existing content.
    ///
    /// `file_url` may be absolute or relative to the API base URL.
    pub async fn download(&self, file_url: &str, dest: &Path) -> Result<()> {
        let url = self.endpoint(file_url)?;

        let mut req = self.client.get(url.clone());
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;

        tracing::debug!(url = %url, dest = %dest.display(), "Downloaded file");
        Ok(())
    }

    /// Resolve a path (or absolute URL) against the base URL.
    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|_| ClientError::InvalidUrl {
                url: path.to_string(),
            })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.endpoint(path)?;

        let mut req = self.client.get(url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_under_base_path() {
        let client = CmsClient::new("http://localhost:1337").unwrap();
        assert_eq!(
            client.endpoint("articles").unwrap().as_str(),
            "http://localhost:1337/articles"
        );

        let prefixed = CmsClient::new("http://example.com/cms").unwrap();
        assert_eq!(
            prefixed.endpoint("articles").unwrap().as_str(),
            "http://example.com/cms/articles"
        );
    }

    #[test]
    fn endpoint_passes_absolute_urls_through() {
        let client = CmsClient::new("http://localhost:1337").unwrap();
        assert_eq!(
            client
                .endpoint("https://cdn.example.com/u/a.png")
                .unwrap()
                .as_str(),
            "https://cdn.example.com/u/a.png"
        );
    }

    #[test]
    fn new_rejects_invalid_urls() {
        assert!(matches!(
            CmsClient::new("not a url"),
            Err(ClientError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn token_state_tracks_with_token() {
        let client = CmsClient::new("http://localhost:1337").unwrap();
        assert!(!client.is_authenticated());
        assert!(client.with_token("abc").is_authenticated());
    }
}
