//! PostgREST (Supabase) remote store

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde_json::Value;
use tracing::{debug, instrument};

use obra_core::EntityKind;

use crate::{RemoteStore, SyncError, SyncResult};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote store speaking the PostgREST protocol at `<url>/rest/v1/<table>`
pub struct PostgrestRemote {
    client: Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for PostgrestRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgrestRemote")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .finish()
    }
}

impl PostgrestRemote {
    pub fn new(url: &str, api_key: &str) -> SyncResult<Self> {
        let base_url = url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() || api_key.trim().is_empty() {
            return Err(SyncError::Config(
                "both project URL and API key are required".to_string(),
            ));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(SyncError::Config(format!("not an http(s) URL: {base_url}")));
        }

        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(PostgrestRemote {
            client,
            base_url,
            api_key: api_key.trim().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, kind: EntityKind) -> String {
        format!("{}/rest/v1/{}", self.base_url, kind.table_name())
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
    }

    async fn check(kind: EntityKind, response: Response) -> SyncResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(SyncError::Remote {
            table: kind.table_name(),
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl RemoteStore for PostgrestRemote {
    #[instrument(skip(self), fields(table = kind.table_name()))]
    async fn fetch(&self, kind: EntityKind) -> SyncResult<Vec<Value>> {
        let request = self
            .client
            .get(self.table_url(kind))
            .query(&[("select", "*")]);
        let response = self.authorized(request).send().await?;
        let rows: Vec<Value> = Self::check(kind, response).await?.json().await?;
        debug!(rows = rows.len(), "fetched");
        Ok(rows)
    }

    #[instrument(skip(self, rows), fields(table = kind.table_name(), rows = rows.len()))]
    async fn upsert(&self, kind: EntityKind, rows: Vec<Value>) -> SyncResult<()> {
        let request = self
            .client
            .post(self.table_url(kind))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&rows);
        let response = self.authorized(request).send().await?;
        Self::check(kind, response).await?;
        debug!("upserted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_urls() {
        let remote = PostgrestRemote::new("https://abc.supabase.co/", "key").unwrap();
        assert_eq!(remote.base_url(), "https://abc.supabase.co");
        assert_eq!(
            remote.table_url(EntityKind::Certificate),
            "https://abc.supabase.co/rest/v1/certificates"
        );
    }

    #[test]
    fn test_rejects_incomplete_credentials() {
        assert!(matches!(
            PostgrestRemote::new("https://abc.supabase.co", " "),
            Err(SyncError::Config(_))
        ));
        assert!(matches!(
            PostgrestRemote::new("abc.supabase.co", "key"),
            Err(SyncError::Config(_))
        ));
    }

    #[test]
    fn test_debug_hides_key() {
        let remote = PostgrestRemote::new("https://abc.supabase.co", "secret-key").unwrap();
        assert!(!format!("{remote:?}").contains("secret-key"));
    }
}
