//! Minimal PostgREST client for the hosted Supabase backend.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::SyncConfig;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("sync is not configured: missing {0}")]
    NotConfigured(&'static str),
    #[error("hosted backend returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
}

impl SupabaseClient {
    pub fn new(
        url: Option<&str>,
        anon_key: Option<&str>,
        access_token: Option<&str>,
    ) -> Result<Self, SyncError> {
        let url = non_empty(url).ok_or(SyncError::NotConfigured("supabase_url"))?;
        let anon_key = non_empty(anon_key).ok_or(SyncError::NotConfigured("anon_key"))?;
        let access_token =
            non_empty(access_token).ok_or(SyncError::NotConfigured("access_token"))?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            access_token: access_token.to_string(),
        })
    }

    pub fn from_config(config: &SyncConfig) -> Result<Self, SyncError> {
        Self::new(
            config.supabase_url.as_deref(),
            config.anon_key.as_deref(),
            config.access_token.as_deref(),
        )
    }

    /// Use a preconfigured HTTP client (timeouts, proxy settings).
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.anon_key)
            .bearer_auth(&self.access_token)
    }

    /// Id of the user the access token belongs to.
    pub async fn user_id(&self) -> Result<String, SyncError> {
        let req = self.authed(self.http.get(format!("{}/auth/v1/user", self.base_url)));
        let user: AuthUser = read_json(req.send().await?).await?;
        Ok(user.id)
    }

    /// Insert-or-update rows by primary key.
    pub async fn upsert<T: Serialize>(&self, table: &str, rows: &[T]) -> Result<(), SyncError> {
        if rows.is_empty() {
            return Ok(());
        }
        let resp = self
            .authed(self.http.post(self.rest_url(table)))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(rows)
            .send()
            .await?;
        check_status(resp).await?;
        tracing::debug!(table, rows = rows.len(), "upserted rows");
        Ok(())
    }

    /// `GET /rest/v1/{table}` with PostgREST query pairs such as
    /// `("deleted_at", "is.null")`.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, SyncError> {
        let resp = self
            .authed(self.http.get(self.rest_url(table)))
            .query(query)
            .send()
            .await?;
        read_json(resp).await
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, SyncError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(SyncError::Http {
        status: status.as_u16(),
        body,
    })
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, SyncError> {
    let bytes = check_status(resp).await?.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_all_settings() {
        let err = SupabaseClient::new(None, Some("k"), Some("t")).unwrap_err();
        assert!(matches!(err, SyncError::NotConfigured("supabase_url")));

        let err = SupabaseClient::new(Some("https://x.supabase.co"), Some("  "), Some("t"))
            .unwrap_err();
        assert!(err.to_string().contains("anon_key"));

        let err = SupabaseClient::new(Some("https://x.supabase.co"), Some("k"), None).unwrap_err();
        assert!(matches!(err, SyncError::NotConfigured("access_token")));
    }

    #[test]
    fn trims_trailing_slash() {
        let client =
            SupabaseClient::new(Some("https://x.supabase.co/"), Some("k"), Some("t")).unwrap();
        assert_eq!(client.base_url(), "https://x.supabase.co");
        assert_eq!(
            client.rest_url("turns"),
            "https://x.supabase.co/rest/v1/turns"
        );
    }

    #[test]
    fn http_error_message() {
        let err = SyncError::Http {
            status: 401,
            body: "JWT expired".into(),
        };
        assert_eq!(err.to_string(), "hosted backend returned HTTP 401: JWT expired");
    }
}
