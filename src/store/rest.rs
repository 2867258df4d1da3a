//! Hosted table service client (PostgREST conventions).
//!
//! # Security Note - Logging
//!
//! The service key is kept in a `SecretString` and only exposed while
//! building request headers. Do not enable `RUST_LOG=reqwest=debug` in
//! production: header values are marked sensitive, but request URLs are not.

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::config::Config;
use crate::error::{CampusError, Result};
use crate::types::Fields;

use super::error::StoreApiError;
use super::row::{Row, row_from_fields};
use super::RemoteStore;

const REST_PREFIX: &str = "rest/v1/";

/// One table of the hosted service
#[derive(Debug, Clone)]
pub struct RestTable {
    client: Client,
    endpoint: Url,
    table: String,
}

fn sensitive(value: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(value)
        .map_err(|_| CampusError::Config("store.api_key contains invalid characters".into()))?;
    value.set_sensitive(true);
    Ok(value)
}

impl RestTable {
    /// Create a client for `table` under the service at `base_url`
    pub fn new(base_url: &str, table: &str, key: &SecretString, timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join(REST_PREFIX)?.join(table)?;

        let mut headers = HeaderMap::new();
        headers.insert("apikey", sensitive(key.expose_secret())?);
        headers.insert(
            header::AUTHORIZATION,
            sensitive(&format!("Bearer {}", key.expose_secret()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            table: table.to_string(),
        })
    }

    /// Create a client from configuration
    pub fn from_config(config: &Config, table: &str) -> Result<Self> {
        let (url, key) = config.require_store()?;
        Self::new(&url, table, &key, config.request_timeout())
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn list_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "created_at.desc");
        url
    }

    fn row_url(&self, id: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!(table = %self.table, %method, "table request");
        self.client
            .request(method, url)
            .header("Prefer", "return=minimal")
    }

    async fn check(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreApiError::from_response_body(status, &body, &self.table).into())
    }
}

impl RemoteStore for RestTable {
    async fn list(&self) -> Result<Vec<Row>> {
        let response = self.request(Method::GET, self.list_url()).send().await?;
        let response = self.check(response).await?;
        Ok(response.json::<Vec<Row>>().await?)
    }

    async fn insert(&self, row: &Fields) -> Result<()> {
        let response = self
            .request(Method::POST, self.endpoint.clone())
            .json(&row_from_fields(row))
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }

    async fn update(&self, id: &str, patch: &Fields) -> Result<()> {
        let response = self
            .request(Method::PATCH, self.row_url(id))
            .json(&row_from_fields(patch))
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let response = self
            .request(Method::DELETE, self.row_url(id))
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(base: &str) -> RestTable {
        RestTable::new(
            base,
            "students",
            &SecretString::from("anon-key".to_string()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_with_and_without_trailing_slash() {
        assert_eq!(
            table("https://abc.example.co").endpoint().as_str(),
            "https://abc.example.co/rest/v1/students"
        );
        assert_eq!(
            table("https://abc.example.co/proxy/").endpoint().as_str(),
            "https://abc.example.co/proxy/rest/v1/students"
        );
    }

    #[test]
    fn test_list_url_orders_newest_first() {
        let url = table("https://abc.example.co").list_url();
        assert_eq!(url.query(), Some("select=*&order=created_at.desc"));
    }

    #[test]
    fn test_row_url_filters_by_id() {
        let url = table("https://abc.example.co").row_url("7f3a");
        assert_eq!(url.query(), Some("id=eq.7f3a"));
    }

    #[test]
    fn test_invalid_base_url() {
        let result = RestTable::new(
            "not a url",
            "students",
            &SecretString::from("k".to_string()),
            Duration::from_secs(1),
        );
        assert!(result.is_err());
    }
}
