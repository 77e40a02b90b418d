//! HTTP client for the dropshipping supplier's REST API.
//!
//! Every endpoint answers with the same JSON envelope (see
//! [`crate::types::Envelope`]); a `code` other than `200` is surfaced as
//! [`SupplierError::Api`] regardless of the HTTP status.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use storefeed_core::AppConfig;

use crate::error::SupplierError;
use crate::retry::retry_with_backoff;
use crate::source::RawProduct;
use crate::types::{Envelope, ProductListData, TokenData};

pub const ACCESS_TOKEN_HEADER: &str = "CJ-Access-Token";

/// Client for the supplier API.
///
/// Use [`SupplierClient::from_config`] for production or
/// [`SupplierClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct SupplierClient {
    client: Client,
    base_url: Url,
    /// Maximum number of retry attempts after an HTTP 429.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

impl SupplierClient {
    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// See [`SupplierClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, SupplierError> {
        Self::with_base_url(
            &config.supplier_base_url,
            config.supplier_request_timeout_secs,
            &config.supplier_user_agent,
            config.supplier_max_retries,
            config.supplier_retry_backoff_base_secs,
        )
    }

    /// Creates a client with a custom base URL and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`SupplierError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`SupplierError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, SupplierError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Trailing slash so `Url::join` appends rather than replacing the
        // last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| SupplierError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Fetches one page of the product list.
    ///
    /// A successful envelope with a missing or null `data.list` is an empty
    /// page. HTTP 429 is retried with back-off; nothing else is.
    ///
    /// # Errors
    ///
    /// - [`SupplierError::Api`] when the envelope `code` is not `200`.
    /// - [`SupplierError::RateLimited`] when 429 persists past `max_retries`.
    /// - [`SupplierError::UnexpectedStatus`] for any other non-2xx status.
    /// - [`SupplierError::Http`] on network failure.
    /// - [`SupplierError::Deserialize`] when the body is not JSON.
    pub async fn fetch_page(
        &self,
        token: &str,
        page_num: u32,
        page_size: u32,
    ) -> Result<Vec<RawProduct>, SupplierError> {
        let mut url = self.endpoint("product/list")?;
        url.query_pairs_mut()
            .append_pair("pageNum", &page_num.to_string())
            .append_pair("pageSize", &page_size.to_string());

        let body = retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(url.clone())
                    .header(ACCESS_TOKEN_HEADER, token)
                    .header(reqwest::header::ACCEPT, "application/json")
                    .send()
                    .await?;
                Self::read_body(response, &url).await
            }
        })
        .await?;

        Self::check_api_error(&body)?;
        let envelope: Envelope<ProductListData> =
            serde_json::from_value(body).map_err(|e| SupplierError::Deserialize {
                context: format!("product/list page {page_num}"),
                source: e,
            })?;

        let list = envelope.data.and_then(|d| d.list).unwrap_or_default();
        tracing::debug!(
            page_num,
            page_size,
            count = list.len(),
            "supplier page fetched"
        );
        Ok(list)
    }

    /// Exchanges account email and API key for an access token.
    ///
    /// # Errors
    ///
    /// Returns [`SupplierError::Api`] when the supplier rejects the
    /// credentials, or a transport/decoding error.
    pub async fn request_access_token(
        &self,
        email: &str,
        api_key: &str,
    ) -> Result<TokenData, SupplierError> {
        self.post_for_data(
            "authentication/getAccessToken",
            &json!({ "email": email, "password": api_key }),
        )
        .await
    }

    /// Rotates an access token using a refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`SupplierError::Api`] when the refresh token is rejected, or
    /// a transport/decoding error.
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenData, SupplierError> {
        self.post_for_data(
            "authentication/refreshAccessToken",
            &json!({ "refreshToken": refresh_token }),
        )
        .await
    }

    async fn post_for_data<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &Value,
    ) -> Result<T, SupplierError> {
        let url = self.endpoint(path)?;
        let body = retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                let response = self.client.post(url.clone()).json(payload).send().await?;
                Self::read_body(response, &url).await
            }
        })
        .await?;

        Self::check_api_error(&body)?;
        let envelope: Envelope<T> =
            serde_json::from_value(body).map_err(|e| SupplierError::Deserialize {
                context: path.to_owned(),
                source: e,
            })?;
        envelope.data.ok_or_else(|| SupplierError::Api {
            code: envelope.code,
            message: format!("{path} returned no data"),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, SupplierError> {
        self.base_url
            .join(path)
            .map_err(|e| SupplierError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    /// Maps HTTP status to typed errors and parses the body as JSON.
    async fn read_body(response: reqwest::Response, url: &Url) -> Result<Value, SupplierError> {
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(SupplierError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            return Err(SupplierError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| SupplierError::Deserialize {
            context: url.path().to_owned(),
            source: e,
        })
    }

    /// Checks the envelope `code` and returns an error unless it is `200`.
    fn check_api_error(body: &Value) -> Result<(), SupplierError> {
        let code = body.get("code").and_then(Value::as_i64);
        if code == Some(200) {
            return Ok(());
        }
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        Err(SupplierError::Api {
            code: code.unwrap_or_default(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> SupplierClient {
        SupplierClient::with_base_url(base_url, 5, "storefeed-test/0.1", 0, 0)
            .expect("client construction should not fail")
    }

    #[test]
    fn endpoint_appends_to_base_path() {
        let client = test_client("https://api.example.com/api2.0/v1");
        let url = client.endpoint("product/list").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/api2.0/v1/product/list"
        );
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let client = test_client("https://api.example.com/api2.0/v1/");
        let url = client.endpoint("authentication/getAccessToken").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/api2.0/v1/authentication/getAccessToken"
        );
    }

    #[test]
    fn from_config_uses_configured_base_url() {
        let mut config = storefeed_core::build_app_config(|_| Err(std::env::VarError::NotPresent))
            .expect("default config");
        config.supplier_base_url = "http://127.0.0.1:9000/api".to_string();

        let client = SupplierClient::from_config(&config).expect("client");
        let url = client.endpoint("product/list").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/api/product/list");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = SupplierClient::with_base_url("not a url", 5, "ua", 0, 0).unwrap_err();
        assert!(matches!(err, SupplierError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn check_api_error_accepts_code_200() {
        assert!(SupplierClient::check_api_error(&json!({"code": 200})).is_ok());
    }

    #[test]
    fn check_api_error_surfaces_code_and_message() {
        let err = SupplierClient::check_api_error(&json!({
            "code": 1_600_001,
            "result": false,
            "message": "Invalid token"
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            SupplierError::Api { code: 1_600_001, ref message } if message == "Invalid token"
        ));
        assert!(err.is_token_rejected());
    }

    #[test]
    fn check_api_error_without_code_is_an_error() {
        let err = SupplierClient::check_api_error(&json!({"data": {}})).unwrap_err();
        assert!(matches!(err, SupplierError::Api { code: 0, .. }));
    }
}
