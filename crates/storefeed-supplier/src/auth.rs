//! Credential providers for the supplier API.

use std::future::Future;

use chrono::{DateTime, TimeDelta, Utc};
use storefeed_core::AppConfig;
use tokio::sync::Mutex;

use crate::client::SupplierClient;
use crate::error::AuthError;
use crate::source::CredentialProvider;
use crate::types::TokenData;

/// Lifetime assumed when the supplier omits or garbles an expiry date.
const DEFAULT_TOKEN_LIFETIME_HOURS: i64 = 24;
/// Tokens this close to expiry are renewed early.
const EXPIRY_MARGIN_MINUTES: i64 = 5;

/// A pre-issued token read from the environment. Never refreshed.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StaticToken").field(&"[redacted]").finish()
    }
}

impl CredentialProvider for StaticToken {
    fn access_token(&self) -> impl Future<Output = Result<String, AuthError>> + Send {
        let token = self.0.trim().to_owned();
        async move {
            if token.is_empty() {
                Err(AuthError::MissingCredentials)
            } else {
                Ok(token)
            }
        }
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
    refresh_token: Option<String>,
}

impl CachedToken {
    fn from_data(data: TokenData, now: DateTime<Utc>) -> Self {
        let expires_at = data
            .access_token_expiry_date
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map_or_else(
                || now + TimeDelta::hours(DEFAULT_TOKEN_LIFETIME_HOURS),
                |d| d.with_timezone(&Utc),
            );
        Self {
            access_token: data.access_token,
            expires_at,
            refresh_token: data.refresh_token.filter(|t| !t.is_empty()),
        }
    }

    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - TimeDelta::minutes(EXPIRY_MARGIN_MINUTES) > now
    }
}

/// Obtains tokens by exchanging the account email and API key, caches them
/// until shortly before expiry, and rotates them with the refresh token
/// when one was issued. A failed refresh falls back to a fresh login.
pub struct TokenManager {
    client: SupplierClient,
    email: String,
    api_key: String,
    cached: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("email", &"[redacted]")
            .field("api_key", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    #[must_use]
    pub fn new(
        client: SupplierClient,
        email: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            email: email.into(),
            api_key: api_key.into(),
            cached: Mutex::new(None),
        }
    }

    async fn current_token(&self) -> Result<String, AuthError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.access_token.clone());
        }

        let refresh_token = cached.as_ref().and_then(|t| t.refresh_token.clone());
        let data = match refresh_token {
            Some(refresh_token) => match self.client.refresh_access_token(&refresh_token).await {
                Ok(data) => {
                    tracing::info!("supplier access token refreshed");
                    data
                }
                Err(e) => {
                    tracing::warn!(error = %e, "token refresh failed, logging in again");
                    self.login().await?
                }
            },
            None => self.login().await?,
        };

        let entry = CachedToken::from_data(data, now);
        let token = entry.access_token.clone();
        tracing::debug!(expires_at = %entry.expires_at, "supplier access token cached");
        *cached = Some(entry);
        Ok(token)
    }

    async fn login(&self) -> Result<TokenData, AuthError> {
        let data = self
            .client
            .request_access_token(&self.email, &self.api_key)
            .await?;
        tracing::info!("supplier access token issued");
        Ok(data)
    }
}

impl CredentialProvider for TokenManager {
    fn access_token(&self) -> impl Future<Output = Result<String, AuthError>> + Send {
        self.current_token()
    }

    fn invalidate(&self) -> impl Future<Output = ()> + Send {
        async move {
            if let Some(token) = self.cached.lock().await.as_mut() {
                token.expires_at = Utc::now();
            }
        }
    }
}

/// The credential strategy selected from configuration.
#[derive(Debug)]
pub enum SupplierCredentials {
    Static(StaticToken),
    Managed(TokenManager),
}

impl SupplierCredentials {
    /// Prefers email + API key (renewable) over a pre-issued token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingCredentials`] when neither is configured.
    pub fn from_config(config: &AppConfig, client: &SupplierClient) -> Result<Self, AuthError> {
        if let (Some(email), Some(api_key)) = (&config.supplier_email, &config.supplier_api_key) {
            return Ok(Self::Managed(TokenManager::new(
                client.clone(),
                email.as_str(),
                api_key.as_str(),
            )));
        }
        match &config.supplier_access_token {
            Some(token) => Ok(Self::Static(StaticToken::new(token.as_str()))),
            None => Err(AuthError::MissingCredentials),
        }
    }
}

impl CredentialProvider for SupplierCredentials {
    fn access_token(&self) -> impl Future<Output = Result<String, AuthError>> + Send {
        async move {
            match self {
                Self::Static(token) => token.access_token().await,
                Self::Managed(manager) => manager.access_token().await,
            }
        }
    }

    fn invalidate(&self) -> impl Future<Output = ()> + Send {
        async move {
            if let Self::Managed(manager) = self {
                manager.invalidate().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(expiry: Option<&str>) -> TokenData {
        TokenData {
            access_token: "tok".into(),
            access_token_expiry_date: expiry.map(str::to_owned),
            refresh_token: Some(String::new()),
            refresh_token_expiry_date: None,
        }
    }

    #[tokio::test]
    async fn static_token_returns_value() {
        let token = StaticToken::new(" abc ");
        assert_eq!(token.access_token().await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn blank_static_token_is_missing_credentials() {
        let err = StaticToken::new("  ").access_token().await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));
    }

    #[test]
    fn cached_token_uses_supplier_expiry() {
        let now = Utc::now();
        let entry = CachedToken::from_data(data(Some("2099-01-01T00:00:00+08:00")), now);
        assert!(entry.is_fresh(now));
        assert!(
            entry.refresh_token.is_none(),
            "blank refresh token is dropped"
        );
    }

    #[test]
    fn cached_token_defaults_lifetime_on_garbled_expiry() {
        let now = Utc::now();
        let entry = CachedToken::from_data(data(Some("next tuesday")), now);
        assert_eq!(
            entry.expires_at,
            now + TimeDelta::hours(DEFAULT_TOKEN_LIFETIME_HOURS)
        );
    }

    #[test]
    fn token_inside_margin_is_stale() {
        let now = Utc::now();
        let entry = CachedToken {
            access_token: "tok".into(),
            expires_at: now + TimeDelta::minutes(1),
            refresh_token: None,
        };
        assert!(!entry.is_fresh(now));
    }
}
