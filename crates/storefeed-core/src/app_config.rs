use std::net::SocketAddr;
use std::path::PathBuf;

use crate::fields::NormalizationRules;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub catalog_path: PathBuf,
    pub upload_history_path: PathBuf,
    /// Public storefront origin, without a trailing slash.
    pub site_url: String,
    pub currency: String,
    pub normalization: NormalizationRules,
    pub supplier_base_url: String,
    pub supplier_product_url_base: String,
    pub supplier_access_token: Option<String>,
    pub supplier_email: Option<String>,
    pub supplier_api_key: Option<String>,
    pub supplier_request_timeout_secs: u64,
    pub supplier_user_agent: String,
    pub supplier_max_retries: u32,
    pub supplier_retry_backoff_base_secs: u64,
    pub sync_page_size: u32,
    /// Offset ceiling for pagination; `0` disables the ceiling.
    pub sync_max_offset: u64,
    pub sync_page_timeout_secs: u64,
    pub sync_inter_page_delay_ms: u64,
    pub sync_interval_hours: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("catalog_path", &self.catalog_path)
            .field("upload_history_path", &self.upload_history_path)
            .field("site_url", &self.site_url)
            .field("currency", &self.currency)
            .field("normalization", &self.normalization)
            .field("supplier_base_url", &self.supplier_base_url)
            .field("supplier_product_url_base", &self.supplier_product_url_base)
            .field(
                "supplier_access_token",
                &self.supplier_access_token.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "supplier_email",
                &self.supplier_email.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "supplier_api_key",
                &self.supplier_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "supplier_request_timeout_secs",
                &self.supplier_request_timeout_secs,
            )
            .field("supplier_user_agent", &self.supplier_user_agent)
            .field("supplier_max_retries", &self.supplier_max_retries)
            .field(
                "supplier_retry_backoff_base_secs",
                &self.supplier_retry_backoff_base_secs,
            )
            .field("sync_page_size", &self.sync_page_size)
            .field("sync_max_offset", &self.sync_max_offset)
            .field("sync_page_timeout_secs", &self.sync_page_timeout_secs)
            .field("sync_inter_page_delay_ms", &self.sync_inter_page_delay_ms)
            .field("sync_interval_hours", &self.sync_interval_hours)
            .finish()
    }
}
