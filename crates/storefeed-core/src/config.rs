use crate::app_config::{AppConfig, Environment};
use crate::fields::{CategoryRule, NormalizationRules};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default; only malformed values are rejected.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for a malformed value.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let csv_list = |var: &str, default: &str| -> Vec<String> {
        or_default(var, default)
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    };

    let env = parse_environment(&or_default("STOREFEED_ENV", "development"));
    let bind_addr = parse_addr("STOREFEED_BIND_ADDR", "0.0.0.0:5000")?;
    let log_level = or_default("STOREFEED_LOG_LEVEL", "info");
    let catalog_path = PathBuf::from(or_default("STOREFEED_CATALOG_PATH", "./feed.csv"));
    let upload_history_path = PathBuf::from(or_default(
        "STOREFEED_UPLOAD_HISTORY_PATH",
        "./upload_history.json",
    ));
    let site_url = or_default("STOREFEED_SITE_URL", "https://example.com")
        .trim_end_matches('/')
        .to_string();
    let currency = or_default("STOREFEED_CURRENCY", "NGN");

    let normalization = NormalizationRules {
        category: CategoryRule::new(
            csv_list("STOREFEED_CATEGORY_KEYWORDS", "health,beauty,skincare"),
            or_default(
                "STOREFEED_CATEGORY_LABEL",
                "Health, Beauty and Skincare Products",
            ),
        ),
        denylist: csv_list("STOREFEED_LIST_DENYLIST", "cosplay"),
    };

    let supplier_base_url = or_default(
        "STOREFEED_SUPPLIER_BASE_URL",
        "https://developers.cjdropshipping.com/api2.0/v1",
    )
    .trim_end_matches('/')
    .to_string();
    let supplier_product_url_base = or_default(
        "STOREFEED_SUPPLIER_PRODUCT_URL_BASE",
        "https://app.cjdropshipping.com/product-detail/",
    );
    let supplier_access_token = optional("SUPPLIER_ACCESS_TOKEN");
    let supplier_email = optional("SUPPLIER_EMAIL");
    let supplier_api_key = optional("SUPPLIER_API_KEY");
    let supplier_request_timeout_secs = parse_u64("STOREFEED_SUPPLIER_REQUEST_TIMEOUT_SECS", "20")?;
    let supplier_user_agent = or_default(
        "STOREFEED_SUPPLIER_USER_AGENT",
        "storefeed/0.1 (catalog-sync)",
    );
    let supplier_max_retries = parse_u32("STOREFEED_SUPPLIER_MAX_RETRIES", "2")?;
    let supplier_retry_backoff_base_secs =
        parse_u64("STOREFEED_SUPPLIER_RETRY_BACKOFF_BASE_SECS", "5")?;

    let sync_page_size = parse_u32("STOREFEED_SYNC_PAGE_SIZE", "50")?;
    if sync_page_size == 0 {
        return Err(invalid(
            "STOREFEED_SYNC_PAGE_SIZE",
            "must be at least 1".to_string(),
        ));
    }
    let sync_max_offset = parse_u64("STOREFEED_SYNC_MAX_OFFSET", "6000")?;
    let sync_page_timeout_secs = parse_u64("STOREFEED_SYNC_PAGE_TIMEOUT_SECS", "30")?;
    let sync_inter_page_delay_ms = parse_u64("STOREFEED_SYNC_INTER_PAGE_DELAY_MS", "250")?;
    let sync_interval_hours = parse_u64("STOREFEED_SYNC_INTERVAL_HOURS", "6")?;
    if sync_interval_hours == 0 {
        return Err(invalid(
            "STOREFEED_SYNC_INTERVAL_HOURS",
            "must be at least 1".to_string(),
        ));
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        catalog_path,
        upload_history_path,
        site_url,
        currency,
        normalization,
        supplier_base_url,
        supplier_product_url_base,
        supplier_access_token,
        supplier_email,
        supplier_api_key,
        supplier_request_timeout_secs,
        supplier_user_agent,
        supplier_max_retries,
        supplier_retry_backoff_base_secs,
        sync_page_size,
        sync_max_offset,
        sync_page_timeout_secs,
        sync_inter_page_delay_ms,
        sync_interval_hours,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
