use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupplierError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The envelope carried a non-200 `code`.
    #[error("supplier API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("rate limited by supplier (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid supplier base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

impl SupplierError {
    /// `true` when the supplier refused the access token itself, as opposed
    /// to failing the request for another reason.
    #[must_use]
    pub fn is_token_rejected(&self) -> bool {
        match self {
            SupplierError::Api { code, .. } => matches!(code, 401 | 403 | 1_600_001),
            SupplierError::UnexpectedStatus { status, .. } => matches!(status, 401 | 403),
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no supplier credentials configured (set SUPPLIER_ACCESS_TOKEN, or SUPPLIER_EMAIL and SUPPLIER_API_KEY)")]
    MissingCredentials,

    #[error("supplier rejected credentials ({code}): {message}")]
    Rejected { code: i64, message: String },

    #[error("token request failed: {0}")]
    Transport(#[source] SupplierError),
}

impl From<SupplierError> for AuthError {
    fn from(err: SupplierError) -> Self {
        match err {
            SupplierError::Api { code, message } => AuthError::Rejected { code, message },
            other => AuthError::Transport(other),
        }
    }
}
