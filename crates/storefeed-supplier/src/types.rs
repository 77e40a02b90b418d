//! Wire types for the supplier's JSON envelope.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Response wrapper shared by every supplier endpoint.
///
/// ```json
/// {"code": 200, "result": true, "message": "Success", "data": { ... }}
/// ```
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default)]
    pub result: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

/// `data` of `GET product/list`. Only `list` is consumed; the paging
/// counters are informational.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListData {
    #[serde(default)]
    pub page_num: Option<Value>,
    #[serde(default)]
    pub page_size: Option<Value>,
    #[serde(default)]
    pub total: Option<Value>,
    #[serde(default)]
    pub list: Option<Vec<Map<String, Value>>>,
}

/// `data` of the access-token and refresh endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    pub access_token: String,
    #[serde(default)]
    pub access_token_expiry_date: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub refresh_token_expiry_date: Option<String>,
}
