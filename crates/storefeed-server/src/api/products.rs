use axum::{
    extract::{Query, State},
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storefeed_core::fields::try_parse_price;
use storefeed_core::{CoreError, KeyField, ProductInput, ProductRecord};
use storefeed_store::{SearchFilter, UpsertOutcome};

use crate::middleware::RequestId;

use super::{map_store_error, ApiError, ApiResponse, AppState};

// ---------------------------------------------------------------------------
// Query strings and bodies
// ---------------------------------------------------------------------------

/// Public search parameters. Prices arrive as text so blank values can be
/// treated as unset rather than rejected by the extractor.
#[derive(Debug, Default, Deserialize)]
pub(super) struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TitleQuery {
    pub title: String,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct KeyFieldQuery {
    #[serde(default)]
    pub key_field: KeyField,
}

#[derive(Debug, Deserialize)]
pub(super) struct DeleteQuery {
    pub key: String,
    #[serde(default)]
    pub key_field: KeyField,
}

#[derive(Debug, Serialize)]
pub(super) struct UpsertResponse {
    outcome: &'static str,
    record: ProductRecord,
}

#[derive(Debug, Serialize)]
pub(super) struct DeleteResponse {
    deleted: usize,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_bound(
    req_id: &str,
    name: &str,
    raw: Option<&str>,
) -> Result<Option<Decimal>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => try_parse_price(value).map(Some).map_err(|e| {
            ApiError::new(req_id, "validation_error", format!("invalid {name}: {e}"))
        }),
    }
}

impl ProductQuery {
    fn into_filter(self, req_id: &str) -> Result<SearchFilter, ApiError> {
        Ok(SearchFilter {
            min_price: parse_bound(req_id, "min_price", self.min_price.as_deref())?,
            max_price: parse_bound(req_id, "max_price", self.max_price.as_deref())?,
            text: self.search,
            category: self.category,
        })
    }
}

pub(super) fn validation_error(req_id: &str, error: &CoreError) -> ApiError {
    match error {
        CoreError::Validation(message) => {
            ApiError::new(req_id, "validation_error", message.clone())
        }
    }
}

// ---------------------------------------------------------------------------
// Public handlers
// ---------------------------------------------------------------------------

pub(super) async fn search_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ApiResponse<Vec<ProductRecord>>>, ApiError> {
    let filter = query.into_filter(&req_id.0)?;
    let data = state
        .store
        .search(&filter)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<TitleQuery>,
) -> Result<Json<ApiResponse<ProductRecord>>, ApiError> {
    let record = state
        .store
        .get_by_title(&query.title)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(record, req_id.0)))
}

// ---------------------------------------------------------------------------
// Admin handlers
// ---------------------------------------------------------------------------

pub(super) async fn list_all(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<ProductRecord>>>, ApiError> {
    let data = state
        .store
        .load()
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(data, req_id.0)))
}

/// Creates the product, or replaces the first one sharing its key.
pub(super) async fn upsert_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<KeyFieldQuery>,
    Json(input): Json<ProductInput>,
) -> Result<Json<ApiResponse<UpsertResponse>>, ApiError> {
    let record = input
        .into_record(state.store.rules())
        .map_err(|e| validation_error(&req_id.0, &e))?;

    let outcome = state
        .store
        .upsert(record.clone(), query.key_field)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    let outcome = match outcome {
        UpsertOutcome::Inserted => "inserted",
        UpsertOutcome::Updated => "updated",
    };
    tracing::info!(title = %record.title, outcome, "admin product write");

    Ok(Json(ApiResponse::new(UpsertResponse { outcome, record }, req_id.0)))
}

pub(super) async fn delete_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<ApiResponse<DeleteResponse>>, ApiError> {
    if query.key.trim().is_empty() {
        return Err(ApiError::new(req_id.0.as_str(), "validation_error", "key is required"));
    }

    let deleted = state
        .store
        .delete_by_key(&query.key, query.key_field)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;
    tracing::info!(key = %query.key, key_field = ?query.key_field, deleted, "admin product delete");

    Ok(Json(ApiResponse::new(DeleteResponse { deleted }, req_id.0)))
}
