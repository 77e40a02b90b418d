//! Vendor partitions: products tagged with the owning vendor's id.
//!
//! Supplier syncs never touch these rows.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use storefeed_core::{ProductInput, ProductRecord};

use crate::middleware::RequestId;

use super::products::validation_error;
use super::{map_store_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct ReplaceResponse {
    vendor_id: String,
    written: usize,
}

fn check_vendor_id(req_id: &str, vendor_id: &str) -> Result<(), ApiError> {
    if vendor_id.trim().is_empty() {
        Err(ApiError::new(req_id, "validation_error", "vendor_id is required"))
    } else {
        Ok(())
    }
}

pub(super) async fn list_vendor_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(vendor_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<ProductRecord>>>, ApiError> {
    check_vendor_id(&req_id.0, &vendor_id)?;
    let records = state
        .store
        .vendor_records(&vendor_id)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse::new(records, req_id.0)))
}

pub(super) async fn add_vendor_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(vendor_id): Path<String>,
    Json(input): Json<ProductInput>,
) -> Result<Json<ApiResponse<ProductRecord>>, ApiError> {
    check_vendor_id(&req_id.0, &vendor_id)?;
    let mut record = input
        .into_record(state.store.rules())
        .map_err(|e| validation_error(&req_id.0, &e))?;

    state
        .store
        .add_vendor_record(&vendor_id, record.clone())
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;
    record.vendor_id = Some(vendor_id);

    Ok(Json(ApiResponse::new(record, req_id.0)))
}

/// Replaces the vendor's whole partition. Every item is validated before
/// anything is written.
pub(super) async fn replace_vendor_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(vendor_id): Path<String>,
    Json(inputs): Json<Vec<ProductInput>>,
) -> Result<Json<ApiResponse<ReplaceResponse>>, ApiError> {
    check_vendor_id(&req_id.0, &vendor_id)?;
    let rules = state.store.rules();
    let records = inputs
        .into_iter()
        .enumerate()
        .map(|(index, input)| {
            input.into_record(rules).map_err(|e| {
                let mut error = validation_error(&req_id.0, &e);
                error.error.message = format!("item {index}: {}", error.error.message);
                error
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let written = state
        .store
        .replace_vendor_records(&vendor_id, records)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        ReplaceResponse { vendor_id, written },
        req_id.0,
    )))
}
