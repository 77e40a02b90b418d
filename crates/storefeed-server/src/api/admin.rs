use axum::{
    body::Bytes,
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use storefeed_feeds::InventoryInsights;
use storefeed_store::{StoreError, UploadEntry};
use storefeed_sync::{SyncError, SyncReport};

use crate::middleware::RequestId;

use super::{map_store_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Default, Deserialize)]
pub(super) struct UploadQuery {
    pub filename: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct UploadResponse {
    imported: usize,
    entry: UploadEntry,
}

/// Replaces the catalog with an uploaded CSV body and records the upload.
///
/// The upload history must be readable before the catalog is touched.
pub(super) async fn upload_catalog(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<ApiResponse<UploadResponse>>, ApiError> {
    state
        .uploads
        .entries()
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    let imported = match state.store.import_csv(&body).await {
        Ok(n) => n,
        Err(StoreError::Corrupt { reason, .. }) => {
            tracing::warn!(reason = %reason, "rejected unreadable catalog upload");
            return Err(ApiError::new(
                req_id.0,
                "validation_error",
                format!("uploaded file is not a valid catalog: {reason}"),
            ));
        }
        Err(e) => return Err(map_store_error(req_id.0, &e)),
    };
    if imported == 0 {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "uploaded file contains no products",
        ));
    }

    let filename = query.filename.unwrap_or_else(|| "upload.csv".to_string());
    let username = query.username.unwrap_or_else(|| "admin".to_string());
    let entry = state
        .uploads
        .record(&filename, &username)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;
    tracing::info!(filename = %filename, username = %username, imported, "catalog uploaded");

    Ok(Json(ApiResponse::new(
        UploadResponse { imported, entry },
        req_id.0,
    )))
}

pub(super) async fn upload_history(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<UploadEntry>>>, ApiError> {
    let entries = state
        .uploads
        .entries()
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse::new(entries, req_id.0)))
}

pub(super) async fn inventory_insights(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<InventoryInsights>>, ApiError> {
    let records = state
        .store
        .load()
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse::new(
        InventoryInsights::from_records(&records),
        req_id.0,
    )))
}

/// Runs one sync cycle and reports how it ended.
pub(super) async fn trigger_sync(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<SyncReport>>, ApiError> {
    let Some(sync) = state.sync.as_ref() else {
        return Err(ApiError::new(
            req_id.0,
            "unavailable",
            "supplier sync is not configured",
        ));
    };

    match sync.run_once().await {
        Ok(report) => Ok(Json(ApiResponse::new(report, req_id.0))),
        Err(SyncError::Auth(e)) => {
            tracing::error!(error = %e, "manual sync failed to authenticate");
            Err(ApiError::new(
                req_id.0,
                "unavailable",
                "supplier authentication failed",
            ))
        }
        Err(SyncError::Store(e)) => Err(map_store_error(req_id.0, &e)),
        Err(e) => {
            tracing::error!(error = %e, "manual sync failed");
            Err(ApiError::new(req_id.0, "internal_error", "sync failed"))
        }
    }
}
