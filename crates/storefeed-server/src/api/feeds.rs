//! Catalog exports served on demand.
//!
//! - `GET /feed.csv`            raw catalog file
//! - `GET /feeds/merchant.tsv`  merchant feed, tab-separated
//! - `GET /feeds/merchant.xml`  merchant feed, RSS 2.0
//! - `GET /sitemap.xml`         static pages plus one URL per product

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Extension,
};
use storefeed_core::ProductRecord;
use storefeed_feeds::{
    merchant_items, sitemap_urls, to_rss, to_sitemap_xml, to_tsv, ChannelInfo, FeedError,
};

use crate::middleware::RequestId;

use super::{map_store_error, ApiError, AppState};

fn file_response(content_type: &'static str, body: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, content_type)], body).into_response()
}

fn map_feed_error(request_id: String, error: &FeedError) -> ApiError {
    tracing::error!(error = %error, "feed rendering failed");
    ApiError::new(request_id, "internal_error", "feed rendering failed")
}

async fn snapshot(state: &AppState, req_id: &RequestId) -> Result<Vec<ProductRecord>, ApiError> {
    state
        .store
        .load()
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))
}

pub(super) async fn catalog_csv(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Response, ApiError> {
    let bytes = state
        .store
        .raw_bytes()
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;
    Ok(file_response("text/csv; charset=utf-8", bytes))
}

pub(super) async fn merchant_tsv(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Response, ApiError> {
    let records = snapshot(&state, &req_id).await?;
    let items = merchant_items(&records, &state.config.currency);
    let body = to_tsv(&items).map_err(|e| map_feed_error(req_id.0.clone(), &e))?;
    Ok(file_response("text/tab-separated-values; charset=utf-8", body))
}

pub(super) async fn merchant_xml(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Response, ApiError> {
    let records = snapshot(&state, &req_id).await?;
    let items = merchant_items(&records, &state.config.currency);
    let channel = ChannelInfo::for_site(&state.config.site_url);
    let body = to_rss(&items, &channel).map_err(|e| map_feed_error(req_id.0.clone(), &e))?;
    Ok(file_response("application/rss+xml; charset=utf-8", body))
}

pub(super) async fn sitemap_xml(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Response, ApiError> {
    let records = snapshot(&state, &req_id).await?;
    let urls = sitemap_urls(&state.config.site_url, &records);
    let body = to_sitemap_xml(&urls).map_err(|e| map_feed_error(req_id.0.clone(), &e))?;
    Ok(file_response("application/xml; charset=utf-8", body))
}
