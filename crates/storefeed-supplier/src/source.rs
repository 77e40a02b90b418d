//! Seams between the synchronizer and the supplier.
//!
//! The synchronizer is generic over these traits so it can be driven by a
//! fake supplier in tests and by [`crate::SupplierClient`] in production.

use std::future::Future;

use serde_json::{Map, Value};

use crate::client::SupplierClient;
use crate::error::{AuthError, SupplierError};

/// One product object exactly as the supplier returned it.
pub type RawProduct = Map<String, Value>;

/// A paginated product listing.
pub trait ProductSource: Send + Sync {
    /// Fetches page `page_num` (1-based) of `page_size` records.
    fn fetch_page(
        &self,
        token: &str,
        page_num: u32,
        page_size: u32,
    ) -> impl Future<Output = Result<Vec<RawProduct>, SupplierError>> + Send;
}

/// Supplies a bearer credential for [`ProductSource`] calls.
pub trait CredentialProvider: Send + Sync {
    /// Returns a token believed to be valid right now.
    fn access_token(&self) -> impl Future<Output = Result<String, AuthError>> + Send;

    /// Drops any cached token so the next [`Self::access_token`] call
    /// re-authenticates. The default implementation is a no-op.
    fn invalidate(&self) -> impl Future<Output = ()> + Send {
        async {}
    }
}

impl ProductSource for SupplierClient {
    fn fetch_page(
        &self,
        token: &str,
        page_num: u32,
        page_size: u32,
    ) -> impl Future<Output = Result<Vec<RawProduct>, SupplierError>> + Send {
        SupplierClient::fetch_page(self, token, page_num, page_size)
    }
}
