pub mod auth;
pub mod client;
pub mod error;
pub mod normalize;
mod retry;
pub mod source;
pub mod types;

pub use auth::{StaticToken, SupplierCredentials, TokenManager};
pub use client::SupplierClient;
pub use error::{AuthError, SupplierError};
pub use normalize::FieldMapper;
pub use source::{CredentialProvider, ProductSource, RawProduct};
