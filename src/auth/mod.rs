//! Bearer-credential verification.
//!
//! Two implementations of one interface, selected by explicit configuration
//! (`AUTH_MODE`): [`GoogleVerifier`] validates a signed identity token
//! against the provider's fetched public-key set; [`DevVerifier`] trusts the
//! raw credential as an opaque identity for local development. The dev
//! bypass is never chosen by environment sniffing.

mod dev;
mod google;

pub use dev::DevVerifier;
pub use google::GoogleVerifier;

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::models::StoredUser;

/// Turns the raw `Authorization` header value into a verified user.
///
/// Implementations persist the freshest user record on every success, even
/// on read-only routes, so the display name tracks the identity provider.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// # Errors
    ///
    /// Fails with [`crate::error::ApiError::Auth`] if the credential is
    /// missing, malformed, oversized, signed by no trusted key, issued by
    /// the wrong issuer or audience, or expired.
    async fn verify(&self, credential: Option<&str>) -> ApiResult<StoredUser>;
}
