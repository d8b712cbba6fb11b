//! Development-mode verifier: the raw credential is the identity.

use async_trait::async_trait;

use super::IdentityVerifier;
use crate::constants::MAX_AUTHORIZATION_LENGTH;
use crate::error::{ApiError, ApiResult};
use crate::kv::{keys, Store};
use crate::models::StoredUser;

/// Trusts the bearer credential as both subject id and display name.
///
/// Only constructed when `AUTH_MODE=dev` is set explicitly; unblocks local
/// testing without an identity provider.
pub struct DevVerifier {
    store: Store,
}

impl DevVerifier {
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl IdentityVerifier for DevVerifier {
    async fn verify(&self, credential: Option<&str>) -> ApiResult<StoredUser> {
        let token = credential
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ApiError::Auth("missing authorization header".to_string()))?;
        if token.len() > MAX_AUTHORIZATION_LENGTH {
            return Err(ApiError::Auth(format!(
                "authorization header longer than {MAX_AUTHORIZATION_LENGTH}"
            )));
        }

        let user = StoredUser {
            id: token.to_string(),
            username: token.to_string(),
        };
        self.store.put_json(&keys::user(&user.id), &user).await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;

    #[tokio::test]
    async fn raw_credential_becomes_id_and_username() {
        let backend = MemoryStore::new();
        let verifier = DevVerifier::new(Store::new(backend.clone()));

        let user = verifier.verify(Some("trevor")).await.unwrap();
        assert_eq!(user.id, "trevor");
        assert_eq!(user.username, "trevor");

        let store = Store::new(backend);
        let stored: StoredUser = store.get_json("user:trevor").await.unwrap().unwrap();
        assert_eq!(stored, user);
    }

    #[tokio::test]
    async fn missing_or_empty_credential_is_rejected() {
        let verifier = DevVerifier::new(Store::new(MemoryStore::new()));
        assert!(matches!(
            verifier.verify(None).await,
            Err(ApiError::Auth(_))
        ));
        assert!(matches!(
            verifier.verify(Some("")).await,
            Err(ApiError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn oversized_credential_is_rejected() {
        let verifier = DevVerifier::new(Store::new(MemoryStore::new()));
        let oversized = "x".repeat(MAX_AUTHORIZATION_LENGTH + 1);
        assert!(matches!(
            verifier.verify(Some(oversized.as_str())).await,
            Err(ApiError::Auth(_))
        ));
    }
}
