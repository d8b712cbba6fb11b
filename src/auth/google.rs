//! Production verifier for Google-signed identity tokens.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::IdentityVerifier;
use crate::constants::MAX_AUTHORIZATION_LENGTH;
use crate::error::{ApiError, ApiResult};
use crate::kv::{keys, Store};
use crate::models::StoredUser;

/// Claims carried by the identity token. `exp` is transmitted as a string
/// of seconds since epoch.
#[derive(Debug, Clone, Deserialize)]
struct TokenClaims {
    iss: String,
    aud: String,
    exp: String,
    sub: String,
    given_name: String,
}

struct CachedJwks {
    fetched_at: Instant,
    keys: JwkSet,
}

/// Verifies RS256 identity tokens against the provider's published key set.
///
/// The key set is fetched from `jwks_url` and cached for `cache_ttl`;
/// verification succeeds if any key in the set validates the signature
/// (the kid-matching key is tried first). After the signature check, the
/// issuer, audience, and expiry claims are validated.
pub struct GoogleVerifier {
    store: Store,
    http: reqwest::Client,
    issuer: String,
    client_id: String,
    jwks_url: String,
    cache_ttl: Duration,
    cached: RwLock<Option<CachedJwks>>,
}

impl GoogleVerifier {
    #[must_use]
    pub fn new(
        store: Store,
        issuer: String,
        client_id: String,
        jwks_url: String,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            store,
            http: reqwest::Client::new(),
            issuer,
            client_id,
            jwks_url,
            cache_ttl,
            cached: RwLock::new(None),
        }
    }

    async fn key_set(&self) -> ApiResult<JwkSet> {
        {
            let cached = self.cached.read().await;
            if let Some(entry) = cached.as_ref() {
                if entry.fetched_at.elapsed() < self.cache_ttl {
                    return Ok(entry.keys.clone());
                }
            }
        }

        debug!(url = %self.jwks_url, "Fetching identity provider key set");
        let keys: JwkSet = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                warn!("Key set fetch failed: {e}");
                ApiError::Auth(format!("failed to fetch signing keys: {e}"))
            })?
            .json()
            .await
            .map_err(|e| ApiError::Auth(format!("failed to parse signing keys: {e}")))?;

        let mut cached = self.cached.write().await;
        *cached = Some(CachedJwks {
            fetched_at: Instant::now(),
            keys: keys.clone(),
        });
        Ok(keys)
    }
}

/// Try the token's signature against every key in the set, the kid-matching
/// key first; any single success accepts.
fn decode_with_any_key(token: &str, key_set: &JwkSet) -> ApiResult<TokenClaims> {
    let header =
        decode_header(token).map_err(|e| ApiError::Auth(format!("malformed token: {e}")))?;

    // Claim checks happen separately, against the wall clock and the
    // configured issuer/audience; here only the signature matters.
    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();

    let matches_kid = |jwk: &Jwk| jwk.common.key_id == header.kid;
    let candidates = key_set
        .keys
        .iter()
        .filter(|jwk| matches_kid(jwk))
        .chain(key_set.keys.iter().filter(|jwk| !matches_kid(jwk)));

    for jwk in candidates {
        let Ok(decoding_key) = DecodingKey::from_jwk(jwk) else {
            continue;
        };
        if let Ok(data) = decode::<TokenClaims>(token, &decoding_key, &validation) {
            return Ok(data.claims);
        }
    }
    Err(ApiError::Auth(
        "token was not verified by any key".to_string(),
    ))
}

/// Validate issuer, audience, and expiry after a successful signature check.
fn validate_claims(
    claims: &TokenClaims,
    issuer: &str,
    client_id: &str,
    now_secs: i64,
) -> ApiResult<()> {
    if claims.iss != issuer {
        return Err(ApiError::Auth(format!("invalid issuer {}", claims.iss)));
    }
    if claims.aud != client_id {
        return Err(ApiError::Auth(format!("invalid audience {}", claims.aud)));
    }
    let expiry: i64 = claims
        .exp
        .parse()
        .map_err(|_| ApiError::Auth(format!("invalid expiry {}", claims.exp)))?;
    if expiry <= now_secs {
        return Err(ApiError::Auth(format!("token expired {}", claims.exp)));
    }
    Ok(())
}

#[async_trait]
impl IdentityVerifier for GoogleVerifier {
    async fn verify(&self, credential: Option<&str>) -> ApiResult<StoredUser> {
        let token = credential
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ApiError::Auth("missing authorization header".to_string()))?;
        if token.len() > MAX_AUTHORIZATION_LENGTH {
            return Err(ApiError::Auth(format!(
                "authorization header longer than {MAX_AUTHORIZATION_LENGTH}"
            )));
        }

        let key_set = self.key_set().await?;
        let claims = decode_with_any_key(token, &key_set)?;
        validate_claims(
            &claims,
            &self.issuer,
            &self.client_id,
            chrono::Utc::now().timestamp(),
        )?;

        let user = StoredUser {
            id: claims.sub,
            username: claims.given_name,
        };
        self.store.put_json(&keys::user(&user.id), &user).await?;
        Ok(user)
    }
}
