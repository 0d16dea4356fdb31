//! Stateless access tokens.
//!
//! A token is `base64url(claims_json) . base64url(hmac_sha256(claims_json))`.
//! Validity is purely a function of the signature and the embedded expiry;
//! no session row is stored. The caller re-resolves the username against the
//! users table after verification.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username the token was issued for
    pub sub: String,
    /// Issue time (unix seconds)
    pub iat: i64,
    /// Expiry time (unix seconds)
    pub exp: i64,
}

/// Issue a signed token for `username`, expiring `ttl_minutes` from now.
pub fn issue_token(secret: &str, username: &str, ttl_minutes: i64) -> Result<String, String> {
    let now = Utc::now();
    let claims = Claims {
        sub: username.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::minutes(ttl_minutes)).timestamp(),
    };
    sign_claims(secret, &claims)
}

fn sign_claims(secret: &str, claims: &Claims) -> Result<String, String> {
    let payload =
        serde_json::to_vec(claims).map_err(|e| format!("Failed to encode claims: {}", e))?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| format!("Failed to initialize HMAC: {}", e))?;
    mac.update(&payload);
    let signature = mac.finalize().into_bytes();

    Ok(format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(&payload),
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

/// Verify a token's signature and expiry, returning the embedded username.
///
/// Returns `Err` with a caller-safe message on any failure; the caller maps
/// all failures to 401 without distinguishing them.
pub fn verify_token(secret: &str, token: &str) -> Result<String, String> {
    let (payload_b64, signature_b64) = token
        .split_once('.')
        .ok_or_else(|| "Malformed token".to_string())?;

    let payload = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| "Malformed token".to_string())?;
    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| "Malformed token".to_string())?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| format!("Failed to initialize HMAC: {}", e))?;
    mac.update(&payload);
    mac.verify_slice(&signature)
        .map_err(|_| "Invalid token signature".to_string())?;

    let claims: Claims =
        serde_json::from_slice(&payload).map_err(|_| "Malformed token".to_string())?;

    if claims.exp <= Utc::now().timestamp() {
        return Err("Token expired".to_string());
    }

    Ok(claims.sub)
}

/// Hash a password with bcrypt
pub fn hash_password(password: &str) -> Result<String, String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| format!("Failed to hash password: {}", e))
}

/// Verify a password against its bcrypt hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, String> {
    bcrypt::verify(password, hash).map_err(|e| format!("Failed to verify password: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-for-token-signing";

    #[test]
    fn test_issue_and_verify() {
        let token = issue_token(SECRET, "alice", 30).unwrap();
        let sub = verify_token(SECRET, &token).unwrap();
        assert_eq!(sub, "alice");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(SECRET, "alice", 30).unwrap();
        assert!(verify_token("other-secret", &token).is_err());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let token = issue_token(SECRET, "alice", 30).unwrap();
        let (_, signature) = token.split_once('.').unwrap();

        let forged = Claims {
            sub: "mallory".to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 3600,
        };
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());
        let tampered = format!("{}.{}", forged_payload, signature);

        assert!(verify_token(SECRET, &tampered).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Signed directly with an exp in the past
        let claims = Claims {
            sub: "alice".to_string(),
            iat: Utc::now().timestamp() - 3600,
            exp: Utc::now().timestamp() - 60,
        };
        let token = sign_claims(SECRET, &claims).unwrap();
        let err = verify_token(SECRET, &token).unwrap_err();
        assert_eq!(err, "Token expired");
    }

    #[test]
    fn test_token_valid_within_ttl() {
        // 30-minute token issued now is valid a minute later
        let claims = Claims {
            sub: "alice".to_string(),
            iat: Utc::now().timestamp() - 60,
            exp: Utc::now().timestamp() + 29 * 60,
        };
        let token = sign_claims(SECRET, &claims).unwrap();
        assert_eq!(verify_token(SECRET, &token).unwrap(), "alice");
    }

    #[test]
    fn test_malformed_token_rejected() {
        assert!(verify_token(SECRET, "not-a-token").is_err());
        assert!(verify_token(SECRET, "a.b").is_err());
        assert!(verify_token(SECRET, "").is_err());
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("hunter2222").unwrap();
        assert_ne!(hash, "hunter2222");
        assert!(verify_password("hunter2222", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }
}
