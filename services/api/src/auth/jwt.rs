//! Session token issuance and validation.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Validity window for issued session tokens.
pub const TOKEN_TTL_SECS: i64 = 3600;

/// Claims embedded in a session token.
///
/// The token is a pure capability: it carries no identity, only its own
/// validity window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

/// Manages session token creation and validation against the shared secret.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl JwtManager {
    /// Create a new `JwtManager` with the given secret.
    pub fn new(secret: &[u8], ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_secs,
        }
    }

    /// Issue a session token valid for the configured window.
    pub fn issue(&self) -> Result<String, jsonwebtoken::errors::Error> {
        let now = now_secs();
        let claims = Claims {
            iat: now,
            exp: now + self.ttl_secs,
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Validate a token and return its claims.
    pub fn validate(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data =
            jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(data.claims)
    }
}

fn now_secs() -> i64 {
    #[allow(clippy::cast_possible_wrap)]
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    secs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_jwt() -> JwtManager {
        JwtManager::new(b"test-secret-key-for-testing", TOKEN_TTL_SECS)
    }

    #[test]
    fn issue_and_validate_token() {
        let jwt = test_jwt();
        let token = jwt.issue().unwrap();

        let claims = jwt.validate(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);
    }

    #[test]
    fn invalid_token_fails_validation() {
        let jwt = test_jwt();
        assert!(jwt.validate("not-a-valid-token").is_err());
    }

    #[test]
    fn wrong_secret_fails_validation() {
        let jwt1 = test_jwt();
        let jwt2 = JwtManager::new(b"different-secret", TOKEN_TTL_SECS);

        let token = jwt1.issue().unwrap();
        assert!(jwt2.validate(&token).is_err());
    }

    #[test]
    fn expired_token_fails_validation() {
        // Issue a token whose expiry is well past the default leeway.
        let jwt = JwtManager::new(b"test-secret-key-for-testing", -120);
        let token = jwt.issue().unwrap();
        assert!(jwt.validate(&token).is_err());
    }
}
