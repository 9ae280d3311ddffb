use crate::error::AppError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Token lifetime. Expired means fully invalid; there is no refresh.
const TOKEN_TTL_HOURS: i64 = 24;

/// Claims carried by a session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's unique identifier.
    pub sub: i32,
    /// Username at the time of issuance.
    pub username: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Signing and verification keys, derived from the configured secret once at
/// startup and passed to the components that need them. Nothing reads the
/// secret from the environment after that.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issues a signed token asserting `{user_id, username}`, expiring in 24 hours.
    pub fn issue(&self, user_id: i32, username: &str) -> Result<String, AppError> {
        let now = chrono::Utc::now();
        let expiration = now
            .checked_add_signed(chrono::Duration::hours(TOKEN_TTL_HOURS))
            .expect("valid timestamp")
            .timestamp() as usize;

        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            iat: now.timestamp() as usize,
            exp: expiration,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Verifies a token's signature and expiration and decodes its claims.
    ///
    /// Malformed, forged, and expired tokens are all `Unauthorized`; the
    /// default `jsonwebtoken` validation checks signature and `exp`.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_issue_and_verify() {
        let keys = TokenKeys::new("test_secret_for_issue_verify");
        let token = keys.issue(1, "alice").unwrap();
        let claims = keys.verify(&token).unwrap();

        assert_eq!(claims.sub, 1);
        assert_eq!(claims.username, "alice");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_expiration() {
        let keys = TokenKeys::new("test_secret_for_expiration");

        let expired = chrono::Utc::now()
            .checked_sub_signed(chrono::Duration::hours(2))
            .expect("valid timestamp")
            .timestamp() as usize;

        let claims = Claims {
            sub: 2,
            username: "bob".to_string(),
            iat: expired - 60,
            exp: expired,
        };
        let expired_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test_secret_for_expiration".as_bytes()),
        )
        .unwrap();

        match keys.verify(&expired_token) {
            Err(AppError::Unauthorized(msg)) => {
                assert!(
                    msg.contains("ExpiredSignature"),
                    "unexpected error message for expired token: {}",
                    msg
                );
            }
            Ok(_) => panic!("Token should have been invalid due to expiration"),
            Err(e) => panic!("Unexpected error type for expired token: {:?}", e),
        }
    }

    #[test]
    fn test_token_signed_with_other_secret() {
        let keys = TokenKeys::new("the_real_secret");
        let other_keys = TokenKeys::new("a_completely_different_secret");

        let forged = other_keys.issue(3, "mallory").unwrap();

        match keys.verify(&forged) {
            Err(AppError::Unauthorized(msg)) => {
                assert!(
                    msg.contains("InvalidSignature") || msg.contains("InvalidToken"),
                    "unexpected error message for forged token: {}",
                    msg
                );
            }
            Ok(_) => panic!("Token should have been invalid due to signature mismatch"),
            Err(e) => panic!("Unexpected error type for forged token: {:?}", e),
        }
    }

    #[test]
    fn test_malformed_token() {
        let keys = TokenKeys::new("test_secret_malformed");
        assert!(matches!(
            keys.verify("not-a-jwt-at-all"),
            Err(AppError::Unauthorized(_))
        ));
    }
}
