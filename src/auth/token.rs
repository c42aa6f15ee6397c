//! Signed access and refresh tokens.
//!
//! Both tokens are compact HS256 JWTs signed with the same secret. They are
//! told apart by the shape of their claims, not by a flag: access claims carry
//! `userID`, `role` and `exp`; refresh claims carry only `userID` and `exp`.
//! Unknown fields are rejected, so an access token never decodes as a refresh
//! token and vice versa.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Role;

/// Lifetime of an access token.
pub const ACCESS_TOKEN_MINUTES: i64 = 10;
/// Lifetime of a refresh token.
pub const REFRESH_TOKEN_DAYS: i64 = 7;

/// Claims of a short-lived access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessClaims {
    #[serde(rename = "userID")]
    pub user_id: String,
    pub role: Role,
    /// Expiry as Unix seconds.
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

/// Claims of a long-lived refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefreshClaims {
    #[serde(rename = "userID")]
    pub user_id: String,
    /// Expiry as Unix seconds.
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

/// Every claim set this service signs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Claims {
    Access(AccessClaims),
    Refresh(RefreshClaims),
}

/// An access/refresh token pair handed to a client after authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_key: String,
    pub refresh_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// An access token failed signature, structure, shape or expiry checks.
    InvalidToken(String),
    /// A refresh token failed signature, structure, shape or expiry checks.
    InvalidRefresh(String),
    /// Encoding a token failed.
    Signing(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenError::InvalidToken(msg) => write!(f, "invalid access key: {}", msg),
            TokenError::InvalidRefresh(msg) => write!(f, "invalid refresh key: {}", msg),
            TokenError::Signing(msg) => write!(f, "failed to sign token: {}", msg),
        }
    }
}

impl std::error::Error for TokenError {}

/// Issues and verifies tokens with a secret fixed at construction.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Signs a fresh access/refresh pair whose lifetimes start at `now`.
    pub fn issue_pair(
        &self,
        user_id: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        let access = AccessClaims {
            user_id: user_id.to_string(),
            role,
            expires_at: (now + Duration::minutes(ACCESS_TOKEN_MINUTES)).timestamp(),
        };
        let refresh = RefreshClaims {
            user_id: user_id.to_string(),
            expires_at: (now + Duration::days(REFRESH_TOKEN_DAYS)).timestamp(),
        };

        Ok(TokenPair {
            access_key: self.sign(&access)?,
            refresh_key: self.sign(&refresh)?,
        })
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verifies signature and expiry, then decodes whichever claim shape the token carries.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &self.validation).map(|data| data.claims)
    }

    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        match self.verify(token) {
            Ok(Claims::Access(claims)) => Ok(claims),
            Ok(Claims::Refresh(_)) => Err(TokenError::InvalidToken(
                "refresh key used as access key".into(),
            )),
            Err(e) => Err(TokenError::InvalidToken(e.to_string())),
        }
    }

    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        match self.verify(token) {
            Ok(Claims::Refresh(claims)) => Ok(claims),
            Ok(Claims::Access(_)) => Err(TokenError::InvalidRefresh(
                "access key used as refresh key".into(),
            )),
            Err(e) => Err(TokenError::InvalidRefresh(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const SECRET: &[u8] = b"test_secret_for_tokens";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(SECRET)
    }

    #[test]
    fn test_issue_and_verify_pair() {
        let now = Utc::now();
        let pair = issuer().issue_pair("user-1", Role::Admin, now).unwrap();

        let access = issuer().verify_access(&pair.access_key).unwrap();
        assert_eq!(
            access,
            AccessClaims {
                user_id: "user-1".to_string(),
                role: Role::Admin,
                expires_at: now.timestamp() + ACCESS_TOKEN_MINUTES * 60,
            }
        );

        let refresh = issuer().verify_refresh(&pair.refresh_key).unwrap();
        assert_eq!(refresh.user_id, "user-1");
        assert_eq!(
            refresh.expires_at,
            now.timestamp() + REFRESH_TOKEN_DAYS * 24 * 60 * 60
        );
    }

    #[test]
    fn test_issue_is_deterministic_for_same_inputs() {
        let now = Utc::now();
        let first = issuer().issue_pair("user-1", Role::User, now).unwrap();
        let second = issuer().issue_pair("user-1", Role::User, now).unwrap();
        assert_eq!(first, second);
        assert_ne!(first.access_key, first.refresh_key);
    }

    #[test]
    fn test_token_is_three_base64url_parts() {
        let pair = issuer().issue_pair("user-1", Role::User, Utc::now()).unwrap();
        let parts: Vec<&str> = pair.access_key.split('.').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| !p.is_empty()
            && p.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')));
    }

    #[test]
    fn test_tokens_are_not_interchangeable() {
        let pair = issuer().issue_pair("user-1", Role::User, Utc::now()).unwrap();

        assert!(matches!(
            issuer().verify_access(&pair.refresh_key),
            Err(TokenError::InvalidToken(_))
        ));
        assert!(matches!(
            issuer().verify_refresh(&pair.access_key),
            Err(TokenError::InvalidRefresh(_))
        ));
    }

    #[test]
    fn test_rejects_other_secret() {
        let pair = TokenIssuer::new(b"a_completely_different_secret")
            .issue_pair("user-1", Role::Admin, Utc::now())
            .unwrap();

        assert!(matches!(
            issuer().verify_access(&pair.access_key),
            Err(TokenError::InvalidToken(_))
        ));
        assert!(matches!(
            issuer().verify_refresh(&pair.refresh_key),
            Err(TokenError::InvalidRefresh(_))
        ));
    }

    #[test]
    fn test_rejects_expired_tokens() {
        let issued = Utc::now() - Duration::minutes(ACCESS_TOKEN_MINUTES + 1);
        let pair = issuer().issue_pair("user-1", Role::User, issued).unwrap();
        assert!(matches!(
            issuer().verify_access(&pair.access_key),
            Err(TokenError::InvalidToken(_))
        ));
        // The refresh window is still open.
        assert!(issuer().verify_refresh(&pair.refresh_key).is_ok());

        let issued = Utc::now() - Duration::days(REFRESH_TOKEN_DAYS + 1);
        let pair = issuer().issue_pair("user-1", Role::User, issued).unwrap();
        assert!(matches!(
            issuer().verify_refresh(&pair.refresh_key),
            Err(TokenError::InvalidRefresh(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_tokens() {
        for token in ["", "not-a-token", "a.b.c", "eyJhbGciOiJIUzI1NiJ9..sig"] {
            assert!(
                matches!(issuer().verify_access(token), Err(TokenError::InvalidToken(_))),
                "accepted {:?}",
                token
            );
        }
    }

    #[test]
    fn test_rejects_unknown_and_missing_claims() {
        let exp = (Utc::now() + Duration::minutes(5)).timestamp();
        let key = EncodingKey::from_secret(SECRET);
        let header = Header::new(Algorithm::HS256);

        let extra = encode(
            &header,
            &json!({ "userID": "user-1", "role": "admin", "exp": exp, "scope": "all" }),
            &key,
        )
        .unwrap();
        assert!(issuer().verify_access(&extra).is_err());

        let no_user = encode(&header, &json!({ "role": "admin", "exp": exp }), &key).unwrap();
        assert!(issuer().verify_access(&no_user).is_err());

        let no_exp = encode(&header, &json!({ "userID": "user-1", "role": "user" }), &key).unwrap();
        assert!(issuer().verify_access(&no_exp).is_err());

        let bad_role = encode(
            &header,
            &json!({ "userID": "user-1", "role": "root", "exp": exp }),
            &key,
        )
        .unwrap();
        assert!(issuer().verify_access(&bad_role).is_err());
    }

    #[test]
    fn test_rejects_other_algorithm() {
        let claims = AccessClaims {
            user_id: "user-1".to_string(),
            role: Role::Admin,
            expires_at: (Utc::now() + Duration::minutes(5)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        assert!(issuer().verify_access(&token).is_err());
    }
}
