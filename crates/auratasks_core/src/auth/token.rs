//! Bearer token issuance and verification.

use jsonwebtoken::{
    decode, encode, get_current_timestamp, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Claims carried by every AuraTasks token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account e-mail, the owner key for tasks and goals.
    pub email: String,
    /// Issued-at, seconds since epoch.
    pub iat: u64,
    /// Expiry, seconds since epoch.
    pub exp: u64,
}

#[derive(Debug)]
pub enum TokenError {
    /// Signature, structure or expiry check failed.
    Invalid(jsonwebtoken::errors::Error),
    /// Token could not be signed.
    Signing(jsonwebtoken::errors::Error),
}

impl Display for TokenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "invalid token: {err}"),
            Self::Signing(err) => write!(f, "token signing failed: {err}"),
        }
    }
}

impl Error for TokenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) | Self::Signing(err) => Some(err),
        }
    }
}

/// Signs and checks HS256 tokens with one shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Token lifetime applied by `issue`.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `email` valid from now for the configured lifetime.
    pub fn issue(&self, email: &str) -> Result<String, TokenError> {
        self.issue_at(email, get_current_timestamp())
    }

    pub(crate) fn issue_at(&self, email: &str, issued_at: u64) -> Result<String, TokenError> {
        let claims = Claims {
            email: email.to_string(),
            iat: issued_at,
            exp: issued_at.saturating_add(self.ttl.as_secs()),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    /// Verifies signature and expiry, returning the carried claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::{TokenError, TokenIssuer};
    use jsonwebtoken::get_current_timestamp;
    use std::time::Duration;

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(secret.as_bytes(), Duration::from_secs(3600))
    }

    #[test]
    fn issued_token_verifies_and_carries_email() {
        let issuer = issuer("secret-a");
        let token = issuer.issue("ada@example.com").unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = issuer("secret-a").issue("ada@example.com").unwrap();
        let err = issuer("secret-b").verify(&token).unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = issuer("secret-a");
        let two_hours_ago = get_current_timestamp() - 7200;
        let token = issuer.issue_at("ada@example.com", two_hours_ago).unwrap();
        assert!(issuer.verify(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(issuer("secret-a").verify("not.a.token").is_err());
    }
}
