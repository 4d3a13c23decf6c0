//! Session token verification.
//!
//! Players are identified by an HS256-signed JWT carried in the `token`
//! cookie. The subject is read from the `sub` claim, falling back to `id`.
//! An `exp` claim, when present, must lie in the future. Anything that does not
//! verify is treated as an anonymous visitor.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use readrise_core::model::UserId;

use crate::Clock;
use crate::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

#[derive(Deserialize)]
struct Header {
    alg: String,
}

#[derive(Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Option<Value>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    exp: Option<i64>,
}

impl Claims {
    fn subject(&self) -> Option<UserId> {
        [self.sub.as_ref(), self.id.as_ref()]
            .into_iter()
            .flatten()
            .find_map(|value| match value {
                Value::String(s) => UserId::new(s.as_str()).ok(),
                Value::Number(n) => UserId::new(n.to_string()).ok(),
                _ => None,
            })
    }
}

/// Verifies session tokens against a shared secret.
#[derive(Clone)]
pub struct TokenVerifier {
    mac: HmacSha256,
    clock: Clock,
}

impl TokenVerifier {
    /// # Errors
    ///
    /// Returns `AuthError::InvalidSecret` for an empty secret.
    pub fn new(secret: &[u8], clock: Clock) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::InvalidSecret);
        }
        let mac = HmacSha256::new_from_slice(secret).map_err(|_| AuthError::InvalidSecret)?;
        Ok(Self { mac, clock })
    }

    /// Resolve an optional cookie value to a player, or `None` for anonymous.
    ///
    /// Rejected tokens are logged and otherwise ignored.
    #[must_use]
    pub fn identify(&self, token: Option<&str>) -> Option<UserId> {
        let token = token?;
        match self.verify(token) {
            Ok(user_id) => Some(user_id),
            Err(e) => {
                tracing::warn!(
                    event = "auth_failure",
                    reason = %e,
                    "session token rejected"
                );
                None
            }
        }
    }

    /// Check signature, algorithm and expiry, and extract the subject.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` describing the first check that failed.
    pub fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let (signing_input, signature) = token.rsplit_once('.').ok_or(AuthError::Malformed)?;
        let (header, claims) = signing_input
            .split_once('.')
            .ok_or(AuthError::Malformed)?;
        if claims.contains('.') {
            return Err(AuthError::Malformed);
        }

        let header: Header = decode_json(header)?;
        if header.alg != "HS256" {
            return Err(AuthError::UnsupportedAlgorithm(header.alg));
        }

        let provided = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::Decode)?;
        let expected = self.sign(signing_input.as_bytes());
        let matches: bool = provided.ct_eq(&expected).into();
        if !matches {
            return Err(AuthError::BadSignature);
        }

        let claims: Claims = decode_json(claims)?;
        if claims.exp.is_some_and(|exp| exp <= self.clock.unix_seconds()) {
            return Err(AuthError::Expired);
        }
        claims.subject().ok_or(AuthError::MissingSubject)
    }

    /// Mint a token for `user_id`, optionally expiring at `expires_at`
    /// (seconds since the epoch).
    #[must_use]
    pub fn issue(&self, user_id: &UserId, expires_at: Option<i64>) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let claims = match expires_at {
            Some(exp) => serde_json::json!({ "sub": user_id.as_str(), "exp": exp }),
            None => serde_json::json!({ "sub": user_id.as_str() }),
        };
        let claims = URL_SAFE_NO_PAD.encode(claims.to_string());
        let signing_input = format!("{header}.{claims}");
        let signature = URL_SAFE_NO_PAD.encode(self.sign(signing_input.as_bytes()));
        format!("{signing_input}.{signature}")
    }

    fn sign(&self, input: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(input);
        mac.finalize().into_bytes().to_vec()
    }
}

fn decode_json<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T, AuthError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::Decode)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use readrise_core::time::{FIXED_TEST_TIMESTAMP, fixed_clock};

    fn verifier() -> TokenVerifier {
        TokenVerifier::new(b"test-secret", fixed_clock()).unwrap()
    }

    fn token_with(secret: &[u8], header: &str, claims: &str) -> String {
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(claims)
        );
        let mut mac = HmacSha256::new_from_slice(secret).unwrap();
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{signing_input}.{signature}")
    }

    #[test]
    fn issued_token_verifies() {
        let v = verifier();
        let user = UserId::new("reader-7").unwrap();
        let token = v.issue(&user, Some(FIXED_TEST_TIMESTAMP + 60));
        assert_eq!(v.verify(&token).unwrap(), user);
        assert_eq!(v.identify(Some(&token)), Some(user));
    }

    #[test]
    fn id_claim_is_a_fallback_subject() {
        let token = token_with(b"test-secret", r#"{"alg":"HS256"}"#, r#"{"id":42}"#);
        assert_eq!(verifier().verify(&token).unwrap().as_str(), "42");
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut clock = fixed_clock();
        let v = TokenVerifier::new(b"test-secret", clock).unwrap();
        let token = v.issue(&UserId::new("u").unwrap(), Some(FIXED_TEST_TIMESTAMP + 10));

        clock.advance(Duration::seconds(10));
        let later = TokenVerifier::new(b"test-secret", clock).unwrap();
        assert_eq!(later.verify(&token).unwrap_err(), AuthError::Expired);
    }

    #[test]
    fn wrong_secret_or_algorithm_is_rejected() {
        let forged = token_with(b"other", r#"{"alg":"HS256"}"#, r#"{"sub":"u"}"#);
        assert_eq!(verifier().verify(&forged).unwrap_err(), AuthError::BadSignature);

        let none = token_with(b"test-secret", r#"{"alg":"none"}"#, r#"{"sub":"u"}"#);
        assert!(matches!(
            verifier().verify(&none).unwrap_err(),
            AuthError::UnsupportedAlgorithm(_)
        ));
    }

    #[test]
    fn garbage_is_anonymous() {
        let v = verifier();
        assert_eq!(v.verify("not-a-jwt").unwrap_err(), AuthError::Malformed);
        assert_eq!(v.verify("a.b.c.d").unwrap_err(), AuthError::Malformed);
        assert_eq!(v.identify(Some("a.b.c")), None);
        assert_eq!(v.identify(None), None);
    }

    #[test]
    fn blank_subject_is_rejected() {
        let token = token_with(b"test-secret", r#"{"alg":"HS256"}"#, r#"{"sub":"  "}"#);
        assert_eq!(
            verifier().verify(&token).unwrap_err(),
            AuthError::MissingSubject
        );
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(TokenVerifier::new(b"", fixed_clock()).is_err());
    }
}
