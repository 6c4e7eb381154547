//! Bearer token inspection.
//!
//! Reads the user identifier out of a JWT **without verifying its signature**.
//! The identity service is the only authority on whether a session is valid;
//! values read here are hints for handlers that have already passed session
//! validation and must never drive an authorization decision.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use jsonwebtoken::{DecodingKey, Validation};
use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

/// Authentication scheme accepted in front of a token.
pub const BEARER_SCHEME: &str = "bearer";

/// Claim carrying the user identifier.
pub const USER_ID_CLAIM: &str = "_id";

/// Token inspection failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("no token provided")]
    Empty,

    #[error("bearer value is not of the form '<scheme> <token>'")]
    MalformedBearer,

    #[error("token has {0} segments, expected 3")]
    PartCount(usize),

    #[error("token could not be decoded: {0}")]
    Undecodable(String),

    #[error("claim '{0}' not found in token")]
    ClaimMissing(&'static str),

    #[error("claim '{0}' is not a string")]
    ClaimNotString(&'static str),

    #[error("claim '{claim}' is not a valid identifier: {reason}")]
    ClaimFormat {
        claim: &'static str,
        reason: String,
    },
}

/// A 12-byte user identifier, written as 24 hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId([u8; 12]);

impl UserId {
    pub fn bytes(&self) -> &[u8; 12] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for UserId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 24 {
            return Err(format!("expected 24 hex characters, got {}", s.len()));
        }
        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| e.to_string())?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for UserId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Claims read from a token whose signature was not checked.
#[derive(Debug, Clone, Default)]
pub struct UnverifiedClaims(HashMap<String, Value>);

impl UnverifiedClaims {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }
}

/// Strip a leading, case-insensitive `Bearer` scheme from a header value.
///
/// Values without the scheme come back trimmed and otherwise unchanged.
pub fn strip_bearer_prefix(raw: &str) -> Result<&str, TokenError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TokenError::Empty);
    }

    let Some(scheme) = trimmed.get(..BEARER_SCHEME.len()) else {
        return Ok(trimmed);
    };
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Ok(trimmed);
    }

    let rest = &trimmed[BEARER_SCHEME.len()..];
    if !rest.starts_with(char::is_whitespace) {
        return Err(TokenError::MalformedBearer);
    }
    let token = rest.trim_start();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(TokenError::MalformedBearer);
    }
    Ok(token)
}

/// Decode a token's claims segment without verifying the signature segment.
pub fn decode_unverified(token: &str) -> Result<UnverifiedClaims, TokenError> {
    let segments = token.split('.').count();
    if segments != 3 {
        return Err(TokenError::PartCount(segments));
    }

    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = jsonwebtoken::decode::<HashMap<String, Value>>(
        token,
        &DecodingKey::from_secret(&[]),
        &validation,
    )
    .map_err(|e| TokenError::Undecodable(e.to_string()))?;

    Ok(UnverifiedClaims(data.claims))
}

/// Extract the user identifier from an `Authorization` value or a bare token.
pub fn extract_user_id(raw: &str) -> Result<UserId, TokenError> {
    let token = strip_bearer_prefix(raw)?;
    let claims = decode_unverified(token)?;

    let claim = claims
        .get(USER_ID_CLAIM)
        .ok_or(TokenError::ClaimMissing(USER_ID_CLAIM))?;
    let Value::String(id) = claim else {
        return Err(TokenError::ClaimNotString(USER_ID_CLAIM));
    };

    id.parse().map_err(|reason| TokenError::ClaimFormat {
        claim: USER_ID_CLAIM,
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const USER: &str = "65a1f0c2b4e8d91a2c3b4d5e";

    fn token_with(claims: Value, secret: &str) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_strip_bearer_is_case_and_whitespace_insensitive() {
        for raw in ["Bearer xyz", "bearer  xyz", " BEARER xyz", "BeArEr\txyz  "] {
            assert_eq!(strip_bearer_prefix(raw), Ok("xyz"), "input {raw:?}");
        }
    }

    #[test]
    fn test_strip_bearer_rejects_bad_shapes() {
        assert_eq!(strip_bearer_prefix("   "), Err(TokenError::Empty));
        assert_eq!(strip_bearer_prefix("Bearer"), Err(TokenError::MalformedBearer));
        assert_eq!(strip_bearer_prefix("Bearer   "), Err(TokenError::MalformedBearer));
        assert_eq!(strip_bearer_prefix("Bearerxyz"), Err(TokenError::MalformedBearer));
        assert_eq!(strip_bearer_prefix("Bearer a b"), Err(TokenError::MalformedBearer));
        assert_eq!(strip_bearer_prefix("abc.def.ghi"), Ok("abc.def.ghi"));
    }

    #[test]
    fn test_extract_user_id_ignores_signature() {
        let token = token_with(json!({ "_id": USER, "exp": 1 }), "not-the-real-secret");

        let from_header = extract_user_id(&format!("Bearer {token}")).unwrap();
        let from_bare = extract_user_id(&token).unwrap();

        assert_eq!(from_header.to_string(), USER);
        assert_eq!(from_header, from_bare);
    }

    #[test]
    fn test_extract_user_id_claim_errors() {
        let missing = token_with(json!({ "sub": "someone" }), "k");
        assert_eq!(
            extract_user_id(&missing),
            Err(TokenError::ClaimMissing("_id"))
        );

        let numeric = token_with(json!({ "_id": 42 }), "k");
        assert_eq!(
            extract_user_id(&numeric),
            Err(TokenError::ClaimNotString("_id"))
        );

        let short = token_with(json!({ "_id": "abc" }), "k");
        assert!(matches!(
            extract_user_id(&short),
            Err(TokenError::ClaimFormat { claim: "_id", .. })
        ));

        let not_hex = token_with(json!({ "_id": "zzzzzzzzzzzzzzzzzzzzzzzz" }), "k");
        assert!(matches!(
            extract_user_id(&not_hex),
            Err(TokenError::ClaimFormat { .. })
        ));
    }

    #[test]
    fn test_extract_user_id_structure_errors() {
        assert_eq!(extract_user_id(""), Err(TokenError::Empty));
        assert_eq!(extract_user_id("Bearer a.b"), Err(TokenError::PartCount(2)));
        assert!(matches!(
            extract_user_id("Bearer not.a.jwt"),
            Err(TokenError::Undecodable(_))
        ));
    }

    #[test]
    fn test_user_id_parsing() {
        let id: UserId = USER.parse().unwrap();
        assert_eq!(id.bytes()[0], 0x65);
        assert_eq!(id.to_hex(), USER);
        assert_eq!(serde_json::to_value(id).unwrap(), json!(USER));
        assert!("65A1F0C2B4E8D91A2C3B4D5E".parse::<UserId>().is_ok());
        assert!(format!("{USER}00").parse::<UserId>().is_err());
    }
}
