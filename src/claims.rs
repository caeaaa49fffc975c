//! Reading claims from a token **without verifying its signature**.
//!
//! Nothing here proves who issued a token. The claims are only fit for display, and must never
//! be used to make an authorization decision.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::AuthError;

/// Displayed in place of the email when the ID token carries no `email` claim.
pub const EMAIL_NOT_FOUND: &str = "Email not found in token";

/// JWT segments are base64url without padding, but some issuers pad them anyway.
const BASE64_URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    NO_PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// The payload of a token whose signature has **not** been checked.
///
/// Claims are read leniently: a claim holding an unexpected JSON type is treated as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnverifiedClaims(Map<String, Value>);

impl UnverifiedClaims {
    #[must_use]
    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.0.get(claim)
    }

    #[must_use]
    pub fn sub(&self) -> Option<&str> {
        self.get("sub").and_then(Value::as_str)
    }

    /// ## Errors
    ///
    /// Returns [`AuthError::ClaimMissing`] if the token has no `email` claim, or it is not a
    /// string.
    pub fn email(&self) -> Result<&str, AuthError> {
        self.get("email")
            .and_then(Value::as_str)
            .ok_or(AuthError::ClaimMissing("email"))
    }

    /// The `email` claim, or [`EMAIL_NOT_FOUND`].
    #[must_use]
    pub fn email_or_default(&self) -> String {
        match self.email() {
            Ok(email) => email.to_string(),
            Err(_) => EMAIL_NOT_FOUND.to_string(),
        }
    }

    /// Expiry, as seconds since the Unix epoch. Fractional seconds are truncated.
    #[must_use]
    pub fn exp(&self) -> Option<i64> {
        let exp = self.get("exp")?;

        exp.as_i64().or_else(|| exp.as_f64().map(|exp| exp as i64))
    }

    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp().and_then(|exp| DateTime::from_timestamp(exp, 0))
    }
}

/// Decode the payload of a `header.payload.signature` token, skipping signature verification.
///
/// ## Errors
///
/// Returns [`AuthError::InvalidToken`] if the token does not have three segments, or its
/// payload is not a base64url encoded JSON object.
pub fn decode_unverified(token: &str) -> Result<UnverifiedClaims, AuthError> {
    let mut segments = token.split('.');

    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AuthError::InvalidToken(
            "Expected a token with three dot separated segments".into(),
        ));
    };

    let payload = BASE64_URL.decode(payload).map_err(|err| {
        AuthError::InvalidToken(format!("Invalid base64 payload. Received '{err}'"))
    })?;

    serde_json::from_slice(&payload)
        .map(UnverifiedClaims)
        .map_err(|err| {
            AuthError::InvalidToken(format!("Invalid JSON object payload. Received '{err}'"))
        })
}

/// Render a token for display without disclosing it: the first few characters and its length.
#[must_use]
pub fn redact(token: &str) -> String {
    const VISIBLE: usize = 10;

    let length = token.chars().count();

    match token.char_indices().nth(VISIBLE) {
        Some((end, _)) => format!("{}... ({length} chars)", &token[..end]),
        None => format!("<redacted> ({length} chars)"),
    }
}
