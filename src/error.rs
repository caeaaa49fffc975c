use thiserror::Error;

/// An error occurred while authenticating a user against AWS Cognito.
///
/// Each variant maps to a distinct failure class, so callers can match on the
/// kind of failure rather than inspecting messages.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// An identity or credential field was missing or malformed, or AWS Cognito reported that
    /// the user pool or app client is not configured for this request.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The HMAC used to compute the secret hash could not be built.
    #[error("Encoding error: {0}")]
    Encoding(#[from] digest::InvalidLength),

    /// AWS Cognito refused the credentials, or answered with a challenge which a single
    /// password request cannot satisfy.
    #[error("Authentication rejected: {0}")]
    AuthRejected(String),

    /// AWS Cognito could not be reached, throttled the request, or failed on its side.
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The token payload was decoded but does not carry the named claim.
    #[error("Claim not found in token: {0}")]
    ClaimMissing(&'static str),

    /// The token is not a three-part token with a base64url encoded JSON payload.
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

impl AuthError {
    /// A stable, machine readable tag for the kind of error.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::Configuration(_) => "configuration_error",
            AuthError::Encoding(_) => "encoding_error",
            AuthError::AuthRejected(_) => "auth_rejected",
            AuthError::ProviderUnavailable(_) => "provider_unavailable",
            AuthError::ClaimMissing(_) => "claim_missing",
            AuthError::InvalidToken(_) => "invalid_token",
        }
    }

    /// Whether repeating the same request later could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::ProviderUnavailable(_))
    }
}
