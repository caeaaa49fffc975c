use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use log::{debug, info, warn};
use sha2::Sha256;

use crate::claims::{decode_unverified, redact, EMAIL_NOT_FOUND};
use crate::AuthError;

pub use cognito::CognitoProvider;
pub use provider::{AuthFlow, IdentityProvider, PasswordAuthRequest};

mod cognito;
mod provider;

type HmacSha256 = Hmac<Sha256>;

/// The hash of the client secret which AWS Cognito requires on every authentication request
/// made by an app client configured with a client secret.
///
/// The value is derived from the client secret, so [`fmt::Debug`] does not print it.
#[derive(Clone, Eq, PartialEq)]
pub struct SecretHash(String);

impl SecretHash {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for SecretHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretHash(..)")
    }
}

impl fmt::Display for SecretHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the secret hash for a user of an app client.
///
/// Calculation is: `BASE64(HMAC_SHA256(<client secret>, <username> + <client id>))`
///
/// No validation is performed on the inputs; a malformed username or client ID simply
/// produces a hash which AWS Cognito will reject.
///
/// ## Errors
///
/// Returns [`AuthError::Encoding`] if the HMAC cannot be keyed with the client secret.
pub fn compute_secret_hash(
    username: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<SecretHash, AuthError> {
    let mut hmac = HmacSha256::new_from_slice(client_secret.as_bytes())?;
    hmac.update(username.as_bytes());
    hmac.update(client_id.as_bytes());

    Ok(SecretHash(BASE64.encode(hmac.finalize().into_bytes())))
}

/// The app client making requests to AWS Cognito.
#[derive(Clone, Eq, PartialEq)]
pub struct AppIdentity {
    /// The ID of the AWS Cognito User Pool the user is registered with.
    ///
    /// The format enforced by AWS Cognito is: `<region>_<pool id>`.
    ///
    /// For example: `us-east-1_SqmNeowUdp`.
    user_pool_id: String,
    client_id: String,
    client_secret: String,
}

impl AppIdentity {
    /// ## Errors
    ///
    /// Returns [`AuthError::Configuration`] if any value is empty, or the user pool ID is not
    /// in the form `<region>_<pool id>`.
    pub fn new(user_pool_id: &str, client_id: &str, client_secret: &str) -> Result<Self, AuthError> {
        require("user pool ID", user_pool_id)?;
        require("app client ID", client_id)?;
        require("client secret", client_secret)?;

        match user_pool_id.split_once('_') {
            Some((region, pool)) if !region.is_empty() && !pool.is_empty() => {}
            _ => {
                return Err(AuthError::Configuration(
                    "Invalid user pool ID, must be in the form `<region>_<pool id>`".into(),
                ))
            }
        }

        Ok(Self {
            user_pool_id: user_pool_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        })
    }

    #[must_use]
    pub fn user_pool_id(&self) -> &str {
        &self.user_pool_id
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The AWS region hosting the user pool, taken from the prefix of the user pool ID.
    #[must_use]
    pub fn region(&self) -> &str {
        self.user_pool_id
            .split_once('_')
            .map_or(self.user_pool_id.as_str(), |(region, _)| region)
    }

    /// Compute the secret hash for `username` with this app client.
    ///
    /// ## Errors
    ///
    /// See [`compute_secret_hash`].
    pub fn secret_hash(&self, username: &str) -> Result<SecretHash, AuthError> {
        compute_secret_hash(username, &self.client_id, &self.client_secret)
    }
}

impl fmt::Debug for AppIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppIdentity")
            .field("user_pool_id", &self.user_pool_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// The credentials of a **user** stored in the AWS Cognito user pool.
#[derive(Clone, Eq, PartialEq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// ## Errors
    ///
    /// Returns [`AuthError::Configuration`] if either value is empty.
    pub fn new(username: &str, password: &str) -> Result<Self, AuthError> {
        require("username", username)?;
        require("password", password)?;

        Ok(Self {
            username: username.into(),
            password: password.into(),
        })
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn require(name: &str, value: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::Configuration(format!("Missing {name}")));
    }

    Ok(())
}

/// The tokens issued by AWS Cognito after a successful authentication.
///
/// For the full response structure see documentation: [AuthenticationResultType](https://docs.aws.amazon.com/cognito-user-identity-pools/latest/APIReference/API_AuthenticationResultType.html)
#[derive(Clone, Eq, PartialEq)]
pub struct AuthResult {
    pub access_token: String,
    pub id_token: String,

    /// Not every flow returns a refresh token.
    pub refresh_token: Option<String>,

    /// Lifetime of the access and ID tokens, in seconds.
    pub expires_in: i32,
    pub token_type: Option<String>,
}

impl fmt::Debug for AuthResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResult")
            .field("access_token", &redact(&self.access_token))
            .field("id_token", &redact(&self.id_token))
            .field("refresh_token", &self.refresh_token.as_deref().map(redact))
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// The outcome of [`AuthClient::authenticate`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Authenticated {
    pub tokens: AuthResult,

    /// The `email` claim read from the **unverified** ID token payload, or
    /// [`EMAIL_NOT_FOUND`](crate::EMAIL_NOT_FOUND). For display only.
    pub email: String,
}

/// The client for authenticating users of an app client with their username and password.
///
/// Requests are made through an [`IdentityProvider`], which is [`CognitoProvider`] outside of
/// tests.
#[derive(Debug)]
pub struct AuthClient<P: IdentityProvider> {
    provider: P,
    identity: AppIdentity,
    flow: AuthFlow,
}

impl<P: IdentityProvider> AuthClient<P> {
    /// Create a client which uses the `ADMIN_USER_PASSWORD_AUTH` flow.
    #[must_use]
    pub fn new(provider: P, identity: AppIdentity) -> Self {
        Self {
            provider,
            identity,
            flow: AuthFlow::default(),
        }
    }

    #[must_use]
    pub fn with_flow(mut self, flow: AuthFlow) -> Self {
        self.flow = flow;
        self
    }

    #[must_use]
    pub fn identity(&self) -> &AppIdentity {
        &self.identity
    }

    /// Authenticate the user with a single password request.
    ///
    /// The request is made once. There is no retry, so callers wanting to retry should check
    /// [`AuthError::is_retryable`].
    ///
    /// ## Errors
    ///
    /// - [`AuthError::Encoding`] if the secret hash cannot be computed (before any request).
    /// - [`AuthError::AuthRejected`] if AWS Cognito refuses the credentials.
    /// - [`AuthError::ProviderUnavailable`] if AWS Cognito cannot be reached or fails.
    /// - [`AuthError::Configuration`] if AWS Cognito reports a configuration mismatch.
    ///
    /// An ID token which cannot be decoded does not fail the call, the email falls back to
    /// [`EMAIL_NOT_FOUND`].
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Authenticated, AuthError> {
        let username = credentials.username.as_str();
        let secret_hash = self.identity.secret_hash(username)?;

        info!(
            username = username,
            user_pool_id = self.identity.user_pool_id.as_str(),
            flow = self.flow.as_str();
            "Authenticating user with password"
        );

        let tokens = self
            .provider
            .password_auth(PasswordAuthRequest {
                flow: self.flow,
                user_pool_id: &self.identity.user_pool_id,
                client_id: &self.identity.client_id,
                username,
                password: &credentials.password,
                secret_hash: &secret_hash,
            })
            .await?;

        info!(username = username; "Log in success");
        debug!(
            access_token = redact(&tokens.access_token).as_str(),
            id_token = redact(&tokens.id_token).as_str(),
            expires_in = tokens.expires_in;
            "Received tokens"
        );

        // Claims are display only, an unreadable ID token must not fail the login.
        let email = match decode_unverified(&tokens.id_token) {
            Ok(claims) => claims.email_or_default(),
            Err(err) => {
                warn!(error = err.to_string().as_str(); "Could not read claims from the ID token");
                EMAIL_NOT_FOUND.to_string()
            }
        };

        Ok(Authenticated { tokens, email })
    }
}
