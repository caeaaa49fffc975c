use async_trait::async_trait;

use crate::client::{AuthResult, SecretHash};
use crate::AuthError;

/// The password based authentication flows supported by the client.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum AuthFlow {
    /// `ADMIN_USER_PASSWORD_AUTH` through [AdminInitiateAuth](https://docs.aws.amazon.com/cognito-user-identity-pools/latest/APIReference/API_AdminInitiateAuth.html).
    ///
    /// The caller must hold AWS credentials allowed to call `cognito-idp:AdminInitiateAuth`.
    #[default]
    AdminUserPassword,

    /// `USER_PASSWORD_AUTH` through [InitiateAuth](https://docs.aws.amazon.com/cognito-user-identity-pools/latest/APIReference/API_InitiateAuth.html).
    UserPassword,
}

impl AuthFlow {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthFlow::AdminUserPassword => "ADMIN_USER_PASSWORD_AUTH",
            AuthFlow::UserPassword => "USER_PASSWORD_AUTH",
        }
    }
}

/// The parameters of a single password authentication request.
#[derive(Clone, Copy)]
pub struct PasswordAuthRequest<'a> {
    pub flow: AuthFlow,
    pub user_pool_id: &'a str,
    pub client_id: &'a str,

    /// Sent as `USERNAME`.
    pub username: &'a str,

    /// Sent as `PASSWORD`.
    pub password: &'a str,

    /// Sent as `SECRET_HASH`.
    pub secret_hash: &'a SecretHash,
}

/// A service able to authenticate a user with their password.
///
/// Implementations make exactly one attempt, and must classify failures into
/// [`AuthError::AuthRejected`], [`AuthError::ProviderUnavailable`] or
/// [`AuthError::Configuration`].
#[async_trait]
pub trait IdentityProvider {
    async fn password_auth(&self, request: PasswordAuthRequest<'_>) -> Result<AuthResult, AuthError>;
}

#[async_trait]
impl<P: IdentityProvider + Sync + ?Sized> IdentityProvider for &P {
    async fn password_auth(&self, request: PasswordAuthRequest<'_>) -> Result<AuthResult, AuthError> {
        (**self).password_auth(request).await
    }
}
