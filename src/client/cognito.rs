use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cognitoidentityprovider::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cognitoidentityprovider::types::{
    AuthFlowType, AuthenticationResultType, ChallengeNameType,
};
use aws_sdk_cognitoidentityprovider::Client;
use log::warn;

use crate::client::{AuthFlow, AuthResult, IdentityProvider, PasswordAuthRequest};
use crate::AuthError;

/// Service error codes meaning AWS Cognito refused the user's credentials.
const REJECTED_CODES: &[&str] = &[
    "NotAuthorizedException",
    "UserNotFoundException",
    "UserNotConfirmedException",
    "PasswordResetRequiredException",
    "UserLambdaValidationException",
];

/// Service error codes meaning the user pool, app client or caller is misconfigured.
const CONFIGURATION_CODES: &[&str] = &[
    "ResourceNotFoundException",
    "InvalidParameterException",
    "InvalidUserPoolConfigurationException",
    "AccessDeniedException",
    "UnrecognizedClientException",
    "InvalidSignatureException",
];

/// An [`IdentityProvider`] backed by the AWS Cognito Identity Provider API.
#[derive(Debug, Clone)]
pub struct CognitoProvider {
    client: Client,
}

impl CognitoProvider {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a provider for `region` from the default AWS configuration chain.
    ///
    /// Retries in the SDK are disabled, so each authentication is a single attempt.
    pub async fn from_env(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .retry_config(RetryConfig::disabled())
            .load()
            .await;

        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl IdentityProvider for CognitoProvider {
    async fn password_auth(&self, request: PasswordAuthRequest<'_>) -> Result<AuthResult, AuthError> {
        let (result, challenge) = match request.flow {
            AuthFlow::AdminUserPassword => {
                let output = self
                    .client
                    .admin_initiate_auth()
                    .user_pool_id(request.user_pool_id)
                    .client_id(request.client_id)
                    .auth_flow(AuthFlowType::AdminUserPasswordAuth)
                    .auth_parameters("USERNAME", request.username)
                    .auth_parameters("PASSWORD", request.password)
                    .auth_parameters("SECRET_HASH", request.secret_hash.as_str())
                    .send()
                    .await
                    .map_err(classify_sdk_error)?;

                (output.authentication_result, output.challenge_name)
            }
            AuthFlow::UserPassword => {
                let output = self
                    .client
                    .initiate_auth()
                    .client_id(request.client_id)
                    .auth_flow(AuthFlowType::UserPasswordAuth)
                    .auth_parameters("USERNAME", request.username)
                    .auth_parameters("PASSWORD", request.password)
                    .auth_parameters("SECRET_HASH", request.secret_hash.as_str())
                    .send()
                    .await
                    .map_err(classify_sdk_error)?;

                (output.authentication_result, output.challenge_name)
            }
        };

        into_auth_result(result, challenge)
    }
}

/// Convert the body of an `InitiateAuth` / `AdminInitiateAuth` response into tokens.
///
/// A challenge in place of tokens means further steps (new password, MFA, ...) are required,
/// which a single password request cannot complete.
fn into_auth_result(
    result: Option<AuthenticationResultType>,
    challenge: Option<ChallengeNameType>,
) -> Result<AuthResult, AuthError> {
    let Some(result) = result else {
        return Err(match challenge {
            Some(challenge) => AuthError::AuthRejected(format!(
                "AWS Cognito issued the {} challenge, which password authentication cannot answer",
                challenge.as_str()
            )),
            None => AuthError::ProviderUnavailable(
                "Response contained neither tokens nor a challenge".into(),
            ),
        });
    };

    let AuthenticationResultType {
        access_token,
        id_token,
        refresh_token,
        expires_in,
        token_type,
        ..
    } = result;

    Ok(AuthResult {
        access_token: access_token.ok_or_else(|| {
            AuthError::ProviderUnavailable("Response is missing the access token".into())
        })?,
        id_token: id_token.ok_or_else(|| {
            AuthError::ProviderUnavailable("Response is missing the ID token".into())
        })?,
        refresh_token,
        expires_in,
        token_type,
    })
}

fn classify_sdk_error<E, R>(err: SdkError<E, R>) -> AuthError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    if let Some(service_error) = err.as_service_error() {
        return classify_service_error(
            service_error.code().unwrap_or("Unknown"),
            service_error.message().unwrap_or("no message"),
        );
    }

    let message = DisplayErrorContext(&err).to_string();
    warn!(error = message.as_str(); "Request to AWS Cognito failed before a response was received");

    AuthError::ProviderUnavailable(message)
}

fn classify_service_error(code: &str, message: &str) -> AuthError {
    let report = format!("{code}: {message}");

    // Cognito answers a bad or missing SECRET_HASH with NotAuthorizedException.
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("secret hash") || lowered.contains("configured for secret") {
        return AuthError::Configuration(report);
    }

    if REJECTED_CODES.contains(&code) {
        AuthError::AuthRejected(report)
    } else if CONFIGURATION_CODES.contains(&code) {
        AuthError::Configuration(report)
    } else {
        warn!(code = code; "AWS Cognito returned a service error");
        AuthError::ProviderUnavailable(report)
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_cognitoidentityprovider::error::{ErrorMetadata, SdkError};
    use aws_sdk_cognitoidentityprovider::operation::admin_initiate_auth::AdminInitiateAuthError;
    use aws_sdk_cognitoidentityprovider::types::{AuthenticationResultType, ChallengeNameType};

    use super::{classify_sdk_error, classify_service_error, into_auth_result};
    use crate::AuthError;

    fn service_error(code: &str, message: &str) -> SdkError<AdminInitiateAuthError, ()> {
        SdkError::service_error(
            AdminInitiateAuthError::generic(
                ErrorMetadata::builder().code(code).message(message).build(),
            ),
            (),
        )
    }

    #[test]
    fn test_wrong_password_is_rejected() {
        assert_eq!(
            classify_sdk_error(service_error(
                "NotAuthorizedException",
                "Incorrect username or password."
            )),
            AuthError::AuthRejected("NotAuthorizedException: Incorrect username or password.".into())
        );
    }

    #[test]
    fn test_unknown_user_is_rejected() {
        assert!(matches!(
            classify_sdk_error(service_error("UserNotFoundException", "User does not exist.")),
            AuthError::AuthRejected(_)
        ));
    }

    #[test]
    fn test_throttling_is_unavailable() {
        let err = classify_sdk_error(service_error("TooManyRequestsException", "Rate exceeded"));

        assert!(matches!(err, AuthError::ProviderUnavailable(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_network_fault_is_unavailable() {
        let err = classify_sdk_error(SdkError::<AdminInitiateAuthError, ()>::timeout_error(
            "connection timed out",
        ));

        assert!(matches!(err, AuthError::ProviderUnavailable(_)));
    }

    #[test]
    fn test_bad_secret_hash_is_configuration() {
        assert!(matches!(
            classify_service_error(
                "NotAuthorizedException",
                "Unable to verify secret hash for client abc123"
            ),
            AuthError::Configuration(_)
        ));
    }

    #[test]
    fn test_unknown_pool_is_configuration() {
        assert!(matches!(
            classify_service_error("ResourceNotFoundException", "User pool does not exist."),
            AuthError::Configuration(_)
        ));
    }

    #[test]
    fn test_tokens_are_extracted() {
        let result = AuthenticationResultType::builder()
            .access_token("access")
            .id_token("id")
            .refresh_token("refresh")
            .expires_in(3600)
            .token_type("Bearer")
            .build();

        let tokens = into_auth_result(Some(result), None).unwrap();

        assert_eq!(tokens.access_token, "access");
        assert_eq!(tokens.id_token, "id");
        assert_eq!(tokens.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(tokens.expires_in, 3600);
    }

    #[test]
    fn test_challenge_is_rejected() {
        assert!(matches!(
            into_auth_result(None, Some(ChallengeNameType::NewPasswordRequired)),
            Err(AuthError::AuthRejected(message)) if message.contains("NEW_PASSWORD_REQUIRED")
        ));
    }

    #[test]
    fn test_missing_id_token_is_unavailable() {
        let result = AuthenticationResultType::builder().access_token("access").build();

        assert_eq!(
            into_auth_result(Some(result), None),
            Err(AuthError::ProviderUnavailable("Response is missing the ID token".into()))
        );
    }
}
