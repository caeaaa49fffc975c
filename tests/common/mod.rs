use std::sync::Mutex;

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

use aws_cognito_password_auth::{
    AppIdentity, AuthError, AuthFlow, AuthResult, IdentityProvider, PasswordAuthRequest,
};

/// A request received by the [MockProvider], with the secret hash as plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub flow: AuthFlow,
    pub user_pool_id: String,
    pub client_id: String,
    pub username: String,
    pub password: String,
    pub secret_hash: String,
}

/// An identity provider which records every request, and answers with a canned response.
pub struct MockProvider {
    response: Result<AuthResult, AuthError>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockProvider {
    pub fn responding_with(response: Result<AuthResult, AuthError>) -> Self {
        Self {
            response,
            requests: Mutex::new(vec![]),
        }
    }

    pub fn issuing_id_token(id_token: String) -> Self {
        Self::responding_with(Ok(AuthResult {
            access_token: "access-token".into(),
            id_token,
            refresh_token: Some("refresh-token".into()),
            expires_in: 3600,
            token_type: Some("Bearer".into()),
        }))
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityProvider for MockProvider {
    async fn password_auth(&self, request: PasswordAuthRequest<'_>) -> Result<AuthResult, AuthError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            flow: request.flow,
            user_pool_id: request.user_pool_id.into(),
            client_id: request.client_id.into(),
            username: request.username.into(),
            password: request.password.into(),
            secret_hash: request.secret_hash.to_string(),
        });

        self.response.clone()
    }
}

pub fn identity() -> AppIdentity {
    AppIdentity::new("us-east-1_abc", "client123", "testsecret")
        .expect("Test identity should be valid")
}

/// Build a token with the given JSON payload, and a signature nothing could verify.
pub fn unsigned_token(payload: &str) -> String {
    format!(
        "{}.{}.c2lnbmF0dXJl",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","kid":"test"}"#),
        URL_SAFE_NO_PAD.encode(payload)
    )
}
