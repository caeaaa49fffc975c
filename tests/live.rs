use std::env;

use aws_cognito_password_auth::{AppIdentity, AuthClient, CognitoProvider, Credentials};

fn var(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| panic!("{name} should be set in .env"))
}

#[tokio::test]
#[ignore = "requires an AWS Cognito user pool configured in .env"]
async fn test_user_sign_in_works() {
    dotenvy::dotenv().ok();

    let identity = AppIdentity::new(
        &var("COGNITO_USER_POOL_ID"),
        &var("COGNITO_CLIENT_ID"),
        &var("COGNITO_CLIENT_SECRET"),
    )
    .expect("Configured identity should be valid");

    let provider = CognitoProvider::from_env(identity.region()).await;

    let authenticated = AuthClient::new(provider, identity)
        .authenticate(
            &Credentials::new(&var("COGNITO_USERNAME"), &var("COGNITO_PASSWORD"))
                .expect("Configured credentials should be valid"),
        )
        .await
        .expect("Authentication should succeed");

    assert!(!authenticated.tokens.access_token.is_empty());
    assert!(!authenticated.email.is_empty());
}
