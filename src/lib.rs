#![crate_name = "aws_cognito_password_auth"]

//! # AWS Cognito Password Auth
//!
//! Username and password authentication against AWS Cognito, for App clients which are
//! configured with a client secret.
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! aws-cognito-password-auth = "0.1.0"
//! ```
//!
//! ### Secret hash
//!
//! When an App client has a client secret, AWS Cognito requires a `SECRET_HASH` on every
//! authentication request, binding the request to a user and App client.
//!
//! The calculation is `BASE64(HMAC_SHA256(<client secret>, <username> + <client id>))`, and is
//! described in the [AWS Cognito documentation](https://docs.aws.amazon.com/cognito/latest/developerguide/signing-up-users-in-your-app.html#cognito-user-pools-computing-secret-hash).
//!
//! ```
//! use aws_cognito_password_auth::{compute_secret_hash, AuthError};
//!
//! let hash = compute_secret_hash("alice", "client123", "testsecret")?;
//!
//! assert_eq!(hash.as_str(), "Do/oiiNjW4kng7kNaBeniU6nHdNEsKQWFaS37KOxVvU=");
//!
//! # Ok::<(), AuthError>(())
//! ```
//!
//! ### User authentication
//!
//! The [AuthClient] sends a single [AdminInitiateAuth](https://docs.aws.amazon.com/cognito-user-identity-pools/latest/APIReference/API_AdminInitiateAuth.html)
//! request using the `ADMIN_USER_PASSWORD_AUTH` flow (or [InitiateAuth](https://docs.aws.amazon.com/cognito-user-identity-pools/latest/APIReference/API_InitiateAuth.html)
//! with `USER_PASSWORD_AUTH`, see [AuthFlow]), including the secret hash.
//!
//! ```no_run
//! use aws_cognito_password_auth::{AppIdentity, AuthClient, AuthError, CognitoProvider, Credentials};
//!
//! # async fn run() -> Result<(), AuthError> {
//! let identity = AppIdentity::new(
//!     // The ID of the AWS Cognito User Pool the user is registered with.
//!     "<region>_<pool id>",
//!
//!     // The App client, and its client secret.
//!     "<client id>",
//!     "<client secret>",
//! )?;
//!
//! let provider = CognitoProvider::from_env(identity.region()).await;
//! let client = AuthClient::new(provider, identity);
//!
//! let authenticated = client
//!     .authenticate(&Credentials::new("<username>", "<password>")?)
//!     .await?;
//!
//! println!("Email: {}", authenticated.email);
//! # Ok(())
//! # }
//! ```
//!
//! ### Reading claims
//!
//! The `email` returned by [AuthClient::authenticate] is read from the ID token **without
//! verifying its signature** (see [claims]). It is suitable for display only.
//!
//! ## Contributing
//!
//! The live test (`tests/live.rs`) requires an AWS Cognito User Pool with an App client which
//! has a client secret and `ADMIN_USER_PASSWORD_AUTH` enabled, and AWS credentials allowed to
//! call `AdminInitiateAuth`.
//!
//! Its configuration is read from a `.env` file, which can be created by using `.env.example`
//! as a template:
//! ```sh
//! cp .env.example .env
//! ```
//!
//! ### Running tests
//!
//! ```sh
//! cargo test
//!
//! # Including the live test
//! cargo test -- --include-ignored
//! ```

pub use crate::claims::{decode_unverified, redact, UnverifiedClaims, EMAIL_NOT_FOUND};
pub use crate::client::{compute_secret_hash, AppIdentity, AuthClient, AuthResult, Authenticated};
pub use crate::client::{AuthFlow, CognitoProvider, Credentials, IdentityProvider};
pub use crate::client::{PasswordAuthRequest, SecretHash};
pub use crate::error::AuthError;

pub mod claims;
mod client;
mod error;
