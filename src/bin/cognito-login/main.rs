use std::process::ExitCode;

use aws_cognito_password_auth::{
    compute_secret_hash, decode_unverified, redact, AppIdentity, AuthClient, AuthError,
    Authenticated, CognitoProvider, Credentials,
};
use clap::Parser;
use log::{debug, info, LevelFilter};
use serde::Serialize;
use serde_json::json;

use crate::args::{Cli, Command, LoginArgs, OutputFormat, SecretHashArgs};

mod args;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logger(cli.verbose);

    let outcome = match cli.command {
        Command::Login(args) => login(args).await,
        Command::SecretHash(args) => secret_hash(&args),
    };

    match outcome {
        Ok(report) => {
            match cli.output {
                OutputFormat::Text => print!("{}", report.to_text()),
                OutputFormat::Json => println!("{}", json!(report)),
            }

            ExitCode::SUCCESS
        }
        Err(err) => {
            debug!(kind = err.kind(), retryable = err.is_retryable(); "{err}");

            match cli.output {
                OutputFormat::Text => eprintln!("Error [{}]: {err}", err.kind()),
                OutputFormat::Json => println!("{}", error_report(&err)),
            }

            ExitCode::from(exit_code(&err))
        }
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

async fn login(args: LoginArgs) -> Result<Report, AuthError> {
    // Both are validated before any request is made.
    let identity = AppIdentity::new(&args.user_pool_id, &args.client_id, &args.client_secret)?;
    let credentials = Credentials::new(&args.username, &args.password)?;

    let region = args
        .region
        .clone()
        .filter(|region| !region.is_empty())
        .unwrap_or_else(|| identity.region().to_string());

    info!(region = region.as_str(); "Using AWS Cognito region");

    let client = AuthClient::new(CognitoProvider::from_env(&region).await, identity)
        .with_flow(args.flow.into());

    let authenticated = client.authenticate(&credentials).await?;

    Ok(Report::logged_in(authenticated, args.show_tokens))
}

fn secret_hash(args: &SecretHashArgs) -> Result<Report, AuthError> {
    let hash = compute_secret_hash(&args.username, &args.client_id, &args.client_secret)?;

    Ok(Report::SecretHash {
        secret_hash: hash.into_inner(),
    })
}

#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
enum Report {
    LoggedIn {
        access_token: String,
        id_token: String,
        refresh_token: Option<String>,
        expires_in: i32,
        expires_at: Option<String>,
        email: String,
    },
    SecretHash {
        secret_hash: String,
    },
}

impl Report {
    fn logged_in(authenticated: Authenticated, show_tokens: bool) -> Self {
        let Authenticated { tokens, email } = authenticated;

        let expires_at = decode_unverified(&tokens.id_token)
            .ok()
            .and_then(|claims| claims.expires_at())
            .map(|at| at.to_rfc3339());

        let display = |token: String| if show_tokens { token } else { redact(&token) };

        Report::LoggedIn {
            access_token: display(tokens.access_token),
            id_token: display(tokens.id_token),
            refresh_token: tokens.refresh_token.map(display),
            expires_in: tokens.expires_in,
            expires_at,
            email,
        }
    }

    fn to_text(&self) -> String {
        match self {
            Report::LoggedIn {
                access_token,
                id_token,
                refresh_token,
                expires_in,
                expires_at,
                email,
            } => {
                let refresh_token = refresh_token
                    .as_ref()
                    .map(|token| format!("Refresh token: {token}\n"))
                    .unwrap_or_default();
                let expires_at = expires_at
                    .as_ref()
                    .map(|at| format!(" (at {at})"))
                    .unwrap_or_default();

                format!(
                    "Log in success\n\
                     Access token: {access_token}\n\
                     ID token: {id_token}\n\
                     {refresh_token}\
                     Expires in: {expires_in}s{expires_at}\n\
                     Email: {email}\n"
                )
            }
            Report::SecretHash { secret_hash } => format!("Secret hash: {secret_hash}\n"),
        }
    }
}

fn error_report(err: &AuthError) -> serde_json::Value {
    json!({
        "result": "error",
        "error": {
            "kind": err.kind(),
            "message": err.to_string(),
            "retryable": err.is_retryable(),
        }
    })
}

fn exit_code(err: &AuthError) -> u8 {
    match err {
        AuthError::Configuration(_) => 2,
        AuthError::Encoding(_) => 3,
        AuthError::AuthRejected(_) => 4,
        AuthError::ProviderUnavailable(_) => 5,
        // Neither is returned by `login`, claims are recovered to a default.
        AuthError::InvalidToken(_) | AuthError::ClaimMissing(_) => 6,
    }
}

#[cfg(test)]
mod tests {
    use aws_cognito_password_auth::{AuthError, AuthResult, Authenticated, EMAIL_NOT_FOUND};
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

    use super::{error_report, exit_code, Report};

    fn authenticated() -> Authenticated {
        Authenticated {
            tokens: AuthResult {
                access_token: "access-token-value".into(),
                id_token: "not-a-jwt-id-token".into(),
                refresh_token: None,
                expires_in: 3600,
                token_type: Some("Bearer".into()),
            },
            email: EMAIL_NOT_FOUND.into(),
        }
    }

    #[test]
    fn test_tokens_are_redacted_by_default() {
        let text = Report::logged_in(authenticated(), false).to_text();

        assert!(!text.contains("access-token-value"));
        assert!(text.contains("Access token: access-tok... (18 chars)"));
        assert!(text.contains("Email: Email not found in token"));
    }

    #[test]
    fn test_tokens_are_shown_on_request() {
        let text = Report::logged_in(authenticated(), true).to_text();

        assert_eq!(
            text,
            "Log in success\n\
             Access token: access-token-value\n\
             ID token: not-a-jwt-id-token\n\
             Expires in: 3600s\n\
             Email: Email not found in token\n"
        );
    }

    #[test]
    fn test_refresh_token_and_expiry_are_listed() {
        let mut authenticated = authenticated();
        authenticated.tokens.refresh_token = Some("refresh-token".into());
        authenticated.tokens.id_token = format!(
            "{}.{}.signature",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256"}"#),
            URL_SAFE_NO_PAD.encode(r#"{"exp":1739212212}"#)
        );

        let text = Report::logged_in(authenticated, true).to_text();

        assert!(text.contains("Refresh token: refresh-token\n"));
        assert!(text.contains("Expires in: 3600s (at 2025-02-10T18:30:12+00:00)\n"));
    }

    #[test]
    fn test_error_report_is_structured() {
        let report = error_report(&AuthError::AuthRejected("wrong password".into()));

        assert_eq!(report["error"]["kind"], "auth_rejected");
        assert_eq!(report["error"]["retryable"], false);
        assert_eq!(
            report["error"]["message"],
            "Authentication rejected: wrong password"
        );
    }

    #[test]
    fn test_failures_exit_non_zero() {
        assert_eq!(exit_code(&AuthError::Configuration("x".into())), 2);
        assert_eq!(exit_code(&AuthError::AuthRejected("x".into())), 4);
        assert_eq!(exit_code(&AuthError::ProviderUnavailable("x".into())), 5);
    }
}
