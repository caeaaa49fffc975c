use aws_cognito_password_auth::AuthFlow;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Authenticate against AWS Cognito with a username and password.
///
/// Every value can also be supplied through the environment, or a `.env` file in the working
/// directory.
#[derive(Parser)]
#[command(name = "cognito-login", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Increase logging (-v info, -vv debug, -vvv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Authenticate a user and print the tokens issued by AWS Cognito.
    Login(LoginArgs),

    /// Compute the SECRET_HASH for a user locally, without contacting AWS Cognito.
    SecretHash(SecretHashArgs),
}

#[derive(Args)]
pub struct LoginArgs {
    #[arg(long, env = "COGNITO_USERNAME")]
    pub username: String,

    #[arg(long, env = "COGNITO_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// The ID of the user pool, in the form `<region>_<pool id>`.
    #[arg(long, env = "COGNITO_USER_POOL_ID")]
    pub user_pool_id: String,

    #[arg(long, env = "COGNITO_CLIENT_ID")]
    pub client_id: String,

    #[arg(long, env = "COGNITO_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    /// Defaults to the region prefix of the user pool ID.
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    #[arg(long, value_enum, default_value_t = FlowArg::Admin)]
    pub flow: FlowArg,

    /// Print tokens in full instead of redacted.
    #[arg(long)]
    pub show_tokens: bool,
}

#[derive(Args)]
pub struct SecretHashArgs {
    #[arg(long, env = "COGNITO_USERNAME")]
    pub username: String,

    #[arg(long, env = "COGNITO_CLIENT_ID")]
    pub client_id: String,

    #[arg(long, env = "COGNITO_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FlowArg {
    /// ADMIN_USER_PASSWORD_AUTH, requires AWS credentials.
    Admin,

    /// USER_PASSWORD_AUTH.
    User,
}

impl From<FlowArg> for AuthFlow {
    fn from(flow: FlowArg) -> Self {
        match flow {
            FlowArg::Admin => AuthFlow::AdminUserPassword,
            FlowArg::User => AuthFlow::UserPassword,
        }
    }
}
