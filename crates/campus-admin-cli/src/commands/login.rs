//! `campus-admin login`: sign in and print the credential.

use clap::Args;
use serde::Serialize;

use campus_admin_auth::{AdminUser, AuthClient};
use campus_admin_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for login
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Admin email
    #[arg(short, long)]
    pub email: String,
    /// Password (will prompt if not provided)
    #[arg(short, long)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginOutput<'a> {
    token: &'a str,
    admin: &'a AdminUser,
}

/// Execute login
pub async fn execute(args: &LoginArgs, config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let password = match &args.password {
        Some(p) => p.clone(),
        None => dialoguer::Password::new()
            .with_prompt("Admin password")
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {e}")))?,
    };

    let client = AuthClient::new(&config.api)?;
    let response = client.login(&args.email, &password).await?;

    match format {
        OutputFormat::Table => {
            output::print_success(&format!("Signed in as {}", response.admin.email));
            output::print_kv("Role", &response.admin.role.to_string());
            output::print_kv("Token", response.token.as_str());
            println!();
            println!("  export {}={}", super::TOKEN_ENV, response.token.as_str());
        }
        OutputFormat::Json => output::print_item(
            &LoginOutput {
                token: response.token.as_str(),
                admin: &response.admin,
            },
            format,
        ),
    }
    Ok(())
}
