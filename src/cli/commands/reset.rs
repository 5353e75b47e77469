//! Password-reset command handlers (the unauthenticated side of the flow)

use crate::cli::commands::prompt;
use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, SeaOrmAuthService, Session};

async fn auth_service(config: &Config) -> anyhow::Result<SeaOrmAuthService> {
    let store = Store::new(&config.general.database_path).await?;
    let session = Session::new();
    session.finish_loading();
    Ok(SeaOrmAuthService::new(
        store,
        session,
        config.security.clone(),
    ))
}

pub async fn cmd_forgot_password(config: &Config) -> anyhow::Result<()> {
    let auth = auth_service(config).await?;

    println!("Request a password reset");
    println!("{:-<40}", "");

    let username = prompt("Username")?;
    let email = prompt("Email")?;

    match auth.request_password_reset(&username, &email).await {
        Ok(()) => {
            println!();
            println!("✓ Reset request filed. Once an administrator approves it,");
            println!("  run 'atlas reset-password' to choose a new password.");
        }
        Err(e) => {
            println!();
            println!("Could not file the request: {e}");
        }
    }

    Ok(())
}

pub async fn cmd_reset_password(config: &Config) -> anyhow::Result<()> {
    let auth = auth_service(config).await?;

    println!("Set a new password");
    println!("{:-<40}", "");

    let username = prompt("Username")?;
    let email = prompt("Email")?;
    let new_password = prompt("New password")?;

    match auth
        .complete_password_reset(&username, &email, &new_password)
        .await
    {
        Ok(()) => {
            println!();
            println!("✓ Password updated. Sign in with: atlas shell");
        }
        Err(e) => {
            println!();
            println!("Could not reset the password: {e}");
        }
    }

    Ok(())
}
