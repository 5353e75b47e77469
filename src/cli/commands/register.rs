//! Account registration command handler

use crate::cli::commands::prompt;
use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, RegisterData, SeaOrmAuthService, Session};

pub async fn cmd_register(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let session = Session::new();
    session.finish_loading();
    let auth = SeaOrmAuthService::new(store, session, config.security.clone());

    println!("Create a new account");
    println!("{:-<40}", "");

    let first_name = prompt("First name")?;
    let last_name = prompt("Last name")?;
    let email = prompt("Email")?;
    let username = prompt("Username (3-15 letters/digits)")?;
    let phone = prompt("Phone (10 digits)")?;
    let password = prompt("Password")?;

    match auth
        .register(RegisterData {
            email,
            username,
            password,
            first_name,
            last_name,
            phone,
        })
        .await
    {
        Ok(user) => {
            println!();
            println!("✓ Welcome, {}! Account created successfully.", user.first_name);
            println!("Sign in with: atlas shell");
        }
        Err(e) => {
            println!();
            println!("Could not create the account: {e}");
        }
    }

    Ok(())
}
