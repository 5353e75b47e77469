pub mod cli;
pub mod config;
pub mod db;
pub mod entities;
pub mod services;

pub use config::Config;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = cli::Cli::parse();

    match args.command {
        Some(cli::Commands::Init) => {
            if Config::create_default_if_missing()? {
                println!("✓ Config file created. Edit config.toml and run again.");
            } else {
                println!("Config file already exists.");
            }
            Ok(())
        }

        Some(cli::Commands::Register) => cli::commands::register::cmd_register(&config).await,

        Some(cli::Commands::Shell) => cli::commands::shell::cmd_shell(&config).await,

        Some(cli::Commands::ForgotPassword) => {
            cli::commands::reset::cmd_forgot_password(&config).await
        }

        Some(cli::Commands::ResetPassword) => {
            cli::commands::reset::cmd_reset_password(&config).await
        }

        None => {
            cli::Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}
