//! CLI module - command-line interface for Atlas
//!
//! This module provides a structured CLI using clap for argument parsing.

pub mod commands;

use clap::{Parser, Subcommand};

/// Atlas - local step tracking
/// Record daily step counts, keep an archive, and manage accounts
#[derive(Parser)]
#[command(name = "atlas")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a default config file
    #[command(alias = "--init")]
    Init,

    /// Create a new account
    #[command(alias = "r")]
    Register,

    /// Sign in and open the interactive shell
    #[command(alias = "login", alias = "sh")]
    Shell,

    /// File a password-reset request (an admin must approve it)
    ForgotPassword,

    /// Set a new password once your reset request has been approved
    ResetPassword,
}
