//! CLI definitions and entry point.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// Project-scoped issue tracker (HTTP service + `SQLite`)
#[derive(Parser, Debug)]
#[command(name = "issues", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: issues.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// `SQLite` busy timeout in ms
    #[arg(long, global = true)]
    pub lock_timeout: Option<u64>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP service
    Serve(ServeArgs),

    /// Create an issue
    Create(CreateArgs),

    /// List a project's issues
    List(ListArgs),

    /// Update an issue
    Update(UpdateArgs),

    /// Delete an issue permanently
    Delete(DeleteArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Address to listen on (default: 127.0.0.1:3000)
    #[arg(long)]
    pub bind: Option<String>,

    /// Keep issues in memory only
    #[arg(long)]
    pub memory: bool,

    /// Answer request errors with 400/404/500 instead of 200
    #[arg(long)]
    pub strict_status: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CreateArgs {
    /// Project name
    pub project: String,

    /// Issue title
    #[arg(long)]
    pub title: Option<String>,

    /// Issue text
    #[arg(long)]
    pub text: Option<String>,

    /// Reporter
    #[arg(long)]
    pub created_by: Option<String>,

    /// Assignee
    #[arg(long)]
    pub assigned_to: Option<String>,

    /// Status text
    #[arg(long)]
    pub status_text: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Project name
    pub project: String,

    /// Exact-match filter, repeatable (e.g. --filter open=true)
    #[arg(long = "filter", value_name = "FIELD=VALUE", value_parser = parse_key_value)]
    pub filters: Vec<(String, String)>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct UpdateArgs {
    /// Project name
    pub project: String,

    /// Issue ID
    pub id: String,

    /// Field to change, repeatable (e.g. --set status_text=done)
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_key_value)]
    pub sets: Vec<(String, String)>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct DeleteArgs {
    /// Project name
    pub project: String,

    /// Issue ID
    pub id: String,
}

/// Parse a `FIELD=VALUE` argument. The value may be empty.
///
/// # Errors
///
/// Returns a message when there is no `=` or the field name is empty.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected FIELD=VALUE, got '{raw}'")),
    }
}
