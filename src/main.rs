use clap::Parser;
use issue_tracker::cli::commands;
use issue_tracker::cli::{Cli, Commands};
use issue_tracker::config::{self, ServiceConfig};
use issue_tracker::logging::{init_json_logging, init_logging};
use issue_tracker::{StructuredError, TrackerError};
use std::io::{self, IsTerminal};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let overrides = build_cli_overrides(&cli);
    let config = match config::load_config(&overrides) {
        Ok(config) => config,
        Err(e) => handle_error(&e, cli.json),
    };

    // Initialize logging
    if let Err(e) = start_logging(&cli, &config) {
        eprintln!("Failed to initialize logging: {e}");
        // Don't exit, just continue without logging
    }

    let result = match &cli.command {
        Commands::Serve(_) => commands::serve::execute(&config).await,
        Commands::Create(args) => commands::create::execute(args, cli.json, &config).await,
        Commands::List(args) => commands::list::execute(args, cli.json, &config).await,
        Commands::Update(args) => commands::update::execute(args, cli.json, &config).await,
        Commands::Delete(args) => commands::delete::execute(args, cli.json, &config).await,
    };

    if let Err(e) = result {
        handle_error(&e, cli.json);
    }
}

fn start_logging(cli: &Cli, config: &ServiceConfig) -> issue_tracker::Result<()> {
    let filter = config.log_filter.as_deref();
    if config.log_json {
        init_json_logging(cli.verbose, cli.quiet, filter)
    } else {
        init_logging(cli.verbose, cli.quiet, filter)
    }
}

/// Handle errors with structured output support.
///
/// When --json is set or stdout is not a TTY, outputs structured JSON to stderr.
/// Otherwise, outputs human-readable error with optional color.
fn handle_error(err: &TrackerError, json_mode: bool) -> ! {
    let structured = StructuredError::from_error(err);
    let exit_code = structured.code.exit_code();

    // Determine output mode: JSON if --json flag or stdout is not a terminal
    let use_json = json_mode || !io::stdout().is_terminal();

    if use_json {
        let json = structured.to_json();
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        );
    } else {
        // Human-readable output with color if stderr is a terminal
        let use_color = io::stderr().is_terminal();
        eprintln!("{}", structured.to_human(use_color));
    }

    std::process::exit(exit_code);
}

fn build_cli_overrides(cli: &Cli) -> config::CliOverrides {
    let mut overrides = config::CliOverrides {
        db: cli.db.clone(),
        lock_timeout: cli.lock_timeout,
        ..Default::default()
    };
    if let Commands::Serve(args) = &cli.command {
        overrides.bind.clone_from(&args.bind);
        // Unset flags leave file and env values in place.
        overrides.memory = args.memory.then_some(true);
        overrides.strict_status = args.strict_status.then_some(true);
    }
    overrides
}
