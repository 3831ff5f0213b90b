//! Serve command implementation.

use crate::cli::commands::open_handler;
use crate::config::ServiceConfig;
use crate::error::Result;
use crate::server::{self, AppState};

/// Run the HTTP service until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the address cannot be bound.
pub async fn execute(config: &ServiceConfig) -> Result<()> {
    let handler = open_handler(config)?;
    tracing::info!(
        bind = %config.bind,
        db = %config.db_path.display(),
        memory = config.memory,
        strict_status = config.strict_status,
        "Starting issue service"
    );
    server::serve(config.bind, AppState::new(handler, config.strict_status)).await
}
