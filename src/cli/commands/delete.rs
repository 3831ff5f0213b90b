//! Delete command implementation.

use crate::cli::DeleteArgs;
use crate::cli::commands::{open_handler, print_json};
use crate::config::ServiceConfig;
use crate::error::{Result, TrackerError};
use crate::model::{FieldMap, IssueField};

/// Execute the delete command.
///
/// # Errors
///
/// Returns an error if the issue does not exist in the project or the
/// store fails.
pub async fn execute(args: &DeleteArgs, json: bool, config: &ServiceConfig) -> Result<()> {
    let handler = open_handler(config)?;
    let fields: FieldMap = [(IssueField::Id.as_str(), args.id.as_str())]
        .into_iter()
        .collect();
    let confirmation = handler
        .delete(&args.project, &fields)
        .await
        .map_err(TrackerError::from)?;

    if json {
        print_json(&confirmation)?;
    } else {
        println!("{} {}", confirmation.result, confirmation.id);
    }
    Ok(())
}
