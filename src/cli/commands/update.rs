//! Update command implementation.

use crate::cli::UpdateArgs;
use crate::cli::commands::{open_handler, print_json};
use crate::config::ServiceConfig;
use crate::error::{Result, TrackerError};
use crate::model::{FieldMap, IssueField};

/// Client fields for an update: the `--set` pairs plus `_id`.
#[must_use]
pub fn fields_from_args(args: &UpdateArgs) -> FieldMap {
    let mut fields: FieldMap = args.sets.iter().cloned().collect();
    fields.insert(IssueField::Id.as_str(), args.id.clone());
    fields
}

/// Execute the update command.
///
/// # Errors
///
/// Returns an error if nothing is set, the issue does not exist in the
/// project, or the store fails.
pub async fn execute(args: &UpdateArgs, json: bool, config: &ServiceConfig) -> Result<()> {
    let handler = open_handler(config)?;
    let confirmation = handler
        .update(&args.project, &fields_from_args(args))
        .await
        .map_err(TrackerError::from)?;

    if json {
        print_json(&confirmation)?;
    } else {
        println!("{} {}", confirmation.result, confirmation.id);
    }
    Ok(())
}
