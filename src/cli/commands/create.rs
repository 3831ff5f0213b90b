//! Create command implementation.

use crate::cli::CreateArgs;
use crate::cli::commands::{open_handler, print_json};
use crate::config::ServiceConfig;
use crate::error::{Result, TrackerError};
use crate::model::{FieldMap, IssueField};

/// Map create flags onto client fields. Unset flags stay absent.
#[must_use]
pub fn fields_from_args(args: &CreateArgs) -> FieldMap {
    [
        (IssueField::IssueTitle, &args.title),
        (IssueField::IssueText, &args.text),
        (IssueField::CreatedBy, &args.created_by),
        (IssueField::AssignedTo, &args.assigned_to),
        (IssueField::StatusText, &args.status_text),
    ]
    .into_iter()
    .filter_map(|(field, value)| value.as_ref().map(|v| (field.as_str(), v.clone())))
    .collect()
}

/// Execute the create command.
///
/// # Errors
///
/// Returns an error if a required field is missing or the store fails.
pub async fn execute(args: &CreateArgs, json: bool, config: &ServiceConfig) -> Result<()> {
    let handler = open_handler(config)?;
    let issue = handler
        .create(&args.project, &fields_from_args(args))
        .await
        .map_err(TrackerError::from)?;

    if json {
        print_json(&issue)?;
    } else {
        println!("Created {}: {}", issue.id, issue.issue_title);
    }
    Ok(())
}
