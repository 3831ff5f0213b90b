//! List command implementation.

use crate::cli::ListArgs;
use crate::cli::commands::{format_issue_line, open_handler, print_json};
use crate::config::ServiceConfig;
use crate::error::{Result, TrackerError};
use crate::storage::IssueFilter;

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or queried.
pub async fn execute(args: &ListArgs, json: bool, config: &ServiceConfig) -> Result<()> {
    let handler = open_handler(config)?;
    let filter = IssueFilter::from_pairs(args.filters.iter().map(|(k, v)| (k, v)));
    let issues = handler
        .query_filter(&args.project, &filter)
        .await
        .map_err(TrackerError::from)?;

    if json {
        print_json(&issues)?;
    } else if issues.is_empty() {
        println!("No issues found.");
    } else {
        for issue in &issues {
            println!("{}", format_issue_line(issue));
        }
    }
    Ok(())
}
