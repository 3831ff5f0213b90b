mod common;

use common::cli::{IssuesWorkspace, extract_json_payload, run_issues};
use serde_json::Value;

fn parse_created_id(stdout: &str) -> String {
    let line = stdout.lines().next().unwrap_or("");
    let id_part = line
        .strip_prefix("Created ")
        .and_then(|rest| rest.split(':').next())
        .unwrap_or("");
    id_part.trim().to_string()
}

#[test]
fn e2e_basic_lifecycle() {
    let workspace = IssuesWorkspace::new();

    let create = run_issues(
        &workspace,
        [
            "create",
            "apitest",
            "--title",
            "Test issue",
            "--text",
            "Something broke",
            "--created-by",
            "alice",
        ],
        "create",
    );
    assert!(create.status.success(), "create failed: {}", create.stderr);
    let id = parse_created_id(&create.stdout);
    assert_eq!(id.len(), 24, "unexpected create output: {}", create.stdout);

    let list = run_issues(&workspace, ["list", "apitest"], "list");
    assert!(list.status.success(), "list failed: {}", list.stderr);
    assert!(list.stdout.contains(&id));
    assert!(list.stdout.contains("[open]"));
    assert!(list.stdout.contains("Test issue"));

    let update = run_issues(
        &workspace,
        [
            "update",
            "apitest",
            &id,
            "--set",
            "assigned_to=bob",
            "--set",
            "open=false",
        ],
        "update",
    );
    assert!(update.status.success(), "update failed: {}", update.stderr);
    assert_eq!(
        update.stdout.trim(),
        format!("successfully updated {id}")
    );

    let list_json = run_issues(
        &workspace,
        ["list", "apitest", "--filter", "open=false", "--json"],
        "list_json",
    );
    assert!(list_json.status.success(), "list failed: {}", list_json.stderr);
    let payload = extract_json_payload(&list_json.stdout);
    let issues: Vec<Value> = serde_json::from_str(&payload).expect("list json");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["_id"], id.as_str());
    assert_eq!(issues[0]["assigned_to"], "bob");
    assert_eq!(issues[0]["open"], false);

    let delete = run_issues(
        &workspace,
        ["delete", "apitest", &id, "--json"],
        "delete",
    );
    assert!(delete.status.success(), "delete failed: {}", delete.stderr);
    let confirmation: Value =
        serde_json::from_str(&extract_json_payload(&delete.stdout)).expect("delete json");
    assert_eq!(confirmation["result"], "successfully deleted");
    assert_eq!(confirmation["_id"], id.as_str());

    let empty = run_issues(&workspace, ["list", "apitest"], "list_empty");
    assert!(empty.status.success());
    assert!(empty.stdout.contains("No issues found."));
}

#[test]
fn e2e_create_json_output() {
    let workspace = IssuesWorkspace::new();

    let create = run_issues(
        &workspace,
        [
            "create",
            "apitest",
            "--title",
            "JSON issue",
            "--text",
            "Body",
            "--created-by",
            "alice",
            "--status-text",
            "In QA",
            "--json",
        ],
        "create_json",
    );
    assert!(create.status.success(), "create failed: {}", create.stderr);
    let issue: Value =
        serde_json::from_str(&extract_json_payload(&create.stdout)).expect("create json");
    assert_eq!(issue["issue_title"], "JSON issue");
    assert_eq!(issue["status_text"], "In QA");
    assert_eq!(issue["assigned_to"], "");
    assert_eq!(issue["open"], true);
    assert_eq!(issue["project"], "apitest");
}

#[test]
fn e2e_projects_share_a_database_but_not_issues() {
    let workspace = IssuesWorkspace::new();

    for project in ["alpha", "beta"] {
        let create = run_issues(
            &workspace,
            [
                "create",
                project,
                "--title",
                project,
                "--text",
                "t",
                "--created-by",
                "me",
            ],
            &format!("create_{project}"),
        );
        assert!(create.status.success(), "create failed: {}", create.stderr);
    }

    let alpha = run_issues(&workspace, ["list", "alpha", "--json"], "list_alpha");
    let issues: Vec<Value> =
        serde_json::from_str(&extract_json_payload(&alpha.stdout)).expect("list json");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["issue_title"], "alpha");
}
