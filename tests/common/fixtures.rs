#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use issue_tracker::model::{FieldMap, NewIssue};

/// Base time for fixtures, set in the past so tests can move `updated_on`
/// forward without crossing `created_on`.
pub fn base_time() -> DateTime<Utc> {
    Utc.timestamp_opt(1_735_689_600, 0).unwrap() // 2025-01-01 00:00:00 UTC
}

pub fn new_issue(title: &str) -> NewIssue {
    NewIssue {
        issue_title: title.to_string(),
        issue_text: format!("{title} text"),
        created_by: "tester".to_string(),
        assigned_to: String::new(),
        status_text: String::new(),
        created_on: base_time(),
        open: true,
    }
}

pub struct IssueBuilder {
    issue: NewIssue,
}

impl IssueBuilder {
    pub fn new(title: &str) -> Self {
        Self {
            issue: new_issue(title),
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.issue.issue_text = text.to_string();
        self
    }

    pub fn with_creator(mut self, created_by: &str) -> Self {
        self.issue.created_by = created_by.to_string();
        self
    }

    pub fn with_assignee(mut self, assigned_to: &str) -> Self {
        self.issue.assigned_to = assigned_to.to_string();
        self
    }

    pub fn with_status_text(mut self, status_text: &str) -> Self {
        self.issue.status_text = status_text.to_string();
        self
    }

    pub fn closed(mut self) -> Self {
        self.issue.open = false;
        self
    }

    pub fn created_minutes_later(mut self, minutes: i64) -> Self {
        self.issue.created_on = base_time() + Duration::minutes(minutes);
        self
    }

    pub fn build(self) -> NewIssue {
        self.issue
    }

    /// The same issue as client fields, the way a form or JSON body sends it.
    pub fn fields(self) -> FieldMap {
        let issue = self.issue;
        let mut fields: FieldMap = [
            ("issue_title", issue.issue_title),
            ("issue_text", issue.issue_text),
            ("created_by", issue.created_by),
        ]
        .into_iter()
        .collect();
        if !issue.assigned_to.is_empty() {
            fields.insert("assigned_to", issue.assigned_to);
        }
        if !issue.status_text.is_empty() {
            fields.insert("status_text", issue.status_text);
        }
        fields
    }
}
