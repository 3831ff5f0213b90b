//! Client field extraction for HTTP requests.
//!
//! Query strings become an [`IssueFilter`] directly. Bodies may be JSON or
//! `application/x-www-form-urlencoded`. A body that cannot be read is
//! treated as carrying no fields, so the handler answers with its own
//! validation error instead of a transport rejection.

use crate::model::FieldMap;
use crate::storage::IssueFilter;
use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Form, FromRequest, Query, Request};
use axum::http::header::CONTENT_TYPE;
use serde_json::Value;

/// Pairs decoded from a URL query string or form body.
pub type Pairs = Vec<(String, String)>;

/// Filter from a request's query string. Every pair is kept, so a repeated
/// name constrains the field once per value.
pub fn query_filter(query: Result<Query<Pairs>, QueryRejection>) -> IssueFilter {
    match query {
        Ok(Query(pairs)) => IssueFilter::from_pairs(pairs),
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Unreadable query string");
            IssueFilter::all()
        }
    }
}

/// Fields from a request body.
pub async fn body_fields(req: Request) -> FieldMap {
    if is_form(&req) {
        return match Form::<Pairs>::from_request(req, &()).await {
            Ok(Form(pairs)) => pairs.into_iter().collect(),
            Err(rejection) => {
                tracing::warn!(error = %rejection, "Unreadable form body");
                FieldMap::new()
            }
        };
    }

    let bytes = match Bytes::from_request(req, &()).await {
        Ok(bytes) => bytes,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Unreadable request body");
            return FieldMap::new();
        }
    };
    json_fields(&bytes)
}

fn json_fields(bytes: &[u8]) -> FieldMap {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return FieldMap::new();
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => FieldMap::from_json(&value),
        Err(e) => {
            tracing::warn!(error = %e, "Request body is not JSON");
            FieldMap::new()
        }
    }
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value
                .to_ascii_lowercase()
                .starts_with("application/x-www-form-urlencoded")
        })
}
