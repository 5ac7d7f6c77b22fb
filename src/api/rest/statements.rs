//! Statement endpoints

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use super::{encoded, ApiError};
use crate::api::http::STATEMENTS_PATH;
use crate::api::state::AppState;
use crate::service::PageQuery;
use crate::types::{to_canonical_json, FilterCriteria};
use crate::validation::decode_batch;

/// Query parameters for GET /xAPI/statements
#[derive(Debug, Deserialize)]
pub struct StatementQuery {
    /// Fetch a single statement; excludes the filter parameters
    #[serde(rename = "statementId")]
    pub statement_id: Option<String>,
    /// Canonical actor identifier, e.g. `mailto:a@example.org`
    pub actor: Option<String>,
    /// Activity IRI
    pub activity: Option<String>,
    /// Maximum number of statements in the page
    pub limit: Option<usize>,
    /// Continuation token from a previous page
    pub more: Option<String>,
}

/// GET /xAPI/statements - Single statement or filtered statement result
pub async fn get_statements(
    State(state): State<Arc<AppState>>,
    query: Result<Query<StatementQuery>, QueryRejection>,
) -> Response {
    let params = match query {
        Ok(Query(params)) => params,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };

    if let Some(id) = params.statement_id {
        if params.actor.is_some() || params.activity.is_some() {
            return ApiError::bad_request("statementId cannot be combined with actor or activity")
                .into_response();
        }
        return match state.service.get_statement(&id).await {
            Ok(statement) => encoded(StatusCode::OK, statement.to_json()),
            Err(e) => ApiError::from(e).into_response(),
        };
    }

    let criteria = FilterCriteria::from_params(None, params.actor, params.activity);
    let page = PageQuery {
        limit: params.limit,
        more: params.more,
    };

    match state.service.get_statements(&criteria, &page).await {
        Ok(mut result) => {
            result.more = result
                .more
                .map(|token| more_irl(&criteria, page.limit, &token));
            encoded(StatusCode::OK, result.to_json())
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// POST /xAPI/statements - Store one statement or an array of statements
pub async fn post_statements(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };

    let statements = match decode_batch(body) {
        Ok(statements) => statements,
        Err(e) => return ApiError::bad_request(e.to_string()).into_response(),
    };

    match state.service.post_statements(statements).await {
        Ok(ids) => encoded(StatusCode::OK, to_canonical_json("STATEMENT_IDS", &ids)),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Relative IRL for the next page, carrying the same filters
fn more_irl(criteria: &FilterCriteria, limit: Option<usize>, token: &str) -> String {
    let mut params: Vec<String> = criteria
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect();
    if let Some(limit) = limit {
        params.push(format!("limit={}", limit));
    }
    params.push(format!("more={}", urlencoding::encode(token)));
    format!("{}?{}", STATEMENTS_PATH, params.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_more_irl_keeps_filters() {
        let criteria = FilterCriteria::new()
            .actor("mailto:a@example.org")
            .activity("http://example.org/course/1");
        let irl = more_irl(&criteria, Some(10), "p1a");
        assert_eq!(
            irl,
            "/xAPI/statements?actor=mailto%3Aa%40example.org&activity=http%3A%2F%2Fexample.org%2Fcourse%2F1&limit=10&more=p1a"
        );
    }

    #[test]
    fn test_more_irl_unfiltered() {
        assert_eq!(more_irl(&FilterCriteria::new(), None, "p2"), "/xAPI/statements?more=p2");
    }
}
