use crate::state::AppState;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rollcall_runtime::{AuthError, IssueError, RedeemError, RedemptionOutcome};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/auth/sessions", post(issue_session))
        .route("/auth/logout", post(logout))
        .route("/auth/verify", get(verify))
        .route("/checkins", post(issue_checkin))
        .route("/checkins/redeem", post(redeem))
        .with_state(state)
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "service": "rollcall-server" }))
}

#[derive(Deserialize)]
struct IssueSessionRequest {
    subject_id: String,
    role: String,
    ttl_secs: Option<u64>,
}

async fn issue_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IssueSessionRequest>,
) -> Response {
    let ttl = chrono::Duration::seconds(
        req.ttl_secs.unwrap_or(state.cfg.tokens.session_ttl_secs) as i64,
    );
    match state
        .authenticator
        .sessions()
        .issue(&req.subject_id, &req.role, ttl)
    {
        Ok(token) => Json(json!({ "token": token })).into_response(),
        Err(e) => {
            tracing::debug!(error = %e, "session issuance refused");
            error_response(StatusCode::BAD_REQUEST, "invalid_request")
        }
    }
}

async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let Some(token) = extract_bearer(&headers) else {
        return error_response(StatusCode::UNAUTHORIZED, "invalid_token");
    };
    match state.authenticator.logout(&token, "logout").await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => auth_error_response(e),
    }
}

async fn verify(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let Some(token) = extract_bearer(&headers) else {
        return error_response(StatusCode::UNAUTHORIZED, "invalid_token");
    };
    match state.authenticator.authenticate(&token).await {
        Ok(claims) => Json(json!({
            "subject_id": claims.subject_id,
            "role": claims.role,
            "expires_at": claims.expires_at,
        }))
        .into_response(),
        Err(e) => auth_error_response(e),
    }
}

#[derive(Deserialize)]
struct IssueCheckinRequest {
    session_id: String,
}

/// Check-in issuance requires an authenticated caller; the caller's own
/// identity becomes the token's issuer.
async fn issue_checkin(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<IssueCheckinRequest>,
) -> Response {
    let Some(token) = extract_bearer(&headers) else {
        return error_response(StatusCode::UNAUTHORIZED, "invalid_token");
    };
    let claims = match state.authenticator.authenticate(&token).await {
        Ok(claims) => claims,
        Err(e) => return auth_error_response(e),
    };

    match state
        .issuer
        .issue_checkin(&req.session_id, &claims.subject_id)
        .await
    {
        Ok(issued) => Json(issued).into_response(),
        Err(IssueError::Token(e)) => {
            tracing::debug!(error = %e, "check-in issuance refused");
            error_response(StatusCode::BAD_REQUEST, "invalid_request")
        }
        Err(IssueError::Unavailable(e)) => {
            tracing::warn!(error = %e, "check-in issuance failed");
            error_response(StatusCode::SERVICE_UNAVAILABLE, "infrastructure_unavailable")
        }
    }
}

#[derive(Deserialize)]
struct RedeemRequest {
    token: String,
    holder_id: String,
}

async fn redeem(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RedeemRequest>,
) -> Response {
    match state.coordinator.redeem(&req.token, &req.holder_id).await {
        Ok(RedemptionOutcome::Recorded(record)) => Json(json!({
            "status": "recorded",
            "record": record,
        }))
        .into_response(),
        Ok(RedemptionOutcome::AlreadyRecorded(record)) => Json(json!({
            "status": "already_recorded",
            "record": record,
        }))
        .into_response(),
        Ok(RedemptionOutcome::Rejected(reason)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "status": "rejected",
                "reason": reason.code(),
            })),
        )
            .into_response(),
        Err(RedeemError::Unavailable(e)) => {
            tracing::warn!(error = %e, "redemption failed on infrastructure");
            error_response(StatusCode::SERVICE_UNAVAILABLE, "infrastructure_unavailable")
        }
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let v = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;
    let rest = v.strip_prefix("Bearer ")?.trim();
    if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    }
}

fn auth_error_response(e: AuthError) -> Response {
    let status = match e {
        AuthError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::UNAUTHORIZED,
    };
    error_response(status, e.code())
}

fn error_response(status: StatusCode, code: &str) -> Response {
    (status, Json(json!({ "error": code }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(
            axum::http::header::AUTHORIZATION,
            "Bearer abc.def".parse().unwrap(),
        );
        assert_eq!(extract_bearer(&headers), Some("abc.def".to_string()));

        headers.insert(axum::http::header::AUTHORIZATION, "Basic xyz".parse().unwrap());
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(axum::http::header::AUTHORIZATION, "Bearer ".parse().unwrap());
        assert_eq!(extract_bearer(&headers), None);
    }
}
