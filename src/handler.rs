//! HTTP request handlers for the SBP gateway API
//!
//! Thin orchestration over the core modules:
//! - payer-facing issuance of payment links and QR payloads
//! - the `/pay/{session_id}` redirect itself
//! - admin CRUD over redirect rules and working hours
//!
//! Handlers add no invariants of their own; they read the clock, call into
//! `hours` / `rules` / `session` and let `ApiError` render failures.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Json,
};
use serde_json::{json, Value};

use crate::database::AppState;
use crate::error::ApiError;
use crate::hours;
use crate::model::{CreateRuleRequest, SessionKind, SetHoursRequest};
use crate::rules;
use crate::session;

// ---------------------------------------------------------------------------
// Payer-facing endpoints
// ---------------------------------------------------------------------------

/// Redirects a payment session to its bound bank URL
///
/// The target was snapshotted at issuance, so admin changes made since then
/// do not affect this session.
///
/// # Response
///
/// - **307 Temporary Redirect** - On to the bank payment page
/// - **404 Not Found** - Unknown session token
/// - **410 Gone** - Session TTL has passed; the payer must request a new one
pub async fn redeem_session(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, ApiError> {
    let session = session::redeem(&state, &session_id, state.clock.now())?;
    Ok(Redirect::temporary(&session.bound_target_url))
}

/// Issues a link-type payment session
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "session_id": "k3J9...",
///   "link": "https://gateway.example/pay/k3J9...",
///   "expires_at": "2026-09-01T12:05:00Z",
///   "expires_in": 300
/// }
/// ```
///
/// - **503 Service Unavailable** - `closed` outside working hours,
///   `maintenance` when no rule is resolvable
pub async fn payment_link(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let now = state.clock.now();
    let session = session::issue(&state, SessionKind::Link, now)?;

    Ok(Json(json!({
        "success": true,
        "session_id": session.session_id,
        "link": session::gateway_url(&state, &session.session_id),
        "expires_at": session.expires_at,
        "expires_in": (session.expires_at - now).num_seconds(),
    })))
}

/// Issues a QR-type payment session
///
/// Returns the gateway URL the caller encodes into a QR image; drawing the
/// image itself is the rendering layer's job.
pub async fn generate_qr(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let now = state.clock.now();
    let session = session::issue(&state, SessionKind::Qr, now)?;

    Ok(Json(json!({
        "success": true,
        "qr_code": {
            "url": session::gateway_url(&state, &session.session_id),
            "session_id": session.session_id,
            "expires_at": session.expires_at,
            "expires_in": (session.expires_at - now).num_seconds(),
        },
    })))
}

/// Availability probe for the payer page
///
/// Always answers 200; closure and maintenance are states, not errors.
///
/// # Response
///
/// ```json
/// { "available": false, "reason": "closed", "message": "Working hours: 10:00 - 21:00" }
/// ```
pub async fn payment_status(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let now = state.clock.now();

    if let Some(message) = hours::closed_reason(&state.db, now)? {
        return Ok(Json(json!({
            "available": false,
            "reason": "closed",
            "message": message,
        })));
    }

    if rules::resolve_active(&state.db, now)?.is_none() {
        return Ok(Json(json!({
            "available": false,
            "reason": "maintenance",
            "message": "Payment is temporarily unavailable",
        })));
    }

    Ok(Json(json!({
        "available": true,
        "message": "Payment is available",
    })))
}

// ---------------------------------------------------------------------------
// Admin endpoints (behind the token middleware)
// ---------------------------------------------------------------------------

/// Creates a new redirect rule as the live target
///
/// Every other rule is deactivated in the same transaction.
///
/// # Response
///
/// - **201 Created** - The full created record
/// - **400 Bad Request** - Malformed URL or inverted validity window
pub async fn create_rule(
    State(state): State<AppState>,
    Json(payload): Json<CreateRuleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let rule = rules::add_rule(&state.db, &payload, state.clock.now())?;
    tracing::info!(rule_id = rule.id, "redirect rule created");
    Ok((StatusCode::CREATED, Json(rule)))
}

/// Full rule history, newest first
pub async fn list_rules(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rules = rules::list_rules(&state.db)?;
    Ok(Json(rules))
}

/// The currently resolvable rule, or `{"active": false}`
pub async fn current_rule(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    match rules::resolve_active(&state.db, state.clock.now())? {
        Some(rule) => Ok(Json(json!({
            "active": true,
            "gateway_base": format!("{}/pay", state.public_url),
            "rule": rule,
        }))),
        None => Ok(Json(json!({ "active": false }))),
    }
}

/// Flips a rule's active flag
///
/// # Response
///
/// - **200 OK** - The updated record
/// - **404 Not Found** - Unknown rule id
/// - **422 Unprocessable Entity** - Turning on a rule outside its window
pub async fn toggle_rule(
    Path(id): Path<u64>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let rule = rules::toggle_rule(&state.db, id, state.clock.now())?;
    tracing::info!(rule_id = rule.id, is_active = rule.is_active, "redirect rule toggled");
    Ok(Json(rule))
}

/// Hard-deletes a rule; nothing is promoted in its place
pub async fn delete_rule(
    Path(id): Path<u64>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    rules::delete_rule(&state.db, id)?;
    tracing::info!(rule_id = id, "redirect rule deleted");
    Ok(Json(json!({
        "message": "Redirect rule deleted successfully",
        "deleted_id": id,
    })))
}

/// All seven weekday schedule rows
pub async fn get_working_hours(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = hours::list_hours(&state.db)?;
    Ok(Json(entries))
}

/// Upserts one weekday's accepting hours
///
/// # Response
///
/// - **200 OK** - The stored entry
/// - **400 Bad Request** - Bad `HH:MM` format or `work_start >= work_end`
pub async fn update_working_hours(
    State(state): State<AppState>,
    Json(payload): Json<SetHoursRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = hours::set_hours(&state.db, &payload)?;
    tracing::info!(day = entry.day_of_week, "working hours updated");
    Ok(Json(entry))
}
