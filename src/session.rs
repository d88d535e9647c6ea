//! Payment session issuer
//!
//! Mints short-lived redirect artifacts for payers. Issuance consults the
//! working hours gate, resolves the currently active rule and snapshots its
//! target URL into an immutable session with a fixed 300 second TTL.
//!
//! The issuer keeps no state across calls beyond the session map itself:
//! there is no background expiry sweep, no renewal, no payment tracking.
//! A payer whose artifact lapsed simply requests a fresh one; the old
//! session id never re-resolves to a newer rule.

use chrono::{DateTime, Duration, Utc};
use rand::{distr::Alphanumeric, Rng};

use crate::database::AppState;
use crate::error::ApiError;
use crate::hours;
use crate::model::{PaymentSession, SessionKind};
use crate::rules;

/// Fixed artifact lifetime in seconds
pub const SESSION_TTL_SECS: i64 = 300;

/// Session token length; 32 alphanumeric chars is ~190 bits of entropy,
/// comfortably unguessable
const SESSION_ID_LEN: usize = 32;

/// Issues a new payment session
///
/// Fails with `Closed` outside working hours and `NoActiveRule` when no
/// rule is currently resolvable. Concurrent calls are fully independent;
/// each gets its own token.
pub fn issue(
    state: &AppState,
    kind: SessionKind,
    now: DateTime<Utc>,
) -> Result<PaymentSession, ApiError> {
    if let Some(message) = hours::closed_reason(&state.db, now)? {
        return Err(ApiError::Closed(message));
    }

    let rule = rules::resolve_active(&state.db, now)?.ok_or(ApiError::NoActiveRule)?;

    let session = PaymentSession {
        session_id: mint_session_id(),
        kind,
        bound_target_url: rule.target_url,
        issued_at: now,
        expires_at: now + Duration::seconds(SESSION_TTL_SECS),
    };

    state
        .sessions
        .write()
        .expect("session map lock poisoned")
        .insert(session.session_id.clone(), session.clone());

    Ok(session)
}

/// Looks up a session for redemption
///
/// Expiry is a pure timestamp comparison at read time; expired sessions are
/// reported as `SessionExpired` (not `NotFound`) so the payer page can tell
/// "stale artifact" apart from "made-up token".
pub fn redeem(
    state: &AppState,
    session_id: &str,
    now: DateTime<Utc>,
) -> Result<PaymentSession, ApiError> {
    let sessions = state.sessions.read().expect("session map lock poisoned");

    match sessions.get(session_id) {
        None => Err(ApiError::NotFound("payment session not found".to_string())),
        Some(session) if now >= session.expires_at => Err(ApiError::SessionExpired),
        Some(session) => Ok(session.clone()),
    }
}

/// The externally visible gateway URL for a session
pub fn gateway_url(state: &AppState, session_id: &str) -> String {
    format!("{}/pay/{}", state.public_url, session_id)
}

fn mint_session_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}
