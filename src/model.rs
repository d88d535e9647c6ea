//! Data models for the SBP redirect gateway
//!
//! This module defines the records persisted in the database, the ephemeral
//! payment session, and the request payloads accepted by the admin API.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A redirect rule pointing at a real bank payment URL
///
/// At most one rule is flagged active at any given time. The flag marks the
/// admin's intended live target; whether the rule is actually handed out also
/// depends on its validity window containing the present moment.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RedirectRule {
    /// Unique id, assigned monotonically at creation
    pub id: u64,

    /// Optional human-readable label for the admin history view
    pub name: Option<String>,

    /// The real bank payment URL payers are redirected to.
    /// Opaque beyond basic http/https syntax validation.
    pub target_url: String,

    /// Start of the validity window (inclusive)
    pub valid_from: DateTime<Utc>,

    /// End of the validity window (inclusive). Passing this instant never
    /// flips `is_active`; it only stops the rule from resolving.
    pub valid_until: DateTime<Utc>,

    /// Exclusive "live target" flag. Creating a new rule deactivates every
    /// other rule in the same transaction.
    pub is_active: bool,

    /// Immutable creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Accepting hours for one weekday (Monday = 0)
///
/// One row per day. Days absent from the table are closed; the seven default
/// rows (10:00-21:00, enabled) are seeded once at first boot.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WorkingHoursEntry {
    /// Weekday index, 0 = Monday .. 6 = Sunday
    pub day_of_week: u8,

    /// Opening time of day, Moscow civil time
    pub work_start: NaiveTime,

    /// Closing time of day, exclusive
    pub work_end: NaiveTime,

    /// When false the whole day is closed regardless of hours
    pub is_enabled: bool,
}

/// Which artifact the payer asked for
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Link,
    Qr,
}

/// A short-lived redirect artifact handed to a single payer
///
/// The target URL is captured by value at issuance, so a later admin change
/// never retroactively alters an already-issued artifact. Sessions live only
/// in memory and become inert once `expires_at` passes; nothing deletes them
/// eagerly.
#[derive(Serialize, Debug, Clone)]
pub struct PaymentSession {
    /// High-entropy unguessable token, embedded in the gateway URL
    pub session_id: String,

    pub kind: SessionKind,

    /// Snapshot of the active rule's `target_url` at issuance time
    pub bound_target_url: String,

    pub issued_at: DateTime<Utc>,

    /// `issued_at` + 300 seconds, fixed TTL
    pub expires_at: DateTime<Utc>,
}

/// Request payload for creating a redirect rule
///
/// # Example
/// ```json
/// {
///   "name": "September QR batch",
///   "target_url": "https://qr.nspk.ru/AD10001...",
///   "valid_from": "2026-09-01T00:00:00Z",
///   "valid_until": "2026-09-30T23:59:59Z"
/// }
/// ```
#[derive(Deserialize)]
pub struct CreateRuleRequest {
    pub name: Option<String>,

    /// The bank payment URL; must parse as an http/https URL
    pub target_url: String,

    pub valid_from: DateTime<Utc>,

    /// Must be strictly after `valid_from`
    pub valid_until: DateTime<Utc>,
}

/// Request payload for upserting one weekday's accepting hours
///
/// Times come in as `HH:MM` strings (the format the admin console sends)
/// and are parsed at the boundary.
#[derive(Deserialize)]
pub struct SetHoursRequest {
    /// Weekday index, 0 = Monday .. 6 = Sunday
    pub day_of_week: u8,

    /// Opening time, e.g. "10:00"
    pub work_start: String,

    /// Closing time, e.g. "21:00"; must be after `work_start`
    pub work_end: String,

    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
}

fn default_enabled() -> bool {
    true
}
