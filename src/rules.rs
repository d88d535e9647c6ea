//! Redirect rule store
//!
//! Ordered history of candidate redirect targets. Each rule carries a
//! validity window and an exclusive "active" flag: at most one rule is
//! active at any instant (zero is allowed -- "no active link").
//!
//! `add_rule` enforces exclusivity automatically: the insert and the
//! deactivation of every predecessor happen inside one redb write
//! transaction, so concurrent readers observe either the old exclusive
//! state or the new one, never two active rules or a gap. `toggle_rule`
//! deliberately does NOT deactivate siblings -- manual toggles are the
//! admin's responsibility, matching the observed product behavior.

use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable};
use url::Url;

use crate::database::{NEXT_RULE_ID, TABLE_META, TABLE_RULES};
use crate::error::ApiError;
use crate::model::{CreateRuleRequest, RedirectRule};

/// Creates a new rule as the live target
///
/// The new rule is inserted with `is_active = true` and, in the same atomic
/// unit, every other rule's flag is cleared. Rejects malformed target URLs
/// and inverted validity windows before touching storage.
pub fn add_rule(
    db: &Database,
    req: &CreateRuleRequest,
    now: DateTime<Utc>,
) -> Result<RedirectRule, ApiError> {
    validate_target_url(&req.target_url)?;

    if req.valid_from >= req.valid_until {
        return Err(ApiError::Validation(
            "valid_from must be before valid_until".to_string(),
        ));
    }

    let write_txn = db.begin_write()?;
    let rule;
    {
        let mut table = write_txn.open_table(TABLE_RULES)?;

        // Deactivate every predecessor inside this transaction. Collect
        // first: the iterator holds a shared borrow of the table.
        let mut active: Vec<(u64, RedirectRule)> = Vec::new();
        for item in table.iter()? {
            let (key, value) = item?;
            let existing: RedirectRule = serde_json::from_str(value.value())?;
            if existing.is_active {
                active.push((key.value(), existing));
            }
        }
        for (id, mut existing) in active {
            existing.is_active = false;
            let existing_json = serde_json::to_string(&existing)?;
            table.insert(id, existing_json.as_str())?;
        }

        let mut meta = write_txn.open_table(TABLE_META)?;
        let id = meta.get(NEXT_RULE_ID)?.map(|g| g.value()).unwrap_or(1);
        meta.insert(NEXT_RULE_ID, id + 1)?;

        rule = RedirectRule {
            id,
            name: req.name.clone(),
            target_url: req.target_url.clone(),
            valid_from: req.valid_from,
            valid_until: req.valid_until,
            is_active: true,
            created_at: now,
        };
        let rule_json = serde_json::to_string(&rule)?;
        table.insert(id, rule_json.as_str())?;
    }
    write_txn.commit()?;

    Ok(rule)
}

/// Flips a rule's active flag
///
/// Turning a rule on requires `now` to be inside its validity window;
/// otherwise the call fails with `RuleExpired` and storage is untouched.
/// Turning off is always allowed. Unlike `add_rule`, toggling on does not
/// deactivate other rules.
pub fn toggle_rule(db: &Database, id: u64, now: DateTime<Utc>) -> Result<RedirectRule, ApiError> {
    let write_txn = db.begin_write()?;
    let rule;
    {
        let mut table = write_txn.open_table(TABLE_RULES)?;

        let mut existing: RedirectRule = match table.get(id)? {
            Some(guard) => serde_json::from_str(guard.value())?,
            None => return Err(ApiError::NotFound(format!("rule {} not found", id))),
        };

        if !existing.is_active {
            if now > existing.valid_until {
                return Err(ApiError::RuleExpired(format!(
                    "rule {} expired at {}",
                    id,
                    existing.valid_until.to_rfc3339(),
                )));
            }
            if now < existing.valid_from {
                return Err(ApiError::RuleExpired(format!(
                    "rule {} is not valid until {}",
                    id,
                    existing.valid_from.to_rfc3339(),
                )));
            }
        }

        existing.is_active = !existing.is_active;
        let existing_json = serde_json::to_string(&existing)?;
        table.insert(id, existing_json.as_str())?;
        rule = existing;
    }
    write_txn.commit()?;

    Ok(rule)
}

/// Hard-deletes a rule
///
/// Deleting the active rule leaves zero active rules; nothing is promoted
/// in its place.
pub fn delete_rule(db: &Database, id: u64) -> Result<(), ApiError> {
    let write_txn = db.begin_write()?;
    {
        let mut table = write_txn.open_table(TABLE_RULES)?;
        if table.remove(id)?.is_none() {
            return Err(ApiError::NotFound(format!("rule {} not found", id)));
        }
    }
    write_txn.commit()?;

    Ok(())
}

/// The rule payers are redirected to right now, if any
///
/// A rule resolves only when it is both flagged active and its validity
/// window contains `now` (inclusive bounds). A flagged-active rule whose
/// window has passed yields `None` -- the flag is not cleared. Should
/// manual toggles ever leave several qualifying rules, the newest one wins.
pub fn resolve_active(db: &Database, now: DateTime<Utc>) -> Result<Option<RedirectRule>, ApiError> {
    let read_txn = db.begin_read()?;
    let table = read_txn.open_table(TABLE_RULES)?;

    for item in table.iter()?.rev() {
        let (_, value) = item?;
        let rule: RedirectRule = serde_json::from_str(value.value())?;
        if rule.is_active && rule.valid_from <= now && now <= rule.valid_until {
            return Ok(Some(rule));
        }
    }
    Ok(None)
}

/// Full rule history, newest first, for the admin console
pub fn list_rules(db: &Database) -> Result<Vec<RedirectRule>, ApiError> {
    let read_txn = db.begin_read()?;
    let table = read_txn.open_table(TABLE_RULES)?;

    let mut rules = Vec::new();
    for item in table.iter()?.rev() {
        let (_, value) = item?;
        rules.push(serde_json::from_str(value.value())?);
    }
    Ok(rules)
}

fn validate_target_url(raw: &str) -> Result<(), ApiError> {
    let parsed = Url::parse(raw)
        .map_err(|e| ApiError::Validation(format!("invalid target_url: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ApiError::Validation(format!(
            "unsupported target_url scheme: {}",
            other
        ))),
    }
}
