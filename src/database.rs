//! Database initialization, table definitions and shared state
//!
//! This module handles the setup of the embedded redb database: the redirect
//! rule history, the per-weekday working hours and the monotonic id counter.
//! It also defines the application state shared across request handlers.

use redb::{Database, ReadableTable, TableDefinition};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::ApiError;
use crate::hours::{self, Clock};
use crate::model::PaymentSession;

/// Redirect rule history
///
/// Key: rule id (monotonic u64)
/// Value: JSON-serialized RedirectRule
pub const TABLE_RULES: TableDefinition<u64, &str> = TableDefinition::new("rules_v1");

/// Accepting hours, one row per weekday
///
/// Key: weekday index (0 = Monday .. 6 = Sunday)
/// Value: JSON-serialized WorkingHoursEntry
pub const TABLE_HOURS: TableDefinition<u8, &str> = TableDefinition::new("working_hours_v1");

/// Counters and flags that must survive restarts
///
/// Currently holds only the next rule id under [`NEXT_RULE_ID`].
pub const TABLE_META: TableDefinition<&str, u64> = TableDefinition::new("meta_v1");

/// Meta key for the monotonic rule id counter
pub const NEXT_RULE_ID: &str = "next_rule_id";

/// Issued payment sessions, keyed by session token
///
/// Sessions are ephemeral: they are never persisted and never swept. Expiry
/// is enforced by a timestamp comparison at redeem time only.
pub type SessionMap = Arc<RwLock<HashMap<String, PaymentSession>>>;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe reference to the embedded database
    pub db: Arc<Database>,

    /// In-memory store of issued payment sessions
    pub sessions: SessionMap,

    /// Public base URL embedded in issued gateway links
    pub public_url: String,

    /// Time source for all scheduling decisions; fixed in tests
    pub clock: Clock,
}

impl AppState {
    pub fn new(db: Database, public_url: impl Into<String>) -> Self {
        AppState {
            db: Arc::new(db),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            public_url: public_url.into(),
            clock: Clock::System,
        }
    }
}

/// Initializes the embedded database and creates required tables
///
/// On the very first boot (empty working hours table) the seven default
/// rows are seeded: every day enabled, 10:00-21:00 Moscow time. This is a
/// one-time initialization, not a runtime fallback -- an admin who later
/// disables or narrows a day is never overridden.
///
/// # Arguments
///
/// * `db_path` - File path where the database should be stored
pub fn init_db(db_path: &str) -> Result<Database, ApiError> {
    // Create or open the database file
    let db = Database::create(db_path).map_err(redb::Error::from)?;

    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_RULES)?;
        write_txn.open_table(TABLE_META)?;

        let mut table_hours = write_txn.open_table(TABLE_HOURS)?;

        // First boot: install the default schedule. The Monday row doubles
        // as the seed marker; the admin API can disable days but never
        // delete rows, so it stays present.
        if table_hours.get(0u8)?.is_none() {
            for day in 0..7u8 {
                let entry = hours::default_entry(day);
                let entry_json = serde_json::to_string(&entry)?;
                table_hours.insert(day, entry_json.as_str())?;
            }
        }
    }
    write_txn.commit()?;

    Ok(db)
}
