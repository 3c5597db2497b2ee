//! Application constants and configuration values.
//!
//! Error messages returned to clients live here so handlers, services and
//! tests agree on the exact wording.

/// Messages surfaced in `{"error": ...}` bodies
pub mod messages {
    /// Submitted item text was empty or whitespace only
    pub const EMPTY_ITEM_ERROR: &str = "You can't have an empty list item";

    /// Submitted item text already exists in the target list
    pub const DUPLICATE_ITEM_ERROR: &str = "You've already got this in your list";

    pub const LIST_NOT_FOUND: &str = "List not found";

    /// Fallback for paths that match no route
    pub const ROUTE_NOT_FOUND: &str = "Not found";

    /// Generic message for 5xx responses; internals are only logged
    pub const INTERNAL_ERROR: &str = "An internal server error occurred";
}

/// Server defaults used when the environment does not override them
pub mod server {
    pub const DEFAULT_HOST: &str = "0.0.0.0";
    pub const DEFAULT_PORT: u16 = 8000;

    /// Request timeout in seconds
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Response header carrying the per-request correlation id
    pub const REQUEST_ID_HEADER: &str = "x-request-id";
}

/// Database constants
pub mod database {
    /// Default pool size
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

    pub const MIN_CONNECTIONS: u32 = 1;

    /// Connection acquire timeout in seconds
    pub const ACQUIRE_TIMEOUT_SECS: u64 = 3;

    /// Idle connection timeout in seconds
    pub const IDLE_TIMEOUT_SECS: u64 = 180;

    /// PostgreSQL SQLSTATE for unique_violation
    pub const UNIQUE_VIOLATION: &str = "23505";

    /// PostgreSQL SQLSTATE for foreign_key_violation
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
}
