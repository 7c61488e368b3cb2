//! Table and column names of the hosted schema.
//!
//! Accounts live in the `characters` table; the owner reference and the
//! transaction endpoints keep their historical column names.

/// Table names.
pub mod table {
    /// Account records.
    pub const ACCOUNTS: &str = "characters";

    /// Transaction-log rows.
    pub const TRANSACTIONS: &str = "transactions";
}

/// Column names used in filters and ordering.
pub mod column {
    /// Primary key of both tables.
    pub const ID: &str = "id";

    /// Unique account name.
    pub const NAME: &str = "name";

    /// Sender of a transaction row.
    pub const FROM_ACCOUNT: &str = "from_character_id";

    /// Recipient of a transaction row.
    pub const TO_ACCOUNT: &str = "to_character_id";

    /// Server-assigned insertion time.
    pub const CREATED_AT: &str = "created_at";
}

/// `PostgreSQL` error code for `unique_violation`.
pub const UNIQUE_VIOLATION_CODE: &str = "23505";
