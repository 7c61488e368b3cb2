//! Identifier types for tally.
//!
//! Accounts and transaction records are keyed by UUIDs assigned by the store.
//! Each kind of identifier gets its own newtype so an account id can never be
//! passed where a transaction id is expected. On the wire they are plain
//! hyphenated UUID strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares a store key: a `Copy` newtype over `uuid::Uuid` that serializes
/// as the bare UUID string and parses with [`IdError`] on bad input.
macro_rules! store_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Fresh random (v4) key, as the store would assign on insert.
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// The wrapped UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|_| IdError::InvalidUuid)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

store_key!(
    /// An account identifier, assigned by the store on insert.
    AccountId
);
store_key!(
    /// A transaction-log row identifier, assigned by the store on insert.
    TransactionId
);
store_key!(
    /// Reference to the external entity owning an account.
    ///
    /// Every account created by tally carries [`SENTINEL_OWNER_ID`].
    OwnerId
);

/// Owner reference stamped on every account: the nil UUID, meaning "no distinct owner".
pub const SENTINEL_OWNER_ID: OwnerId = OwnerId::from_uuid(uuid::Uuid::nil());

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input is not a valid UUID.
    #[error("invalid UUID format")]
    InvalidUuid,
}
