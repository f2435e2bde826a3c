//! [`Database`]-related implementations.

#[cfg(feature = "sql")]
pub mod sql;

use derive_more::{Display, Error as StdError, From};

#[cfg(feature = "sql")]
pub use self::sql::Sql;

/// Database operation.
pub use common::Handler as Database;

/// [`Database`] error.
///
/// Signals the storage backend being unavailable or misbehaving. An absent
/// row is never an [`Error`]: lookups represent it as a value instead.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "sql")]
    /// [`Sql`] error.
    Sql(sql::Error),
}
