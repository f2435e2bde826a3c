//! Infrastructure layer.

pub mod database;

pub use self::database::Database;
#[cfg(feature = "sql")]
pub use self::database::{sql, Sql};
