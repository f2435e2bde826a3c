//! [`Database`] implementations of the [`Sql`] client.
//!
//! [`Database`]: crate::infra::Database
//! [`Sql`]: super::Sql

mod user;
