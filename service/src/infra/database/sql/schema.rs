//! Embedded schema of the SQL [`Database`].
//!
//! [`Database`]: crate::infra::Database

/// DDL statements bringing the schema up-to-date, in execution order.
///
/// Written in the portable subset of SQL the MySQL-compatible engines
/// accept. Timestamps are stored as Unix seconds and IDs as their canonical
/// textual form, keeping the rows interpretable by any backing engine.
pub(super) const STATEMENTS: &[&str] = &["\
    CREATE TABLE IF NOT EXISTS users (\
        id CHAR(36) NOT NULL PRIMARY KEY, \
        name VARCHAR(60) NOT NULL, \
        email VARCHAR(100) NOT NULL, \
        created_at BIGINT NOT NULL, \
        updated_at BIGINT\
    )"];
