//! [`Provider`] definitions.

use derive_more::Display;

/// Relational engine backing the [`Sql`] client.
///
/// Selected exactly once per process, at startup; the decision is never
/// revisited at runtime.
///
/// [`Sql`]: super::Sql
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Provider {
    /// Microsoft SQL Server.
    #[display("SQLSERVER")]
    SqlServer,

    /// MySQL-compatible engine.
    #[display("MYSQL")]
    MySql,
}

impl Provider {
    /// Marker value selecting [`Provider::SqlServer`].
    const SQL_SERVER: &'static str = "SQLSERVER";

    /// Detects the [`Provider`] from the provided environment value.
    ///
    /// The comparison is case-insensitive. An unrecognized or missing value
    /// falls back to [`Provider::MySql`]: startup never fails merely because
    /// the switch is absent, at the documented price of misconfiguration
    /// being silent.
    #[must_use]
    pub fn detect(value: Option<&str>) -> Self {
        value
            .filter(|v| v.eq_ignore_ascii_case(Self::SQL_SERVER))
            .map_or(Self::MySql, |_| Self::SqlServer)
    }

    /// Returns the connection URL scheme of this [`Provider`]'s driver.
    #[must_use]
    pub fn url_scheme(self) -> &'static str {
        match self {
            Self::SqlServer => "mssql",
            Self::MySql => "mysql",
        }
    }
}

#[cfg(test)]
mod spec {
    use super::Provider;

    #[test]
    fn recognizes_sql_server_case_insensitively() {
        for value in ["SQLSERVER", "sqlserver", "SqLsErVeR"] {
            assert_eq!(
                Provider::detect(Some(value)),
                Provider::SqlServer,
                "`{value}` not recognized",
            );
        }
    }

    #[test]
    fn falls_back_to_mysql() {
        for value in [None, Some("MYSQL"), Some("postgres"), Some("")] {
            assert_eq!(
                Provider::detect(value),
                Provider::MySql,
                "`{value:?}` did not fall back",
            );
        }
    }
}
