//! [`Query`] collection related to the multiple [`User`]s.

use common::operations::By;

use crate::domain::User;
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the [`User`]s of the system.
pub type All = DatabaseQuery<By<Vec<User>, ()>>;
