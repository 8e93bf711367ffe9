//! [`Query`] collection related to the multiple [`Platform`]s.

use common::operations::By;

use crate::domain::Platform;
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the active [`Platform`]s, ordered by their IDs.
pub type List = DatabaseQuery<By<Vec<Platform>, ()>>;
