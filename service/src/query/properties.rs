//! [`Query`] collection related to the multiple [`Property`]s.

use common::operations::By;

use crate::domain::Property;
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the active [`Property`]s, ordered by their IDs.
pub type List = DatabaseQuery<By<Vec<Property>, ()>>;
