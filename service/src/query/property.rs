//! [`Query`] collection related to a single [`Property`].

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{
    domain::{property, Property},
    read::Active,
};

use super::DatabaseQuery;

/// Queries an active [`Property`] by its [`property::Id`].
pub type ById = DatabaseQuery<By<Option<Active<Property>>, property::Id>>;
