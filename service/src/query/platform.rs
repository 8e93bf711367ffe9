//! [`Query`] collection related to a single [`Platform`].

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{
    domain::{platform, Platform},
    read::Active,
};

use super::DatabaseQuery;

/// Queries an active [`Platform`] by its [`platform::Id`].
pub type ById = DatabaseQuery<By<Option<Active<Platform>>, platform::Id>>;
