//! [`Query`] collection related to a single [`Advertisement`].

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{
    domain::{advertisement, Advertisement},
    read::Active,
};

use super::DatabaseQuery;

/// Queries an active [`Advertisement`] by its [`advertisement::Id`].
pub type ById =
    DatabaseQuery<By<Option<Active<Advertisement>>, advertisement::Id>>;
