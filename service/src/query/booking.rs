//! [`Query`] collection related to a single [`Booking`].

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{
    domain::{booking, Booking},
    read::Active,
};

use super::DatabaseQuery;

/// Queries an active [`Booking`] by its [`booking::Id`].
pub type ById = DatabaseQuery<By<Option<Active<Booking>>, booking::Id>>;
