//! [`Advertisement`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

use crate::domain::{platform, property};
#[cfg(doc)]
use crate::domain::{Booking, Platform, Property};

/// Placement of a [`Property`] on a [`Platform`].
///
/// [`Booking`]s are made against an [`Advertisement`], while the dates they
/// occupy belong to its [`Property`].
#[derive(Clone, Debug)]
pub struct Advertisement {
    /// ID of this [`Advertisement`].
    pub id: Id,

    /// ID of the advertised [`Property`].
    ///
    /// Never changes after creation.
    pub property_id: property::Id,

    /// ID of the [`Platform`] this [`Advertisement`] is placed on.
    pub platform_id: platform::Id,

    /// Indicator whether this [`Advertisement`] is active.
    pub is_active: bool,

    /// [`DateTime`] when this [`Advertisement`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Advertisement`] was modified the last time.
    pub updated_at: ModificationDateTime,
}

/// ID of an [`Advertisement`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(i64);

/// [`DateTime`] of an [`Advertisement`] creation.
pub type CreationDateTime = DateTimeOf<(Advertisement, unit::Creation)>;

/// [`DateTime`] of an [`Advertisement`] last modification.
pub type ModificationDateTime =
    DateTimeOf<(Advertisement, unit::Modification)>;
