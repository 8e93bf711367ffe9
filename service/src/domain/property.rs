//! [`Property`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, Date, DateTimeOf, Money};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::Advertisement;

/// Rental property (a listing).
///
/// A [`Property`] owns its [`Advertisement`]s: deactivating it deactivates
/// them too.
#[derive(Clone, Debug)]
pub struct Property {
    /// ID of this [`Property`].
    pub id: Id,

    /// Maximum number of guests this [`Property`] accepts.
    pub guest_limit: GuestLimit,

    /// Number of bathrooms in this [`Property`].
    pub bathrooms: Bathrooms,

    /// Indicator whether pets are allowed in this [`Property`].
    pub pets_allowed: bool,

    /// Cleaning fee charged for this [`Property`].
    pub cleaning_fee: Money,

    /// [`Date`] this [`Property`] becomes available, if scheduled.
    pub activation_date: Option<Date>,

    /// Indicator whether this [`Property`] is active (not deleted).
    pub is_active: bool,

    /// [`DateTime`] when this [`Property`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Property`] was modified the last time.
    pub updated_at: ModificationDateTime,
}

/// ID of a [`Property`].
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

/// Guest capacity of a [`Property`].
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct GuestLimit(i32);

impl GuestLimit {
    /// Creates a new [`GuestLimit`] if the provided `limit` is positive.
    #[must_use]
    pub fn new(limit: i32) -> Option<Self> {
        (limit >= 1).then_some(Self(limit))
    }
}

/// Number of bathrooms in a [`Property`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Bathrooms(i32);

impl Bathrooms {
    /// Creates new [`Bathrooms`] if the provided `count` is not negative.
    #[must_use]
    pub fn new(count: i32) -> Option<Self> {
        (count >= 0).then_some(Self(count))
    }
}

/// [`DateTime`] of a [`Property`] creation.
pub type CreationDateTime = DateTimeOf<(Property, unit::Creation)>;

/// [`DateTime`] of a [`Property`] last modification.
pub type ModificationDateTime = DateTimeOf<(Property, unit::Modification)>;

#[cfg(test)]
mod spec {
    use super::{Bathrooms, GuestLimit};

    #[test]
    fn guest_limit_is_positive() {
        assert!(GuestLimit::new(1).is_some());
        assert!(GuestLimit::new(12).is_some());

        assert!(GuestLimit::new(0).is_none());
        assert!(GuestLimit::new(-3).is_none());
    }

    #[test]
    fn bathrooms_are_not_negative() {
        assert_eq!(Bathrooms::new(0), Some(Bathrooms::default()));
        assert!(Bathrooms::new(2).is_some());

        assert!(Bathrooms::new(-1).is_none());
    }
}
