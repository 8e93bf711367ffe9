//! [`Booking`]-related read definitions.

use derive_more::Deref;

use crate::domain::booking;
#[cfg(doc)]
use crate::domain::{Booking, Property};

/// Indicator whether a [`booking::Code`] is already held by any [`Booking`],
/// active or not.
#[derive(Clone, Copy, Debug, Deref, Eq, Hash, PartialEq)]
pub struct IsCodeTaken(pub bool);

/// Policy of which existing [`Booking`]s block the dates of a new one.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ConflictScope {
    /// Every [`Booking`] ever made for the [`Property`] blocks its dates,
    /// including deactivated ones.
    #[default]
    All,

    /// Only active [`Booking`]s block their dates.
    Active,
}

/// [`booking::Stay`] occupied at a [`Property`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Occupancy {
    /// ID of the [`Booking`] occupying the [`booking::Stay`].
    pub booking_id: booking::Id,

    /// Occupied [`booking::Stay`].
    pub stay: booking::Stay,
}

pub mod occupancy {
    //! [`Occupancy`] selection definitions.

    use crate::domain::{booking, property};
    #[cfg(doc)]
    use crate::domain::Property;

    use super::ConflictScope;
    #[cfg(doc)]
    use super::Occupancy;

    /// Selector of [`Occupancy`]s overlapping a [`booking::Stay`] at a
    /// [`Property`].
    #[derive(Clone, Copy, Debug)]
    pub struct Selector {
        /// ID of the [`Property`] to inspect.
        pub property_id: property::Id,

        /// [`booking::Stay`] to find overlaps with.
        pub stay: booking::Stay,

        /// [`ConflictScope`] to apply.
        pub scope: ConflictScope,
    }
}

pub mod list {
    //! [`Booking`]s list definitions.

    use crate::domain::{advertisement, property};
    #[cfg(doc)]
    use crate::domain::{Advertisement, Booking, Property};

    /// Selector of active [`Booking`]s, ordered by their IDs.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum Selector {
        /// All active [`Booking`]s.
        All,

        /// Active [`Booking`]s made through any [`Advertisement`] of the
        /// [`Property`] with the provided ID.
        ByProperty(property::Id),

        /// Active [`Booking`]s made through the [`Advertisement`] with the
        /// provided ID.
        ByAdvertisement(advertisement::Id),
    }
}
