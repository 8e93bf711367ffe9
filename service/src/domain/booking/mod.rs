//! [`Booking`] definitions.

pub mod code;

#[cfg(doc)]
use common::DateTime;
use common::{unit, Date, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

use crate::domain::advertisement;
#[cfg(doc)]
use crate::domain::{Advertisement, Property};

pub use self::code::Code;

/// Reservation of a [`Stay`] made through an [`Advertisement`].
///
/// Never modified after creation, except being deactivated.
#[derive(Clone, Debug)]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: Id,

    /// ID of the [`Advertisement`] this [`Booking`] was made through.
    pub advertisement_id: advertisement::Id,

    /// Unique [`Code`] of this [`Booking`].
    pub code: Code,

    /// Free-text [`Comment`] left for this [`Booking`], if any.
    pub comment: Option<Comment>,

    /// Total charge of this [`Booking`].
    pub total: Money,

    /// [`Stay`] reserved by this [`Booking`].
    pub stay: Stay,

    /// Indicator whether this [`Booking`] is active.
    pub is_active: bool,

    /// [`DateTime`] when this [`Booking`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Booking`] was modified the last time.
    pub updated_at: ModificationDateTime,
}

/// ID of a [`Booking`].
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

/// Comment of a [`Booking`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Comment(String);

impl Comment {
    /// Creates a new [`Comment`] if the given `comment` is not blank.
    #[must_use]
    pub fn new(comment: impl Into<String>) -> Option<Self> {
        let comment = comment.into();
        (!comment.trim().is_empty()).then_some(Self(comment))
    }
}

impl FromStr for Comment {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("blank `Comment`")
    }
}

/// Half-open range of [`Date`]s `[checkin, checkout)` occupied by a guest.
///
/// The `checkout` day itself is free, so back-to-back [`Stay`]s never
/// overlap.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Stay {
    /// First occupied [`Date`].
    checkin: Date,

    /// [`Date`] the guest leaves on.
    checkout: Date,
}

impl Stay {
    /// Creates a new [`Stay`] if `checkin` is not after `checkout`.
    ///
    /// Zero-length [`Stay`]s (`checkin == checkout`) are allowed.
    #[must_use]
    pub fn new(checkin: Date, checkout: Date) -> Option<Self> {
        (checkin <= checkout).then_some(Self { checkin, checkout })
    }

    /// Returns the check-in [`Date`] of this [`Stay`].
    #[must_use]
    pub fn checkin(&self) -> Date {
        self.checkin
    }

    /// Returns the check-out [`Date`] of this [`Stay`].
    #[must_use]
    pub fn checkout(&self) -> Date {
        self.checkout
    }

    /// Checks whether this [`Stay`] intersects with the `other` one.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.checkin < other.checkout && self.checkout > other.checkin
    }
}

/// [`DateTime`] of a [`Booking`] creation.
pub type CreationDateTime = DateTimeOf<(Booking, unit::Creation)>;

/// [`DateTime`] of a [`Booking`] last modification.
pub type ModificationDateTime = DateTimeOf<(Booking, unit::Modification)>;

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::Date;

    use super::{Comment, Stay};

    fn stay(checkin: &str, checkout: &str) -> Stay {
        Stay::new(
            Date::from_str(checkin).unwrap(),
            Date::from_str(checkout).unwrap(),
        )
        .unwrap()
    }

    /// Union of the three clauses the legacy admission query was built from.
    fn legacy_conflict(existing: &Stay, proposed: &Stay) -> bool {
        let (eci, eco) = (existing.checkin(), existing.checkout());
        let (ci, co) = (proposed.checkin(), proposed.checkout());

        (eco > ci && eco <= co)
            || (eci >= ci && eci < co)
            || (eci <= ci && eco >= co)
    }

    #[test]
    fn checkin_must_not_follow_checkout() {
        let (early, late) = (
            Date::from_str("2023-07-14").unwrap(),
            Date::from_str("2023-07-15").unwrap(),
        );

        assert!(Stay::new(early, late).is_some());
        assert!(Stay::new(early, early).is_some());
        assert!(Stay::new(late, early).is_none());
    }

    #[test]
    fn overlapping_stays_conflict() {
        let existing = stay("2023-07-03", "2023-07-06");

        for proposed in [
            stay("2023-07-03", "2023-07-06"),
            stay("2023-07-01", "2023-07-04"),
            stay("2023-07-05", "2023-07-09"),
            stay("2023-07-04", "2023-07-05"),
            stay("2023-07-01", "2023-07-10"),
            stay("2023-07-04", "2023-07-04"),
        ] {
            assert!(existing.overlaps(&proposed), "{proposed:?}");
            assert!(proposed.overlaps(&existing), "{proposed:?}");
        }
    }

    #[test]
    fn back_to_back_stays_do_not_conflict() {
        let existing = stay("2023-07-03", "2023-07-06");

        assert!(!existing.overlaps(&stay("2023-07-06", "2023-07-08")));
        assert!(!existing.overlaps(&stay("2023-07-01", "2023-07-03")));
        assert!(!existing.overlaps(&stay("2023-07-14", "2023-07-15")));
    }

    #[test]
    fn zero_length_probe_at_boundary_does_not_conflict() {
        let existing = stay("2023-07-03", "2023-07-06");

        assert!(!existing.overlaps(&stay("2023-07-03", "2023-07-03")));
        assert!(!existing.overlaps(&stay("2023-07-06", "2023-07-06")));
    }

    #[test]
    fn agrees_with_legacy_clauses_on_non_empty_stays() {
        let base = Date::from_str("2023-07-01").unwrap();
        let day = |n| base.checked_add_days(n).unwrap();

        let stays = (0..6)
            .flat_map(|ci| ((ci + 1)..7).map(move |co| (ci, co)))
            .map(|(ci, co)| Stay::new(day(ci), day(co)).unwrap())
            .collect::<Vec<_>>();

        for existing in &stays {
            for proposed in &stays {
                assert_eq!(
                    existing.overlaps(proposed),
                    legacy_conflict(existing, proposed),
                    "existing: {existing:?}, proposed: {proposed:?}",
                );
            }
        }
    }

    #[test]
    fn comment_must_not_be_blank() {
        assert!(Comment::new("late arrival").is_some());

        assert!(Comment::new("").is_none());
        assert!(Comment::new("  \t").is_none());
    }
}
