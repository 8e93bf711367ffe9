//! [`Platform`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// External advertising platform a [`Property`] may be advertised on.
///
/// [`Property`]: crate::domain::Property
#[derive(Clone, Debug)]
pub struct Platform {
    /// ID of this [`Platform`].
    pub id: Id,

    /// [`Name`] of this [`Platform`].
    pub name: Name,

    /// Fee rate this [`Platform`] charges.
    pub fee_rate: FeeRate,

    /// Indicator whether this [`Platform`] is active.
    pub is_active: bool,

    /// [`DateTime`] when this [`Platform`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Platform`] was modified the last time.
    pub updated_at: ModificationDateTime,
}

/// ID of a [`Platform`].
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

/// Name of a [`Platform`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        !name.trim().is_empty() && name.chars().count() <= 100
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Fee rate of a [`Platform`].
#[derive(
    Clone, Copy, Debug, Default, Display, Eq, Hash, Into, PartialEq, Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct FeeRate(
    #[serde(with = "rust_decimal::serde::float")] Decimal,
);

impl FeeRate {
    /// Creates a new [`FeeRate`] if the given `rate` is not negative.
    #[must_use]
    pub fn new(rate: Decimal) -> Option<Self> {
        (rate >= Decimal::ZERO).then_some(Self(rate))
    }
}

/// [`DateTime`] of a [`Platform`] creation.
pub type CreationDateTime = DateTimeOf<(Platform, unit::Creation)>;

/// [`DateTime`] of a [`Platform`] last modification.
pub type ModificationDateTime = DateTimeOf<(Platform, unit::Modification)>;

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use super::{FeeRate, Name};

    #[test]
    fn name() {
        assert!(Name::new("Airbnb").is_some());
        assert!(Name::new("a".repeat(100)).is_some());

        assert!(Name::new("").is_none());
        assert!(Name::new("   ").is_none());
        assert!(Name::new("a".repeat(101)).is_none());
    }

    #[test]
    fn fee_rate() {
        assert!(FeeRate::new(Decimal::new(15, 2)).is_some());
        assert!(FeeRate::new(Decimal::ZERO).is_some());

        assert!(FeeRate::new(Decimal::new(-1, 2)).is_none());
    }
}
