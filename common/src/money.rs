//! [`Money`]-related definitions.

use std::{fmt, str::FromStr};

use derive_more::Into;
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;

/// Non-negative amount of money.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Into, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Money(Decimal);

impl Money {
    /// Zero [`Money`].
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new [`Money`] if the provided `amount` is not negative.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        (amount >= Decimal::ZERO).then_some(Self(amount))
    }

    /// Returns the amount of this [`Money`].
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s).map_err(|_| "invalid amount")?;
        Self::new(amount).ok_or("negative amount")
    }
}

#[cfg(feature = "serde")]
mod serde {
    //! Module providing integration with [`serde`] crate.

    use rust_decimal::serde::float;
    use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

    use super::Money;

    impl Serialize for Money {
        fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            float::serialize(&self.0, s)
        }
    }

    impl<'de> Deserialize<'de> for Money {
        fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            Self::new(float::deserialize(d)?)
                .ok_or_else(|| D::Error::custom("negative amount of money"))
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::Money;

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn rejects_negative_amounts() {
        assert!(Money::new(decimal("-0.01")).is_none());
        assert!(Money::new(decimal("-100")).is_none());

        assert_eq!(Money::new(decimal("0")), Some(Money::ZERO));
        assert_eq!(Money::new(decimal("-0")), Some(Money::ZERO));
        assert_eq!(
            Money::new(decimal("150.50")).unwrap().amount(),
            decimal("150.50"),
        );
    }

    #[test]
    fn from_str() {
        assert_eq!(
            Money::from_str("123.45").unwrap().amount(),
            decimal("123.45"),
        );
        assert!(Money::from_str("123").is_ok());
        assert!(Money::from_str("0").is_ok());

        assert!(Money::from_str("-1").is_err());
        assert!(Money::from_str("123.45USD").is_err());
        assert!(Money::from_str("").is_err());
    }

    #[test]
    fn to_string() {
        assert_eq!(Money::from_str("123.45").unwrap().to_string(), "123.45");
        assert_eq!(Money::from_str("123.00").unwrap().to_string(), "123");
        assert_eq!(Money::from_str("123.0").unwrap().to_string(), "123");
        assert_eq!(Money::ZERO.to_string(), "0");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde() {
        let money: Money = serde_json::from_str("99.5").unwrap();

        assert_eq!(money.amount(), decimal("99.5"));
        assert_eq!(serde_json::to_string(&money).unwrap(), "99.5");
        assert!(serde_json::from_str::<Money>("-3").is_err());
    }
}
