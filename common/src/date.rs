//! Calendar [`Date`] definitions.

use std::{fmt, str::FromStr};

use derive_more::{From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use time::{format_description::BorrowedFormatItem, macros::format_description};

use crate::DateTime;

/// Format of a [`Date`] in its textual representation.
const FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]");

/// Calendar date without a time zone, rendered as `YYYY-MM-DD`.
#[derive(Clone, Copy, Debug, Eq, From, Hash, Into, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Date(time::Date);

impl Date {
    /// Returns the current UTC [`Date`].
    #[must_use]
    pub fn today() -> Self {
        DateTime::now().date()
    }

    /// Returns this [`Date`] shifted by the provided number of `days`.
    ///
    /// [`None`] is returned on overflow.
    #[must_use]
    pub fn checked_add_days(self, days: i64) -> Option<Self> {
        self.0.checked_add(time::Duration::days(days)).map(Self)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0.format(FORMAT).map_err(|_| fmt::Error)?;
        f.write_str(&s)
    }
}

impl FromStr for Date {
    type Err = time::error::Parse;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        time::Date::parse(s, FORMAT).map(Self)
    }
}

#[cfg(feature = "serde")]
mod serde {
    //! Module providing integration with [`serde`] crate.

    use std::{borrow::Cow, str::FromStr as _};

    use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

    use super::Date;

    impl Serialize for Date {
        fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            s.collect_str(self)
        }
    }

    impl<'de> Deserialize<'de> for Date {
        fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            let s = Cow::<'_, str>::deserialize(d)?;
            Self::from_str(&s).map_err(|e| {
                D::Error::custom(format!("invalid date `{s}`: {e}"))
            })
        }
    }
}
