//! [`Session`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, FromStr};
use serde::{Deserialize, Serialize};

/// Authenticated caller session.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Session {
    /// [`Subject`] this [`Session`] was issued to.
    #[serde(rename = "sub")]
    pub subject: Subject,

    /// [`DateTime`] when this [`Session`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

/// Identity of a caller a [`Session`] is issued to.
#[derive(AsRef, Clone, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[as_ref(forward)]
pub struct Subject(String);

impl Subject {
    /// Creates a new [`Subject`] if the given `subject` is not blank.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Option<Self> {
        let subject = subject.into();
        (!subject.trim().is_empty()).then_some(Self(subject))
    }
}

impl FromStr for Subject {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("blank `Subject`")
    }
}

/// Access token of a [`Session`].
#[derive(AsRef, Clone, Debug, Display, FromStr)]
#[as_ref(forward)]
pub struct Token(String);

impl Token {
    /// Creates a new [`Token`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `token` must be a valid [`Token`] representation.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(token: String) -> Self {
        Self(token)
    }
}

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;
