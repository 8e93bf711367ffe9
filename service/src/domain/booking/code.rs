//! [`Code`] definitions.

use std::{future::Future, str::FromStr};

use derive_more::{AsRef, Display};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rand::Rng;
use serde::Serialize;

#[cfg(doc)]
use crate::domain::Booking;

/// Unique human-readable code of a [`Booking`].
///
/// Consists of [`Code::LENGTH`] characters from [`Code::ALPHABET`].
#[derive(
    AsRef, Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Code(String);

impl Code {
    /// Number of characters in a [`Code`].
    pub const LENGTH: usize = 12;

    /// Characters a [`Code`] is composed of.
    pub const ALPHABET: &'static [u8; 36] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    /// Creates a new [`Code`] if the given `code` is valid.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Option<Self> {
        let code = code.into();
        Self::check(&code).then_some(Self(code))
    }

    /// Draws a new random [`Code`] out of the provided `rng`.
    ///
    /// Every character is drawn uniformly and independently.
    #[must_use]
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(
            (0..Self::LENGTH)
                .map(|_| {
                    let i = rng.gen_range(0..Self::ALPHABET.len());
                    char::from(Self::ALPHABET[i])
                })
                .collect(),
        )
    }

    /// Checks whether the given `code` is a valid [`Code`].
    fn check(code: impl AsRef<str>) -> bool {
        let code = code.as_ref();
        code.len() == Self::LENGTH
            && code.bytes().all(|b| Self::ALPHABET.contains(&b))
    }
}

impl FromStr for Code {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Code`")
    }
}

/// Draws random [`Code`]s out of the provided `rng` until the `is_taken`
/// predicate reports a free one.
///
/// # Errors
///
/// Propagates the first error of the `is_taken` predicate.
pub async fn generate_unique<R, F, Fut, E>(
    rng: &mut R,
    mut is_taken: F,
) -> Result<Code, E>
where
    R: Rng + ?Sized,
    F: FnMut(Code) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    loop {
        let code = Code::random(rng);
        if !is_taken(code.clone()).await? {
            return Ok(code);
        }
    }
}

#[cfg(test)]
mod spec {
    use std::{cell::RefCell, collections::HashSet, future, str::FromStr as _};

    use rand::{rngs::StdRng, SeedableRng as _};

    use super::{generate_unique, Code};

    #[test]
    fn random_codes_match_format() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..1000 {
            let code = Code::random(&mut rng);

            let s = code.to_string();
            assert_eq!(s.len(), 12);
            assert!(
                s.chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()),
                "{code}",
            );
            assert!(Code::new(code.to_string()).is_some());
        }
    }

    #[test]
    fn random_codes_use_whole_alphabet() {
        let mut rng = StdRng::seed_from_u64(7);

        let seen = (0..500)
            .flat_map(|_| Code::random(&mut rng).to_string().into_bytes())
            .collect::<HashSet<_>>();

        assert_eq!(seen.len(), Code::ALPHABET.len());
    }

    #[test]
    fn from_str() {
        assert!(Code::from_str("AB12CD34EF56").is_ok());
        assert!(Code::from_str("000000000000").is_ok());

        assert!(Code::from_str("ab12cd34ef56").is_err());
        assert!(Code::from_str("AB12CD34EF5").is_err());
        assert!(Code::from_str("AB12CD34EF567").is_err());
        assert!(Code::from_str("AB12-D34EF56").is_err());
    }

    #[tokio::test]
    async fn retries_until_code_is_free() {
        let mut rng = StdRng::seed_from_u64(1);
        let attempts = RefCell::new(Vec::new());

        let code = generate_unique(&mut rng, |code| {
            attempts.borrow_mut().push(code);
            future::ready(Ok::<_, ()>(attempts.borrow().len() < 3))
        })
        .await
        .unwrap();

        let attempts = attempts.into_inner();
        assert_eq!(attempts.len(), 3);
        assert_eq!(attempts.last(), Some(&code));
        assert_ne!(attempts[0], attempts[1]);
    }

    #[tokio::test]
    async fn propagates_predicate_errors() {
        let mut rng = StdRng::seed_from_u64(1);

        let res =
            generate_unique(&mut rng, |_| future::ready(Err::<bool, _>("db")))
                .await;

        assert_eq!(res, Err("db"));
    }
}
