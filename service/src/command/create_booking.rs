//! [`Command`] for admitting a new [`Booking`].

use std::fmt;

use common::{
    operations::{
        Allocate, By, Commit, Insert, Lock, Select, Transact, Transacted,
    },
    Date, DateTime, Money,
};
use derive_more::{Display, Error, From};
use rand::rngs::OsRng;
use rust_decimal::Decimal;
use strum::{AsRefStr, Display as StrumDisplay};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::booking::Stay;
use crate::{
    domain::{
        advertisement, booking, property, Advertisement, Booking, Property,
    },
    infra::{database, Database},
    read::{
        booking::{occupancy, IsCodeTaken, Occupancy},
        Active,
    },
    Service,
};

use super::Command;

/// [`Command`] for admitting a new [`Booking`] through an [`Advertisement`].
///
/// A [`Booking`] is admitted only if its [`Stay`] doesn't overlap with the
/// ones already occupied at the same [`Property`], via any of its
/// [`Advertisement`]s. Admissions for the same [`Property`] are serialized.
#[derive(Clone, Debug)]
pub struct CreateBooking {
    /// ID of the [`Advertisement`] to book through.
    pub advertisement_id: advertisement::Id,

    /// Comment to leave for the [`Booking`], if any.
    pub comment: Option<String>,

    /// Total charge of the [`Booking`], zero if omitted.
    pub total: Option<Decimal>,

    /// Check-in [`Date`] of the [`Booking`].
    pub checkin: Date,

    /// Check-out [`Date`] of the [`Booking`], exclusive.
    pub checkout: Date,
}

/// Fields of a [`CreateBooking`] [`Command`] having passed the validation.
#[derive(Debug)]
struct Validated {
    /// Reserved [`booking::Stay`].
    stay: booking::Stay,

    /// Total charge.
    total: Money,

    /// Optional [`booking::Comment`].
    comment: Option<booking::Comment>,
}

impl CreateBooking {
    /// Validates the fields of this [`CreateBooking`] [`Command`] not
    /// requiring any storage access, as of the provided `today`.
    fn validate(&self, today: Date) -> Result<Validated, ValidationError> {
        use Field as F;
        use Reason as R;

        let Self {
            advertisement_id: _,
            comment,
            total,
            checkin,
            checkout,
        } = self;

        if *checkin < today {
            return Err(ValidationError::of(F::Checkin, R::InPast));
        }
        if *checkout < today {
            return Err(ValidationError::of(F::Checkout, R::InPast));
        }

        let stay = booking::Stay::new(*checkin, *checkout).ok_or(
            ValidationError {
                field: None,
                reason: R::CheckinAfterCheckout,
            },
        )?;

        let total = total
            .map_or(Some(Money::ZERO), Money::new)
            .ok_or(ValidationError::of(F::Total, R::Negative))?;

        let comment = comment
            .as_ref()
            .map(|c| {
                booking::Comment::new(c.as_str())
                    .ok_or(ValidationError::of(F::Comment, R::Blank))
            })
            .transpose()?;

        Ok(Validated {
            stay,
            total,
            comment,
        })
    }
}

impl<Db> Command<CreateBooking> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Active<Advertisement>>, advertisement::Id>>,
            Ok = Option<Active<Advertisement>>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Occupancy>, occupancy::Selector>>,
            Ok = Vec<Occupancy>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<IsCodeTaken, booking::Code>>,
            Ok = IsCodeTaken,
            Err = Traced<database::Error>,
        > + Database<
            Allocate<booking::Id>,
            Ok = booking::Id,
            Err = Traced<database::Error>,
        > + Database<Insert<Booking>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateBooking) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let advertisement_id = cmd.advertisement_id;
        let not_found =
            ValidationError::of(Field::AdvertisementId, Reason::NotFound);

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let property_id = tx
            .execute(Select(By::<Option<Active<Advertisement>>, _>::new(
                advertisement_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(not_found)
            .map_err(tracerr::from_and_wrap!(=> E))?
            .property_id;

        let Validated {
            stay,
            total,
            comment,
        } = cmd
            .validate(Date::today())
            .map_err(tracerr::from_and_wrap!(=> E))?;

        // Serialize admissions for the same `Property`.
        tx.execute(Lock(By::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        // The `Property` might have been deleted while waiting for the lock.
        drop(
            tx.execute(Select(By::<Option<Active<Advertisement>>, _>::new(
                advertisement_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(not_found)
            .map_err(tracerr::from_and_wrap!(=> E))?,
        );

        let occupied = tx
            .execute(Select(By::new(occupancy::Selector {
                property_id,
                stay,
                scope: self.config().conflict_scope,
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if let Some(Occupancy { booking_id, .. }) = occupied.first() {
            log::debug!(
                "rejected `Booking` of `Property(id: {property_id})` \
                 for {}..{}: overlaps with `Booking(id: {booking_id})`",
                stay.checkin(),
                stay.checkout(),
            );
            return Err(tracerr::new!(E::from(ValidationError {
                field: None,
                reason: Reason::DateConflict,
            })));
        }

        let tx_ref = &tx;
        let code =
            booking::code::generate_unique(&mut OsRng, |code| async move {
                tx_ref
                    .execute(Select(By::<IsCodeTaken, _>::new(code)))
                    .await
                    .map(|IsCodeTaken(taken)| taken)
            })
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let now = DateTime::now();
        let booking = Booking {
            id: tx
                .execute(Allocate::new())
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?,
            advertisement_id,
            code,
            comment,
            total,
            stay,
            is_active: true,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        tx.execute(Insert(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "admitted `Booking(id: {}, code: {})` of `Property(id: \
             {property_id})` for {}..{}",
            booking.id,
            booking.code,
            stay.checkin(),
            stay.checkout(),
        );

        Ok(booking)
    }
}

/// Error of [`CreateBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`CreateBooking`] [`Command`] is invalid.
    #[display("Invalid `Booking`: {_0}")]
    Invalid(ValidationError),
}

/// Reason of a [`CreateBooking`] [`Command`] rejection.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub struct ValidationError {
    /// [`Field`] the rejection relates to, if any particular.
    pub field: Option<Field>,

    /// [`Reason`] of the rejection.
    pub reason: Reason,
}

impl ValidationError {
    /// Creates a new [`ValidationError`] of the provided [`Field`].
    #[must_use]
    pub const fn of(field: Field, reason: Reason) -> Self {
        Self {
            field: Some(field),
            reason,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            Some(field) => write!(f, "`{field}` is {}", self.reason),
            None => write!(f, "{}", self.reason),
        }
    }
}

/// Field of a [`CreateBooking`] [`Command`].
#[derive(AsRefStr, Clone, Copy, Debug, Eq, Hash, PartialEq, StrumDisplay)]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    /// [`CreateBooking::advertisement_id`].
    AdvertisementId,

    /// [`CreateBooking::checkin`].
    Checkin,

    /// [`CreateBooking::checkout`].
    Checkout,

    /// [`CreateBooking::total`].
    Total,

    /// [`CreateBooking::comment`].
    Comment,
}

/// Reason of a [`ValidationError`].
#[derive(AsRefStr, Clone, Copy, Debug, Eq, Hash, PartialEq, StrumDisplay)]
#[strum(serialize_all = "snake_case")]
pub enum Reason {
    /// Referenced entity doesn't exist or is inactive.
    NotFound,

    /// [`Date`] is before today.
    InPast,

    /// Check-in [`Date`] is after the check-out one.
    CheckinAfterCheckout,

    /// Amount is negative.
    Negative,

    /// Text is empty or consists of whitespaces only.
    Blank,

    /// [`Stay`] overlaps with an already occupied one.
    DateConflict,
}

#[cfg(test)]
mod spec {
    use common::{Date, Handler as _, Money};
    use rand::{rngs::StdRng, Rng as _, SeedableRng as _};
    use rust_decimal::Decimal;

    use crate::{
        command::{fixture, CreateBooking, DeleteBooking},
        domain::{advertisement, Booking},
        infra::Memory,
        query,
        read::booking::{list::Selector, ConflictScope},
        Config, Service,
    };

    use super::{ExecutionError, Field, Reason, ValidationError};

    fn day(offset: i64) -> Date {
        Date::today().checked_add_days(offset).unwrap()
    }

    fn cmd(ad: advertisement::Id, from: i64, to: i64) -> CreateBooking {
        CreateBooking {
            advertisement_id: ad,
            comment: None,
            total: None,
            checkin: day(from),
            checkout: day(to),
        }
    }

    fn rejection(
        res: Result<Booking, tracerr::Traced<ExecutionError>>,
    ) -> ValidationError {
        match res.unwrap_err().as_ref() {
            ExecutionError::Invalid(e) => *e,
            ExecutionError::Db(e) => panic!("unexpected `Database` error: {e}"),
        }
    }

    #[test]
    fn validates_in_order() {
        let today = Date::today();
        let ad = advertisement::Id::from(1_i64);

        assert_eq!(
            cmd(ad, -2, -1).validate(today).map(drop),
            Err(ValidationError::of(Field::Checkin, Reason::InPast)),
        );
        assert_eq!(
            cmd(ad, 0, -1).validate(today).map(drop),
            Err(ValidationError::of(Field::Checkout, Reason::InPast)),
        );
        assert_eq!(
            cmd(ad, 5, 4).validate(today).map(drop),
            Err(ValidationError {
                field: None,
                reason: Reason::CheckinAfterCheckout,
            }),
        );
        assert_eq!(
            CreateBooking {
                total: Some(Decimal::NEGATIVE_ONE),
                comment: Some(" ".into()),
                ..cmd(ad, 1, 2)
            }
            .validate(today)
            .map(drop),
            Err(ValidationError::of(Field::Total, Reason::Negative)),
        );
        assert_eq!(
            CreateBooking {
                comment: Some(" \t".into()),
                ..cmd(ad, 1, 2)
            }
            .validate(today)
            .map(drop),
            Err(ValidationError::of(Field::Comment, Reason::Blank)),
        );

        let valid = CreateBooking {
            total: Some(Decimal::new(12_050, 2)),
            comment: Some("late arrival".into()),
            ..cmd(ad, 0, 0)
        }
        .validate(today)
        .unwrap();
        assert_eq!(valid.total, Money::new(Decimal::new(12_050, 2)).unwrap());
        assert_eq!(valid.stay.checkin(), valid.stay.checkout());
        assert!(valid.comment.is_some());
    }

    #[test]
    fn renders_snake_case() {
        assert_eq!(Field::AdvertisementId.to_string(), "advertisement_id");
        assert_eq!(
            Reason::CheckinAfterCheckout.as_ref(),
            "checkin_after_checkout",
        );
        assert_eq!(
            ValidationError::of(Field::Checkin, Reason::InPast).to_string(),
            "`checkin` is in_past",
        );
        assert_eq!(
            ValidationError {
                field: None,
                reason: Reason::DateConflict,
            }
            .to_string(),
            "date_conflict",
        );
    }

    #[tokio::test]
    async fn admits_and_rejects_as_documented() {
        let svc = fixture::service();
        let platform = fixture::platform(&svc).await;
        let property = fixture::property(&svc).await;
        let ad1 = fixture::advertisement(&svc, property.id, platform.id).await;
        let ad2 = fixture::advertisement(&svc, property.id, platform.id).await;

        let b1 = svc.execute(cmd(ad1.id, 1, 2)).await.unwrap();
        let b2 = svc.execute(cmd(ad1.id, 3, 4)).await.unwrap();
        assert!(b1.is_active && b2.is_active);
        assert_ne!(b1.code, b2.code);

        // Same dates through another `Advertisement` of the same `Property`.
        assert_eq!(
            rejection(svc.execute(cmd(ad2.id, 3, 4)).await).reason,
            Reason::DateConflict,
        );

        let b3 = svc.execute(cmd(ad2.id, 14, 15)).await.unwrap();
        assert_eq!(b3.advertisement_id, ad2.id);
        assert_eq!(b3.total, Money::ZERO);

        assert_eq!(
            rejection(svc.execute(cmd(ad1.id, 15, 14)).await).reason,
            Reason::CheckinAfterCheckout,
        );
        assert_eq!(
            rejection(svc.execute(cmd(ad1.id, -10, -9)).await),
            ValidationError::of(Field::Checkin, Reason::InPast),
        );
        assert_eq!(
            rejection(
                svc.execute(cmd(advertisement::Id::from(10_i64), 20, 21))
                    .await
            ),
            ValidationError::of(Field::AdvertisementId, Reason::NotFound),
        );

        let listed = svc
            .execute(query::bookings::ByProperty(property.id))
            .await
            .unwrap();
        assert_eq!(
            listed.iter().map(|b| b.id).collect::<Vec<_>>(),
            [b1.id, b2.id, b3.id],
        );
    }

    #[tokio::test]
    async fn accepts_back_to_back_stays() {
        let svc = fixture::service();
        let ad = fixture::listing(&svc).await;

        let first = svc.execute(cmd(ad, 5, 8)).await.unwrap();
        let before = svc.execute(cmd(ad, 2, 5)).await.unwrap();
        let after = svc.execute(cmd(ad, 8, 9)).await.unwrap();

        assert_eq!(before.stay.checkout(), first.stay.checkin());
        assert_eq!(after.stay.checkin(), first.stay.checkout());
        assert_eq!(
            rejection(svc.execute(cmd(ad, 7, 10)).await).reason,
            Reason::DateConflict,
        );
        assert_eq!(
            rejection(svc.execute(cmd(ad, 1, 20)).await).reason,
            Reason::DateConflict,
        );
    }

    #[tokio::test]
    async fn accepts_zero_length_probe_at_boundary() {
        let svc = fixture::service();
        let ad = fixture::listing(&svc).await;
        drop(svc.execute(cmd(ad, 5, 8)).await.unwrap());

        drop(svc.execute(cmd(ad, 5, 5)).await.unwrap());
        drop(svc.execute(cmd(ad, 8, 8)).await.unwrap());
        assert_eq!(
            rejection(svc.execute(cmd(ad, 6, 6)).await).reason,
            Reason::DateConflict,
        );
    }

    #[tokio::test]
    async fn deleted_bookings_block_dates_by_default() {
        let svc = fixture::service();
        let ad = fixture::listing(&svc).await;
        let booking = svc.execute(cmd(ad, 1, 3)).await.unwrap();
        svc.execute(DeleteBooking {
            booking_id: booking.id,
        })
        .await
        .unwrap();

        assert_eq!(
            rejection(svc.execute(cmd(ad, 1, 3)).await).reason,
            Reason::DateConflict,
        );
    }

    #[tokio::test]
    async fn active_scope_ignores_deleted_bookings() {
        let mut config = Config::with_secret(b"secret");
        config.conflict_scope = ConflictScope::Active;
        let svc = Service::new(config, Memory::new());
        let ad = fixture::listing(&svc).await;
        let booking = svc.execute(cmd(ad, 1, 3)).await.unwrap();
        svc.execute(DeleteBooking {
            booking_id: booking.id,
        })
        .await
        .unwrap();

        let rebooked = svc.execute(cmd(ad, 1, 3)).await.unwrap();

        assert_eq!(rebooked.stay, booking.stay);
        assert_ne!(rebooked.code, booking.code);
    }

    #[tokio::test]
    async fn stores_comment_and_total() {
        let svc = fixture::service();
        let ad = fixture::listing(&svc).await;

        let booking = svc
            .execute(CreateBooking {
                comment: Some("two cats".into()),
                total: Some(Decimal::new(45_000, 2)),
                ..cmd(ad, 1, 4)
            })
            .await
            .unwrap();

        let stored = svc
            .execute(query::booking::ById::by(booking.id))
            .await
            .unwrap()
            .unwrap()
            .into_inner();
        assert_eq!(stored.comment.unwrap().to_string(), "two cats");
        assert_eq!(stored.total.amount(), Decimal::new(450, 0));
        assert_eq!(stored.code, booking.code);
    }

    #[tokio::test]
    async fn concurrent_requests_never_double_book() {
        let svc = fixture::service();
        let platform = fixture::platform(&svc).await;
        let property = fixture::property(&svc).await;
        let ad1 = fixture::advertisement(&svc, property.id, platform.id).await;
        let ad2 = fixture::advertisement(&svc, property.id, platform.id).await;

        let (first, second) = tokio::join!(
            svc.execute(cmd(ad1.id, 2, 6)),
            svc.execute(cmd(ad2.id, 4, 8)),
        );

        assert!(first.is_ok() != second.is_ok());
    }

    #[tokio::test]
    async fn active_stays_are_pairwise_disjoint() {
        let svc = fixture::service();
        let platform = fixture::platform(&svc).await;
        let property = fixture::property(&svc).await;
        let mut ads = Vec::new();
        for _ in 0..3 {
            ads.push(
                fixture::advertisement(&svc, property.id, platform.id)
                    .await
                    .id,
            );
        }

        let mut rng = StdRng::seed_from_u64(2023);
        for _ in 0..200 {
            let ad = ads[rng.gen_range(0..ads.len())];
            let from = rng.gen_range(0..60);
            let to = from + rng.gen_range(0..5);
            match svc.execute(cmd(ad, from, to)).await {
                Ok(_) => {}
                Err(e) => assert_eq!(
                    rejection(Err(e)).reason,
                    Reason::DateConflict,
                ),
            }
        }

        let bookings = svc
            .execute(query::bookings::List::by(Selector::All))
            .await
            .unwrap();
        assert!(!bookings.is_empty());
        for (i, a) in bookings.iter().enumerate() {
            for b in &bookings[i + 1..] {
                assert!(!a.stay.overlaps(&b.stay), "{a:?} overlaps {b:?}");
            }
            assert_eq!(a.code.to_string().len(), 12);
        }
        let codes = bookings
            .iter()
            .map(|b| b.code.clone())
            .collect::<std::collections::HashSet<_>>();
        assert_eq!(codes.len(), bookings.len());
    }
}
