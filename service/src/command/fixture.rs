//! Helpers for setting up [`Service`]s in tests.

use common::{
    operations::{Allocate, Insert},
    Date, DateTime, Handler as _, Money,
};
use rust_decimal::Decimal;

use crate::{
    command::{CreateAdvertisement, CreateBooking, CreateProperty},
    domain::{
        advertisement, platform, property, Advertisement, Booking, Platform,
        Property,
    },
    infra::Memory,
    Config, Service,
};

/// Creates a new [`Service`] backed by an empty [`Memory`] database.
pub(crate) fn service() -> Service<Memory> {
    Service::new(Config::with_secret(b"secret"), Memory::new())
}

/// Inserts a new active [`Platform`] directly into the [`Memory`] database.
pub(crate) async fn platform(svc: &Service<Memory>) -> Platform {
    let db = svc.database();
    let now = DateTime::now();
    let platform = Platform {
        id: db.execute(Allocate::<platform::Id>::new()).await.unwrap(),
        name: platform::Name::new("Airbnb").unwrap(),
        fee_rate: platform::FeeRate::new(Decimal::new(50, 0)).unwrap(),
        is_active: true,
        created_at: now.coerce(),
        updated_at: now.coerce(),
    };
    db.execute(Insert(platform.clone())).await.unwrap();
    platform
}

/// Creates a new [`Property`] with default characteristics.
pub(crate) async fn property(svc: &Service<Memory>) -> Property {
    svc.execute(CreateProperty {
        guest_limit: property::GuestLimit::new(2).unwrap(),
        bathrooms: property::Bathrooms::default(),
        pets_allowed: false,
        cleaning_fee: Money::ZERO,
        activation_date: None,
    })
    .await
    .unwrap()
}

/// Creates a new [`Advertisement`] of the provided [`Property`] on the
/// provided [`Platform`].
pub(crate) async fn advertisement(
    svc: &Service<Memory>,
    property_id: property::Id,
    platform_id: platform::Id,
) -> Advertisement {
    svc.execute(CreateAdvertisement {
        property_id,
        platform_id,
    })
    .await
    .unwrap()
}

/// Creates a fresh [`Property`] advertised on a fresh [`Platform`], returning
/// the ID of the [`Advertisement`].
pub(crate) async fn listing(svc: &Service<Memory>) -> advertisement::Id {
    let platform = platform(svc).await;
    let property = property(svc).await;
    advertisement(svc, property.id, platform.id).await.id
}

/// Creates a new [`Booking`] through the provided [`Advertisement`] for the
/// days offset from today.
pub(crate) async fn booking(
    svc: &Service<Memory>,
    advertisement_id: advertisement::Id,
    checkin: i64,
    checkout: i64,
) -> Booking {
    let day = |n| Date::today().checked_add_days(n).unwrap();
    svc.execute(CreateBooking {
        advertisement_id,
        comment: None,
        total: None,
        checkin: day(checkin),
        checkout: day(checkout),
    })
    .await
    .unwrap()
}
