//! [`Booking`]-related [`Database`] implementations.

use common::{
    operations::{Allocate, By, Delete, Insert, Select},
    DateTime,
};
use tracerr::Traced;

use crate::{
    domain::{booking, Booking},
    infra::{
        database::{self, memory::Storage, Memory},
        Database,
    },
    read::{
        self,
        booking::{occupancy, ConflictScope, IsCodeTaken, Occupancy},
        Active,
    },
};

impl<C: Storage> Database<Allocate<booking::Id>> for Memory<C> {
    type Ok = booking::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Allocate<booking::Id>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| {
            s.sequences.booking += 1;
            booking::Id::from(s.sequences.booking)
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Storage> Database<Insert<Booking>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| {
            _ = s
                .advertisement_bookings
                .entry(booking.advertisement_id)
                .or_default()
                .insert(booking.id);
            _ = s.codes.insert(booking.code.clone());
            _ = s.bookings.insert(booking.id, booking);
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Storage> Database<Select<By<Option<Active<Booking>>, booking::Id>>>
    for Memory<C>
{
    type Ok = Option<Active<Booking>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Active<Booking>>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.read(|s| {
            s.bookings
                .get(&id)
                .filter(|b| b.is_active)
                .cloned()
                .map(Active)
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Storage>
    Database<Select<By<Vec<Booking>, read::booking::list::Selector>>>
    for Memory<C>
{
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, read::booking::list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        use read::booking::list::Selector as S;

        let selector = by.into_inner();
        self.read(|s| {
            let ads = match selector {
                S::All => {
                    return s
                        .bookings
                        .values()
                        .filter(|b| b.is_active)
                        .cloned()
                        .collect();
                }
                S::ByProperty(property_id) => s
                    .property_advertisements
                    .get(&property_id)
                    .into_iter()
                    .flatten()
                    .copied()
                    .collect::<Vec<_>>(),
                S::ByAdvertisement(ad_id) => vec![ad_id],
            };

            let mut bookings = ads
                .iter()
                .filter_map(|id| s.advertisement_bookings.get(id))
                .flatten()
                .filter_map(|id| s.bookings.get(id))
                .filter(|b| b.is_active)
                .cloned()
                .collect::<Vec<_>>();
            bookings.sort_by_key(|b| b.id);
            bookings
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Storage> Database<Select<By<Vec<Occupancy>, occupancy::Selector>>>
    for Memory<C>
{
    type Ok = Vec<Occupancy>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Occupancy>, occupancy::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let occupancy::Selector {
            property_id,
            stay,
            scope,
        } = by.into_inner();

        self.read(|s| {
            let mut occupied = s
                .property_advertisements
                .get(&property_id)
                .into_iter()
                .flatten()
                .filter_map(|id| s.advertisement_bookings.get(id))
                .flatten()
                .filter_map(|id| s.bookings.get(id))
                .filter(|b| match scope {
                    ConflictScope::All => true,
                    ConflictScope::Active => b.is_active,
                })
                .filter(|b| b.stay.overlaps(&stay))
                .map(|b| Occupancy {
                    booking_id: b.id,
                    stay: b.stay,
                })
                .collect::<Vec<_>>();
            occupied.sort_by_key(|o| o.booking_id);
            occupied
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Storage> Database<Select<By<IsCodeTaken, booking::Code>>>
    for Memory<C>
{
    type Ok = IsCodeTaken;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<IsCodeTaken, booking::Code>>,
    ) -> Result<Self::Ok, Self::Err> {
        let code = by.into_inner();
        self.read(|s| IsCodeTaken(s.codes.contains(&code)))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Storage> Database<Delete<By<Booking, booking::Id>>> for Memory<C> {
    /// Indicator whether an active [`Booking`] has been deactivated.
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let now = DateTime::now();
        self.write(|s| {
            s.bookings
                .get_mut(&id)
                .filter(|booking| booking.is_active)
                .map(|booking| {
                    booking.is_active = false;
                    booking.updated_at = now.coerce();
                })
                .is_some()
        })
        .await
        .map_err(tracerr::wrap!())
    }
}
