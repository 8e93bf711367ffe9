//! [`Property`]-related [`Database`] implementations.

use common::{
    operations::{Allocate, By, Delete, Insert, Lock, Select, Update},
    DateTime,
};
use tracerr::Traced;

use crate::{
    domain::{property, Property},
    infra::{
        database::{self, memory::Storage, Memory},
        Database,
    },
    read::Active,
};

impl<C: Storage> Database<Allocate<property::Id>> for Memory<C> {
    type Ok = property::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Allocate<property::Id>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| {
            s.sequences.property += 1;
            property::Id::from(s.sequences.property)
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Storage> Database<Insert<Property>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(property): Insert<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| {
            _ = s.property_advertisements.entry(property.id).or_default();
            _ = s.properties.insert(property.id, property);
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Storage> Database<Update<Property>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(property): Update<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| {
            if let Some(existing) = s.properties.get_mut(&property.id) {
                *existing = property;
            }
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Storage> Database<Select<By<Option<Active<Property>>, property::Id>>>
    for Memory<C>
{
    type Ok = Option<Active<Property>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Active<Property>>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.read(|s| {
            s.properties
                .get(&id)
                .filter(|p| p.is_active)
                .cloned()
                .map(Active)
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Storage> Database<Select<By<Vec<Property>, ()>>> for Memory<C> {
    type Ok = Vec<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Property>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.read(|s| {
            s.properties
                .values()
                .filter(|p| p.is_active)
                .cloned()
                .collect()
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Storage> Database<Lock<By<Property, property::Id>>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Transactions already own the whole `State` exclusively.
        self.read(|_| ()).await.map_err(tracerr::wrap!())
    }
}

impl<C: Storage> Database<Delete<By<Property, property::Id>>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let now = DateTime::now();
        self.write(|s| {
            if let Some(property) = s.properties.get_mut(&id) {
                property.is_active = false;
                property.updated_at = now.coerce();
            }

            let ads = s.property_advertisements.get(&id).into_iter().flatten();
            for ad_id in ads {
                if let Some(ad) =
                    s.advertisements.get_mut(ad_id).filter(|ad| ad.is_active)
                {
                    ad.is_active = false;
                    ad.updated_at = now.coerce();
                }

                // Already cancelled `Booking`s keep their modification time.
                let bookings =
                    s.advertisement_bookings.get(ad_id).into_iter().flatten();
                for booking_id in bookings {
                    if let Some(booking) =
                        s.bookings.get_mut(booking_id).filter(|b| b.is_active)
                    {
                        booking.is_active = false;
                        booking.updated_at = now.coerce();
                    }
                }
            }
        })
        .await
        .map_err(tracerr::wrap!())
    }
}
