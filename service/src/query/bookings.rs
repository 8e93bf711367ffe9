//! [`Query`] collection related to the multiple [`Booking`]s.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{advertisement, property, Advertisement, Booking, Property},
    infra::{database, Database},
    read::{self, Active},
    Service,
};

use super::{DatabaseQuery, Query};

/// Queries a list of active [`Booking`]s, ordered by their IDs.
pub type List =
    DatabaseQuery<By<Vec<Booking>, read::booking::list::Selector>>;

/// Queries active [`Booking`]s made through any [`Advertisement`] of an
/// active [`Property`], ordered by their IDs.
#[derive(Clone, Copy, Debug)]
pub struct ByProperty(pub property::Id);

/// Queries active [`Booking`]s made through an active [`Advertisement`],
/// ordered by their IDs.
#[derive(Clone, Copy, Debug)]
pub struct ByAdvertisement(pub advertisement::Id);

impl<Db> Query<ByProperty> for Service<Db>
where
    Db: Database<
            Select<By<Option<Active<Property>>, property::Id>>,
            Ok = Option<Active<Property>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Booking>, read::booking::list::Selector>>,
            Ok = Vec<Booking>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<Booking>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        ByProperty(property_id): ByProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use read::booking::list::Selector;
        use ExecutionError as E;

        drop(
            self.database()
                .execute(Select(By::<Option<Active<Property>>, _>::new(
                    property_id,
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::PropertyNotExists(property_id))
                .map_err(tracerr::wrap!())?,
        );

        self.database()
            .execute(Select(By::new(Selector::ByProperty(property_id))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

impl<Db> Query<ByAdvertisement> for Service<Db>
where
    Db: Database<
            Select<By<Option<Active<Advertisement>>, advertisement::Id>>,
            Ok = Option<Active<Advertisement>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Booking>, read::booking::list::Selector>>,
            Ok = Vec<Booking>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<Booking>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        ByAdvertisement(advertisement_id): ByAdvertisement,
    ) -> Result<Self::Ok, Self::Err> {
        use read::booking::list::Selector;
        use ExecutionError as E;

        drop(
            self.database()
                .execute(Select(By::<Option<Active<Advertisement>>, _>::new(
                    advertisement_id,
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::AdvertisementNotExists(advertisement_id))
                .map_err(tracerr::wrap!())?,
        );

        self.database()
            .execute(Select(By::new(Selector::ByAdvertisement(
                advertisement_id,
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`ByProperty`] and [`ByAdvertisement`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Property`] with the provided ID does not exist or is inactive.
    #[display("`Property(id: {_0})` does not exist")]
    #[from(ignore)]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// [`Advertisement`] with the provided ID does not exist or is inactive.
    #[display("`Advertisement(id: {_0})` does not exist")]
    #[from(ignore)]
    AdvertisementNotExists(#[error(not(source))] advertisement::Id),
}

#[cfg(test)]
mod spec {
    use common::Handler as _;

    use crate::{
        command::{fixture, DeleteBooking, DeleteProperty},
        domain::advertisement,
        query::bookings::{ByAdvertisement, ByProperty, ExecutionError, List},
        read::booking::list::Selector,
    };

    #[tokio::test]
    async fn lists_bookings_across_advertisements_of_property() {
        let svc = fixture::service();
        let platform = fixture::platform(&svc).await;
        let property = fixture::property(&svc).await;
        let ad1 = fixture::advertisement(&svc, property.id, platform.id).await;
        let ad2 = fixture::advertisement(&svc, property.id, platform.id).await;
        let other = fixture::listing(&svc).await;

        let b1 = fixture::booking(&svc, ad1.id, 1, 2).await;
        let b2 = fixture::booking(&svc, ad2.id, 2, 3).await;
        let foreign = fixture::booking(&svc, other, 1, 2).await;
        let b3 = fixture::booking(&svc, ad1.id, 3, 4).await;
        let deleted = fixture::booking(&svc, ad2.id, 5, 6).await;
        svc.execute(DeleteBooking {
            booking_id: deleted.id,
        })
        .await
        .unwrap();

        let by_property = svc.execute(ByProperty(property.id)).await.unwrap();
        assert_eq!(
            by_property.iter().map(|b| b.id).collect::<Vec<_>>(),
            [b1.id, b2.id, b3.id],
        );

        let by_ad = svc.execute(ByAdvertisement(ad1.id)).await.unwrap();
        assert_eq!(
            by_ad.iter().map(|b| b.id).collect::<Vec<_>>(),
            [b1.id, b3.id],
        );

        let all = svc.execute(List::by(Selector::All)).await.unwrap();
        assert_eq!(
            all.iter().map(|b| b.id).collect::<Vec<_>>(),
            [b1.id, b2.id, foreign.id, b3.id],
        );
    }

    #[tokio::test]
    async fn requires_active_parent() {
        let svc = fixture::service();
        let platform = fixture::platform(&svc).await;
        let property = fixture::property(&svc).await;
        let ad = fixture::advertisement(&svc, property.id, platform.id).await;
        svc.execute(DeleteProperty {
            property_id: property.id,
        })
        .await
        .unwrap();

        let err = svc.execute(ByProperty(property.id)).await.unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::PropertyNotExists(_)));

        for id in [ad.id, advertisement::Id::from(77_i64)] {
            let err = svc.execute(ByAdvertisement(id)).await.unwrap_err();
            assert!(matches!(
                err.as_ref(),
                ExecutionError::AdvertisementNotExists(i) if *i == id,
            ));
        }
    }
}
