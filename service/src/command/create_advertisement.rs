//! [`Command`] for creating a new [`Advertisement`].

use common::{
    operations::{Allocate, By, Commit, Insert, Lock, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        advertisement, platform, property, Advertisement, Platform, Property,
    },
    infra::{database, Database},
    read::Active,
    Service,
};

use super::Command;

/// [`Command`] for placing a [`Property`] on a [`Platform`] with a new
/// [`Advertisement`].
#[derive(Clone, Copy, Debug)]
pub struct CreateAdvertisement {
    /// ID of the advertised [`Property`].
    pub property_id: property::Id,

    /// ID of the [`Platform`] to advertise on.
    pub platform_id: platform::Id,
}

impl<Db> Command<CreateAdvertisement> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Active<Property>>, property::Id>>,
            Ok = Option<Active<Property>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Active<Platform>>, platform::Id>>,
            Ok = Option<Active<Platform>>,
            Err = Traced<database::Error>,
        > + Database<
            Allocate<advertisement::Id>,
            Ok = advertisement::Id,
            Err = Traced<database::Error>,
        > + Database<Insert<Advertisement>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Advertisement;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateAdvertisement,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateAdvertisement {
            property_id,
            platform_id,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid racing with the `Property` deletion.
        tx.execute(Lock(By::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        drop(
            tx.execute(Select(By::<Option<Active<Property>>, _>::new(
                property_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?,
        );
        drop(
            tx.execute(Select(By::<Option<Active<Platform>>, _>::new(
                platform_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PlatformNotExists(platform_id))
            .map_err(tracerr::wrap!())?,
        );

        let now = DateTime::now();
        let ad = Advertisement {
            id: tx
                .execute(Allocate::new())
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?,
            property_id,
            platform_id,
            is_active: true,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        tx.execute(Insert(ad.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(ad)
    }
}

/// Error of [`CreateAdvertisement`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Property`] with the provided ID does not exist or is inactive.
    #[display("`Property(id: {_0})` does not exist")]
    #[from(ignore)]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// [`Platform`] with the provided ID does not exist or is inactive.
    #[display("`Platform(id: {_0})` does not exist")]
    #[from(ignore)]
    PlatformNotExists(#[error(not(source))] platform::Id),
}

#[cfg(test)]
mod spec {
    use common::Handler as _;

    use crate::{
        command::{
            create_advertisement::ExecutionError, fixture, CreateAdvertisement,
            DeleteProperty,
        },
        domain::platform,
        query,
        read::advertisement::list::Selector,
    };

    #[tokio::test]
    async fn creates_advertisement() {
        let svc = fixture::service();
        let platform = fixture::platform(&svc).await;
        let property = fixture::property(&svc).await;

        let ad = svc
            .execute(CreateAdvertisement {
                property_id: property.id,
                platform_id: platform.id,
            })
            .await
            .unwrap();

        assert!(ad.is_active);
        assert_eq!(ad.property_id, property.id);
        assert_eq!(ad.platform_id, platform.id);

        let listed = svc
            .execute(query::advertisements::ByProperty(property.id))
            .await
            .unwrap();
        assert_eq!(listed.iter().map(|a| a.id).collect::<Vec<_>>(), [ad.id]);
        assert_eq!(
            svc.execute(query::advertisements::List::by(Selector::All))
                .await
                .unwrap()
                .len(),
            1,
        );
    }

    #[tokio::test]
    async fn requires_active_property() {
        let svc = fixture::service();
        let platform = fixture::platform(&svc).await;
        let property = fixture::property(&svc).await;
        svc.execute(DeleteProperty {
            property_id: property.id,
        })
        .await
        .unwrap();

        let err = svc
            .execute(CreateAdvertisement {
                property_id: property.id,
                platform_id: platform.id,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::PropertyNotExists(_)));
    }

    #[tokio::test]
    async fn requires_existing_platform() {
        let svc = fixture::service();
        let property = fixture::property(&svc).await;
        let unknown = platform::Id::from(42_i64);

        let err = svc
            .execute(CreateAdvertisement {
                property_id: property.id,
                platform_id: unknown,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::PlatformNotExists(id) if *id == unknown,
        ));
    }
}
