//! [`Command`] for updating an [`Advertisement`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
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

/// [`Command`] for updating an active [`Advertisement`].
///
/// Only the [`Platform`] may be changed, while the advertised [`Property`]
/// stays the same.
#[derive(Clone, Copy, Debug)]
pub struct UpdateAdvertisement {
    /// ID of the [`Advertisement`] to update.
    pub advertisement_id: advertisement::Id,

    /// ID of the new [`Platform`] of the [`Advertisement`], if changed.
    pub platform_id: Option<platform::Id>,
}

impl<Db> Command<UpdateAdvertisement> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Active<Advertisement>>, advertisement::Id>>,
            Ok = Option<Active<Advertisement>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Active<Platform>>, platform::Id>>,
            Ok = Option<Active<Platform>>,
            Err = Traced<database::Error>,
        > + Database<Update<Advertisement>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Advertisement;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateAdvertisement,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateAdvertisement {
            advertisement_id,
            platform_id,
        } = cmd;

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
            .ok_or(E::AdvertisementNotExists(advertisement_id))
            .map_err(tracerr::wrap!())?
            .property_id;

        // Serialize with the cascade deletion of the owning `Property`.
        tx.execute(Lock(By::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut ad = tx
            .execute(Select(By::<Option<Active<Advertisement>>, _>::new(
                advertisement_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AdvertisementNotExists(advertisement_id))
            .map_err(tracerr::wrap!())?
            .into_inner();

        if let Some(platform_id) = platform_id {
            drop(
                tx.execute(Select(By::<Option<Active<Platform>>, _>::new(
                    platform_id,
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::PlatformNotExists(platform_id))
                .map_err(tracerr::wrap!())?,
            );
            ad.platform_id = platform_id;
        }
        ad.updated_at = DateTime::now().coerce();

        tx.execute(Update(ad.clone()))
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

/// Error of [`UpdateAdvertisement`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Advertisement`] with the provided ID does not exist or is inactive.
    #[display("`Advertisement(id: {_0})` does not exist")]
    #[from(ignore)]
    AdvertisementNotExists(#[error(not(source))] advertisement::Id),

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
            fixture, update_advertisement::ExecutionError, DeleteProperty,
            UpdateAdvertisement,
        },
        domain::{advertisement, platform},
        query,
    };

    #[tokio::test]
    async fn switches_platform_only() {
        let svc = fixture::service();
        let airbnb = fixture::platform(&svc).await;
        let hurb = fixture::platform(&svc).await;
        let property = fixture::property(&svc).await;
        let ad = fixture::advertisement(&svc, property.id, airbnb.id).await;

        let updated = svc
            .execute(UpdateAdvertisement {
                advertisement_id: ad.id,
                platform_id: Some(hurb.id),
            })
            .await
            .unwrap();

        assert_eq!(updated.id, ad.id);
        assert_eq!(updated.platform_id, hurb.id);
        assert_eq!(updated.property_id, property.id);
        assert_eq!(updated.created_at, ad.created_at);
    }

    #[tokio::test]
    async fn rejects_unknown_platform() {
        let svc = fixture::service();
        let platform = fixture::platform(&svc).await;
        let property = fixture::property(&svc).await;
        let ad = fixture::advertisement(&svc, property.id, platform.id).await;

        let err = svc
            .execute(UpdateAdvertisement {
                advertisement_id: ad.id,
                platform_id: Some(platform::Id::from(99_i64)),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::PlatformNotExists(_)));
    }

    #[tokio::test]
    async fn rejects_unknown_advertisement() {
        let svc = fixture::service();

        let err = svc
            .execute(UpdateAdvertisement {
                advertisement_id: advertisement::Id::from(7_i64),
                platform_id: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::AdvertisementNotExists(_),
        ));
    }

    #[tokio::test]
    async fn rejects_advertisement_of_deleted_property() {
        let svc = fixture::service();
        let airbnb = fixture::platform(&svc).await;
        let hurb = fixture::platform(&svc).await;
        let property = fixture::property(&svc).await;
        let ad = fixture::advertisement(&svc, property.id, airbnb.id).await;
        svc.execute(DeleteProperty {
            property_id: property.id,
        })
        .await
        .unwrap();

        let err = svc
            .execute(UpdateAdvertisement {
                advertisement_id: ad.id,
                platform_id: Some(hurb.id),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::AdvertisementNotExists(id) if *id == ad.id,
        ));
        assert!(svc
            .execute(query::advertisement::ById::by(ad.id))
            .await
            .unwrap()
            .is_none());
    }
}
