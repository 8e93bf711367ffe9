//! [`Query`] collection related to the multiple [`Advertisement`]s.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{property, Advertisement, Property},
    infra::{database, Database},
    read::{self, Active},
    Service,
};

use super::{DatabaseQuery, Query};

/// Queries a list of active [`Advertisement`]s, ordered by their IDs.
pub type List = DatabaseQuery<
    By<Vec<Advertisement>, read::advertisement::list::Selector>,
>;

/// Queries active [`Advertisement`]s of an active [`Property`], ordered by
/// their IDs.
#[derive(Clone, Copy, Debug)]
pub struct ByProperty(pub property::Id);

impl<Db> Query<ByProperty> for Service<Db>
where
    Db: Database<
            Select<By<Option<Active<Property>>, property::Id>>,
            Ok = Option<Active<Property>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Advertisement>, read::advertisement::list::Selector>>,
            Ok = Vec<Advertisement>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<Advertisement>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        ByProperty(property_id): ByProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use read::advertisement::list::Selector;
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

/// Error of [`ByProperty`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Property`] with the provided ID does not exist or is inactive.
    #[display("`Property(id: {_0})` does not exist")]
    #[from(ignore)]
    PropertyNotExists(#[error(not(source))] property::Id),
}

#[cfg(test)]
mod spec {
    use common::Handler as _;

    use crate::{
        command::{fixture, DeleteProperty},
        domain::property,
        query::advertisements::{ByProperty, ExecutionError},
    };

    #[tokio::test]
    async fn lists_advertisements_of_property_in_order() {
        let svc = fixture::service();
        let platform = fixture::platform(&svc).await;
        let property = fixture::property(&svc).await;
        let other = fixture::property(&svc).await;
        let first = fixture::advertisement(&svc, property.id, platform.id).await;
        drop(fixture::advertisement(&svc, other.id, platform.id).await);
        let second =
            fixture::advertisement(&svc, property.id, platform.id).await;

        let ads = svc.execute(ByProperty(property.id)).await.unwrap();

        assert_eq!(
            ads.iter().map(|a| a.id).collect::<Vec<_>>(),
            [first.id, second.id],
        );
    }

    #[tokio::test]
    async fn requires_active_property() {
        let svc = fixture::service();
        let property = fixture::property(&svc).await;
        svc.execute(DeleteProperty {
            property_id: property.id,
        })
        .await
        .unwrap();

        for id in [property.id, property::Id::from(100_i64)] {
            let err = svc.execute(ByProperty(id)).await.unwrap_err();

            assert!(matches!(
                err.as_ref(),
                ExecutionError::PropertyNotExists(i) if *i == id,
            ));
        }
    }
}
