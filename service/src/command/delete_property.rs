//! [`Command`] for deleting a [`Property`].

use common::operations::{By, Commit, Delete, Lock, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{Advertisement, Booking};
use crate::{
    domain::{property, Property},
    infra::{database, Database},
    read::Active,
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Property`].
///
/// Deactivates the [`Property`] along with all its [`Advertisement`]s and
/// all the [`Booking`]s made through them, atomically.
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteProperty {
    /// ID of the [`Property`] to delete.
    pub property_id: property::Id,
}

impl<Db> Command<DeleteProperty> for Service<Db>
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
            Delete<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteProperty { property_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Hold off new `Booking`s while the cascade is running.
        tx.execute(Lock(By::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        drop(
            tx.execute(Select(By::new(property_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::PropertyNotExists(property_id))
                .map_err(tracerr::wrap!())?,
        );

        tx.execute(Delete(By::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)
    }
}

/// Error of [`DeleteProperty`] [`Command`] execution.
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
