//! [`Command`] for deleting a [`Booking`].

use common::operations::{By, Commit, Delete, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{booking, Booking},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Booking`].
///
/// Deactivates the [`Booking`] only, leaving its siblings untouched.
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteBooking {
    /// ID of the [`Booking`] to delete.
    pub booking_id: booking::Id,
}

impl<Db> Command<DeleteBooking> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Delete<By<Booking, booking::Id>>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteBooking) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteBooking { booking_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Only an active `Booking` is deactivated, so a concurrent deletion
        // of the same one is reported as missing.
        let deactivated = tx
            .execute(Delete(By::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !deactivated {
            return Err(tracerr::new!(E::BookingNotExists(booking_id)));
        }
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)
    }
}

/// Error of [`DeleteBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Booking`] with the provided ID does not exist or is inactive.
    #[display("`Booking(id: {_0})` does not exist")]
    #[from(ignore)]
    BookingNotExists(#[error(not(source))] booking::Id),
}

#[cfg(test)]
mod spec {
    use common::Handler as _;

    use crate::{
        command::{delete_booking::ExecutionError, fixture, DeleteBooking},
        query,
    };

    #[tokio::test]
    async fn deactivates_only_deleted_booking() {
        let svc = fixture::service();
        let ad = fixture::listing(&svc).await;
        let deleted = fixture::booking(&svc, ad, 1, 2).await;
        let sibling = fixture::booking(&svc, ad, 2, 3).await;

        svc.execute(DeleteBooking {
            booking_id: deleted.id,
        })
        .await
        .unwrap();

        assert!(svc
            .execute(query::booking::ById::by(deleted.id))
            .await
            .unwrap()
            .is_none());
        let listed = svc
            .execute(query::bookings::ByAdvertisement(ad))
            .await
            .unwrap();
        assert_eq!(listed.iter().map(|b| b.id).collect::<Vec<_>>(), [sibling.id]);
        assert!(svc
            .execute(query::advertisement::ById::by(ad))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn rejects_already_deleted_booking() {
        let svc = fixture::service();
        let ad = fixture::listing(&svc).await;
        let booking = fixture::booking(&svc, ad, 1, 2).await;
        svc.execute(DeleteBooking {
            booking_id: booking.id,
        })
        .await
        .unwrap();

        let err = svc
            .execute(DeleteBooking {
                booking_id: booking.id,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::BookingNotExists(id) if *id == booking.id,
        ));
    }
}
