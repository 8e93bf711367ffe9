//! In-memory [`Database`] implementation.
//!
//! Every [`Tx`] holds the exclusive lock of the whole [`State`] until it's
//! committed or dropped, so transactions are fully serialized.

mod impls;

use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    future::Future,
    sync::Arc,
};

use derive_more::{Deref, Display, Error as StdError};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracerr::Traced;

use crate::{
    domain::{
        advertisement, booking, platform, property, Advertisement, Booking,
        Platform, Property,
    },
    infra::database,
};
#[cfg(doc)]
use crate::infra::Database;

/// In-memory [`Database`] client.
#[derive(Clone, Debug, Default, Deref)]
pub struct Memory<T = NonTx>(T);

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// In-memory [`Database`] error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// [`Tx`] has been already committed.
    #[display("`Tx` is already finished")]
    TransactionFinished,
}

/// Storage of a [`Memory`] database client.
pub trait Storage {
    /// Applies the provided function to the current [`State`].
    ///
    /// # Errors
    ///
    /// If the [`State`] is not accessible anymore.
    fn read<F, R>(
        &self,
        f: F,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>
    where
        F: FnOnce(&State) -> R;

    /// Applies the provided function to the current [`State`], allowing to
    /// mutate it.
    ///
    /// # Errors
    ///
    /// If the [`State`] is not accessible anymore.
    fn write<F, R>(
        &self,
        f: F,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>
    where
        F: FnOnce(&mut State) -> R;
}

/// Non-transactional [`Storage`], applying every operation immediately.
#[derive(Clone, Debug, Default)]
pub struct NonTx {
    /// Shared [`State`] of the database.
    state: Arc<Mutex<State>>,
}

impl Storage for NonTx {
    async fn read<F, R>(&self, f: F) -> Result<R, Traced<database::Error>>
    where
        F: FnOnce(&State) -> R,
    {
        Ok(f(&*self.state.lock().await))
    }

    async fn write<F, R>(&self, f: F) -> Result<R, Traced<database::Error>>
    where
        F: FnOnce(&mut State) -> R,
    {
        Ok(f(&mut *self.state.lock().await))
    }
}

/// Transactional [`Storage`], applying operations to a staged copy of the
/// [`State`] and publishing it on commit.
#[derive(Clone, Debug)]
pub struct Tx {
    /// Staged changes of this [`Tx`], if it's not finished yet.
    staged: Arc<Mutex<Option<Staged>>>,
}

/// Changes staged by a [`Tx`].
#[derive(Debug)]
struct Staged {
    /// Exclusive lock of the shared [`State`].
    guard: OwnedMutexGuard<State>,

    /// [`State`] with the changes applied.
    state: State,
}

impl Tx {
    /// Starts a new [`Tx`], waiting for the previous one to finish.
    async fn begin(non_tx: &NonTx) -> Self {
        let guard = Arc::clone(&non_tx.state).lock_owned().await;
        let state = State::clone(&guard);
        Self {
            staged: Arc::new(Mutex::new(Some(Staged { guard, state }))),
        }
    }

    /// Publishes the changes of this [`Tx`].
    ///
    /// # Errors
    ///
    /// If this [`Tx`] is already committed.
    async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let Staged { mut guard, state } = self
            .staged
            .lock()
            .await
            .take()
            .ok_or(Error::TransactionFinished)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?;
        *guard = state;
        Ok(())
    }
}

impl Storage for Tx {
    async fn read<F, R>(&self, f: F) -> Result<R, Traced<database::Error>>
    where
        F: FnOnce(&State) -> R,
    {
        self.staged
            .lock()
            .await
            .as_ref()
            .map(|staged| f(&staged.state))
            .ok_or(Error::TransactionFinished)
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }

    async fn write<F, R>(&self, f: F) -> Result<R, Traced<database::Error>>
    where
        F: FnOnce(&mut State) -> R,
    {
        self.staged
            .lock()
            .await
            .as_mut()
            .map(|staged| f(&mut staged.state))
            .ok_or(Error::TransactionFinished)
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

/// Whole contents of a [`Memory`] database.
#[derive(Clone, Debug, Default)]
pub struct State {
    /// All the [`Property`]s ever created.
    properties: BTreeMap<property::Id, Property>,

    /// All the [`Platform`]s ever created.
    platforms: BTreeMap<platform::Id, Platform>,

    /// All the [`Advertisement`]s ever created.
    advertisements: BTreeMap<advertisement::Id, Advertisement>,

    /// All the [`Booking`]s ever created.
    bookings: BTreeMap<booking::Id, Booking>,

    /// [`Advertisement`]s of every [`Property`].
    property_advertisements: HashMap<property::Id, BTreeSet<advertisement::Id>>,

    /// [`Booking`]s of every [`Advertisement`].
    advertisement_bookings: HashMap<advertisement::Id, BTreeSet<booking::Id>>,

    /// [`booking::Code`]s of all the [`Booking`]s ever created.
    codes: HashSet<booking::Code>,

    /// Last allocated IDs.
    sequences: Sequences,
}

/// Last IDs allocated by a [`Memory`] database.
#[derive(Clone, Copy, Debug, Default)]
struct Sequences {
    /// Last [`property::Id`].
    property: i64,

    /// Last [`platform::Id`].
    platform: i64,

    /// Last [`advertisement::Id`].
    advertisement: i64,

    /// Last [`booking::Id`].
    booking: i64,
}

#[cfg(test)]
mod spec {
    use std::{thread, time::Duration};

    use common::{
        operations::{Allocate, By, Commit, Delete, Transact, Update},
        Handler as _,
    };

    use crate::{
        command::{fixture, DeleteBooking, DeleteProperty},
        domain::{property, Advertisement, Booking},
    };

    use super::{Memory, State};

    /// Returns a copy of the whole [`State`] of the provided [`Memory`].
    async fn snapshot(db: &Memory) -> State {
        db.0.state.lock().await.clone()
    }

    #[tokio::test]
    async fn dropped_tx_discards_changes() {
        let db = Memory::new();

        let tx = db.execute(Transact).await.unwrap();
        let first = tx.execute(Allocate::<property::Id>::new()).await.unwrap();
        drop(tx);

        let tx = db.execute(Transact).await.unwrap();
        let second = tx.execute(Allocate::<property::Id>::new()).await.unwrap();
        tx.execute(Commit).await.unwrap();

        assert_eq!(first, second);

        let third = db.execute(Allocate::<property::Id>::new()).await.unwrap();
        assert!(third > second);
    }

    #[tokio::test]
    async fn tx_cannot_be_committed_twice() {
        let db = Memory::new();

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Commit).await.unwrap();

        assert!(tx.execute(Commit).await.is_err());
        assert!(tx.execute(Allocate::<property::Id>::new()).await.is_err());
    }

    #[tokio::test]
    async fn deactivation_touches_only_update_timestamps() {
        let svc = fixture::service();
        let platform = fixture::platform(&svc).await;
        let property = fixture::property(&svc).await;
        let ad = fixture::advertisement(&svc, property.id, platform.id).await;
        let cancelled = fixture::booking(&svc, ad.id, 1, 2).await;
        let cascaded = fixture::booking(&svc, ad.id, 2, 3).await;
        let before = snapshot(svc.database()).await;

        thread::sleep(Duration::from_millis(2));
        svc.execute(DeleteBooking {
            booking_id: cancelled.id,
        })
        .await
        .unwrap();
        let cancelled_at =
            snapshot(svc.database()).await.bookings[&cancelled.id].updated_at;

        thread::sleep(Duration::from_millis(2));
        svc.execute(DeleteProperty {
            property_id: property.id,
        })
        .await
        .unwrap();
        let after = snapshot(svc.database()).await;

        let (old, new) = (
            &before.properties[&property.id],
            &after.properties[&property.id],
        );
        assert!(!new.is_active);
        assert_eq!(new.created_at, old.created_at);
        assert!(new.updated_at > old.updated_at);

        let (old, new) = (
            &before.advertisements[&ad.id],
            &after.advertisements[&ad.id],
        );
        assert!(!new.is_active);
        assert_eq!(new.created_at, old.created_at);
        assert!(new.updated_at > old.updated_at);

        for id in [cancelled.id, cascaded.id] {
            let (old, new) = (&before.bookings[&id], &after.bookings[&id]);
            assert!(!new.is_active, "{id}");
            assert_eq!(new.created_at, old.created_at, "{id}");
            assert!(new.updated_at > old.updated_at, "{id}");
        }
        // Already inactive `Booking`s are left as is by the cascade.
        assert_eq!(after.bookings[&cancelled.id].updated_at, cancelled_at);
    }

    #[tokio::test]
    async fn update_never_reactivates_advertisement() {
        let svc = fixture::service();
        let platform = fixture::platform(&svc).await;
        let property = fixture::property(&svc).await;
        let ad = fixture::advertisement(&svc, property.id, platform.id).await;
        svc.execute(DeleteProperty {
            property_id: property.id,
        })
        .await
        .unwrap();

        svc.database()
            .execute(Update(Advertisement {
                is_active: true,
                ..ad.clone()
            }))
            .await
            .unwrap();

        let state = snapshot(svc.database()).await;
        assert!(!state.advertisements[&ad.id].is_active);
    }

    #[tokio::test]
    async fn deletes_booking_only_once() {
        let svc = fixture::service();
        let ad = fixture::listing(&svc).await;
        let booking = fixture::booking(&svc, ad, 1, 2).await;
        let db = svc.database();

        let delete = || Delete(By::<Booking, _>::new(booking.id));
        assert!(db.execute(delete()).await.unwrap());
        assert!(!db.execute(delete()).await.unwrap());
    }
}
