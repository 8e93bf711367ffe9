//! [`Platform`]-related [`Database`] implementations.
//!
//! Unlike `Postgres`, which seeds [`Platform`]s with migrations, [`Memory`]
//! allows inserting them directly.

use common::operations::{Allocate, By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{platform, Platform},
    infra::{
        database::{self, memory::Storage, Memory},
        Database,
    },
    read::Active,
};

impl<C: Storage> Database<Allocate<platform::Id>> for Memory<C> {
    type Ok = platform::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Allocate<platform::Id>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| {
            s.sequences.platform += 1;
            platform::Id::from(s.sequences.platform)
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Storage> Database<Insert<Platform>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(platform): Insert<Platform>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| {
            _ = s.platforms.insert(platform.id, platform);
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Storage> Database<Select<By<Option<Active<Platform>>, platform::Id>>>
    for Memory<C>
{
    type Ok = Option<Active<Platform>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Active<Platform>>, platform::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.read(|s| {
            s.platforms
                .get(&id)
                .filter(|p| p.is_active)
                .cloned()
                .map(Active)
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Storage> Database<Select<By<Vec<Platform>, ()>>> for Memory<C> {
    type Ok = Vec<Platform>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Platform>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.read(|s| {
            s.platforms
                .values()
                .filter(|p| p.is_active)
                .cloned()
                .collect()
        })
        .await
        .map_err(tracerr::wrap!())
    }
}
