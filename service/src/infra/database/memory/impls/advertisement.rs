//! [`Advertisement`]-related [`Database`] implementations.

use common::operations::{Allocate, By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{advertisement, Advertisement},
    infra::{
        database::{self, memory::Storage, Memory},
        Database,
    },
    read::{self, Active},
};

impl<C: Storage> Database<Allocate<advertisement::Id>> for Memory<C> {
    type Ok = advertisement::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Allocate<advertisement::Id>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| {
            s.sequences.advertisement += 1;
            advertisement::Id::from(s.sequences.advertisement)
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Storage> Database<Insert<Advertisement>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(ad): Insert<Advertisement>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| {
            _ = s
                .property_advertisements
                .entry(ad.property_id)
                .or_default()
                .insert(ad.id);
            _ = s.advertisement_bookings.entry(ad.id).or_default();
            _ = s.advertisements.insert(ad.id, ad);
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Storage> Database<Update<Advertisement>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(ad): Update<Advertisement>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| {
            if let Some(existing) = s
                .advertisements
                .get_mut(&ad.id)
                .filter(|existing| existing.is_active)
            {
                // Owning `Property` never changes, and deactivation is
                // terminal.
                *existing = Advertisement {
                    property_id: existing.property_id,
                    is_active: true,
                    ..ad
                };
            }
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Storage>
    Database<Select<By<Option<Active<Advertisement>>, advertisement::Id>>>
    for Memory<C>
{
    type Ok = Option<Active<Advertisement>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<Active<Advertisement>>, advertisement::Id>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.read(|s| {
            s.advertisements
                .get(&id)
                .filter(|a| a.is_active)
                .cloned()
                .map(Active)
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Storage>
    Database<
        Select<By<Vec<Advertisement>, read::advertisement::list::Selector>>,
    > for Memory<C>
{
    type Ok = Vec<Advertisement>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<Advertisement>, read::advertisement::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        use read::advertisement::list::Selector as S;

        let selector = by.into_inner();
        self.read(|s| {
            let active = |a: &&Advertisement| a.is_active;
            match selector {
                S::All => {
                    s.advertisements.values().filter(active).cloned().collect()
                }
                S::ByProperty(property_id) => s
                    .property_advertisements
                    .get(&property_id)
                    .into_iter()
                    .flatten()
                    .filter_map(|id| s.advertisements.get(id))
                    .filter(active)
                    .cloned()
                    .collect(),
            }
        })
        .await
        .map_err(tracerr::wrap!())
    }
}
