//! [`Platform`]-related [`Database`] implementations.
//!
//! [`Platform`]s are seeded by migrations, so only reading is supported.

use common::operations::{By, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{platform, Platform},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::Active,
};

/// Maps the provided [`Row`] of the `platforms` table into a [`Platform`].
fn from_row(row: &Row) -> Platform {
    Platform {
        id: row.get("id"),
        name: row.get("name"),
        fee_rate: row.get("fee_rate"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Select<By<Option<Active<Platform>>, platform::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Active<Platform>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Active<Platform>>, platform::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: platform::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, name, fee_rate, is_active, created_at, updated_at \
            FROM platforms \
            WHERE id = $1::INT8 \
              AND is_active";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row)
            .map(Active))
    }
}

impl<C> Database<Select<By<Vec<Platform>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Platform>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Platform>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id, name, fee_rate, is_active, created_at, updated_at \
            FROM platforms \
            WHERE is_active \
            ORDER BY id ASC";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}
