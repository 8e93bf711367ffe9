//! [`Advertisement`]-related [`Database`] implementations.

use common::operations::{Allocate, By, Insert, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{advertisement, Advertisement},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::{self, Active},
};

/// Maps the provided [`Row`] of the `advertisements` table into an
/// [`Advertisement`].
fn from_row(row: &Row) -> Advertisement {
    Advertisement {
        id: row.get("id"),
        property_id: row.get("property_id"),
        platform_id: row.get("platform_id"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Allocate<advertisement::Id>> for Postgres<C>
where
    C: Connection,
{
    type Ok = advertisement::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Allocate<advertisement::Id>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "SELECT nextval('advertisements_id_seq') AS id";
        let row = self.query_opt(SQL, &[]).await.map_err(tracerr::wrap!())?;
        Ok(row.expect("`nextval()` always returns a row").get("id"))
    }
}

impl<C> Database<Insert<Advertisement>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(ad): Insert<Advertisement>,
    ) -> Result<Self::Ok, Self::Err> {
        let Advertisement {
            id,
            property_id,
            platform_id,
            is_active,
            created_at,
            updated_at,
        } = ad;

        const SQL: &str = "\
            INSERT INTO advertisements (\
                id, property_id, platform_id, \
                is_active, created_at, updated_at\
            ) VALUES (\
                $1::INT8, $2::INT8, $3::INT8, \
                $4::BOOL, $5::TIMESTAMPTZ, $6::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &property_id,
                &platform_id,
                &is_active,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<Advertisement>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(ad): Update<Advertisement>,
    ) -> Result<Self::Ok, Self::Err> {
        // Owning `Property` never changes, and deactivation is terminal.
        let Advertisement {
            id,
            property_id: _,
            platform_id,
            is_active: _,
            created_at: _,
            updated_at,
        } = ad;

        const SQL: &str = "\
            UPDATE advertisements \
            SET platform_id = $2::INT8, \
                updated_at = $3::TIMESTAMPTZ \
            WHERE id = $1::INT8 \
              AND is_active";
        self.exec(SQL, &[&id, &platform_id, &updated_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<Option<Active<Advertisement>>, advertisement::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Active<Advertisement>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<Active<Advertisement>>, advertisement::Id>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: advertisement::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, property_id, platform_id, \
                   is_active, created_at, updated_at \
            FROM advertisements \
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

impl<C>
    Database<
        Select<By<Vec<Advertisement>, read::advertisement::list::Selector>>,
    > for Postgres<C>
where
    C: Connection,
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

        let rows = match by.into_inner() {
            S::All => {
                const SQL: &str = "\
                    SELECT id, property_id, platform_id, \
                           is_active, created_at, updated_at \
                    FROM advertisements \
                    WHERE is_active \
                    ORDER BY id ASC";
                self.query(SQL, &[]).await
            }
            S::ByProperty(property_id) => {
                const SQL: &str = "\
                    SELECT id, property_id, platform_id, \
                           is_active, created_at, updated_at \
                    FROM advertisements \
                    WHERE property_id = $1::INT8 \
                      AND is_active \
                    ORDER BY id ASC";
                self.query(SQL, &[&property_id]).await
            }
        }
        .map_err(tracerr::wrap!())?;

        Ok(rows.iter().map(from_row).collect())
    }
}
