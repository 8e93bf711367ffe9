//! [`Property`]-related [`Database`] implementations.

use common::operations::{Allocate, By, Delete, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{property, Property},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::Active,
};

/// Maps the provided [`Row`] of the `properties` table into a [`Property`].
fn from_row(row: &Row) -> Property {
    Property {
        id: row.get("id"),
        guest_limit: row.get("guest_limit"),
        bathrooms: row.get("bathrooms"),
        pets_allowed: row.get("pets_allowed"),
        cleaning_fee: row.get("cleaning_fee"),
        activation_date: row.get("activation_date"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Allocate<property::Id>> for Postgres<C>
where
    C: Connection,
{
    type Ok = property::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Allocate<property::Id>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "SELECT nextval('properties_id_seq') AS id";
        let row = self.query_opt(SQL, &[]).await.map_err(tracerr::wrap!())?;
        Ok(row.expect("`nextval()` always returns a row").get("id"))
    }
}

impl<C> Database<Insert<Property>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(property): Insert<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        let Property {
            id,
            guest_limit,
            bathrooms,
            pets_allowed,
            cleaning_fee,
            activation_date,
            is_active,
            created_at,
            updated_at,
        } = property;

        const SQL: &str = "\
            INSERT INTO properties (\
                id, guest_limit, bathrooms, pets_allowed, cleaning_fee, \
                activation_date, is_active, created_at, updated_at\
            ) VALUES (\
                $1::INT8, $2::INT4, $3::INT4, $4::BOOL, $5::NUMERIC, \
                $6::DATE, $7::BOOL, $8::TIMESTAMPTZ, $9::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &guest_limit,
                &bathrooms,
                &pets_allowed,
                &cleaning_fee,
                &activation_date,
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

impl<C> Database<Update<Property>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(property): Update<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        let Property {
            id,
            guest_limit,
            bathrooms,
            pets_allowed,
            cleaning_fee,
            activation_date,
            is_active,
            created_at: _,
            updated_at,
        } = property;

        const SQL: &str = "\
            UPDATE properties \
            SET guest_limit = $2::INT4, \
                bathrooms = $3::INT4, \
                pets_allowed = $4::BOOL, \
                cleaning_fee = $5::NUMERIC, \
                activation_date = $6::DATE, \
                is_active = $7::BOOL, \
                updated_at = $8::TIMESTAMPTZ \
            WHERE id = $1::INT8";
        self.exec(
            SQL,
            &[
                &id,
                &guest_limit,
                &bathrooms,
                &pets_allowed,
                &cleaning_fee,
                &activation_date,
                &is_active,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Select<By<Option<Active<Property>>, property::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Active<Property>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Active<Property>>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, guest_limit, bathrooms, pets_allowed, cleaning_fee, \
                   activation_date, is_active, created_at, updated_at \
            FROM properties \
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

impl<C> Database<Select<By<Vec<Property>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Property>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id, guest_limit, bathrooms, pets_allowed, cleaning_fee, \
                   activation_date, is_active, created_at, updated_at \
            FROM properties \
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

impl<C> Database<Lock<By<Property, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM properties \
            WHERE id = $1::INT8 \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Property, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        // Single statement, so the cascade is never observed half-applied.
        const SQL: &str = "\
            WITH deactivated_property AS (\
                UPDATE properties \
                SET is_active = FALSE, \
                    updated_at = NOW() \
                WHERE id = $1::INT8 \
                RETURNING id\
            ), deactivated_advertisements AS (\
                UPDATE advertisements \
                SET is_active = FALSE, \
                    updated_at = NOW() \
                WHERE property_id = $1::INT8 \
                  AND is_active \
                RETURNING id\
            ) \
            UPDATE bookings \
            SET is_active = FALSE, \
                updated_at = NOW() \
            WHERE advertisement_id IN (\
                SELECT id FROM deactivated_advertisements\
            ) \
              AND is_active";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
