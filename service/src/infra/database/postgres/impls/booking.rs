//! [`Booking`]-related [`Database`] implementations.

use common::operations::{Allocate, By, Delete, Insert, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{booking, Booking},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::{
        self,
        booking::{occupancy, ConflictScope, IsCodeTaken, Occupancy},
        Active,
    },
};

/// Reads a [`booking::Stay`] out of the provided [`Row`].
fn stay_from_row(row: &Row) -> booking::Stay {
    booking::Stay::new(row.get("checkin"), row.get("checkout"))
        .expect("`bookings_stay_check` constraint holds")
}

/// Maps the provided [`Row`] of the `bookings` table into a [`Booking`].
fn from_row(row: &Row) -> Booking {
    Booking {
        id: row.get("id"),
        advertisement_id: row.get("advertisement_id"),
        code: row.get("code"),
        comment: row.get("comment"),
        total: row.get("total"),
        stay: stay_from_row(row),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Allocate<booking::Id>> for Postgres<C>
where
    C: Connection,
{
    type Ok = booking::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Allocate<booking::Id>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "SELECT nextval('bookings_id_seq') AS id";
        let row = self.query_opt(SQL, &[]).await.map_err(tracerr::wrap!())?;
        Ok(row.expect("`nextval()` always returns a row").get("id"))
    }
}

impl<C> Database<Insert<Booking>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        let Booking {
            id,
            advertisement_id,
            code,
            comment,
            total,
            stay,
            is_active,
            created_at,
            updated_at,
        } = booking;

        const SQL: &str = "\
            INSERT INTO bookings (\
                id, advertisement_id, code, comment, total, \
                checkin, checkout, \
                is_active, created_at, updated_at\
            ) VALUES (\
                $1::INT8, $2::INT8, $3::VARCHAR, $4::TEXT, $5::NUMERIC, \
                $6::DATE, $7::DATE, \
                $8::BOOL, $9::TIMESTAMPTZ, $10::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &advertisement_id,
                &code,
                &comment,
                &total,
                &stay.checkin(),
                &stay.checkout(),
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

impl<C> Database<Select<By<Option<Active<Booking>>, booking::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Active<Booking>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Active<Booking>>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: booking::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, advertisement_id, code, comment, total, \
                   checkin, checkout, \
                   is_active, created_at, updated_at \
            FROM bookings \
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

impl<C> Database<Select<By<Vec<Booking>, read::booking::list::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, read::booking::list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        use read::booking::list::Selector as S;

        let rows = match by.into_inner() {
            S::All => {
                const SQL: &str = "\
                    SELECT id, advertisement_id, code, comment, total, \
                           checkin, checkout, \
                           is_active, created_at, updated_at \
                    FROM bookings \
                    WHERE is_active \
                    ORDER BY id ASC";
                self.query(SQL, &[]).await
            }
            S::ByProperty(property_id) => {
                const SQL: &str = "\
                    SELECT b.id, b.advertisement_id, b.code, b.comment, \
                           b.total, b.checkin, b.checkout, \
                           b.is_active, b.created_at, b.updated_at \
                    FROM bookings AS b \
                    INNER JOIN advertisements AS a \
                            ON a.id = b.advertisement_id \
                    WHERE a.property_id = $1::INT8 \
                      AND b.is_active \
                    ORDER BY b.id ASC";
                self.query(SQL, &[&property_id]).await
            }
            S::ByAdvertisement(advertisement_id) => {
                const SQL: &str = "\
                    SELECT id, advertisement_id, code, comment, total, \
                           checkin, checkout, \
                           is_active, created_at, updated_at \
                    FROM bookings \
                    WHERE advertisement_id = $1::INT8 \
                      AND is_active \
                    ORDER BY id ASC";
                self.query(SQL, &[&advertisement_id]).await
            }
        }
        .map_err(tracerr::wrap!())?;

        Ok(rows.iter().map(from_row).collect())
    }
}

impl<C> Database<Select<By<Vec<Occupancy>, occupancy::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Occupancy>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Occupancy>, occupancy::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let occupancy::Selector {
            property_id,
            stay,
            scope,
        } = by.into_inner();
        let include_inactive = matches!(scope, ConflictScope::All);

        // Closed bounds only narrow down the candidates, while the exact
        // half-open check is `booking::Stay::overlaps()`.
        const SQL: &str = "\
            SELECT b.id, b.checkin, b.checkout \
            FROM bookings AS b \
            INNER JOIN advertisements AS a \
                    ON a.id = b.advertisement_id \
            WHERE a.property_id = $1::INT8 \
              AND b.checkin <= $3::DATE \
              AND b.checkout >= $2::DATE \
              AND ($4::BOOL OR b.is_active) \
            ORDER BY b.id ASC";
        Ok(self
            .query(
                SQL,
                &[
                    &property_id,
                    &stay.checkin(),
                    &stay.checkout(),
                    &include_inactive,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| Occupancy {
                booking_id: row.get("id"),
                stay: stay_from_row(row),
            })
            .filter(|o| o.stay.overlaps(&stay))
            .collect())
    }
}

impl<C> Database<Select<By<IsCodeTaken, booking::Code>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = IsCodeTaken;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<IsCodeTaken, booking::Code>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let code: booking::Code = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM bookings \
            WHERE code = $1::VARCHAR \
            LIMIT 1";
        self.query_opt(SQL, &[&code])
            .await
            .map_err(tracerr::wrap!())
            .map(|r| IsCodeTaken(r.is_some()))
    }
}

impl<C> Database<Delete<By<Booking, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    /// Indicator whether an active [`Booking`] has been deactivated.
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: booking::Id = by.into_inner();

        const SQL: &str = "\
            UPDATE bookings \
            SET is_active = FALSE, \
                updated_at = NOW() \
            WHERE id = $1::INT8 \
              AND is_active";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|affected| affected > 0)
    }
}
