//! Postgres database clients.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection},
};

/// Non-transactional Postgres database client.
///
/// Checks out a pooled connection for every statement.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to check connections out of.
    pool: connection::Pool,
}

impl NonTx {
    /// Creates a new [`NonTx`] client on top of the provided
    /// [`connection::Pool`].
    #[must_use]
    pub(crate) fn from_pool(pool: connection::Pool) -> Self {
        Self { pool }
    }

    /// Checks out a [`connection::Pooled`] connection.
    pub(crate) async fn conn(
        &self,
    ) -> Result<connection::Pooled, Traced<database::Error>> {
        self.pool
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

impl Connection for NonTx {
    async fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.conn()
            .await
            .map_err(tracerr::wrap!())?
            .query(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.conn()
            .await
            .map_err(tracerr::wrap!())?
            .query_opt(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.conn()
            .await
            .map_err(tracerr::wrap!())?
            .exec(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }
}

/// Transactional Postgres database client.
///
/// All its clones share the same transaction, which is rolled back once the
/// last of them is dropped without committing.
#[derive(Clone, Debug)]
pub struct Tx {
    /// Running [`connection::Tx`], until it's committed.
    tx: Arc<Mutex<Option<connection::Tx>>>,
}

impl Tx {
    /// Begins a new [`Tx`] on a connection checked out by the provided
    /// [`NonTx`] client.
    ///
    /// # Errors
    ///
    /// If failed to check out a connection or to begin a transaction.
    pub async fn begin(client: &NonTx) -> Result<Self, Traced<database::Error>> {
        let conn = client.conn().await.map_err(tracerr::wrap!())?;
        let tx = connection::Tx::begin(conn)
            .await
            .map_err(tracerr::wrap!())?;
        Ok(Self {
            tx: Arc::new(Mutex::new(Some(tx))),
        })
    }

    /// Commits this [`Tx`].
    ///
    /// # Errors
    ///
    /// If this [`Tx`] is committed already, or the commit itself fails.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        self.tx
            .lock()
            .await
            .take()
            .ok_or(postgres::Error::TransactionFinished)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?
            .commit()
            .await
            .map_err(tracerr::wrap!())
    }
}

impl Connection for Tx {
    async fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.tx
            .lock()
            .await
            .as_ref()
            .ok_or(postgres::Error::TransactionFinished)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?
            .query(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.tx
            .lock()
            .await
            .as_ref()
            .ok_or(postgres::Error::TransactionFinished)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?
            .query_opt(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.tx
            .lock()
            .await
            .as_ref()
            .ok_or(postgres::Error::TransactionFinished)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?
            .exec(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }
}
