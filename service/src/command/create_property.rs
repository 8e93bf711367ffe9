//! [`Command`] for creating a new [`Property`].

use common::{
    operations::{Allocate, Commit, Insert, Transact, Transacted},
    Date, DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{property, Property},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Property`].
#[derive(Clone, Debug)]
pub struct CreateProperty {
    /// [`property::GuestLimit`] of a new [`Property`].
    pub guest_limit: property::GuestLimit,

    /// [`property::Bathrooms`] of a new [`Property`].
    pub bathrooms: property::Bathrooms,

    /// Indicator whether pets are allowed in a new [`Property`].
    pub pets_allowed: bool,

    /// Cleaning fee of a new [`Property`].
    pub cleaning_fee: Money,

    /// [`Date`] a new [`Property`] becomes available on, if scheduled.
    pub activation_date: Option<Date>,
}

impl<Db> Command<CreateProperty> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Allocate<property::Id>,
            Ok = property::Id,
            Err = Traced<database::Error>,
        > + Database<Insert<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateProperty {
            guest_limit,
            bathrooms,
            pets_allowed,
            cleaning_fee,
            activation_date,
        } = cmd;

        if let Some(date) = activation_date {
            if date < Date::today() {
                return Err(tracerr::new!(E::ActivationDateInPast(date)));
            }
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let now = DateTime::now();
        let property = Property {
            id: tx
                .execute(Allocate::new())
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?,
            guest_limit,
            bathrooms,
            pets_allowed,
            cleaning_fee,
            activation_date,
            is_active: true,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        tx.execute(Insert(property.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(property)
    }
}

/// Error of [`CreateProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Activation [`Date`] is before today.
    #[display("Activation date `{_0}` is in the past")]
    #[from(ignore)]
    ActivationDateInPast(#[error(not(source))] Date),
}

#[cfg(test)]
mod spec {
    use common::{Date, Handler as _, Money};

    use crate::{
        command::{create_property::ExecutionError, CreateProperty},
        domain::property,
        infra::Memory,
        query, Config, Service,
    };

    fn cmd() -> CreateProperty {
        CreateProperty {
            guest_limit: property::GuestLimit::new(4).unwrap(),
            bathrooms: property::Bathrooms::default(),
            pets_allowed: false,
            cleaning_fee: Money::ZERO,
            activation_date: None,
        }
    }

    #[tokio::test]
    async fn creates_property() {
        let svc = Service::new(Config::with_secret(b"secret"), Memory::new());

        let first = svc.execute(cmd()).await.unwrap();
        let second = svc
            .execute(CreateProperty {
                activation_date: Some(Date::today()),
                ..cmd()
            })
            .await
            .unwrap();

        assert!(first.is_active);
        assert!(first.id < second.id);
        assert_eq!(first.created_at.coerce(), first.updated_at);
        assert_eq!(second.activation_date, Some(Date::today()));

        let listed = svc.execute(query::properties::List::by(())).await.unwrap();
        assert_eq!(
            listed.iter().map(|p| p.id).collect::<Vec<_>>(),
            [first.id, second.id],
        );
    }

    #[tokio::test]
    async fn rejects_activation_date_in_past() {
        let svc = Service::new(Config::with_secret(b"secret"), Memory::new());
        let yesterday = Date::today().checked_add_days(-1).unwrap();

        let err = svc
            .execute(CreateProperty {
                activation_date: Some(yesterday),
                ..cmd()
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ActivationDateInPast(d) if *d == yesterday,
        ));
        assert!(svc
            .execute(query::properties::List::by(()))
            .await
            .unwrap()
            .is_empty());
    }
}
