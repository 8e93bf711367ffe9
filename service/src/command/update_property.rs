//! [`Command`] for updating a [`Property`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Date, DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{property, Property},
    infra::{database, Database},
    read::Active,
    Service,
};

use super::Command;

/// [`Command`] for partially updating an active [`Property`].
///
/// [`None`] fields are left untouched.
#[derive(Clone, Debug)]
pub struct UpdateProperty {
    /// ID of the [`Property`] to update.
    pub property_id: property::Id,

    /// New [`property::GuestLimit`] of the [`Property`].
    pub guest_limit: Option<property::GuestLimit>,

    /// New [`property::Bathrooms`] of the [`Property`].
    pub bathrooms: Option<property::Bathrooms>,

    /// New indicator whether pets are allowed in the [`Property`].
    pub pets_allowed: Option<bool>,

    /// New cleaning fee of the [`Property`].
    pub cleaning_fee: Option<Money>,

    /// New activation [`Date`] of the [`Property`].
    ///
    /// `Some(None)` unschedules the activation.
    pub activation_date: Option<Option<Date>>,
}

impl UpdateProperty {
    /// Creates a new [`UpdateProperty`] [`Command`] leaving all the fields of
    /// the [`Property`] with the provided ID untouched.
    #[must_use]
    pub fn new(property_id: property::Id) -> Self {
        Self {
            property_id,
            guest_limit: None,
            bathrooms: None,
            pets_allowed: None,
            cleaning_fee: None,
            activation_date: None,
        }
    }
}

impl<Db> Command<UpdateProperty> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Active<Property>>, property::Id>>,
            Ok = Option<Active<Property>>,
            Err = Traced<database::Error>,
        > + Database<Update<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateProperty {
            property_id,
            guest_limit,
            bathrooms,
            pets_allowed,
            cleaning_fee,
            activation_date,
        } = cmd;

        if let Some(Some(date)) = activation_date {
            if date < Date::today() {
                return Err(tracerr::new!(E::ActivationDateInPast(date)));
            }
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut property = tx
            .execute(Select(By::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?
            .into_inner();

        if let Some(limit) = guest_limit {
            property.guest_limit = limit;
        }
        if let Some(bathrooms) = bathrooms {
            property.bathrooms = bathrooms;
        }
        if let Some(allowed) = pets_allowed {
            property.pets_allowed = allowed;
        }
        if let Some(fee) = cleaning_fee {
            property.cleaning_fee = fee;
        }
        if let Some(date) = activation_date {
            property.activation_date = date;
        }
        property.updated_at = DateTime::now().coerce();

        tx.execute(Update(property.clone()))
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

/// Error of [`UpdateProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Activation [`Date`] is before today.
    #[display("Activation date `{_0}` is in the past")]
    #[from(ignore)]
    ActivationDateInPast(#[error(not(source))] Date),

    /// [`Property`] with the provided ID does not exist or is inactive.
    #[display("`Property(id: {_0})` does not exist")]
    #[from(ignore)]
    PropertyNotExists(#[error(not(source))] property::Id),
}
