//! [`Property`]-related HTTP API definitions.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use common::{Date, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, property},
    query::{self, Query as _},
};

use crate::{
    api::{method_not_allowed, JsonBody, PathParam},
    AsError, Error, Service, Session,
};

/// Routes of the [`Property`] API.
pub(crate) fn routes() -> Router<Service> {
    Router::new()
        .route(
            "/properties",
            get(list).post(create).fallback(method_not_allowed),
        )
        .route(
            "/properties/:id",
            get(by_id)
                .patch(update)
                .delete(delete)
                .fallback(method_not_allowed),
        )
}

/// Rental property.
#[derive(Clone, Debug, Serialize)]
pub struct Property {
    /// Unique ID of this [`Property`].
    pub id: property::Id,

    /// Maximum number of guests.
    pub guest_limit: property::GuestLimit,

    /// Number of bathrooms.
    pub bathrooms: property::Bathrooms,

    /// Indicator whether pets are allowed.
    pub pets_allowed: bool,

    /// Cleaning fee charged per stay.
    pub cleaning_fee: Money,

    /// [`Date`] since which this [`Property`] is available, if any.
    pub activation_date: Option<Date>,

    /// Indicator whether this [`Property`] is active.
    pub is_active: bool,

    /// [`DateTime`] when this [`Property`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub created_at: property::CreationDateTime,

    /// [`DateTime`] when this [`Property`] was modified the last time.
    ///
    /// [`DateTime`]: common::DateTime
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub updated_at: property::ModificationDateTime,
}

impl From<domain::Property> for Property {
    fn from(property: domain::Property) -> Self {
        let domain::Property {
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

        Self {
            id,
            guest_limit,
            bathrooms,
            pets_allowed,
            cleaning_fee,
            activation_date,
            is_active,
            created_at,
            updated_at,
        }
    }
}

/// Request for creating a new [`Property`].
#[derive(Clone, Debug, Deserialize)]
pub struct CreateRequest {
    /// Maximum number of guests, at least one.
    pub guest_limit: i32,

    /// Number of bathrooms, zero if omitted.
    #[serde(default)]
    pub bathrooms: i32,

    /// Indicator whether pets are allowed, `false` if omitted.
    #[serde(default)]
    pub pets_allowed: bool,

    /// Cleaning fee, zero if omitted.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub cleaning_fee: Option<Decimal>,

    /// [`Date`] since which the [`Property`] is available, if any.
    #[serde(default)]
    pub activation_date: Option<Date>,
}

/// Request for updating an existing [`Property`].
///
/// Omitted fields are left unchanged.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateRequest {
    /// New maximum number of guests.
    pub guest_limit: Option<i32>,

    /// New number of bathrooms.
    pub bathrooms: Option<i32>,

    /// New indicator whether pets are allowed.
    pub pets_allowed: Option<bool>,

    /// New cleaning fee.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub cleaning_fee: Option<Decimal>,

    /// New activation [`Date`], `null` to clear it.
    #[serde(default, deserialize_with = "super::de::present")]
    pub activation_date: Option<Option<Date>>,
}

/// Validates the provided `guest_limit`.
fn guest_limit(limit: i32) -> Result<property::GuestLimit, Error> {
    property::GuestLimit::new(limit).ok_or_else(|| {
        Error::invalid(
            Some("guest_limit"),
            "not_positive",
            &"`guest_limit` must be at least 1",
        )
    })
}

/// Validates the provided `bathrooms` count.
fn bathrooms(count: i32) -> Result<property::Bathrooms, Error> {
    property::Bathrooms::new(count).ok_or_else(|| {
        Error::invalid(
            Some("bathrooms"),
            "negative",
            &"`bathrooms` must not be negative",
        )
    })
}

/// Validates the provided `cleaning_fee`.
fn cleaning_fee(fee: Decimal) -> Result<Money, Error> {
    Money::new(fee).ok_or_else(|| {
        Error::invalid(
            Some("cleaning_fee"),
            "negative",
            &"`cleaning_fee` must not be negative",
        )
    })
}

/// Lists all the active [`Property`]s.
#[tracing::instrument(skip_all)]
async fn list(
    _: Session,
    State(service): State<Service>,
) -> Result<impl IntoResponse, Error> {
    let properties = service
        .execute(query::properties::List::by(()))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(
        properties.into_iter().map(Property::from).collect::<Vec<_>>(),
    ))
}

/// Returns the active [`Property`] with the requested ID.
#[tracing::instrument(skip(service))]
async fn by_id(
    _: Session,
    State(service): State<Service>,
    WithRejection(Path(id), _): PathParam<property::Id>,
) -> Result<impl IntoResponse, Error> {
    let property = service
        .execute(query::property::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| {
            Error::not_found(&format!("`Property(id: {id})` does not exist"))
        })?;

    Ok(Json(Property::from(property.into_inner())))
}

/// Creates a new [`Property`].
#[tracing::instrument(skip(service))]
async fn create(
    _: Session,
    State(service): State<Service>,
    WithRejection(Json(body), _): JsonBody<CreateRequest>,
) -> Result<impl IntoResponse, Error> {
    let CreateRequest {
        guest_limit: limit,
        bathrooms: count,
        pets_allowed,
        cleaning_fee: fee,
        activation_date,
    } = body;

    let property = service
        .execute(command::CreateProperty {
            guest_limit: guest_limit(limit)?,
            bathrooms: bathrooms(count)?,
            pets_allowed,
            cleaning_fee: fee
                .map(cleaning_fee)
                .transpose()?
                .unwrap_or_default(),
            activation_date,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((http::StatusCode::CREATED, Json(Property::from(property))))
}

/// Partially updates the active [`Property`] with the requested ID.
#[tracing::instrument(skip(service))]
async fn update(
    _: Session,
    State(service): State<Service>,
    WithRejection(Path(id), _): PathParam<property::Id>,
    WithRejection(Json(body), _): JsonBody<UpdateRequest>,
) -> Result<impl IntoResponse, Error> {
    let UpdateRequest {
        guest_limit: limit,
        bathrooms: count,
        pets_allowed,
        cleaning_fee: fee,
        activation_date,
    } = body;

    let property = service
        .execute(command::UpdateProperty {
            guest_limit: limit.map(guest_limit).transpose()?,
            bathrooms: count.map(bathrooms).transpose()?,
            pets_allowed,
            cleaning_fee: fee.map(cleaning_fee).transpose()?,
            activation_date,
            ..command::UpdateProperty::new(id)
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Property::from(property)))
}

/// Deactivates the [`Property`] with the requested ID along with all its
/// advertisements and bookings.
#[tracing::instrument(skip(service))]
async fn delete(
    _: Session,
    State(service): State<Service>,
    WithRejection(Path(id), _): PathParam<property::Id>,
) -> Result<impl IntoResponse, Error> {
    service
        .execute(command::DeleteProperty { property_id: id })
        .await
        .map_err(AsError::into_error)?;

    Ok(http::StatusCode::NO_CONTENT)
}

impl AsError for command::create_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ActivationDateInPast(_) => {
                Some(Error::invalid(Some("activation_date"), "in_past", self))
            }
        }
    }
}

impl AsError for command::update_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ActivationDateInPast(_) => {
                Some(Error::invalid(Some("activation_date"), "in_past", self))
            }
            Self::PropertyNotExists(_) => Some(Error::not_found(self)),
        }
    }
}

impl AsError for command::delete_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PropertyNotExists(_) => Some(Error::not_found(self)),
        }
    }
}

#[cfg(test)]
mod spec {
    use super::{CreateRequest, UpdateRequest};

    #[test]
    fn create_request_defaults() {
        let req: CreateRequest =
            serde_json::from_str(r#"{"guest_limit": 4}"#).unwrap();

        assert_eq!(req.guest_limit, 4);
        assert_eq!(req.bathrooms, 0);
        assert!(!req.pets_allowed);
        assert!(req.cleaning_fee.is_none());
        assert!(req.activation_date.is_none());
    }

    #[test]
    fn update_request_distinguishes_null_from_omitted() {
        let omitted: UpdateRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(omitted.activation_date, None);

        let cleared: UpdateRequest =
            serde_json::from_str(r#"{"activation_date": null}"#).unwrap();
        assert_eq!(cleared.activation_date, Some(None));

        let set: UpdateRequest =
            serde_json::from_str(r#"{"activation_date": "2031-01-02"}"#)
                .unwrap();
        assert_eq!(
            set.activation_date.flatten().map(|d| d.to_string()),
            Some("2031-01-02".to_owned()),
        );
    }

    #[test]
    fn cleaning_fee_is_a_number() {
        let req: UpdateRequest =
            serde_json::from_str(r#"{"cleaning_fee": 25.5}"#).unwrap();

        assert_eq!(
            req.cleaning_fee.map(|f| f.to_string()),
            Some("25.5".to_owned()),
        );
    }
}
