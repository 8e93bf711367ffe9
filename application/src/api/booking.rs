//! [`Booking`]-related HTTP API definitions.

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
    domain::{self, advertisement, booking},
    query::{self, Query as _},
    read,
};

use crate::{
    api::{method_not_allowed, JsonBody, PathParam},
    AsError, Error, Service, Session,
};

/// Routes of the [`Booking`] API.
///
/// [`Booking`]s are immutable, so they can only be created, read and
/// deactivated.
pub(crate) fn routes() -> Router<Service> {
    Router::new()
        .route(
            "/bookings",
            get(list).post(create).fallback(method_not_allowed),
        )
        .route(
            "/bookings/:id",
            get(by_id).delete(delete).fallback(method_not_allowed),
        )
        .route(
            "/bookings/property/:id",
            get(by_property).fallback(method_not_allowed),
        )
        .route(
            "/bookings/advertisement/:id",
            get(by_advertisement).fallback(method_not_allowed),
        )
}

/// Reservation of a stay made through an advertisement.
#[derive(Clone, Debug, Serialize)]
pub struct Booking {
    /// Unique ID of this [`Booking`].
    pub id: booking::Id,

    /// ID of the advertisement this [`Booking`] was made through.
    pub advertisement_id: advertisement::Id,

    /// Unique code of this [`Booking`].
    pub code: booking::Code,

    /// Comment left for this [`Booking`], if any.
    pub comment: Option<booking::Comment>,

    /// Total charge of this [`Booking`].
    pub total: Money,

    /// First occupied [`Date`].
    pub checkin: Date,

    /// [`Date`] the guest leaves on.
    pub checkout: Date,

    /// Indicator whether this [`Booking`] is active.
    pub is_active: bool,

    /// [`DateTime`] when this [`Booking`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub created_at: booking::CreationDateTime,

    /// [`DateTime`] when this [`Booking`] was modified the last time.
    ///
    /// [`DateTime`]: common::DateTime
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub updated_at: booking::ModificationDateTime,
}

impl From<domain::Booking> for Booking {
    fn from(booking: domain::Booking) -> Self {
        let domain::Booking {
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

        Self {
            id,
            advertisement_id,
            code,
            comment,
            total,
            checkin: stay.checkin(),
            checkout: stay.checkout(),
            is_active,
            created_at,
            updated_at,
        }
    }
}

/// Request for creating a new [`Booking`].
#[derive(Clone, Debug, Deserialize)]
pub struct CreateRequest {
    /// ID of the advertisement to book through.
    pub advertisement_id: advertisement::Id,

    /// Comment to leave, if any.
    #[serde(default)]
    pub comment: Option<String>,

    /// Total charge, zero if omitted.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub total: Option<Decimal>,

    /// First occupied [`Date`].
    pub checkin: Date,

    /// [`Date`] the guest leaves on.
    pub checkout: Date,
}

/// Converts the provided [`domain::Booking`]s into a JSON response.
fn to_json(bookings: Vec<domain::Booking>) -> Json<Vec<Booking>> {
    Json(bookings.into_iter().map(Booking::from).collect())
}

/// Lists all the active [`Booking`]s.
#[tracing::instrument(skip_all)]
async fn list(
    _: Session,
    State(service): State<Service>,
) -> Result<impl IntoResponse, Error> {
    service
        .execute(query::bookings::List::by(
            read::booking::list::Selector::All,
        ))
        .await
        .map(to_json)
        .map_err(AsError::into_error)
}

/// Lists the active [`Booking`]s made for the requested active property.
#[tracing::instrument(skip(service))]
async fn by_property(
    _: Session,
    State(service): State<Service>,
    WithRejection(Path(id), _): PathParam<domain::property::Id>,
) -> Result<impl IntoResponse, Error> {
    service
        .execute(query::bookings::ByProperty(id))
        .await
        .map(to_json)
        .map_err(AsError::into_error)
}

/// Lists the active [`Booking`]s made through the requested active
/// advertisement.
#[tracing::instrument(skip(service))]
async fn by_advertisement(
    _: Session,
    State(service): State<Service>,
    WithRejection(Path(id), _): PathParam<advertisement::Id>,
) -> Result<impl IntoResponse, Error> {
    service
        .execute(query::bookings::ByAdvertisement(id))
        .await
        .map(to_json)
        .map_err(AsError::into_error)
}

/// Returns the active [`Booking`] with the requested ID.
#[tracing::instrument(skip(service))]
async fn by_id(
    _: Session,
    State(service): State<Service>,
    WithRejection(Path(id), _): PathParam<booking::Id>,
) -> Result<impl IntoResponse, Error> {
    let booking = service
        .execute(query::booking::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| {
            Error::not_found(&format!("`Booking(id: {id})` does not exist"))
        })?;

    Ok(Json(Booking::from(booking.into_inner())))
}

/// Admits a new [`Booking`].
#[tracing::instrument(skip(service))]
async fn create(
    _: Session,
    State(service): State<Service>,
    WithRejection(Json(body), _): JsonBody<CreateRequest>,
) -> Result<impl IntoResponse, Error> {
    let CreateRequest {
        advertisement_id,
        comment,
        total,
        checkin,
        checkout,
    } = body;

    let booking = service
        .execute(command::CreateBooking {
            advertisement_id,
            comment,
            total,
            checkin,
            checkout,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((http::StatusCode::CREATED, Json(Booking::from(booking))))
}

/// Deactivates the active [`Booking`] with the requested ID.
#[tracing::instrument(skip(service))]
async fn delete(
    _: Session,
    State(service): State<Service>,
    WithRejection(Path(id), _): PathParam<booking::Id>,
) -> Result<impl IntoResponse, Error> {
    service
        .execute(command::DeleteBooking { booking_id: id })
        .await
        .map_err(AsError::into_error)?;

    Ok(http::StatusCode::NO_CONTENT)
}

impl AsError for command::create_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Invalid(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::create_booking::ValidationError {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::invalid(self.field, self.reason, self))
    }
}

impl AsError for command::delete_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::BookingNotExists(_) => Some(Error::not_found(self)),
        }
    }
}

impl AsError for query::bookings::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PropertyNotExists(_) | Self::AdvertisementNotExists(_) => {
                Some(Error::not_found(self))
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use service::command::create_booking::{Field, Reason, ValidationError};

    use crate::AsError as _;

    use super::CreateRequest;

    #[test]
    fn validation_error_renders_field_and_reason() {
        let err = ValidationError::of(Field::AdvertisementId, Reason::NotFound)
            .as_error();

        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
        assert_eq!(err.field.as_deref(), Some("advertisement_id"));
        assert_eq!(err.reason.as_deref(), Some("not_found"));
    }

    #[test]
    fn date_conflict_has_no_field() {
        let err = ValidationError {
            field: None,
            reason: Reason::DateConflict,
        }
        .as_error();

        assert_eq!(err.field, None);
        assert_eq!(err.reason.as_deref(), Some("date_conflict"));
    }

    #[test]
    fn request_dates_are_calendar_dates() {
        let req: CreateRequest = serde_json::from_str(
            r#"{
                "advertisement_id": 10,
                "checkin": "2023-07-14",
                "checkout": "2023-07-15",
                "total": 120.5
            }"#,
        )
        .unwrap();

        assert_eq!(req.checkin.to_string(), "2023-07-14");
        assert_eq!(req.checkout.to_string(), "2023-07-15");
        assert!(req.comment.is_none());
        assert_eq!(req.total.map(|t| t.to_string()), Some("120.5".to_owned()));

        assert!(serde_json::from_str::<CreateRequest>(
            r#"{"advertisement_id": 1, "checkin": "14/07/2023",
                "checkout": "2023-07-15"}"#,
        )
        .is_err());
    }
}
