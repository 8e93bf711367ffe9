//! [`Advertisement`]-related HTTP API definitions.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, advertisement, platform, property},
    query::{self, Query as _},
    read,
};

use crate::{
    api::{method_not_allowed, JsonBody, PathParam},
    AsError, Error, Service, Session,
};

/// Routes of the [`Advertisement`] API.
///
/// [`Advertisement`]s cannot be deleted directly, only along with their
/// property.
pub(crate) fn routes() -> Router<Service> {
    Router::new()
        .route(
            "/advertisements",
            get(list).post(create).fallback(method_not_allowed),
        )
        .route(
            "/advertisements/:id",
            get(by_id).patch(update).fallback(method_not_allowed),
        )
        .route(
            "/advertisements/property/:id",
            get(by_property).fallback(method_not_allowed),
        )
}

/// Listing of a property on an advertising platform.
#[derive(Clone, Debug, Serialize)]
pub struct Advertisement {
    /// Unique ID of this [`Advertisement`].
    pub id: advertisement::Id,

    /// ID of the advertised property.
    pub property_id: property::Id,

    /// ID of the platform the property is advertised on.
    pub platform_id: platform::Id,

    /// Indicator whether this [`Advertisement`] is active.
    pub is_active: bool,

    /// [`DateTime`] when this [`Advertisement`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub created_at: advertisement::CreationDateTime,

    /// [`DateTime`] when this [`Advertisement`] was modified the last time.
    ///
    /// [`DateTime`]: common::DateTime
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub updated_at: advertisement::ModificationDateTime,
}

impl From<domain::Advertisement> for Advertisement {
    fn from(ad: domain::Advertisement) -> Self {
        let domain::Advertisement {
            id,
            property_id,
            platform_id,
            is_active,
            created_at,
            updated_at,
        } = ad;

        Self {
            id,
            property_id,
            platform_id,
            is_active,
            created_at,
            updated_at,
        }
    }
}

/// Request for creating a new [`Advertisement`].
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct CreateRequest {
    /// ID of the property to advertise.
    pub property_id: property::Id,

    /// ID of the platform to advertise on.
    pub platform_id: platform::Id,
}

/// Request for updating an existing [`Advertisement`].
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct UpdateRequest {
    /// ID of the platform to move the [`Advertisement`] to.
    #[serde(default)]
    pub platform_id: Option<platform::Id>,
}

/// Converts the provided [`domain::Advertisement`]s into a JSON response.
fn to_json(ads: Vec<domain::Advertisement>) -> Json<Vec<Advertisement>> {
    Json(ads.into_iter().map(Advertisement::from).collect())
}

/// Lists all the active [`Advertisement`]s.
#[tracing::instrument(skip_all)]
async fn list(
    _: Session,
    State(service): State<Service>,
) -> Result<impl IntoResponse, Error> {
    service
        .execute(query::advertisements::List::by(
            read::advertisement::list::Selector::All,
        ))
        .await
        .map(to_json)
        .map_err(AsError::into_error)
}

/// Lists the active [`Advertisement`]s of the requested active property.
#[tracing::instrument(skip(service))]
async fn by_property(
    _: Session,
    State(service): State<Service>,
    WithRejection(Path(id), _): PathParam<property::Id>,
) -> Result<impl IntoResponse, Error> {
    service
        .execute(query::advertisements::ByProperty(id))
        .await
        .map(to_json)
        .map_err(AsError::into_error)
}

/// Returns the active [`Advertisement`] with the requested ID.
#[tracing::instrument(skip(service))]
async fn by_id(
    _: Session,
    State(service): State<Service>,
    WithRejection(Path(id), _): PathParam<advertisement::Id>,
) -> Result<impl IntoResponse, Error> {
    let ad = service
        .execute(query::advertisement::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| {
            Error::not_found(&format!(
                "`Advertisement(id: {id})` does not exist",
            ))
        })?;

    Ok(Json(Advertisement::from(ad.into_inner())))
}

/// Advertises a property on a platform.
#[tracing::instrument(skip(service))]
async fn create(
    _: Session,
    State(service): State<Service>,
    WithRejection(Json(body), _): JsonBody<CreateRequest>,
) -> Result<impl IntoResponse, Error> {
    let CreateRequest {
        property_id,
        platform_id,
    } = body;

    let ad = service
        .execute(command::CreateAdvertisement {
            property_id,
            platform_id,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((http::StatusCode::CREATED, Json(Advertisement::from(ad))))
}

/// Moves the active [`Advertisement`] with the requested ID to another
/// platform.
#[tracing::instrument(skip(service))]
async fn update(
    _: Session,
    State(service): State<Service>,
    WithRejection(Path(id), _): PathParam<advertisement::Id>,
    WithRejection(Json(body), _): JsonBody<UpdateRequest>,
) -> Result<impl IntoResponse, Error> {
    let UpdateRequest { platform_id } = body;

    let ad = service
        .execute(command::UpdateAdvertisement {
            advertisement_id: id,
            platform_id,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Advertisement::from(ad)))
}

impl AsError for command::create_advertisement::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PropertyNotExists(_) => {
                Some(Error::invalid(Some("property_id"), "not_found", self))
            }
            Self::PlatformNotExists(_) => {
                Some(Error::invalid(Some("platform_id"), "not_found", self))
            }
        }
    }
}

impl AsError for command::update_advertisement::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::AdvertisementNotExists(_) => Some(Error::not_found(self)),
            Self::PlatformNotExists(_) => {
                Some(Error::invalid(Some("platform_id"), "not_found", self))
            }
        }
    }
}

impl AsError for query::advertisements::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PropertyNotExists(_) => Some(Error::not_found(self)),
        }
    }
}

#[cfg(test)]
mod spec {
    use super::UpdateRequest;

    #[test]
    fn platform_is_optional_on_update() {
        let req: UpdateRequest = serde_json::from_str("{}").unwrap();
        assert!(req.platform_id.is_none());

        let req: UpdateRequest =
            serde_json::from_str(r#"{"platform_id": 2}"#).unwrap();
        assert_eq!(req.platform_id.map(i64::from), Some(2));
    }
}
