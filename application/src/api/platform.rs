//! [`Platform`]-related HTTP API definitions.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use service::{
    domain::{self, platform},
    query::{self, Query as _},
};

use crate::{
    api::{method_not_allowed, PathParam},
    AsError, Error, Service, Session,
};

/// Routes of the [`Platform`] API.
pub(crate) fn routes() -> Router<Service> {
    Router::new()
        .route("/platforms", get(list).fallback(method_not_allowed))
        .route("/platforms/:id", get(by_id).fallback(method_not_allowed))
}

/// Advertising platform charging a fee on bookings made through it.
#[derive(Clone, Debug, Serialize)]
pub struct Platform {
    /// Unique ID of this [`Platform`].
    pub id: platform::Id,

    /// Name of this [`Platform`].
    pub name: platform::Name,

    /// Fee rate charged by this [`Platform`].
    pub fee_rate: platform::FeeRate,

    /// Indicator whether this [`Platform`] is active.
    pub is_active: bool,

    /// [`DateTime`] when this [`Platform`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub created_at: platform::CreationDateTime,

    /// [`DateTime`] when this [`Platform`] was modified the last time.
    ///
    /// [`DateTime`]: common::DateTime
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub updated_at: platform::ModificationDateTime,
}

impl From<domain::Platform> for Platform {
    fn from(platform: domain::Platform) -> Self {
        let domain::Platform {
            id,
            name,
            fee_rate,
            is_active,
            created_at,
            updated_at,
        } = platform;

        Self {
            id,
            name,
            fee_rate,
            is_active,
            created_at,
            updated_at,
        }
    }
}

/// Lists all the active [`Platform`]s.
#[tracing::instrument(skip_all)]
async fn list(
    _: Session,
    State(service): State<Service>,
) -> Result<impl IntoResponse, Error> {
    let platforms = service
        .execute(query::platforms::List::by(()))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(platforms.into_iter().map(Platform::from).collect::<Vec<_>>()))
}

/// Returns the active [`Platform`] with the requested ID.
#[tracing::instrument(skip(service))]
async fn by_id(
    _: Session,
    State(service): State<Service>,
    WithRejection(Path(id), _): PathParam<platform::Id>,
) -> Result<impl IntoResponse, Error> {
    let platform = service
        .execute(query::platform::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| {
            Error::not_found(&format!("`Platform(id: {id})` does not exist"))
        })?;

    Ok(Json(Platform::from(platform.into_inner())))
}
