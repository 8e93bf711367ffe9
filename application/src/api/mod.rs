//! HTTP API definitions.
//!
//! Every route requires a valid bearer token, see [`Session`].

pub mod advertisement;
pub mod booking;
pub mod platform;
pub mod property;

use axum::{extract::Path, Json, Router};
use axum_extra::extract::WithRejection;

use crate::{define_error, Error, Service, Session};

/// Creates a new [`Router`] serving the whole HTTP API on top of the provided
/// [`Service`].
pub fn router(service: Service) -> Router {
    Router::new()
        .merge(property::routes())
        .merge(platform::routes())
        .merge(advertisement::routes())
        .merge(booking::routes())
        .with_state(service)
}

/// Path parameter of a request, rejected with an [`Error`].
pub(crate) type PathParam<T> = WithRejection<Path<T>, Error>;

/// JSON body of a request, rejected with an [`Error`].
pub(crate) type JsonBody<T> = WithRejection<Json<T>, Error>;

/// Rejects an authorized request made with the HTTP method not supported by
/// the requested route.
async fn method_not_allowed(_: Session) -> MethodError {
    MethodError::MethodNotAllowed
}

define_error! {
    enum MethodError {
        #[code = "METHOD_NOT_ALLOWED"]
        #[status = METHOD_NOT_ALLOWED]
        #[message = "Method not allowed"]
        MethodNotAllowed,
    }
}

/// Helpers for `serde` deserialization.
mod de {
    use serde::{Deserialize, Deserializer};

    /// Deserializes a present field, even `null`, as [`Some`], so an omitted
    /// one falls back to [`None`] via `#[serde(default)]`.
    pub(crate) fn present<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        T::deserialize(d).map(Some)
    }
}

#[cfg(test)]
mod spec {
    use axum::{body::Body, Router};
    use service::{
        command::{self, Command as _},
        domain::session,
        infra::Postgres,
    };
    use tower::ServiceExt as _;

    use crate::{config, Service};

    /// Creates a [`Router`] whose storage is never reached by the tested
    /// requests.
    fn app() -> (Router, Service) {
        let postgres = Postgres::new(&config::Postgres::default().into())
            .expect("pool is created lazily");
        let service = Service::new(
            service::Config::with_secret(b"api-secret"),
            postgres,
        );
        (super::router(service.clone()), service)
    }

    async fn token(service: &Service) -> String {
        service
            .execute(command::CreateSession {
                subject: session::Subject::new("tester").unwrap(),
            })
            .await
            .unwrap()
            .token
            .to_string()
    }

    async fn send(
        app: Router,
        method: http::Method,
        uri: &str,
        token: Option<&str>,
    ) -> (http::StatusCode, serde_json::Value) {
        let mut req = http::Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req
                .header(http::header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = req
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();

        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let body = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap_or_default())
    }

    #[tokio::test]
    async fn requires_authorization() {
        let (app, _) = app();

        for (method, uri) in [
            (http::Method::GET, "/properties"),
            (http::Method::POST, "/properties"),
            (http::Method::GET, "/platforms/1"),
            (http::Method::PATCH, "/advertisements/1"),
            (http::Method::POST, "/bookings"),
            (http::Method::DELETE, "/bookings/1"),
            (http::Method::GET, "/bookings/property/1"),
        ] {
            let (status, body) =
                send(app.clone(), method.clone(), uri, None).await;

            assert_eq!(
                status,
                http::StatusCode::UNAUTHORIZED,
                "{method} {uri}",
            );
            assert_eq!(body["code"], "AUTHORIZATION_REQUIRED");
        }
    }

    #[tokio::test]
    async fn rejects_invalid_tokens() {
        let (app, _) = app();

        let foreign = Service::new(
            service::Config::with_secret(b"another-secret"),
            Postgres::new(&config::Postgres::default().into()).unwrap(),
        );
        let foreign = token(&foreign).await;

        for token in ["garbage", foreign.as_str()] {
            let (status, body) = send(
                app.clone(),
                http::Method::GET,
                "/properties",
                Some(token),
            )
            .await;

            assert_eq!(status, http::StatusCode::UNAUTHORIZED);
            assert_eq!(body["code"], "AUTHORIZATION_REQUIRED");
        }
    }

    #[tokio::test]
    async fn rejects_unsupported_methods() {
        let (app, service) = app();
        let token = token(&service).await;

        for (method, uri) in [
            (http::Method::DELETE, "/advertisements/1"),
            (http::Method::PUT, "/bookings/1"),
            (http::Method::PATCH, "/bookings/1"),
            (http::Method::POST, "/bookings/1"),
            (http::Method::DELETE, "/platforms/1"),
            (http::Method::PUT, "/properties/1"),
        ] {
            let (status, body) =
                send(app.clone(), method.clone(), uri, Some(&token)).await;

            assert_eq!(
                status,
                http::StatusCode::METHOD_NOT_ALLOWED,
                "{method} {uri}",
            );
            assert_eq!(body["code"], "METHOD_NOT_ALLOWED");
        }
    }

    #[tokio::test]
    async fn checks_authorization_before_method() {
        let (app, _) = app();

        let (status, _) =
            send(app, http::Method::PUT, "/bookings/1", None).await;

        assert_eq!(status, http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rejects_malformed_ids() {
        let (app, service) = app();
        let token = token(&service).await;

        let (status, body) =
            send(app, http::Method::GET, "/bookings/abc", Some(&token)).await;

        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }
}
