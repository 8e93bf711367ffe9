//! [`Session`]-related definitions.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    RequestPartsExt as _,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use service::{
    command::{self, Command as _},
    domain::session,
};

use crate::{define_error, AsError, Error, Service};

/// Session of an authenticated API caller.
///
/// Extracting it rejects the request with `401 Unauthorized` unless it
/// carries a valid bearer token, so it must precede any other extractor
/// consuming the request.
#[derive(Clone, Debug)]
pub struct Session {
    /// Caller the [`Session`] was issued to.
    pub subject: session::Subject,

    /// [`DateTime`] when this [`Session`] expires.
    ///
    /// [`DateTime`]: common::DateTime
    pub expires_at: session::ExpirationDateTime,
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    Service: FromRef<S>,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AuthError::AuthorizationRequired)?;

        #[expect(unsafe_code, reason = "specified in correct header")]
        let token =
            unsafe { session::Token::new_unchecked(bearer.token().to_owned()) };

        Service::from_ref(state)
            .execute(command::AuthorizeSession { token })
            .await
            .map(|s| Self {
                subject: s.subject,
                expires_at: s.expires_at,
            })
            .map_err(AsError::into_error)
    }
}

impl AsError for command::authorize_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::JsonWebTokenDecodeError(_) => {
                Some(AuthError::AuthorizationRequired.into())
            }
        }
    }
}

impl AsError for command::create_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::JsonWebTokenEncodeError(_) => None,
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,
    }
}
