//! [`Error`]-related definitions.

use std::fmt;

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::typed_header::TypedHeaderRejection;
use derive_more::Error as StdError;
use itertools::Itertools as _;
use serde::Serialize;
use service::infra::database;
use tracerr::{Trace, Traced};
use tracing as log;

/// Defines a new error type.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        #[repr(u16)]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            status_code: ::http::StatusCode::$status_code,
                            message: $message.to_string(),
                            field: None,
                            reason: None,
                            backtrace: None,
                        },
                    )*
                }
            }
        }

        impl ::axum::response::IntoResponse for $name {
            fn into_response(self) -> ::axum::response::Response {
                ::axum::response::IntoResponse::into_response(
                    $crate::Error::from(self),
                )
            }
        }
    };
}

/// HTTP API [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// [`http::StatusCode`] of this [`Error`].
    pub status_code: http::StatusCode,

    /// [`Error`] message.
    pub message: String,

    /// Name of the request field this [`Error`] relates to, if any.
    pub field: Option<String>,

    /// Machine-readable reason of this [`Error`], if any.
    pub reason: Option<String>,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,
}

impl Error {
    /// Create a new [`Error`] representing an internal server error.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self {
            code: "INTERNAL_SERVER_ERROR",
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            field: None,
            reason: None,
            backtrace: None,
        }
    }

    /// Creates a new [`Error`] rejecting the provided request `field` for the
    /// given `reason`.
    #[must_use]
    pub fn invalid(
        field: Option<impl ToString>,
        reason: impl ToString,
        msg: &impl ToString,
    ) -> Self {
        Self {
            code: "VALIDATION_ERROR",
            status_code: http::StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            field: field.map(|f| f.to_string()),
            reason: Some(reason.to_string()),
            backtrace: None,
        }
    }

    /// Creates a new [`Error`] representing a missing or inactive entity.
    #[must_use]
    pub fn not_found(msg: &impl ToString) -> Self {
        Self {
            code: "NOT_FOUND",
            status_code: http::StatusCode::NOT_FOUND,
            message: msg.to_string(),
            field: None,
            reason: None,
            backtrace: None,
        }
    }

    /// Creates a new [`Error`] representing a malformed request.
    #[must_use]
    pub fn bad_request(msg: &impl ToString) -> Self {
        Self {
            code: "BAD_REQUEST",
            status_code: http::StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            field: None,
            reason: None,
            backtrace: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            status_code: _,
            message,
            field: _,
            reason: _,
            backtrace,
        } = self;

        write!(
            f,
            "[{code}]: {message}{}",
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("{trace}"))),
        )
    }
}

/// JSON body of an [`Error`] response.
#[derive(Debug, Serialize)]
struct Body<'e> {
    /// [`Error::code`].
    code: Code,

    /// [`Error::message`].
    message: &'e str,

    /// [`Error::field`].
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'e str>,

    /// [`Error::reason`].
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'e str>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Server failures are reported opaquely and logged in full instead.
        let message = if self.status_code.is_server_error() {
            log::error!("{self}");
            "Internal server error"
        } else {
            self.message.as_str()
        };

        let body = Body {
            code: self.code,
            message,
            field: self.field.as_deref(),
            reason: self.reason.as_deref(),
        };
        (self.status_code, Json(body)).into_response()
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }
}

impl AsError for TypedHeaderRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::bad_request(self))
    }
}

impl AsError for JsonRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::bad_request(&self.body_text()))
    }
}

impl AsError for PathRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::bad_request(&self.body_text()))
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

impl From<JsonRejection> for Error {
    fn from(e: JsonRejection) -> Self {
        e.into_error()
    }
}

impl From<PathRejection> for Error {
    fn from(e: PathRejection) -> Self {
        e.into_error()
    }
}
