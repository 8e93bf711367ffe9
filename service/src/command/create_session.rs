//! [`Command`] for creating a [`Session`].

use common::DateTime;
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{session, Session},
    Service,
};

use super::Command;

/// [`Command`] for creating a [`Session`].
#[derive(Clone, Debug, From)]
pub struct CreateSession {
    /// [`session::Subject`] to issue a new [`Session`] to.
    pub subject: session::Subject,
}

/// Output of [`CreateSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`session::Token`] of the created [`Session`].
    pub token: session::Token,

    /// [`DateTime`] when the created [`Session`] expires.
    pub expires_at: session::ExpirationDateTime,
}

impl<Db> Command<CreateSession> for Service<Db> {
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateSession) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateSession { subject } = cmd;

        let expires_at = (DateTime::now() + self.config().session_ttl).coerce();
        let token = jsonwebtoken::encode::<Session>(
            &jsonwebtoken::Header::default(),
            &Session {
                subject,
                expires_at,
            },
            &self.config().jwt_encoding_key,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        // SAFETY: `jsonwebtoken::encode` always returns a valid
        //         `session::Token`.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let token = unsafe { session::Token::new_unchecked(token) };

        Ok(Output { token, expires_at })
    }
}

/// Error of [`CreateSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),
}
