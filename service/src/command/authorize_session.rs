//! [`Command`] for authorizing a [`Session`].

use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

use crate::{
    domain::{session, Session},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`Session`] by its [`session::Token`].
///
/// Succeeds only if the [`session::Token`] is signed with the configured key
/// and hasn't expired yet.
#[derive(Clone, Debug, From)]
pub struct AuthorizeSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db> Command<AuthorizeSession> for Service<Db> {
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeSession { token } = cmd;

        Ok(jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config().jwt_decoding_key,
            &Validation::default(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims)
    }
}

/// Error of [`AuthorizeSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{DateTime, Handler as _};

    use crate::{
        command::{AuthorizeSession, CreateSession},
        domain::{session, Session},
        infra::Memory,
        Config, Service,
    };

    fn service(secret: &[u8]) -> Service<Memory> {
        Service::new(Config::with_secret(secret), Memory::new())
    }

    #[tokio::test]
    async fn authorizes_issued_token() {
        let svc = service(b"secret");
        let subject = session::Subject::new("admin").unwrap();

        let issued = svc
            .execute(CreateSession {
                subject: subject.clone(),
            })
            .await
            .unwrap();
        assert!(issued.expires_at > DateTime::now().coerce());

        let session = svc
            .execute(AuthorizeSession {
                token: issued.token,
            })
            .await
            .unwrap();
        assert_eq!(session.subject, subject);
        assert_eq!(
            session.expires_at.unix_timestamp(),
            issued.expires_at.unix_timestamp(),
        );
    }

    #[tokio::test]
    async fn rejects_token_signed_with_other_key() {
        let token = service(b"other")
            .execute(CreateSession {
                subject: session::Subject::new("admin").unwrap(),
            })
            .await
            .unwrap()
            .token;

        let res = service(b"secret").execute(AuthorizeSession { token }).await;

        assert!(res.is_err());
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let svc = service(b"secret");

        // Expiration leeway is a minute by default, so forge an older one.
        let expired = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &Session {
                subject: session::Subject::new("admin").unwrap(),
                expires_at: (DateTime::now() - Duration::from_secs(3600))
                    .coerce(),
            },
            &svc.config().jwt_encoding_key,
        )
        .unwrap();

        let res = svc
            .execute(AuthorizeSession {
                token: expired.parse().unwrap(),
            })
            .await;

        assert!(res.is_err());
    }

    #[tokio::test]
    async fn rejects_garbage() {
        let svc = service(b"secret");

        let res = svc
            .execute(AuthorizeSession {
                token: "not-a-jwt".parse().unwrap(),
            })
            .await;

        assert!(res.is_err());
    }
}
