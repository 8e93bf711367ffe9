//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;

use std::time::Duration;

use derive_more::Debug;

#[cfg(doc)]
use infra::Database;

pub use self::{command::Command, query::Query};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] encoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_encoding_key: jsonwebtoken::EncodingKey,

    /// [JWT] decoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// Lifetime of the issued [`domain::Session`]s.
    pub session_ttl: Duration,

    /// [`read::booking::ConflictScope`] applied on [`domain::Booking`]s
    /// admission.
    pub conflict_scope: read::booking::ConflictScope,
}

impl Config {
    /// Default lifetime of the issued [`domain::Session`]s.
    pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

    /// Creates a new [`Config`] signing [`domain::Session`]s with the
    /// provided HMAC `secret`, with all the other settings defaulted.
    #[must_use]
    pub fn with_secret(secret: &[u8]) -> Self {
        Self {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(secret),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(secret),
            session_ttl: Self::DEFAULT_SESSION_TTL,
            conflict_scope: read::booking::ConflictScope::default(),
        }
    }
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters.
    #[must_use]
    pub fn new(config: Config, database: Db) -> Self {
        Self { config, database }
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }
}
