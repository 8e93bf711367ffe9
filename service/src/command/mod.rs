//! [`Command`] definition.

pub mod authorize_session;
pub mod create_advertisement;
pub mod create_booking;
pub mod create_property;
pub mod create_session;
pub mod delete_booking;
pub mod delete_property;
pub mod update_advertisement;
pub mod update_property;

#[cfg(test)]
pub(crate) mod fixture;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_session::AuthorizeSession,
    create_advertisement::CreateAdvertisement, create_booking::CreateBooking,
    create_property::CreateProperty, create_session::CreateSession,
    delete_booking::DeleteBooking, delete_property::DeleteProperty,
    update_advertisement::UpdateAdvertisement,
    update_property::UpdateProperty,
};
