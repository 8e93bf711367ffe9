//! Domain definitions.

pub mod advertisement;
pub mod booking;
pub mod platform;
pub mod property;
pub mod session;

pub use self::{
    advertisement::Advertisement, booking::Booking, platform::Platform,
    property::Property, session::Session,
};
