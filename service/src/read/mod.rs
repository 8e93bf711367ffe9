//! Read entities definitions.

pub mod advertisement;
pub mod booking;

use derive_more::Deref;

/// Wrapper around an entity indicating that it's active (not deleted).
#[derive(Clone, Copy, Debug, Deref)]
pub struct Active<T>(pub T);

impl<T> Active<T> {
    /// Unwraps this [`Active`] entity.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}
