//! [`Advertisement`]-related read definitions.

#[cfg(doc)]
use crate::domain::Advertisement;

pub mod list {
    //! [`Advertisement`]s list definitions.

    use crate::domain::property;
    #[cfg(doc)]
    use crate::domain::{Advertisement, Property};

    /// Selector of active [`Advertisement`]s, ordered by their IDs.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum Selector {
        /// All active [`Advertisement`]s.
        All,

        /// Active [`Advertisement`]s of the [`Property`] with the provided ID.
        ByProperty(property::Id),
    }
}
