pub use crate::error::*;

mod client;
mod entity;
mod error;
mod repository;

#[cfg(feature = "prelude")]
pub mod prelude {
    pub mod entity {
        pub use crate::entity::*;
    }
}

#[cfg(feature = "interface")]
pub mod interface {
    pub mod client {
        pub use crate::client::*;
    }
    pub mod repository {
        pub use crate::repository::*;
    }
}
