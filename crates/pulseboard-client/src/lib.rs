//! Backend access for pulseboard
//!
//! Every dashboard domain is reached through a source trait. Two implementations ship
//! with the crate: [`ApiClient`] for a live REST backend and [`FixtureSource`] for the
//! bundled fixture set. [`Backend`] picks one from configuration at startup.

#![forbid(unsafe_code)]

pub mod api;
pub mod backend;
pub mod error;
pub mod fixtures;
pub mod source;

pub use api::ApiClient;
pub use backend::Backend;
pub use error::{ClientError, ClientResult};
pub use fixtures::FixtureSource;
pub use source::{
    CatalogSource, ControlCenterSource, CrudEndpoint, ProcessMiningSource, ProfileSource,
    SupplyChainSource,
};
