//! Riptide Infrastructure - adapters for the authenticated API client
//!
//! Implements the application's ports with `reqwest`, the filesystem, and
//! process configuration, and wires the standard per-feature client set.

pub mod adapters;
pub mod bootstrap;
pub mod persistence;
pub mod settings;
pub mod telemetry;

pub use adapters::{HttpRefreshEndpoint, ReqwestTransport};
pub use bootstrap::{BootstrapError, ClientSet, FEATURE_HEADER};
pub use persistence::FileSessionStore;
pub use settings::Settings;
pub use telemetry::init_tracing;
