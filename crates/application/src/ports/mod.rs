//! Ports implemented by the infrastructure layer.

mod cancellation;
mod http_transport;
mod refresh_endpoint;
mod session_store;

pub use cancellation::CancellationToken;
pub use http_transport::{HttpTransport, TransportError};
pub use refresh_endpoint::RefreshEndpoint;
pub use session_store::{SessionStore, SessionStoreExt};
