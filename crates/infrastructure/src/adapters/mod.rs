//! Port implementations backed by `reqwest`.

mod refresh_endpoint;
mod reqwest_transport;

pub use refresh_endpoint::HttpRefreshEndpoint;
pub use reqwest_transport::ReqwestTransport;
