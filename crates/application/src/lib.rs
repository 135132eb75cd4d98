//! Riptide Application - orchestration for the authenticated API client
//!
//! Composes the interceptor pipeline, the single-flight refresh
//! coordinator, and the session workflows on top of the transport and
//! storage ports implemented by the infrastructure crate.

pub mod auth;
pub mod client;
pub mod interceptor;
pub mod ports;

pub use auth::{MemorySessionStore, RefreshCoordinator, RefreshState, SessionService};
pub use client::{ApiClient, ApiClientBuilder};
pub use interceptor::{BearerAuth, RequestInterceptor, ResponseObserver, TraceObserver};
pub use ports::{
    CancellationToken, HttpTransport, RefreshEndpoint, SessionStore, SessionStoreExt,
    TransportError,
};
