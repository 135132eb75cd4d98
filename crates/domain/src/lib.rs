//! Riptide Domain - Core types for the authenticated API client
//!
//! This crate defines the domain model shared by the transport, the
//! interceptor pipeline, and the refresh coordinator. All types here are
//! pure Rust with no I/O dependencies.

pub mod error;
pub mod feature;
pub mod request;
pub mod response;
pub mod session;
pub mod token;
pub mod upload;

pub use error::{ApiError, ApiResult, FieldError, RefreshError};
pub use feature::Feature;
pub use request::{ApiRequest, Header, HttpMethod, RequestBody, AUTHORIZATION};
pub use response::{ApiResponse, StatusCode};
pub use session::AuthSession;
pub use token::{token_preview, TokenPair};
pub use upload::{UploadForm, UploadPart, UploadPayload};
