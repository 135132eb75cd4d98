//! Feature tags for partitioning API traffic.

use serde::{Deserialize, Serialize};

/// Functional area an API client instance is dedicated to.
///
/// Every request carries the feature of the client that issued it so logs
/// and diagnostics can be partitioned per functional area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    /// Authentication endpoints (login, refresh, logout).
    Auth,
    /// Catalog endpoints.
    Catalog,
    /// General-purpose endpoints that belong to no dedicated area.
    Generic,
}

impl Feature {
    /// Returns the lowercase name used in logs and headers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Catalog => "catalog",
            Self::Generic => "generic",
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
