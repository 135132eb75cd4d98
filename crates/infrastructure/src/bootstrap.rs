//! Wires settings, persistence, transports, and clients together.

use std::sync::Arc;

use riptide_application::{
    ApiClient, ApiClientBuilder, RefreshCoordinator, SessionService, SessionStore,
};
use riptide_domain::Feature;
use url::Url;

use crate::adapters::{HttpRefreshEndpoint, ReqwestTransport};
use crate::persistence::FileSessionStore;
use crate::settings::Settings;

/// Header tagging every request with the feature that issued it.
pub const FEATURE_HEADER: &str = "x-client-feature";

/// Errors preventing the client set from being assembled.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// A configured base URL did not parse.
    #[error("invalid base url {url:?}: {reason}")]
    InvalidBaseUrl {
        /// The value as configured.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The underlying HTTP client could not be constructed.
    #[error("could not build http client: {0}")]
    Client(String),
}

/// One client per feature, sharing a session store and refresh coordinator.
pub struct ClientSet {
    /// Client for the auth service. Carries no bearer and never refreshes:
    /// a 401 here means the credentials were wrong, not that the session
    /// expired.
    pub auth: ApiClient,
    /// Client for the catalog service.
    pub catalog: ApiClient,
    /// Client for everything else.
    pub generic: ApiClient,
    /// The session store every client reads its bearer token from.
    pub store: Arc<dyn SessionStore>,
    /// The coordinator the catalog and generic clients renew through.
    pub coordinator: Arc<RefreshCoordinator>,
}

impl ClientSet {
    /// Builds the client set over a durable session store at the
    /// configured (or default) location.
    ///
    /// # Errors
    ///
    /// See [`with_store`](Self::with_store).
    pub fn from_settings(settings: &Settings) -> Result<Self, BootstrapError> {
        let path = settings
            .session_file
            .clone()
            .unwrap_or_else(FileSessionStore::default_path);
        Self::with_store(settings, Arc::new(FileSessionStore::open(path)))
    }

    /// Builds the client set over the given session store.
    ///
    /// All transports share one connection pool. The refresh coordinator
    /// talks to `{auth_base_url}/auth/refresh` outside the interceptor
    /// pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::InvalidBaseUrl`] for an unparseable base
    /// URL and [`BootstrapError::Client`] when the HTTP client cannot
    /// start.
    pub fn with_store(
        settings: &Settings,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, BootstrapError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|err| BootstrapError::Client(err.to_string()))?;
        let timeout = settings.timeout();

        let auth_base = parse_base(&settings.auth_base_url)?;
        let catalog_base = parse_base(&settings.catalog_base_url)?;
        let api_base = parse_base(&settings.api_base_url)?;

        let refresh_url =
            auth_base
                .join("auth/refresh")
                .map_err(|err| BootstrapError::InvalidBaseUrl {
                    url: settings.auth_base_url.clone(),
                    reason: err.to_string(),
                })?;
        let coordinator = Arc::new(RefreshCoordinator::new(
            Arc::clone(&store),
            Arc::new(HttpRefreshEndpoint::new(http.clone(), refresh_url, timeout)),
        ));

        let auth = ApiClientBuilder::new(
            transport(&http, auth_base, timeout, Feature::Auth),
            Arc::clone(&store),
            Feature::Auth,
        )
        .without_bearer()
        .build();

        let mut catalog = ApiClientBuilder::new(
            transport(&http, catalog_base, timeout, Feature::Catalog),
            Arc::clone(&store),
            Feature::Catalog,
        );
        let mut generic = ApiClientBuilder::new(
            transport(&http, api_base, timeout, Feature::Generic),
            Arc::clone(&store),
            Feature::Generic,
        );
        if settings.auto_refresh {
            catalog = catalog.with_refresh(Arc::clone(&coordinator));
            generic = generic.with_refresh(Arc::clone(&coordinator));
        }

        Ok(Self {
            auth,
            catalog: catalog.build(),
            generic: generic.build(),
            store,
            coordinator,
        })
    }

    /// Session service bound to the auth client and the shared store.
    #[must_use]
    pub fn session_service(&self) -> SessionService {
        SessionService::new(self.auth.clone(), Arc::clone(&self.store))
    }
}

fn transport(
    http: &reqwest::Client,
    base: Url,
    timeout: std::time::Duration,
    feature: Feature,
) -> Arc<ReqwestTransport> {
    Arc::new(
        ReqwestTransport::new(http.clone(), base, timeout)
            .with_default_header(FEATURE_HEADER, feature.as_str()),
    )
}

fn parse_base(raw: &str) -> Result<Url, BootstrapError> {
    let mut url = Url::parse(raw).map_err(|err| BootstrapError::InvalidBaseUrl {
        url: raw.to_owned(),
        reason: err.to_string(),
    })?;
    // A trailing slash keeps the last path segment when joining.
    if !url.path().ends_with('/') {
        url.set_path(&format!("{}/", url.path()));
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use pretty_assertions::assert_eq;
    use riptide_application::MemorySessionStore;

    use super::*;

    #[test]
    fn test_default_settings_assemble_a_client_set() {
        let clients =
            ClientSet::with_store(&Settings::default(), Arc::new(MemorySessionStore::new()))
                .unwrap();

        assert_eq!(clients.auth.feature(), Feature::Auth);
        assert_eq!(clients.catalog.feature(), Feature::Catalog);
        assert_eq!(clients.generic.feature(), Feature::Generic);
    }

    #[test]
    fn test_bad_base_url_is_rejected() {
        let settings = Settings {
            catalog_base_url: "not a url".into(),
            ..Settings::default()
        };

        let result = ClientSet::with_store(&settings, Arc::new(MemorySessionStore::new()));
        assert!(matches!(
            result,
            Err(BootstrapError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn test_base_path_survives_the_refresh_join() {
        let base = parse_base("http://localhost:3000/api").unwrap();
        let refresh = base.join("auth/refresh").unwrap();
        assert_eq!(refresh.as_str(), "http://localhost:3000/api/auth/refresh");
    }
}
