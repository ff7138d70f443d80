// ─── Distribution Manager ───
// Owns the lazily-built, branch-aware distribution client and rebuilds it
// when the branch setting changes.

use std::sync::Arc;

use tracing::info;

use crate::core::config::ConfigProvider;
use crate::core::distro::api::{
    with_fallback, ClientSettings, DistributionFetcher, FallbackFetch, HttpDistributionClient,
};
use crate::core::distro::url::{fallback_url, primary_url, remote_distro_url};
use crate::core::error::DistroResult;

/// Builds distribution clients bound to a URL. Injection point for tests.
pub trait ClientFactory: Send + Sync {
    fn build(
        &self,
        settings: &ClientSettings,
        url: &str,
    ) -> DistroResult<Arc<dyn DistributionFetcher>>;
}

/// Default factory producing reqwest-backed clients.
pub struct HttpClientFactory;

impl ClientFactory for HttpClientFactory {
    fn build(
        &self,
        settings: &ClientSettings,
        url: &str,
    ) -> DistroResult<Arc<dyn DistributionFetcher>> {
        Ok(Arc::new(HttpDistributionClient::new(
            settings.clone(),
            url.to_string(),
        )?))
    }
}

enum ClientState {
    Uninitialized,
    Ready {
        client: Arc<FallbackFetch>,
        settings: ClientSettings,
    },
}

/// State holder for the process-wide distribution client.
///
/// The client is built on first access and replaced wholesale by
/// [`DistroManager::refresh`]; directories and the dev-mode flag captured
/// at first build are preserved across replacements.
pub struct DistroManager<C: ConfigProvider, F: ClientFactory> {
    config: C,
    factory: F,
    base_url: Option<String>,
    dev_mode: bool,
    state: ClientState,
}

impl<C: ConfigProvider, F: ClientFactory> DistroManager<C, F> {
    /// Create a manager that resolves the base URL from the environment
    /// on first use.
    pub fn new(config: C, factory: F) -> Self {
        Self {
            config,
            factory,
            base_url: None,
            dev_mode: false,
            state: ClientState::Uninitialized,
        }
    }

    /// Override the environment-sourced base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    /// The distribution client, built on first call. Subsequent calls
    /// return the same instance until [`DistroManager::refresh`].
    pub fn client(&mut self) -> DistroResult<Arc<FallbackFetch>> {
        if let ClientState::Ready { client, .. } = &self.state {
            return Ok(client.clone());
        }
        self.rebuild()
    }

    /// Rebuild the client against the currently configured branch,
    /// keeping previously captured directories and dev-mode flag.
    pub fn refresh(&mut self) -> DistroResult<Arc<FallbackFetch>> {
        self.rebuild()
    }

    /// The manifest URL the primary client resolves to right now.
    pub fn resolved_url(&self) -> DistroResult<String> {
        let base = self.base_url()?;
        primary_url(&base, &self.config.distribution_branch())
    }

    fn base_url(&self) -> DistroResult<String> {
        match &self.base_url {
            Some(url) => Ok(url.clone()),
            None => remote_distro_url(),
        }
    }

    fn rebuild(&mut self) -> DistroResult<Arc<FallbackFetch>> {
        let base = self.base_url()?;
        let branch = self.config.distribution_branch();
        let primary = primary_url(&base, &branch)?;
        let fallback = fallback_url(&base)?;

        let settings = match &self.state {
            ClientState::Ready { settings, .. } => settings.clone(),
            ClientState::Uninitialized => ClientSettings {
                launcher_dir: self.config.launcher_directory(),
                common_dir: self.config.common_directory(),
                instance_dir: self.config.instance_directory(),
                dev_mode: self.dev_mode,
            },
        };

        info!("Binding distribution client to {} (branch {:?})", primary, branch);

        let client = Arc::new(with_fallback(
            self.factory.build(&settings, &primary)?,
            self.factory.build(&settings, &fallback)?,
        ));

        self.state = ClientState::Ready {
            client: client.clone(),
            settings,
        };
        Ok(client)
    }
}
