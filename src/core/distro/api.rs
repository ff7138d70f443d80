// ─── Distribution API ───
// Typed manifest schema, the external fetch seam, and the one-shot
// fallback decorator around it.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use crate::core::error::{DistroError, DistroResult};
use crate::core::http::build_http_client;

/// A server entry in the distribution manifest. Unknown fields are
/// ignored; only `id` is required for a structurally valid entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(rename = "mainServer", default)]
    pub main_server: bool,
}

/// Top-level distribution manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct Distribution {
    #[serde(default)]
    pub servers: Vec<ServerEntry>,
}

impl Distribution {
    /// Structural validity check: a manifest without servers is treated
    /// the same as a failed fetch.
    pub fn has_servers(&self) -> bool {
        !self.servers.is_empty()
    }
}

/// Directories and flags a distribution client is constructed with.
/// These survive client rebuilds; only the bound URL changes.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub launcher_dir: PathBuf,
    pub common_dir: PathBuf,
    pub instance_dir: PathBuf,
    pub dev_mode: bool,
}

/// Seam to the external manifest-fetching client.
#[async_trait]
pub trait DistributionFetcher: Send + Sync {
    /// The manifest URL this client is bound to.
    fn url(&self) -> &str;

    async fn fetch_distribution(&self) -> DistroResult<Distribution>;
}

/// HTTP-backed distribution client bound to a single manifest URL.
pub struct HttpDistributionClient {
    settings: ClientSettings,
    url: String,
    client: reqwest::Client,
}

impl HttpDistributionClient {
    pub fn new(settings: ClientSettings, url: String) -> DistroResult<Self> {
        let client = build_http_client()?;
        Ok(Self {
            settings,
            url,
            client,
        })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }
}

#[async_trait]
impl DistributionFetcher for HttpDistributionClient {
    fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_distribution(&self) -> DistroResult<Distribution> {
        info!("Fetching distribution manifest from {}", self.url);

        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DistroError::Fetch {
                url: self.url.clone(),
                reason: format!("HTTP {}", status.as_u16()),
            });
        }

        let distribution: Distribution = response.json().await?;
        info!(
            "Loaded distribution with {} server(s)",
            distribution.servers.len()
        );
        Ok(distribution)
    }
}

/// One-level fallback around a primary fetch capability.
///
/// The primary result is accepted only when it passes
/// [`Distribution::has_servers`]; a fetch error or an empty manifest
/// triggers exactly one attempt through the fallback client, whose
/// errors propagate to the caller uncaught.
pub struct FallbackFetch {
    primary: Arc<dyn DistributionFetcher>,
    fallback: Arc<dyn DistributionFetcher>,
}

/// Compose a fetch capability with fallback semantics.
pub fn with_fallback(
    primary: Arc<dyn DistributionFetcher>,
    fallback: Arc<dyn DistributionFetcher>,
) -> FallbackFetch {
    FallbackFetch { primary, fallback }
}

#[async_trait]
impl DistributionFetcher for FallbackFetch {
    fn url(&self) -> &str {
        self.primary.url()
    }

    async fn fetch_distribution(&self) -> DistroResult<Distribution> {
        match self.primary.fetch_distribution().await {
            Ok(distribution) if distribution.has_servers() => Ok(distribution),
            Ok(_) => {
                warn!(
                    "Distribution from {} has no servers, retrying via {}",
                    self.primary.url(),
                    self.fallback.url()
                );
                self.fallback.fetch_distribution().await
            }
            Err(e) => {
                warn!(
                    "Distribution fetch from {} failed ({}), retrying via {}",
                    self.primary.url(),
                    e,
                    self.fallback.url()
                );
                self.fallback.fetch_distribution().await
            }
        }
    }
}
