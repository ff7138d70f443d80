pub mod api;
pub mod manager;
pub mod url;

pub use api::{
    with_fallback, ClientSettings, Distribution, DistributionFetcher, FallbackFetch,
    HttpDistributionClient, ServerEntry,
};
pub use manager::{ClientFactory, DistroManager, HttpClientFactory};
pub use url::{fallback_url, primary_url, remote_distro_url, DEFAULT_BRANCH, DISTRO_URL_ENV};
