pub mod core;

use tracing_subscriber::EnvFilter;

pub use crate::core::config::{ConfigProvider, LauncherConfig};
pub use crate::core::distro::{
    DistroManager, Distribution, DistributionFetcher, HttpClientFactory,
};
pub use crate::core::error::{DistroError, DistroResult};
pub use crate::core::patterns::matches_pattern;
pub use crate::core::repair::{ProcessRepairFactory, RepairTask};
pub use crate::core::validation::{count_invalid, filter_ignored, ValidationEntry, ValidationReport};

/// Initialize structured logging for the host process.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,launcher_distro=debug")),
        )
        .try_init();
}
