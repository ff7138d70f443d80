// ─── Manifest URL Resolution ───
// Computes the branch-qualified primary URL and the "main" fallback URL.

use crate::core::error::{DistroError, DistroResult};

/// Environment variable carrying the base distribution manifest URL.
pub const DISTRO_URL_ENV: &str = "REMOTE_DISTRO_URL";

/// Branch that always resolves to the unmodified base URL.
pub const DEFAULT_BRANCH: &str = "main";

const MANIFEST_FILE: &str = "distribution.json";

/// Read the base manifest URL from the environment.
///
/// Absence is a fatal configuration error at first use, not at startup.
pub fn remote_distro_url() -> DistroResult<String> {
    match std::env::var(DISTRO_URL_ENV) {
        Ok(url) if !url.trim().is_empty() => Ok(url),
        _ => Err(DistroError::Configuration(format!(
            "{} environment variable is not set",
            DISTRO_URL_ENV
        ))),
    }
}

/// Resolve the manifest URL for the configured branch.
///
/// `main` (or an empty branch) keeps the base URL untouched; any other
/// branch rewrites the first `distribution.json` segment to
/// `distribution_{branch}.json`. This is a literal substring replacement,
/// not a URL parse.
pub fn primary_url(base_url: &str, branch: &str) -> DistroResult<String> {
    let base_url = require_base(base_url)?;

    if branch.is_empty() || branch == DEFAULT_BRANCH {
        return Ok(base_url.to_string());
    }

    Ok(base_url.replacen(
        MANIFEST_FILE,
        &format!("distribution_{}.json", branch),
        1,
    ))
}

/// The fallback manifest URL: always the unmodified base, regardless of
/// branch.
pub fn fallback_url(base_url: &str) -> DistroResult<String> {
    Ok(require_base(base_url)?.to_string())
}

fn require_base(base_url: &str) -> DistroResult<&str> {
    if base_url.trim().is_empty() {
        return Err(DistroError::Configuration(
            "distribution base URL is empty".to_string(),
        ));
    }
    Ok(base_url)
}
