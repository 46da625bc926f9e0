use std::path::PathBuf;

pub const ENV_HOME: &str = "DECOY_HOME";
pub const ENV_CATALOG_URL: &str = "DECOY_CATALOG_URL";

// Passed to spawned service processes.
pub const ENV_SERVICE: &str = "DECOY_SERVICE";
pub const ENV_ARGS: &str = "DECOY_ARGS";
pub const ENV_SINKS: &str = "DECOY_SINKS";

const DECOY_SUBDIR: &str = "decoy";
const DEFAULT_CATALOG_URL: &str = "https://decoy-services.the-ihor.com";

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Registry home ($DECOY_HOME or ~/.local/share/decoy)
pub fn default_home() -> PathBuf {
    let dir = env_opt(ENV_HOME).map(PathBuf::from).unwrap_or_else(|| {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join(DECOY_SUBDIR)
    });
    tracing::trace!(dir = %dir.display(), "Resolved registry home");
    dir
}

/// Service catalog URL ($DECOY_CATALOG_URL or default)
pub fn catalog_url() -> String {
    let url = env_opt(ENV_CATALOG_URL).unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string());
    tracing::trace!(url = %url, "Catalog URL");
    url
}
