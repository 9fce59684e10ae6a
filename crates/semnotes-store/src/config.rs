//! Portal configuration and media host factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use semnotes_core::scheduler::SchedulerConfig;
use semnotes_core::scoring::ScoreWeights;
use semnotes_core::traits::MediaHost;

use crate::media::{CloudinaryHost, UnconfiguredHost};

/// Credentials for the Cloudinary media host.
///
/// Note: Custom Debug impl masks the API secret to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl std::fmt::Debug for MediaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Leaderboard timing and weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Seconds between scheduled recomputations.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Seconds to wait after start before the first recomputation.
    #[serde(default = "default_startup_delay_secs")]
    pub startup_delay_secs: u64,
    #[serde(default)]
    pub weights: ScoreWeights,
}

fn default_interval_secs() -> u64 {
    60 * 60
}
fn default_startup_delay_secs() -> u64 {
    5
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            startup_delay_secs: default_startup_delay_secs(),
            weights: ScoreWeights::default(),
        }
    }
}

impl ScoringConfig {
    pub fn scheduler(&self) -> SchedulerConfig {
        SchedulerConfig {
            interval: Duration::from_secs(self.interval_secs),
            startup_delay: Duration::from_secs(self.startup_delay_secs),
        }
    }
}

/// Top-level semnotes configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// JSON snapshot backing the document store.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    /// Directory topic attachments are written to.
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub media: Option<MediaConfig>,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./semnotes-data/store.json")
}
fn default_uploads_dir() -> PathBuf {
    PathBuf::from("./semnotes-data/uploads")
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            uploads_dir: default_uploads_dir(),
            scoring: ScoringConfig::default(),
            media: None,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        // Substituted values are not scanned again.
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_media_config(config: &MediaConfig) -> MediaConfig {
    MediaConfig {
        cloud_name: resolve_env_vars(&config.cloud_name),
        api_key: resolve_env_vars(&config.api_key),
        api_secret: resolve_env_vars(&config.api_secret),
        base_url: config.base_url.as_ref().map(|u| resolve_env_vars(u)),
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `semnotes.toml` in the current directory
/// 2. `~/.config/semnotes/config.toml`
///
/// Environment variable overrides: `SEMNOTES_STORE`, `SEMNOTES_UPLOADS_DIR`,
/// `SEMNOTES_MEDIA_SECRET`.
pub fn load_config() -> Result<PortalConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<PortalConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("semnotes.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => PortalConfig::default(),
    };

    apply_env_overrides(&mut config);
    Ok(config)
}

/// Parse a TOML config and resolve `${VAR}` references in the media section.
pub fn parse_config_str(content: &str) -> Result<PortalConfig> {
    let mut config: PortalConfig = toml::from_str(content)?;
    config.media = config.media.as_ref().map(resolve_media_config);
    Ok(config)
}

fn apply_env_overrides(config: &mut PortalConfig) {
    if let Ok(store) = std::env::var("SEMNOTES_STORE") {
        config.store_path = PathBuf::from(store);
    }
    if let Ok(dir) = std::env::var("SEMNOTES_UPLOADS_DIR") {
        config.uploads_dir = PathBuf::from(dir);
    }
    if let Ok(secret) = std::env::var("SEMNOTES_MEDIA_SECRET") {
        match config.media.as_mut() {
            Some(media) => media.api_secret = secret,
            None => tracing::warn!("SEMNOTES_MEDIA_SECRET is set but no [media] section exists"),
        }
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("semnotes"))
}

/// Create the media host described by the config.
///
/// Without a `[media]` section every destroy call fails with
/// `MediaError::NotConfigured`, which callers log and tolerate.
pub fn create_media_host(config: Option<&MediaConfig>) -> Arc<dyn MediaHost> {
    match config {
        Some(media) => Arc::new(CloudinaryHost::new(
            &media.cloud_name,
            &media.api_key,
            &media.api_secret,
            media.base_url.clone(),
        )),
        None => Arc::new(UnconfiguredHost),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_SEMNOTES_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_SEMNOTES_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_SEMNOTES_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_SEMNOTES_TEST_VAR");
    }

    #[test]
    fn substituted_value_is_not_expanded_again() {
        std::env::set_var("_SEMNOTES_SELF_REF", "${_SEMNOTES_SELF_REF}");
        assert_eq!(
            resolve_env_vars("key=${_SEMNOTES_SELF_REF}!"),
            "key=${_SEMNOTES_SELF_REF}!"
        );
        std::env::remove_var("_SEMNOTES_SELF_REF");
    }

    #[test]
    fn several_references_resolve_in_order() {
        std::env::set_var("_SEMNOTES_PART_A", "a");
        std::env::set_var("_SEMNOTES_PART_B", "b");
        assert_eq!(
            resolve_env_vars("${_SEMNOTES_PART_A}-${_SEMNOTES_PART_B}-${_SEMNOTES_UNSET_PART}"),
            "a-b-"
        );
        std::env::remove_var("_SEMNOTES_PART_A");
        std::env::remove_var("_SEMNOTES_PART_B");
    }

    #[test]
    fn unterminated_reference_is_left_alone() {
        assert_eq!(resolve_env_vars("abc${OOPS"), "abc${OOPS");
    }

    #[test]
    fn default_config() {
        let config = PortalConfig::default();
        assert_eq!(config.store_path, PathBuf::from("./semnotes-data/store.json"));
        assert_eq!(config.scoring.interval_secs, 3600);
        assert_eq!(config.scoring.startup_delay_secs, 5);
        assert!(config.media.is_none());
    }

    #[test]
    fn parse_full_config() {
        std::env::set_var("_SEMNOTES_TEST_SECRET", "s3cret");
        let toml_str = r#"
store_path = "/var/lib/semnotes/store.json"
uploads_dir = "/var/lib/semnotes/uploads"

[scoring]
interval_secs = 600

[scoring.weights]
revise = 10

[media]
cloud_name = "demo"
api_key = "1234"
api_secret = "${_SEMNOTES_TEST_SECRET}"
"#;
        let config = parse_config_str(toml_str).unwrap();
        std::env::remove_var("_SEMNOTES_TEST_SECRET");

        assert_eq!(config.scoring.interval_secs, 600);
        assert_eq!(config.scoring.startup_delay_secs, 5);
        assert_eq!(config.scoring.weights.revise, 10);
        assert_eq!(config.scoring.weights.read, 2);
        assert_eq!(
            config.scoring.scheduler().interval,
            Duration::from_secs(600)
        );

        let media = config.media.unwrap();
        assert_eq!(media.cloud_name, "demo");
        assert_eq!(media.api_secret, "s3cret");
    }

    #[test]
    fn debug_masks_secret() {
        let media = MediaConfig {
            cloud_name: "demo".into(),
            api_key: "1234".into(),
            api_secret: "hunter2".into(),
            base_url: None,
        };
        let shown = format!("{media:?}");
        assert!(shown.contains("***"));
        assert!(!shown.contains("hunter2"));
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let err = load_config_from(Some(Path::new("/nonexistent/semnotes.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("semnotes.toml");
        std::fs::write(&path, "uploads_dir = \"files\"\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.scoring.interval_secs, 3600);
        if std::env::var("SEMNOTES_UPLOADS_DIR").is_err() {
            assert_eq!(config.uploads_dir, PathBuf::from("files"));
        }
    }

    #[test]
    fn unconfigured_media_host_is_named() {
        assert_eq!(create_media_host(None).name(), "unconfigured");
    }
}
