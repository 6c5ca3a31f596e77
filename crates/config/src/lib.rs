pub mod schema;
pub mod watcher;

pub use schema::{AlertThresholds, DashConfig, MonitorConfig, StreamConfig, SuggestionThresholds};
pub use watcher::ConfigWatcher;

use dash_core::{DashError, Result};
use std::path::{Path, PathBuf};

/// Load and validate configuration from a TOML file.  Returns
/// `DashConfig::default()` if the file doesn't exist so the pipeline always
/// has sensible defaults.
pub fn load(path: impl AsRef<Path>) -> Result<DashConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(DashConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| DashError::Config(format!("cannot read '{}': {e}", path.display())))?;

    let config: DashConfig =
        toml::from_str(&raw).map_err(|e| DashError::Config(format!("TOML parse error: {e}")))?;
    config.validate()?;
    Ok(config)
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("streamdash").join("streamdash.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("streamdash-{}-{name}.toml", std::process::id()))
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = load(scratch("missing")).unwrap();
        assert_eq!(cfg, DashConfig::default());
    }

    #[test]
    fn invalid_values_fail_to_load() {
        let path = scratch("invalid");
        std::fs::write(&path, "[stream]\nhigh_water_mark = 10\nretain_target = 20\n").unwrap();
        let result = load(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(DashError::Config(_))));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let path = scratch("malformed");
        std::fs::write(&path, "[stream\n").unwrap();
        let result = load(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(
            result,
            Err(DashError::Config(msg)) if msg.starts_with("TOML parse error")
        ));
    }
}
