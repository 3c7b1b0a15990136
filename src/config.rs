use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DashError;

/// Names a config file to use instead of [`DEFAULT_CONFIG_FILE`].
pub const CONFIG_ENV: &str = "CRIME_DASH_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "crime_dash.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub log_path: PathBuf,
    /// `EnvFilter` directives; `RUST_LOG` takes precedence.
    pub log_filter: String,
    pub tick_rate_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_path: PathBuf::from("data/crimedata.csv"),
            log_path: PathBuf::from("crime_dash.log"),
            log_filter: "info".to_string(),
            tick_rate_ms: 200,
        }
    }
}

impl DashboardConfig {
    /// Reads the file named by `CRIME_DASH_CONFIG`, else `crime_dash.toml` if
    /// it exists, else falls back to defaults.
    pub fn load() -> Result<Self, DashError> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            return Self::from_file(default_path);
        }
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self, DashError> {
        let content = fs::read_to_string(path).map_err(|source| DashError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: DashboardConfig = toml::from_str(&content).map_err(|source| DashError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    // `load` reads process-wide state; tests that set the variable take turns.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct EnvGuard;

    impl EnvGuard {
        fn set(value: &Path) -> Self {
            env::set_var(CONFIG_ENV, value);
            EnvGuard
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            env::remove_var(CONFIG_ENV);
        }
    }

    #[test]
    fn env_variable_names_the_config_file() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("override.toml");
        fs::write(&path, "log_filter = \"debug\"\ntick_rate_ms = 75\n").unwrap();
        let _env = EnvGuard::set(&path);

        let config = DashboardConfig::load().unwrap();
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.tick_rate_ms, 75);
        assert_eq!(config.data_path, PathBuf::from("data/crimedata.csv"));
    }

    #[test]
    fn env_variable_pointing_nowhere_is_fatal() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let _env = EnvGuard::set(&path);

        match DashboardConfig::load() {
            Err(DashError::ConfigIo { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected config read error, got {:?}", other),
        }
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dash.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "data_path = \"/srv/crimedata.csv\"\ntick_rate_ms = 50").unwrap();

        let config = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(config.data_path, PathBuf::from("/srv/crimedata.csv"));
        assert_eq!(config.tick_rate(), Duration::from_millis(50));
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.log_path, PathBuf::from("crime_dash.log"));
    }

    #[test]
    fn invalid_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dash.toml");
        fs::write(&path, "tick_rate_ms = \"fast\"").unwrap();
        assert!(matches!(
            DashboardConfig::from_file(&path),
            Err(DashError::Config { .. })
        ));
        assert!(matches!(
            DashboardConfig::from_file(&dir.path().join("missing.toml")),
            Err(DashError::ConfigIo { .. })
        ));
    }
}
