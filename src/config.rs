//! Service configuration.
//!
//! Loaded once at start-up: defaults, then an optional TOML file, then
//! environment overrides, then command-line flags. The result is read-only
//! for the lifetime of the process and handed explicitly to the server.
//!
//! ```toml
//! app_name = "DockDockGo API"
//! port = 8000
//! cors_origins = ["http://localhost:3000"]
//! mock_fallback = false
//!
//! [search]
//! api_base_url = "https://api.github.com"
//! concurrency_limit = 5
//! politeness_delay_ms = [0, 0]
//! ```

use crate::error::{Result, ServiceError};
use dockdock_search::SearchConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for the dockdock service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service name reported by `/health`.
    pub app_name: String,
    /// Service version reported by `/`.
    pub app_version: String,
    /// Interface to bind.
    pub host: String,
    /// Port to bind. `0` picks a free port.
    pub port: u16,
    /// Origins allowed by CORS. `"*"` allows any origin without credentials.
    pub cors_origins: Vec<String>,
    /// Default log filter level when `RUST_LOG` is unset.
    pub log_level: String,
    /// When `true`, `/mock` runs a live search for queries no fixture matches.
    pub mock_fallback: bool,
    /// Upstream search settings.
    pub search: SearchConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            app_name: "DockDockGo API".to_owned(),
            app_version: env!("CARGO_PKG_VERSION").to_owned(),
            host: "0.0.0.0".to_owned(),
            port: 8000,
            cors_origins: vec!["http://localhost:3000".to_owned()],
            log_level: "info".to_owned(),
            mock_fallback: false,
            search: SearchConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a TOML file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ServiceError::Config(e.to_string()))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    ///
    /// Recognised variables: `GITHUB_TOKEN`, `GITHUB_API_URL`,
    /// `DOCKDOCK_HOST`, `DOCKDOCK_PORT`, `DOCKDOCK_CORS_ORIGINS`
    /// (comma separated), `DOCKDOCK_LOG_LEVEL`, `DOCKDOCK_MOCK_FALLBACK`.
    /// Empty values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Config`] if a numeric or boolean override
    /// cannot be parsed.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get("GITHUB_TOKEN") {
            self.search.token = Some(token.trim().to_owned());
        }
        if let Some(url) = get("GITHUB_API_URL") {
            self.search.api_base_url = url.trim().to_owned();
        }
        if let Some(host) = get("DOCKDOCK_HOST") {
            self.host = host.trim().to_owned();
        }
        if let Some(port) = get("DOCKDOCK_PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|e| ServiceError::Config(format!("DOCKDOCK_PORT: {e}")))?;
        }
        if let Some(origins) = get("DOCKDOCK_CORS_ORIGINS") {
            self.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_owned)
                .collect();
        }
        if let Some(level) = get("DOCKDOCK_LOG_LEVEL") {
            self.log_level = level.trim().to_owned();
        }
        if let Some(flag) = get("DOCKDOCK_MOCK_FALLBACK") {
            self.mock_fallback = flag
                .trim()
                .parse()
                .map_err(|e| ServiceError::Config(format!("DOCKDOCK_MOCK_FALLBACK: {e}")))?;
        }
        Ok(())
    }

    /// Validate the whole configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Config`] for an empty host or app name, or
    /// [`ServiceError::Search`] if the search settings are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(ServiceError::Config("host must not be empty".into()));
        }
        if self.app_name.trim().is_empty() {
            return Err(ServiceError::Config("app_name must not be empty".into()));
        }
        self.search.validate()?;
        Ok(())
    }

    /// `host:port` to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Default config path: `$XDG_CONFIG_HOME/dockdock/config.toml`, else
    /// `~/.config/dockdock/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("dockdock").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("dockdock")
                .join("config.toml")
        } else {
            PathBuf::from("dockdock.toml")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_sensible() {
        let config = ServiceConfig::default();
        assert_eq!(config.app_name, "DockDockGo API");
        assert_eq!(config.port, 8000);
        assert_eq!(config.cors_origins, ["http://localhost:3000"]);
        assert!(!config.mock_fallback);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn from_file_partial_toml_keeps_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
port = 9100
mock_fallback = true

[search]
concurrency_limit = 3
politeness_delay_ms = [10, 40]
"#,
        )
        .expect("write");

        let config = ServiceConfig::from_file(&path).expect("load");
        assert_eq!(config.port, 9100);
        assert!(config.mock_fallback);
        assert_eq!(config.search.concurrency_limit, 3);
        assert_eq!(config.search.politeness_delay_ms, (10, 40));
        assert_eq!(config.app_name, "DockDockGo API");
        assert_eq!(config.search.artifact_path, "docker-compose.yml");
    }

    #[test]
    fn from_file_nonexistent_returns_error() {
        let result = ServiceConfig::from_file(Path::new("/nonexistent/dockdock/config.toml"));
        assert!(matches!(result, Err(ServiceError::Io(_))));
    }

    #[test]
    fn from_file_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").expect("write");
        assert!(matches!(ServiceConfig::from_file(&path), Err(ServiceError::Config(_))));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = ServiceConfig::default();
        config
            .apply_overrides_from(lookup(&[
                ("GITHUB_TOKEN", " ghp_abc "),
                ("GITHUB_API_URL", "http://127.0.0.1:9999"),
                ("DOCKDOCK_PORT", "8123"),
                ("DOCKDOCK_CORS_ORIGINS", "http://a.test, http://b.test,,"),
                ("DOCKDOCK_MOCK_FALLBACK", "true"),
            ]))
            .expect("overrides");

        assert_eq!(config.search.token.as_deref(), Some("ghp_abc"));
        assert_eq!(config.search.api_base_url, "http://127.0.0.1:9999");
        assert_eq!(config.port, 8123);
        assert_eq!(config.cors_origins, ["http://a.test", "http://b.test"]);
        assert!(config.mock_fallback);
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut config = ServiceConfig::default();
        config
            .apply_overrides_from(lookup(&[("GITHUB_TOKEN", ""), ("DOCKDOCK_HOST", "  ")]))
            .expect("overrides");
        assert!(config.search.token.is_none());
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn bad_port_override_rejected() {
        let mut config = ServiceConfig::default();
        let err = config
            .apply_overrides_from(lookup(&[("DOCKDOCK_PORT", "eighty")]))
            .unwrap_err();
        assert!(err.to_string().contains("DOCKDOCK_PORT"));
    }

    #[test]
    fn invalid_search_section_fails_validation() {
        let mut config = ServiceConfig::default();
        config.search.concurrency_limit = 0;
        assert!(matches!(config.validate(), Err(ServiceError::Search(_))));
    }

    #[test]
    fn debug_never_prints_token() {
        let mut config = ServiceConfig::default();
        config.search.token = Some("ghp_topsecret".into());
        assert!(!format!("{config:?}").contains("ghp_topsecret"));
    }

    #[test]
    fn bind_addr_joins_host_and_port() {
        let config = ServiceConfig {
            host: "127.0.0.1".into(),
            port: 0,
            ..Default::default()
        };
        assert_eq!(config.bind_addr(), "127.0.0.1:0");
    }

    #[test]
    fn default_config_path_ends_with_config_toml() {
        let path = ServiceConfig::default_config_path();
        assert!(path.to_string_lossy().ends_with("config.toml") || path.ends_with("dockdock.toml"));
    }
}
