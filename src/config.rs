//! Configuration for the activity proxy and widget.
//!
//! Settings are layered file → environment → CLI. The file is `folio.toml`:
//!
//! ```toml
//! [github]
//! username = "octocat"
//! api_base_url = "https://github-contributions-api.jogruber.de/v4"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 3141
//! dev = false
//! allowed_origins = ["https://portfolio.example"]
//!
//! [widget]
//! endpoint = "http://127.0.0.1:3141/api/github-activity"
//! cache_file = "/tmp/folio-activity.json"
//! ```
//!
//! Environment overrides: `FOLIO_GITHUB_USERNAME`, `FOLIO_API_BASE_URL`,
//! `FOLIO_PORT`, `FOLIO_ALLOWED_ORIGINS` (comma separated), `FOLIO_ENDPOINT`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "folio.toml";
pub const DEFAULT_API_BASE_URL: &str = "https://github-contributions-api.jogruber.de/v4";
pub const ACTIVITY_ROUTE: &str = "/api/github-activity";

/// Upstream source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubSection {
    /// Profile handle whose contributions are mirrored
    #[serde(default = "default_username")]
    pub username: String,
    /// Base URL of the contributions API, without trailing slash
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_username() -> String {
    "octocat".to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Default for GithubSection {
    fn default() -> Self {
        Self {
            username: default_username(),
            api_base_url: default_api_base_url(),
        }
    }
}

/// Proxy server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Permissive CORS for a local front-end dev server
    #[serde(default)]
    pub dev: bool,
    /// Origins allowed to call the proxy from a browser; empty allows any
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3141
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            dev: false,
            allowed_origins: Vec::new(),
        }
    }
}

/// Widget settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WidgetSection {
    /// Full URL of the activity proxy; derived from `[server]` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Cache record location; defaults to the user cache directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_file: Option<PathBuf>,
}

/// Root of `folio.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolioToml {
    #[serde(default)]
    pub github: GithubSection,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub widget: WidgetSection,
}

impl FolioToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse folio.toml")
    }

    /// Load from `path`, returning defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply environment variable overrides on top of file values.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(username) = lookup("FOLIO_GITHUB_USERNAME") {
            self.github.username = username;
        }
        if let Some(base) = lookup("FOLIO_API_BASE_URL") {
            self.github.api_base_url = base;
        }
        if let Some(port) = lookup("FOLIO_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid FOLIO_PORT value '{}'", port))?;
        }
        if let Some(origins) = lookup("FOLIO_ALLOWED_ORIGINS") {
            self.server.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(endpoint) = lookup("FOLIO_ENDPOINT") {
            self.widget.endpoint = Some(endpoint);
        }
        Ok(())
    }

    /// The proxy URL the widget calls.
    pub fn endpoint(&self) -> String {
        self.widget.endpoint.clone().unwrap_or_else(|| {
            format!(
                "http://{}:{}{}",
                self.server.host, self.server.port, ACTIVITY_ROUTE
            )
        })
    }

    /// Where the widget keeps its cache record.
    pub fn cache_file(&self) -> PathBuf {
        self.widget.cache_file.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("folio")
                .join("github-activity.json")
        })
    }

    /// Public profile page used as the fallback link in error states.
    pub fn profile_url(&self) -> String {
        format!("https://github.com/{}", self.github.username)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize folio.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = FolioToml::default();
        assert_eq!(config.github.username, "octocat");
        assert_eq!(config.github.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.server.port, 3141);
        assert!(!config.server.dev);
        assert_eq!(
            config.endpoint(),
            "http://127.0.0.1:3141/api/github-activity"
        );
    }

    #[test]
    fn test_parse_partial_file_keeps_defaults() {
        let config = FolioToml::parse(
            r#"
[github]
username = "ferris"

[server]
port = 8080
"#,
        )
        .unwrap();
        assert_eq!(config.github.username, "ferris");
        assert_eq!(config.github.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.profile_url(), "https://github.com/ferris");
    }

    #[test]
    fn test_parse_invalid_toml_errors() {
        let err = FolioToml::parse("[github\nusername = 1").unwrap_err();
        assert!(err.to_string().contains("Failed to parse folio.toml"));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempdir().unwrap();
        let config = FolioToml::load_or_default(&dir.path().join("folio.toml")).unwrap();
        assert_eq!(config.server.port, 3141);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("folio.toml");
        std::fs::write(
            &path,
            "[widget]\nendpoint = \"https://example.com/api/github-activity\"\n",
        )
        .unwrap();
        let config = FolioToml::load_or_default(&path).unwrap();
        assert_eq!(config.endpoint(), "https://example.com/api/github-activity");
    }

    #[test]
    fn test_overrides_take_precedence() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("FOLIO_GITHUB_USERNAME", "env-user"),
            ("FOLIO_PORT", "9000"),
        ]);
        let mut config = FolioToml::default();
        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.github.username, "env-user");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.endpoint(), "http://127.0.0.1:9000/api/github-activity");
    }

    #[test]
    fn test_allowed_origins_from_file_and_env() {
        let mut config = FolioToml::parse(
            "[server]\nallowed_origins = [\"https://a.example\"]\n",
        )
        .unwrap();
        assert_eq!(config.server.allowed_origins, vec!["https://a.example"]);

        config
            .apply_overrides(|k| {
                (k == "FOLIO_ALLOWED_ORIGINS")
                    .then(|| "https://b.example, https://c.example,".to_string())
            })
            .unwrap();
        assert_eq!(
            config.server.allowed_origins,
            vec!["https://b.example", "https://c.example"]
        );
    }

    #[test]
    fn test_invalid_port_override_errors() {
        let mut config = FolioToml::default();
        let result = config.apply_overrides(|k| (k == "FOLIO_PORT").then(|| "nope".to_string()));
        assert!(result.unwrap_err().to_string().contains("FOLIO_PORT"));
    }

    #[test]
    fn test_cache_file_override() {
        let mut config = FolioToml::default();
        config.widget.cache_file = Some(PathBuf::from("/tmp/activity.json"));
        assert_eq!(config.cache_file(), PathBuf::from("/tmp/activity.json"));
    }

    #[test]
    fn test_default_cache_file_is_namespaced() {
        let path = FolioToml::default().cache_file();
        assert!(path.ends_with("folio/github-activity.json"));
    }

    #[test]
    fn test_roundtrip_through_toml_string() {
        let mut config = FolioToml::default();
        config.github.username = "ferris".into();
        let text = config.to_toml_string().unwrap();
        let parsed = FolioToml::parse(&text).unwrap();
        assert_eq!(parsed.github.username, "ferris");
    }
}
