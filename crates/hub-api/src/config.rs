//! Server configuration.
//!
//! Resolved from `--config`, then `$HUB_CONFIG`, then
//! `<config dir>/project-hub/config.toml`. A missing file means defaults.
//! `HUB_*` environment variables override the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use hub_auth::{AuthConfig, DEFAULT_AUDIENCE, DEFAULT_ISSUER};
use hub_auth_local::{MAX_TOKEN_TTL, MIN_SECRET_LEN};
use hub_media::{HttpMediaConfig, UploadPolicy};
use hub_media::policy::{DEFAULT_MAX_FILE_BYTES, DEFAULT_MAX_FILES};

use crate::{Error, Result};

/// Project directory name under the platform config/data dirs.
pub const PROJECT_NAME: &str = "project-hub";

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "HUB_CONFIG";

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Allowed CORS origins; `"*"` allows any.
    pub cors_origins: Vec<String>,
    /// Request body limit for uploads.
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origins: Vec::new(),
            body_limit_bytes: 110 * 1024 * 1024,
        }
    }
}

/// `[storage]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// redb database file.
    pub path: PathBuf,
    /// Keep everything in memory and use an in-memory media host.
    pub ephemeral: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let path = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(PROJECT_NAME)
            .join("hub.redb");
        Self {
            path,
            ephemeral: false,
        }
    }
}

/// `[auth]` section.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HS256 signing secret.
    pub jwt_secret: String,
    /// Token issuer.
    pub issuer: String,
    /// Token audience.
    pub audience: String,
    /// Session lifetime in hours.
    pub token_ttl_hours: i64,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("token_ttl_hours", &self.token_ttl_hours)
            .finish()
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            issuer: DEFAULT_ISSUER.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
            token_ttl_hours: 24 * 7,
        }
    }
}

/// `[media]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaSettings {
    /// Upload API base URL.
    pub base_url: String,
    /// Account name at the host.
    pub cloud_name: String,
    /// Unsigned upload preset.
    pub upload_preset: String,
    /// Root folder for every upload.
    pub folder: String,
    /// Most files per request.
    pub max_files: usize,
    /// Largest file, in bytes.
    pub max_file_bytes: u64,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            base_url: hub_media::http::DEFAULT_BASE_URL.to_string(),
            cloud_name: String::new(),
            upload_preset: String::new(),
            folder: PROJECT_NAME.to_string(),
            max_files: DEFAULT_MAX_FILES,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

/// Complete server configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// HTTP listener.
    pub server: ServerConfig,
    /// Document store.
    pub storage: StorageConfig,
    /// Session tokens.
    pub auth: AuthSettings,
    /// Media host.
    pub media: MediaSettings,
}

impl HubConfig {
    /// Default config file location.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(PROJECT_NAME).join("config.toml"))
    }

    /// The config file to use: `explicit`, then `$HUB_CONFIG`, then the
    /// default location.
    pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Ok(path) = std::env::var(CONFIG_ENV)
            && !path.is_empty()
        {
            return Some(PathBuf::from(path));
        }
        Self::default_config_path()
    }

    /// Loads the file (if any) and applies environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match Self::resolve_config_path(explicit) {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) if explicit.is_some() => {
                return Err(Error::config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parses a config file without applying overrides.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        toml::from_str(&content)
            .map_err(|e| Error::config(format!("failed to parse {}: {e}", path.display())))
    }

    /// Applies `HUB_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HUB_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("HUB_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::config(format!("HUB_PORT is not a port: {port}")))?;
        }
        if let Some(origins) = lookup("HUB_CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(path) = lookup("HUB_DATA_PATH") {
            self.storage.path = PathBuf::from(path);
        }
        if let Some(secret) = lookup("HUB_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(hours) = lookup("HUB_TOKEN_TTL_HOURS") {
            self.auth.token_ttl_hours = hours.parse().map_err(|_| {
                Error::config(format!("HUB_TOKEN_TTL_HOURS is not a number: {hours}"))
            })?;
        }
        if let Some(url) = lookup("HUB_MEDIA_BASE_URL") {
            self.media.base_url = url;
        }
        if let Some(name) = lookup("HUB_MEDIA_CLOUD_NAME") {
            self.media.cloud_name = name;
        }
        if let Some(preset) = lookup("HUB_MEDIA_UPLOAD_PRESET") {
            self.media.upload_preset = preset;
        }
        Ok(())
    }

    /// Checks settings that would otherwise fail at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::config("server.port must not be 0"));
        }
        if self.auth.token_ttl_hours <= 0 {
            return Err(Error::config("auth.token_ttl_hours must be positive"));
        }
        if self.auth.token_ttl_hours > MAX_TOKEN_TTL.num_hours() {
            return Err(Error::config(format!(
                "auth.token_ttl_hours must be at most {}",
                MAX_TOKEN_TTL.num_hours()
            )));
        }
        let secret_len = self.auth.jwt_secret.len();
        let secret_required = !self.storage.ephemeral || secret_len > 0;
        if secret_required && secret_len < MIN_SECRET_LEN {
            return Err(Error::config(format!(
                "auth.jwt_secret must be at least {MIN_SECRET_LEN} bytes (set HUB_JWT_SECRET)"
            )));
        }
        if !self.storage.ephemeral && self.media.cloud_name.trim().is_empty() {
            return Err(Error::config(
                "media.cloud_name is required unless storage.ephemeral is set",
            ));
        }
        if self.media.max_files == 0 {
            return Err(Error::config("media.max_files must be at least 1"));
        }
        Ok(())
    }

    /// Whether uploads go to the in-memory host.
    pub fn uses_memory_media(&self) -> bool {
        self.storage.ephemeral && self.media.cloud_name.trim().is_empty()
    }

    /// Issuer/audience for the auth layer.
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            issuer: self.auth.issuer.clone(),
            audience: self.auth.audience.clone(),
        }
    }

    /// Session lifetime.
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::try_hours(self.auth.token_ttl_hours)
            .map_or(MAX_TOKEN_TTL, |ttl| ttl.min(MAX_TOKEN_TTL))
    }

    /// Upload limits.
    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy {
            max_files: self.media.max_files,
            max_file_bytes: self.media.max_file_bytes,
            ..UploadPolicy::default()
        }
    }

    /// HTTP media host settings.
    pub fn http_media_config(&self) -> HttpMediaConfig {
        HttpMediaConfig {
            base_url: self.media.base_url.clone(),
            ..HttpMediaConfig::new(&self.media.cloud_name, &self.media.upload_preset)
        }
    }

    /// Socket address string.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// The settings as `HUB_*` environment variables.
    pub fn to_env_vars(&self) -> Vec<(String, String)> {
        vec![
            ("HUB_HOST".into(), self.server.host.clone()),
            ("HUB_PORT".into(), self.server.port.to_string()),
            ("HUB_CORS_ORIGINS".into(), self.server.cors_origins.join(",")),
            ("HUB_DATA_PATH".into(), self.storage.path.display().to_string()),
            ("HUB_JWT_SECRET".into(), self.auth.jwt_secret.clone()),
            ("HUB_TOKEN_TTL_HOURS".into(), self.auth.token_ttl_hours.to_string()),
            ("HUB_MEDIA_BASE_URL".into(), self.media.base_url.clone()),
            ("HUB_MEDIA_CLOUD_NAME".into(), self.media.cloud_name.clone()),
            ("HUB_MEDIA_UPLOAD_PRESET".into(), self.media.upload_preset.clone()),
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn valid() -> HubConfig {
        let mut config = HubConfig::default();
        config.auth.jwt_secret = "x".repeat(32);
        config.media.cloud_name = "demo".into();
        config
    }

    #[test]
    fn test_defaults() {
        let config = HubConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.token_ttl_hours, 168);
        assert_eq!(config.media.max_files, 10);
        assert!(!config.storage.ephemeral);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: HubConfig = toml::from_str("[server]\nport = 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.auth.issuer, DEFAULT_ISSUER);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = HubConfig::default();
        config
            .apply_overrides(lookup(&[
                ("HUB_PORT", "9100"),
                ("HUB_CORS_ORIGINS", "https://a.example, https://b.example"),
                ("HUB_MEDIA_CLOUD_NAME", "campus"),
                ("HUB_TOKEN_TTL_HOURS", "2"),
            ]))
            .unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(
            config.server.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.media.cloud_name, "campus");
        assert_eq!(config.token_ttl(), chrono::Duration::hours(2));
    }

    #[test]
    fn test_bad_port_override() {
        let mut config = HubConfig::default();
        assert!(config.apply_overrides(lookup(&[("HUB_PORT", "http")])).is_err());
    }

    #[test]
    fn test_validate() {
        valid().validate().unwrap();

        let mut short = valid();
        short.auth.jwt_secret = "short".into();
        assert!(short.validate().is_err());

        let mut no_media = valid();
        no_media.media.cloud_name.clear();
        assert!(no_media.validate().is_err());

        let mut port = valid();
        port.server.port = 0;
        assert!(port.validate().is_err());
    }

    #[test]
    fn test_token_ttl_is_bounded() {
        let mut config = valid();
        config.auth.token_ttl_hours = 24 * 365;
        config.validate().unwrap();

        config
            .apply_overrides(lookup(&[("HUB_TOKEN_TTL_HOURS", "9223372036854775807")]))
            .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("token_ttl_hours"));
        assert_eq!(config.token_ttl(), MAX_TOKEN_TTL);
    }

    #[test]
    fn test_ephemeral_relaxes_requirements() {
        let mut config = HubConfig::default();
        config.storage.ephemeral = true;
        config.validate().unwrap();
        assert!(config.uses_memory_media());

        config.auth.jwt_secret = "too-short".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("hub.toml");
        std::fs::write(&path, "[media]\ncloud_name = \"campus\"\nmax_files = 4\n").unwrap();

        let config = HubConfig::from_file(&path).unwrap();
        assert_eq!(config.media.cloud_name, "campus");
        assert_eq!(config.upload_policy().max_files, 4);

        let missing = dir.path().join("nope.toml");
        assert!(HubConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = valid();
        let text = config.to_toml_string().unwrap();
        let parsed: HubConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", valid());
        assert!(!rendered.contains(&"x".repeat(32)));
    }

    #[test]
    fn test_env_vars_export() {
        let vars = valid().to_env_vars();
        assert!(vars.contains(&("HUB_PORT".to_string(), "8080".to_string())));
        assert!(vars.iter().any(|(k, _)| k == "HUB_JWT_SECRET"));
    }
}
