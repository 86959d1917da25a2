use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::session::live::ChannelPrefixes;
use crate::session::SessionSettings;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub graphql: String,
    pub api: String,
    pub socket: String,
    pub ckb_explorer: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            graphql: "https://api.gwscan.com/graphql".to_string(),
            api: "https://api.gwscan.com/api".to_string(),
            socket: "wss://api.gwscan.com/socket/websocket".to_string(),
            ckb_explorer: "https://explorer.nervos.org".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub refetch_secs: u64,
    pub stale_secs: u64,
    pub page_size: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            refetch_secs: 10,
            stale_secs: 10,
            page_size: 10,
        }
    }
}

/// Topic prefixes for live channels. An empty or missing prefix turns the channel off.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub block: Option<String>,
    pub account: Option<String>,
    pub token: Option<String>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            block: Some("blocks:".to_string()),
            account: None,
            token: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub endpoints: EndpointConfig,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub channels: ChannelConfig,
}

impl Config {
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            page_size: self.polling.page_size.max(1),
            refetch_every: Duration::from_secs(self.polling.refetch_secs.max(1)),
            stale_after: Duration::from_secs(self.polling.stale_secs),
            channels: ChannelPrefixes {
                account: self.channels.account.clone(),
                block: self.channels.block.clone(),
                token: self.channels.token.clone(),
            },
            ckb_explorer: self.endpoints.ckb_explorer.clone(),
        }
    }
}

pub fn load() -> Config {
    match config_path() {
        Some(path) => load_from(&path),
        None => Config::default(),
    }
}

pub fn load_from(path: &Path) -> Config {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    parse(&content).unwrap_or_else(|err| {
        warn!(path = %path.display(), error = %err, "malformed config, using defaults");
        Config::default()
    })
}

pub fn parse(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(content)
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("GWSCOPE_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("gwscope").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("gwscope").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "gwscope", "gwscope")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("gwscope"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("gwscope"));
    }
    directories::ProjectDirs::from("io", "gwscope", "gwscope")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn log_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("gwscope.log"))
}

pub fn exports_dir() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("exports"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_defaults() {
        assert_eq!(parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = parse(
            r#"
            [endpoints]
            graphql = "http://localhost:4000/graphql"

            [polling]
            page_size = 25

            [channels]
            account = "accounts:"
            "#,
        )
        .unwrap();
        assert_eq!(config.endpoints.graphql, "http://localhost:4000/graphql");
        assert_eq!(config.endpoints.api, EndpointConfig::default().api);
        assert_eq!(config.polling.page_size, 25);
        assert_eq!(config.polling.refetch_secs, 10);
        assert_eq!(config.channels.block.as_deref(), Some("blocks:"));

        let settings = config.session_settings();
        assert_eq!(settings.page_size, 25);
        assert_eq!(settings.channels.account.as_deref(), Some("accounts:"));
        assert_eq!(settings.refetch_every, Duration::from_secs(10));
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = std::env::temp_dir().join(format!("gwscope-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, "[polling\npage_size = ").unwrap();
        assert_eq!(load_from(&path), Config::default());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_is_defaults() {
        let path = std::env::temp_dir().join("gwscope-does-not-exist.toml");
        assert_eq!(load_from(&path), Config::default());
    }
}
