//! Client configuration, read from `embershell.toml` at startup and
//! written back on close.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CliError;

pub const CONFIG_FILE: &str = "embershell.toml";

/// Top-level client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the module data file. Empty = no module preloaded.
    pub module: String,
    /// Language ID for the translation table.
    pub lang: String,
    /// Simulation tick rate in Hz. 0 disables the simulation loop.
    pub tick_rate_hz: u32,
    /// Directory for client save files.
    pub saves_dir: String,
    pub debug: bool,
    /// Remote game server. `None` = local authority.
    /// Kept last so the table serializes after the scalar values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            module: String::new(),
            lang: "english".into(),
            tick_rate_hz: 30,
            saves_dir: "saves".into(),
            debug: false,
            server: None,
        }
    }
}

/// Remote server address and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub login: String,
    pub pass: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 8000,
            login: String::new(),
            pass: String::new(),
        }
    }
}

impl Config {
    /// Reads the config file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn parse(text: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(text)?)
    }

    /// Writes the current values back to the config file.
    pub fn save(&self, path: &Path) -> Result<(), CliError> {
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        tracing::debug!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Path to the translation table for the configured language.
    pub fn lang_path(&self) -> PathBuf {
        Path::new("data/lang").join(format!("{}.json", self.lang))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_yields_defaults() {
        let config = Config::parse("").expect("should parse");
        assert_eq!(config.lang, "english");
        assert_eq!(config.tick_rate_hz, 30);
        assert!(config.server.is_none());
        assert!(!config.debug);
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
            module = "data/modules/arena.json"
            lang = "polish"
            tick_rate_hz = 60
            debug = true

            [server]
            host = "play.example.com"
            port = 8440
            login = "hero"
            pass = "secret"
            "#,
        )
        .expect("should parse");

        assert_eq!(config.module, "data/modules/arena.json");
        assert_eq!(config.lang, "polish");
        assert_eq!(config.tick_rate_hz, 60);
        let server = config.server.expect("server section");
        assert_eq!(server.host, "play.example.com");
        assert_eq!(server.port, 8440);
        assert_eq!(server.login, "hero");
    }

    #[test]
    fn test_parse_server_defaults_fill_missing_fields() {
        let config = Config::parse("[server]\nhost = \"srv\"\n")
            .expect("should parse");
        let server = config.server.expect("server section");
        assert_eq!(server.port, 8000);
        assert!(server.login.is_empty());
    }

    #[test]
    fn test_save_round_trips_through_file() {
        let dir = std::env::temp_dir().join(format!(
            "embershell-test-config-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).expect("should create temp dir");
        let path = dir.join(CONFIG_FILE);
        let config = Config {
            module: "data/modules/arena.json".into(),
            lang: "polish".into(),
            tick_rate_hz: 60,
            server: Some(ServerConfig {
                host: "play.example.com".into(),
                ..Default::default()
            }),
            ..Default::default()
        };

        config.save(&path).expect("should save");
        let loaded = Config::load(&path).expect("should load");

        assert_eq!(loaded.module, "data/modules/arena.json");
        assert_eq!(loaded.lang, "polish");
        assert_eq!(loaded.tick_rate_hz, 60);
        assert_eq!(
            loaded.server.expect("server section").host,
            "play.example.com"
        );
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_without_server_omits_the_section() {
        let text =
            toml::to_string_pretty(&Config::default()).expect("should encode");
        assert!(!text.contains("[server]"));
    }

    #[test]
    fn test_lang_path_uses_lang_id() {
        let config = Config {
            lang: "polish".into(),
            ..Default::default()
        };
        assert_eq!(
            config.lang_path(),
            Path::new("data/lang/polish.json")
        );
    }
}
