use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

pub const DEFAULT_OVER_100_POINTS: u32 = 2;
pub const DEFAULT_BETWEEN_50_AND_100_POINTS: u32 = 1;

const ENV_PREFIX: &str = "REWARDS";

/// Points awarded per currency unit in each spending band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRates {
    /// Points per unit spent above 100
    pub over_100: u32,
    /// Points per unit spent between 50 and 100
    pub between_50_and_100: u32,
}

impl Default for RewardRates {
    fn default() -> Self {
        Self {
            over_100: DEFAULT_OVER_100_POINTS,
            between_50_and_100: DEFAULT_BETWEEN_50_AND_100_POINTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub rates: RewardRates,
    pub server: ServerConfig,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rates: RewardRates::default(),
            server: ServerConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Loads settings, later sources overriding earlier ones:
    /// 1. built-in defaults
    /// 2. `<config_dir>/default.toml` (optional)
    /// 3. `REWARDS_*` environment variables (`REWARDS_OVER100_REWARD_POINTS` -> over100.reward.points)
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        Self::build(
            config_dir,
            Environment::with_prefix(ENV_PREFIX)
                .separator("_")
                .try_parsing(true),
        )
    }

    fn build(config_dir: &Path, env: Environment) -> Result<Self, ConfigError> {
        let defaults = Settings::default();

        let config = Config::builder()
            .set_default("over100.reward.points", i64::from(defaults.rates.over_100))?
            .set_default(
                "between50and100.reward.points",
                i64::from(defaults.rates.between_50_and_100),
            )?
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("log.level", defaults.log_level)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(env)
            .build()?;

        Ok(Self {
            rates: RewardRates {
                over_100: config.get("over100.reward.points")?,
                between_50_and_100: config.get("between50and100.reward.points")?,
            },
            server: ServerConfig {
                host: config.get("server.host")?,
                port: config.get("server.port")?,
            },
            log_level: config.get("log.level")?,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// `CONFIG_DIR` if set, otherwise `./config`.
pub fn default_config_dir() -> PathBuf {
    std::env::var("CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn no_env() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("_")
            .try_parsing(true)
            .source(Some(config::Map::new()))
    }

    fn env_of(vars: &[(&str, &str)]) -> Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX)
            .separator("_")
            .try_parsing(true)
            .source(Some(map))
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::build(dir.path(), no_env()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.rates.over_100, 2);
        assert_eq!(settings.rates.between_50_and_100, 1);
        assert_eq!(settings.server_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            r#"
[over100.reward]
points = 3

[server]
port = 9000
"#,
        )
        .unwrap();

        let settings = Settings::build(dir.path(), no_env()).unwrap();
        assert_eq!(settings.rates.over_100, 3);
        assert_eq!(settings.rates.between_50_and_100, 1);
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "127.0.0.1");
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[between50and100.reward]\npoints = 4\n",
        )
        .unwrap();

        let env = env_of(&[
            ("REWARDS_BETWEEN50AND100_REWARD_POINTS", "5"),
            ("REWARDS_OVER100_REWARD_POINTS", "7"),
        ]);
        let settings = Settings::build(dir.path(), env).unwrap();
        assert_eq!(settings.rates.between_50_and_100, 5);
        assert_eq!(settings.rates.over_100, 7);
    }

    #[test]
    fn test_invalid_rate_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let env = env_of(&[("REWARDS_OVER100_REWARD_POINTS", "-1")]);
        assert!(Settings::build(dir.path(), env).is_err());
    }
}
