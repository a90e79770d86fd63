use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

/// Prefix for environment overrides, e.g. `RISK_SERVICE__SERVER__PORT=9090`.
pub const ENV_PREFIX: &str = "RISK_SERVICE";

/// Top-level service configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Listener settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Log filter settings. `RUST_LOG` takes precedence when set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("Invalid bind host: {}", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Load configuration: defaults, then the file if present (always parsed as TOML), then
/// environment overrides
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ServiceConfig> {
    load_config_with_env(path, Environment::with_prefix(ENV_PREFIX))
}

fn load_config_with_env<P: AsRef<Path>>(path: P, env: Environment) -> Result<ServiceConfig> {
    let path = path.as_ref();
    let settings = Config::builder()
        .add_source(File::from(path).format(FileFormat::Toml).required(false))
        .add_source(env.separator("__").try_parsing(true))
        .build()
        .with_context(|| format!("Failed to read configuration: {}", path.display()))?;

    settings
        .try_deserialize()
        .with_context(|| format!("Invalid configuration: {}", path.display()))
}

/// Save configuration to a file
pub fn save_config<P: AsRef<Path>>(config: &ServiceConfig, path: P) -> Result<()> {
    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Create a default configuration template
pub fn create_default_config() -> ServiceConfig {
    ServiceConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env() -> Environment {
        Environment::with_prefix(ENV_PREFIX).source(Some(HashMap::new()))
    }

    #[test]
    fn defaults_listen_on_8080() {
        let config = create_default_config();
        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.server.socket_addr().unwrap(),
            "0.0.0.0:8080".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_with_env(dir.path().join("absent.toml"), no_env()).unwrap();
        assert_eq!(config, create_default_config());
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("risk_service.toml");

        let mut config = create_default_config();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 9191;
        config.logging.level = "debug".to_string();
        save_config(&config, &path).unwrap();

        let loaded = load_config_with_env(&path, no_env()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn file_without_toml_extension_is_still_read() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = create_default_config();
        config.server.port = 9191;

        for name in ["risk.cfg", "risk_config"] {
            let path = dir.path().join(name);
            save_config(&config, &path).unwrap();
            let loaded = load_config_with_env(&path, no_env()).unwrap();
            assert_eq!(loaded.server.port, 9191, "config file: {name}");
        }
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[server]\nport = 7000\n").unwrap();

        let loaded = load_config_with_env(&path, no_env()).unwrap();
        assert_eq!(loaded.server.port, 7000);
        assert_eq!(loaded.server.host, "0.0.0.0");
        assert_eq!(loaded.logging.level, "info");
    }

    #[test]
    fn environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("env.toml");
        std::fs::write(&path, "[server]\nport = 7000\n").unwrap();

        let vars = HashMap::from([("RISK_SERVICE__SERVER__PORT".to_string(), "9090".to_string())]);
        let env = Environment::with_prefix(ENV_PREFIX).source(Some(vars));
        let loaded = load_config_with_env(&path, env).unwrap();
        assert_eq!(loaded.server.port, 9090);
    }

    #[test]
    fn invalid_host_is_reported() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            port: 8080,
        };
        let err = config.socket_addr().unwrap_err();
        assert!(err.to_string().contains("not a host"));
    }
}
