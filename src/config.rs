use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub const DEFAULT_ROOT_SERVER: &str = "whois.iana.org";
pub const DEFAULT_RADB_SERVER: &str = "whois.radb.net";
pub const DEFAULT_WHOIS_PORT: u16 = 43;
pub const DEFAULT_HTTP_PORT: u16 = 30010;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_BUFFER_SIZE: usize = 8192;
pub const DEFAULT_MAX_RESPONSE_SIZE: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub root_server: String,
    pub radb_server: String,
    pub whois_port: u16,
    pub connect_timeout_seconds: u64,
    pub write_timeout_seconds: u64,
    pub read_timeout_seconds: u64,
    pub buffer_size: usize,  // Size of the socket read buffer
    pub max_response_size: usize,  // Per query, in bytes
    pub start_time: Instant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigData {
    pub port: u16,
    pub root_server: String,
    pub radb_server: String,
    pub whois_port: u16,
    pub connect_timeout_seconds: u64,
    pub write_timeout_seconds: u64,
    pub read_timeout_seconds: u64,
    pub buffer_size: usize,
    pub max_response_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_HTTP_PORT,
            root_server: DEFAULT_ROOT_SERVER.to_string(),
            radb_server: DEFAULT_RADB_SERVER.to_string(),
            whois_port: DEFAULT_WHOIS_PORT,
            connect_timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            write_timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            read_timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
            start_time: Instant::now(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Override with environment variables if present
        let settings = Self::apply_env_overrides(Self::default_settings()?)?;
        Self::from_settings(settings)
    }

    fn default_settings() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("port", DEFAULT_HTTP_PORT)?
            .set_default("root_server", DEFAULT_ROOT_SERVER)?
            .set_default("radb_server", DEFAULT_RADB_SERVER)?
            .set_default("whois_port", DEFAULT_WHOIS_PORT)?
            .set_default("connect_timeout_seconds", DEFAULT_TIMEOUT_SECONDS)?
            .set_default("write_timeout_seconds", DEFAULT_TIMEOUT_SECONDS)?
            .set_default("read_timeout_seconds", DEFAULT_TIMEOUT_SECONDS)?
            .set_default("buffer_size", DEFAULT_BUFFER_SIZE as i64)?
            .set_default("max_response_size", DEFAULT_MAX_RESPONSE_SIZE as i64)
    }

    fn from_settings(
        settings: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, config::ConfigError> {
        let config_data: ConfigData = settings.build()?.try_deserialize()?;

        Ok(Config {
            port: config_data.port,
            root_server: config_data.root_server.to_lowercase(),
            radb_server: config_data.radb_server.to_lowercase(),
            whois_port: config_data.whois_port,
            connect_timeout_seconds: config_data.connect_timeout_seconds,
            write_timeout_seconds: config_data.write_timeout_seconds,
            read_timeout_seconds: config_data.read_timeout_seconds,
            buffer_size: config_data.buffer_size.max(1),
            max_response_size: config_data.max_response_size,
            start_time: Instant::now(),
        })
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_seconds)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_seconds)
    }

    fn apply_env_overrides(
        mut settings: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        // Blanket timeout first so the per-stage variables below win
        for env_var in ["WHOIS_TIMEOUT", "WHOIS_TIMEOUT_SECONDS"] {
            if let Ok(value) = std::env::var(env_var) {
                for key in ["connect_timeout_seconds", "write_timeout_seconds", "read_timeout_seconds"] {
                    settings = settings.set_override(key, value.clone())?;
                }
            }
        }

        // Later entries win: PORT beats HTTP_PORT beats SERVER_PORT
        let env_mappings = [
            ("SERVER_PORT", "port"),
            ("HTTP_PORT", "port"),
            ("PORT", "port"),
            ("WHOIS_ROOT_SERVER", "root_server"),
            ("WHOIS_RADB_SERVER", "radb_server"),
            ("WHOIS_PORT", "whois_port"),
            ("WHOIS_CONNECT_TIMEOUT", "connect_timeout_seconds"),
            ("WHOIS_WRITE_TIMEOUT", "write_timeout_seconds"),
            ("WHOIS_READ_TIMEOUT", "read_timeout_seconds"),
            ("BUFFER_SIZE", "buffer_size"),
            ("MAX_RESPONSE_SIZE", "max_response_size"),
        ];

        for (env_var, config_key) in env_mappings {
            if let Ok(value) = std::env::var(env_var) {
                settings = settings.set_override(config_key, value)?;
            }
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.root_server, "whois.iana.org");
        assert_eq!(config.radb_server, "whois.radb.net");
        assert_eq!(config.whois_port, 43);
        assert_eq!(config.connect_timeout(), Duration::from_secs(30));
        assert_eq!(config.write_timeout(), Duration::from_secs(30));
        assert_eq!(config.read_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_settings_without_overrides_match_defaults() {
        let config = Config::from_settings(Config::default_settings().unwrap()).unwrap();
        let defaults = Config::default();

        assert_eq!(config.port, defaults.port);
        assert_eq!(config.whois_port, 43);
        assert_eq!(config.root_server, "whois.iana.org");
        assert_eq!(config.radb_server, defaults.radb_server);
        assert_eq!(config.read_timeout(), defaults.read_timeout());
        assert_eq!(config.buffer_size, defaults.buffer_size);
        assert_eq!(config.max_response_size, DEFAULT_MAX_RESPONSE_SIZE);
    }

    #[test]
    fn test_overrides_are_parsed_and_servers_lowercased() {
        // Same shape as an environment override: string values on top of the defaults.
        let settings = Config::default_settings()
            .unwrap()
            .set_override("whois_port", "4343")
            .unwrap()
            .set_override("root_server", "WHOIS.Example.NET")
            .unwrap()
            .set_override("max_response_size", "65536")
            .unwrap();

        let config = Config::from_settings(settings).unwrap();

        assert_eq!(config.whois_port, 4343);
        assert_eq!(config.root_server, "whois.example.net");
        assert_eq!(config.max_response_size, 65536);
    }
}
