use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_path, validate_positive_number, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "attendance-server")]
#[command(about = "Web service that turns attendance CSV exports into Excel reports")]
pub struct ServerConfig {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value = "8000")]
    pub port: u16,

    #[arg(long, env = "OUTPUT_DIR", default_value = "./output")]
    pub output_dir: String,

    /// Directory served under /static
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<String>,

    /// TOML file with the office rules
    #[arg(long = "rules", env = "RULES_CONFIG")]
    pub rules_path: Option<String>,

    #[arg(long, default_value = "20")]
    pub max_upload_mb: usize,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, env = "JSON_LOGS", help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            output_dir: "./output".to_string(),
            static_dir: None,
            rules_path: None,
            max_upload_mb: 20,
            verbose: false,
            json_logs: false,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| EtlError::InvalidConfigValueError {
                field: "host".to_string(),
                value: self.host.clone(),
                reason: format!("Not a valid listen address: {}", e),
            })
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(EtlError::InvalidConfigValueError {
                field: "port".to_string(),
                value: "0".to_string(),
                reason: "Port must be between 1 and 65535".to_string(),
            });
        }
        self.socket_addr()?;
        validate_path("output_dir", &self.output_dir)?;
        if let Some(static_dir) = &self.static_dir {
            validate_path("static_dir", static_dir)?;
        }
        if let Some(rules_path) = &self.rules_path {
            validate_path("rules", rules_path)?;
        }
        validate_positive_number("max_upload_mb", self.max_upload_mb, 1)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // PORT and HOST are process-wide, so defaults and env overrides share one test.
    #[test]
    fn test_parse_defaults_and_env() {
        std::env::remove_var("PORT");
        std::env::remove_var("HOST");

        let config = ServerConfig::try_parse_from(["attendance-server"]).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:8000");
        assert_eq!(config.max_upload_mb, 20);
        assert_eq!(config.max_upload_bytes(), 20 * 1024 * 1024);
        assert!(config.validate().is_ok());

        std::env::set_var("PORT", "9100");
        std::env::set_var("HOST", "127.0.0.1");
        let config = ServerConfig::try_parse_from(["attendance-server"]);
        std::env::remove_var("PORT");
        std::env::remove_var("HOST");

        let config = config.unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:9100");
    }

    #[test]
    fn test_parse_overrides() {
        let config = ServerConfig::try_parse_from([
            "attendance-server",
            "--host",
            "127.0.0.1",
            "--port",
            "9100",
            "--output-dir",
            "/tmp/reports",
            "--rules",
            "rules.toml",
        ])
        .unwrap();
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:9100");
        assert_eq!(config.output_dir, "/tmp/reports");
        assert_eq!(config.rules_path.as_deref(), Some("rules.toml"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ServerConfig {
            port: 0,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ServerConfig {
            host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ServerConfig {
            max_upload_mb: 0,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
