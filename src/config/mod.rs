pub mod cli;
pub mod toml_config;

pub use cli::ServerConfig;
pub use toml_config::RulesConfig;
