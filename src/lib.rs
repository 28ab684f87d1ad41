pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

pub use adapters::LocalStorage;
pub use config::{RulesConfig, ServerConfig};
pub use crate::core::{etl::EtlEngine, pipeline::AttendancePipeline, rules::OfficeRules};
pub use utils::error::{EtlError, Result};
