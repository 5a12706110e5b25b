pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};

pub use app::pipelines::DocumentPipeline;
pub use core::{clause_pipeline::ClausePipeline, etl::EtlEngine};
pub use utils::error::{EtlError, Result};
