pub mod config;
pub mod core;
pub mod domain;
pub mod ga;
pub mod graph;
pub mod utils;
pub mod vk;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::cli::LocalStorage;
pub use core::{engine::CollectorEngine, pipeline::EgoPipeline};
pub use utils::error::{EgonetError, Result};
pub use vk::VkClient;
