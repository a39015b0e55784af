pub mod cli;
pub mod sweep_config;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::{EgonetError, Result};
#[cfg(feature = "cli")]
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_url, Validate,
};
#[cfg(feature = "cli")]
use crate::vk::{DEFAULT_API_BASE, DEFAULT_API_VERSION};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "vk-egonet")]
#[command(about = "Collect a VK ego-graph and export it for analysis")]
pub struct CliConfig {
    /// Seed user: numeric id or screen name
    #[arg(long)]
    pub user: String,

    /// VK access token; falls back to the VK_TOKEN environment variable
    #[arg(long)]
    pub token: Option<String>,

    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    #[arg(long, default_value = DEFAULT_API_VERSION)]
    pub api_version: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "5")]
    pub concurrent_requests: usize,

    /// VK allows roughly three calls per second per token.
    #[arg(long, default_value = "3")]
    pub requests_per_second: u32,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Enable system monitoring")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// The --token flag wins; otherwise VK_TOKEN from the environment.
    pub fn resolve_token(&self) -> Result<String> {
        if let Some(token) = &self.token {
            if !token.trim().is_empty() {
                return Ok(token.clone());
            }
        }

        std::env::var("VK_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| EgonetError::MissingConfigError {
                field: "token".to_string(),
            })
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn api_base(&self) -> &str {
        &self.api_base
    }

    fn api_version(&self) -> &str {
        &self.api_version
    }

    fn seed_user(&self) -> &str {
        &self.user
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
    }

    fn requests_per_second(&self) -> u32 {
        self.requests_per_second
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("user", &self.user)?;
        validate_url("api_base", &self.api_base)?;
        validate_non_empty_string("api_version", &self.api_version)?;
        validate_path("output_path", &self.output_path)?;
        validate_positive_number("concurrent_requests", self.concurrent_requests, 1)?;
        validate_positive_number(
            "requests_per_second",
            self.requests_per_second as usize,
            1,
        )?;
        Ok(())
    }
}
