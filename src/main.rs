use clap::Parser;
use vk_egonet::utils::{logger, validation::Validate};
use vk_egonet::{CliConfig, CollectorEngine, EgoPipeline, LocalStorage, VkClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting vk-egonet CLI");
    if config.verbose {
        tracing::debug!(
            user = %config.user,
            api_base = %config.api_base,
            output_path = %config.output_path,
            concurrent_requests = config.concurrent_requests,
            "CLI config"
        );
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let token = match config.resolve_token() {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("❌ {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let client = VkClient::new(
        config.api_base.clone(),
        token,
        config.api_version.clone(),
        config.requests_per_second,
    );
    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = EgoPipeline::new(storage, config, client);

    let engine = CollectorEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Ego-graph collection completed successfully!");
            tracing::info!("📁 Output saved to: {}", output_path);
            println!("✅ Ego-graph collection completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Collection failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                vk_egonet::utils::error::ErrorSeverity::Low => 0,
                vk_egonet::utils::error::ErrorSeverity::Medium => 2,
                vk_egonet::utils::error::ErrorSeverity::High => 1,
                vk_egonet::utils::error::ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
