use clap::Parser;
use clause_etl::core::classifier::build_classifier;
use clause_etl::utils::{logger, validation::Validate};
use clause_etl::{CliConfig, DocumentPipeline, EtlEngine, LocalStorage};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting clause-etl CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let classifier = match build_classifier(
        config.classifier_endpoint.as_deref(),
        Some(Duration::from_secs(config.classifier_timeout)),
    ) {
        Ok(classifier) => classifier,
        Err(e) => {
            tracing::error!("❌ Failed to build classifier: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    // 路徑相對於目前工作目錄解析
    let storage = LocalStorage::default();
    let pipeline = DocumentPipeline::new(storage, config, classifier);

    tracing::info!(
        "📚 Vocabulary ready with {} terms",
        pipeline.clause_pipeline().vocabulary().len()
    );

    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Clause extraction completed successfully!");
            tracing::info!("📁 Output saved to: {}", output_path);
            println!("✅ Clause extraction completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = e.severity().exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
