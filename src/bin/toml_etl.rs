use clap::Parser;
use clause_etl::config::toml_config::TomlConfig;
use clause_etl::core::classifier::build_classifier;
use clause_etl::core::clause_pipeline::ClausePipeline;
use clause_etl::core::{ConfigProvider, DocumentFormat};
use clause_etl::utils::{logger, validation::Validate};
use clause_etl::{DocumentPipeline, EtlEngine, LocalStorage};

#[derive(Parser)]
#[command(name = "toml-etl")]
#[command(about = "Clause extraction driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "clause-etl.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the source document from config
    #[arg(long)]
    document: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based clause extraction");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    if let Some(document) = args.document.clone() {
        tracing::info!("🔧 Source document overridden to: {}", document);
        config.source.document = document;
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let classifier = match build_classifier(
        config.classifier_endpoint(),
        Some(config.classifier_timeout()),
    ) {
        Ok(classifier) => classifier,
        Err(e) => {
            tracing::error!("❌ Failed to build classifier: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let storage = LocalStorage::default();
    let pipeline = DocumentPipeline::new(storage, config, classifier);
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

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Pipeline: {} v{}",
        config.pipeline.name, config.pipeline.version
    );
    if let Some(description) = &config.pipeline.description {
        println!("  Description: {}", description);
    }
    println!("  Document: {}", config.document_path());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));
    println!(
        "  Classifier: {}",
        config.classifier_endpoint().unwrap_or("built-in heuristic")
    );

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📄 Source Document:");
    println!("  Path: {}", config.document_path());
    println!("  Format: {}", DocumentFormat::from_path(config.document_path()));

    // 實際載入詞彙表，確認欄位與內容
    let clauses = ClausePipeline::from_config(config);
    println!();
    println!("📚 Vocabulary:");
    match config.vocabulary_path() {
        Some(path) => println!("  File: {} (column '{}')", path, config.vocabulary_column()),
        None => println!("  File: none"),
    }
    println!("  Inline terms: {}", config.inline_terms().len());
    println!("  Loaded terms: {}", clauses.vocabulary().len());
    if clauses.vocabulary().is_empty() {
        println!("  ⚠️ Empty vocabulary: no clause will be kept");
    }

    println!();
    println!("⚙️ Filters:");
    println!("  Blacklisted phrases: {}", config.blacklist().len());
    println!("  Min words: {}", config.min_words());
    if config.min_chars() > 0 {
        println!("  Min characters: {}", config.min_chars());
    }

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));
    if config.save_extracted_text() {
        println!("  ✅ Extracted text will be saved");
    }
    if let Some(filename) = config.compression_filename() {
        println!("  Compression: {} (ZIP)", filename);
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
