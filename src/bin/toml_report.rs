use clap::Parser;
use magazine_report::core::ConfigProvider;
use magazine_report::utils::error::ErrorSeverity;
use magazine_report::utils::{logger, validation::Validate};
use magazine_report::{EtlEngine, LocalStorage, ReportIndex, ReportPipeline, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-report")]
#[command(about = "Magazine report driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "magazine-report.toml")]
    config: String,

    /// Override scan.main_folder from the config
    #[arg(short, long)]
    main_folder: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Scan and summarise without writing the archive
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    let verbose = args.verbose || config.verbose();
    if config.json_logs() {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Some(folder) = args.main_folder {
        tracing::info!("🔧 Main folder overridden to: {}", folder);
        config.scan.main_folder = Some(folder);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, args.dry_run);

    let storage = LocalStorage::new(config.output_path().to_string());
    let engine = EtlEngine::new(ReportPipeline::new(storage, config));

    let outcome = if args.dry_run {
        engine.preview().await.map(|index| print_preview(&index))
    } else {
        engine.run().await.map(|output_path| {
            println!("✅ Report generated successfully!");
            println!("📁 Output saved to: {}", output_path);
        })
    };

    if let Err(e) = outcome {
        tracing::error!(
            "❌ Report generation failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, dry_run: bool) {
    println!("📋 Configuration Summary:");
    println!("  Report: {}", config.report.name);
    if let Some(description) = &config.report.description {
        println!("  Description: {}", description);
    }
    println!("  Main folder: {}", config.main_folder().unwrap_or("-"));
    println!(
        "  Files: *.{} ('{}' delimited, in at -{}, out at -{})",
        config.extension(),
        config.delimiter(),
        config.in_offset(),
        config.out_offset()
    );
    println!(
        "  Output: {}/{}",
        config.output_path(),
        config.archive_name()
    );

    if dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn print_preview(index: &ReportIndex) {
    println!("🔍 Dry Run Analysis:");
    if index.is_empty() {
        println!("  No data files found");
    }
    for (date, records) in index.iter() {
        println!("  {}: {} record(s)", date, records.len());
    }
    println!(
        "  Total: {} record(s) in {} date bucket(s)",
        index.record_count(),
        index.bucket_count()
    );
}
