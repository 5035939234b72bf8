use anyhow::Context;
use clap::Parser;
use ltr_classif::core::ConfigProvider;
use ltr_classif::utils::{logger, validation::Validate};
use ltr_classif::{ClassificationEngine, ClassifyPipeline, FileReportSink, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-classif")]
#[command(about = "LTR superfamily classification driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "ltr-classif.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override parallel setting from config
    #[arg(long)]
    parallel: Option<bool>,

    /// Show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config file '{}'", args.config))?;

    let verbose = args.verbose || config.verbose();
    if config.log_json() {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(parallel) = args.parallel {
        config.job.parallel = parallel;
        tracing::info!("🔧 Parallel classification overridden to: {}", parallel);
    }

    config
        .validate()
        .with_context(|| format!("Invalid configuration in '{}'", args.config))?;

    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        return Ok(());
    }

    let sink = FileReportSink::create(config.output_path(), config.job_name())
        .context("Could not create report files")?;
    let pipeline = ClassifyPipeline::new(LocalStorage::default(), config, sink);
    let engine = ClassificationEngine::new(pipeline);

    let summary = engine.run().await.map_err(|e| {
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        anyhow::Error::new(e).context("Classification run failed")
    })?;

    println!("errors: {}\nsuccess: {}", summary.errors, summary.successes);
    println!(
        "Gypsy: {}  Copia: {}  unclassified: {}",
        summary.gypsy, summary.copia, summary.unclassified
    );

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    let classifier = config.classifier();
    println!("📋 Configuration Summary:");
    println!("  Job: {}", config.job_name());
    println!("  ORFs: {}", config.orf_file());
    println!("  Domain hits: {}", config.hit_file());
    println!("  Output: {}", config.output_path());
    println!(
        "  Gaps: {} after AP, {} downstream",
        classifier.gaps.after_protease, classifier.gaps.downstream
    );
    if let Some(max) = classifier.max_candidates {
        println!("  Max candidates per sequence: {}", max);
    }
    println!("  Parallel: {}", config.parallel());
    println!();
}
