use clap::Parser;
use ltr_classif::adapters::ReportPaths;
use ltr_classif::core::ConfigProvider;
use ltr_classif::utils::error::{ClassifError, ErrorSeverity};
use ltr_classif::utils::{logger, validation::Validate};
use ltr_classif::{
    ClassificationEngine, ClassifyPipeline, CliConfig, FileReportSink, LocalStorage, RunSummary,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse().with_defaults();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting ltr-classif job {}", config.job_name());
    tracing::debug!("CLI config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        fail(&e);
    }

    let sink = match FileReportSink::create(config.output_path(), config.job_name()) {
        Ok(sink) => sink,
        Err(e) => fail(&e),
    };
    let paths = sink.paths().clone();

    let pipeline = ClassifyPipeline::new(LocalStorage::default(), config, sink);
    let engine = ClassificationEngine::new(pipeline);

    match engine.run().await {
        Ok(summary) => print_summary(&summary, &paths),
        Err(e) => fail(&e),
    }

    Ok(())
}

fn print_summary(summary: &RunSummary, paths: &ReportPaths) {
    println!("errors: {}\nsuccess: {}", summary.errors, summary.successes);
    println!(
        "Gypsy: {}  Copia: {}  unclassified: {}",
        summary.gypsy, summary.copia, summary.unclassified
    );
    if summary.truncated > 0 {
        println!(
            "⚠️  {} sequences hit the candidate limit",
            summary.truncated
        );
    }
    println!("📁 Results: {}", paths.results.display());
    println!("📁 Evidence: {}", paths.evidence.display());
}

fn fail(e: &ClassifError) -> ! {
    tracing::error!(
        "❌ Classification failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
