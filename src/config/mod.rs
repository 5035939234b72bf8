pub mod toml_config;

use crate::core::classifier::ClassifierConfig;
use crate::utils::error::Result;
use crate::utils::validation::{validate_positive_number, validate_range};
#[cfg(feature = "cli")]
use crate::{
    core::{transitions::GapThresholds, ConfigProvider},
    utils::validation::{validate_job_name, validate_path, validate_required_field, Validate},
};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub const MAX_GAP_LIMIT: i64 = 10_000_000;

pub fn default_job_name() -> String {
    format!("ltr-classif-{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
}

/// Shared checks for classifier settings from any config source.
pub fn validate_classifier(prefix: &str, config: &ClassifierConfig) -> Result<()> {
    validate_range(
        &format!("{}.after_protease", prefix),
        config.gaps.after_protease,
        0,
        MAX_GAP_LIMIT,
    )?;
    validate_range(
        &format!("{}.downstream", prefix),
        config.gaps.downstream,
        0,
        MAX_GAP_LIMIT,
    )?;
    if let Some(max) = config.max_candidates {
        validate_positive_number(&format!("{}.max_candidates", prefix), max, 1)?;
    }
    Ok(())
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "ltr-classif")]
#[command(about = "Classify LTR retrotransposons as Gypsy or Copia from protein domain hits")]
pub struct CliConfig {
    /// Input FASTA of transposable elements; names the default ORF file
    pub fasta: String,

    /// Translated ORFs (default: <fasta>.orfs)
    #[arg(long)]
    pub orfs: Option<String>,

    /// HMMER --domtblout table (default: <job>-hmmer-output.txt)
    #[arg(long)]
    pub hits: Option<String>,

    /// Prefix for this run's output files (default: ltr-classif-<timestamp>)
    #[arg(short = 'n', long)]
    pub job_name: Option<String>,

    #[arg(long, default_value = ".")]
    pub output_path: String,

    /// Largest gap allowed after a protease (AP) domain
    #[arg(long, default_value = "800")]
    pub ap_max_gap: i64,

    /// Largest gap allowed after RT, RH and IN domains
    #[arg(long, default_value = "2000")]
    pub downstream_max_gap: i64,

    /// Stop enumerating a sequence after this many candidates
    #[arg(long)]
    pub max_candidates: Option<usize>,

    /// Classify sequences on all cores
    #[arg(long)]
    pub parallel: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 補上預設的作業名稱與輸入檔路徑
    pub fn with_defaults(mut self) -> Self {
        let job_name = self.job_name.take().unwrap_or_else(default_job_name);
        if self.orfs.is_none() {
            self.orfs = Some(format!("{}.orfs", self.fasta));
        }
        if self.hits.is_none() {
            self.hits = Some(format!("{}-hmmer-output.txt", job_name));
        }
        self.job_name = Some(job_name);
        self
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn orf_file(&self) -> &str {
        self.orfs.as_deref().unwrap_or_default()
    }

    fn hit_file(&self) -> &str {
        self.hits.as_deref().unwrap_or_default()
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn job_name(&self) -> &str {
        self.job_name.as_deref().unwrap_or_default()
    }

    fn classifier(&self) -> ClassifierConfig {
        ClassifierConfig {
            gaps: GapThresholds {
                after_protease: self.ap_max_gap,
                downstream: self.downstream_max_gap,
            },
            max_candidates: self.max_candidates,
        }
    }

    fn parallel(&self) -> bool {
        self.parallel
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("fasta", &self.fasta)?;
        validate_path("orfs", validate_required_field("orfs", &self.orfs)?)?;
        validate_path("hits", validate_required_field("hits", &self.hits)?)?;
        validate_job_name("job_name", validate_required_field("job_name", &self.job_name)?)?;
        validate_path("output_path", &self.output_path)?;
        validate_classifier("classifier", &self.classifier())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_fasta_and_job_name() {
        let config =
            CliConfig::parse_from(["ltr-classif", "pier.fa", "-n", "run7"]).with_defaults();
        assert_eq!(config.orf_file(), "pier.fa.orfs");
        assert_eq!(config.hit_file(), "run7-hmmer-output.txt");
        assert_eq!(config.job_name(), "run7");
        assert_eq!(config.classifier(), ClassifierConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generated_job_name() {
        let config = CliConfig::parse_from(["ltr-classif", "pier.fa"]).with_defaults();
        assert!(config.job_name().starts_with("ltr-classif-"));
    }

    #[test]
    fn test_overrides_and_validation() {
        let config = CliConfig::parse_from([
            "ltr-classif",
            "pier.fa",
            "--hits",
            "domains.tbl",
            "--ap-max-gap",
            "1200",
            "--max-candidates",
            "0",
        ])
        .with_defaults();
        assert_eq!(config.hit_file(), "domains.tbl");
        assert_eq!(config.classifier().gaps.after_protease, 1200);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_without_defaults_is_invalid() {
        let config = CliConfig::parse_from(["ltr-classif", "pier.fa"]);
        assert!(config.validate().is_err());
    }
}
