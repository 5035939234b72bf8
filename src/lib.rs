pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{FileReportSink, LocalStorage, MemoryReportSink};
pub use config::toml_config::TomlConfig;
pub use core::{
    classifier::{classify, Classification, Classifier, ClassifierConfig},
    engine::ClassificationEngine,
    pipeline::ClassifyPipeline,
};
pub use domain::model::{
    Candidate, Decision, DomainCode, DomainHit, RunSummary, SequenceRecord, SequenceReport,
    Superfamily,
};
pub use utils::error::{ClassifError, Result};
