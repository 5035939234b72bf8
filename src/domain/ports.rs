use crate::core::classifier::ClassifierConfig;
use crate::domain::model::{Candidate, ResultRow, RunSummary, SequenceReport, SequenceRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn orf_file(&self) -> &str;
    fn hit_file(&self) -> &str;
    fn output_path(&self) -> &str;
    fn job_name(&self) -> &str;
    fn classifier(&self) -> ClassifierConfig;
    fn parallel(&self) -> bool;
}

/// Destination for the audit trail of a run: per-sequence evidence, the
/// results table and free-form log lines.
pub trait ReportSink: Send + Sync {
    fn record_evidence(&self, sequence_id: &str, candidates: &[Candidate]) -> Result<()>;
    fn record_result(&self, row: &ResultRow) -> Result<()>;
    fn record_log(&self, line: &str) -> Result<()>;

    fn finish(&self) -> Result<()> {
        Ok(())
    }
}

/// Output of the transform stage.
#[derive(Debug, Clone, Default)]
pub struct ClassificationBatch {
    pub reports: Vec<SequenceReport>,
    pub summary: RunSummary,
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<SequenceRecord>>;
    async fn transform(&self, records: Vec<SequenceRecord>) -> Result<ClassificationBatch>;
    async fn load(&self, batch: ClassificationBatch) -> Result<RunSummary>;
}
