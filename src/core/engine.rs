use crate::core::Pipeline;
use crate::domain::model::RunSummary;
use crate::utils::error::Result;
use std::time::Instant;

pub struct ClassificationEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ClassificationEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting classification run");
        let started = Instant::now();

        // Extract
        let phase = Instant::now();
        let records = self.pipeline.extract().await?;
        let with_hits = records.iter().filter(|r| r.has_hits()).count();
        tracing::info!(
            "Loaded {} sequences ({} with domain hits) in {:?}",
            records.len(),
            with_hits,
            phase.elapsed()
        );

        // Transform
        let phase = Instant::now();
        let batch = self.pipeline.transform(records).await?;
        tracing::info!(
            "Classified {} sequences in {:?}",
            batch.reports.len(),
            phase.elapsed()
        );

        // Load
        let summary = self.pipeline.load(batch).await?;
        tracing::info!(
            "Run {} finished in {:?}: {} Gypsy, {} Copia, {} unclassified",
            summary.job_name,
            started.elapsed(),
            summary.gypsy,
            summary.copia,
            summary.unclassified
        );

        Ok(summary)
    }
}
