use crate::adapters::storage::join_output;
use crate::core::classifier::Classifier;
use crate::core::hmm_hits::parse_hit_table;
use crate::core::orf_fasta::read_orf_records;
use crate::core::{ClassificationBatch, ConfigProvider, Pipeline, ReportSink, Storage};
use crate::domain::model::{ResultRow, RunSummary, SequenceRecord};
use crate::utils::error::Result;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Reads ORF sequences and domain hits, classifies every sequence and writes
/// evidence, results and a JSON summary.
pub struct ClassifyPipeline<S: Storage, C: ConfigProvider, R: ReportSink> {
    storage: S,
    config: C,
    sink: R,
    classifier: Classifier,
    skipped_lines: AtomicUsize,
    dropped_hits: AtomicUsize,
}

impl<S: Storage, C: ConfigProvider, R: ReportSink> ClassifyPipeline<S, C, R> {
    pub fn new(storage: S, config: C, sink: R) -> Self {
        let classifier = Classifier::new(config.classifier());
        Self {
            storage,
            config,
            sink,
            classifier,
            skipped_lines: AtomicUsize::new(0),
            dropped_hits: AtomicUsize::new(0),
        }
    }

    pub fn sink(&self) -> &R {
        &self.sink
    }

    pub fn summary_path(&self) -> String {
        join_output(
            self.config.output_path(),
            &format!("{}-summary.json", self.config.job_name()),
        )
    }

    fn log(&self, line: &str) -> Result<()> {
        tracing::debug!("{}", line);
        self.sink.record_log(line)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, R: ReportSink> Pipeline for ClassifyPipeline<S, C, R> {
    async fn extract(&self) -> Result<Vec<SequenceRecord>> {
        self.log("Get raw sequence information")?;
        let orf_data = self.storage.read_file(self.config.orf_file()).await?;
        let mut sequences = read_orf_records(&orf_data, self.config.orf_file())?;

        self.log("Parsing HMMER hits")?;
        let hit_data = self.storage.read_file(self.config.hit_file()).await?;
        let table = parse_hit_table(&hit_data);

        for diagnostic in &table.diagnostics {
            self.sink.record_log(&format!(
                "Could not parse line {}: {} ({})",
                diagnostic.line_number, diagnostic.line, diagnostic.error
            ))?;
        }
        self.skipped_lines
            .store(table.diagnostics.len(), Ordering::Relaxed);

        let mut dropped = 0;
        for parsed in table.hits {
            if let Err(orphan) = sequences.attach(parsed) {
                tracing::warn!("{} not in sequences, hit dropped", orphan.sequence_id);
                self.sink
                    .record_log(&format!("{} not in sequences", orphan.sequence_id))?;
                dropped += 1;
            }
        }
        self.dropped_hits.store(dropped, Ordering::Relaxed);

        Ok(sequences.into_records())
    }

    async fn transform(&self, records: Vec<SequenceRecord>) -> Result<ClassificationBatch> {
        self.log("Ranking hits and classifying")?;
        let settings = self.classifier.config();
        tracing::debug!(
            "Gap limits: {} after AP, {} downstream; candidate limit {:?}",
            settings.gaps.after_protease,
            settings.gaps.downstream,
            settings.max_candidates
        );

        let reports = self
            .classifier
            .classify_records(&records, self.config.parallel());

        let mut summary = RunSummary {
            job_name: self.config.job_name().to_string(),
            sequences_loaded: records.len(),
            skipped_hit_lines: self.skipped_lines.load(Ordering::Relaxed),
            dropped_hits: self.dropped_hits.load(Ordering::Relaxed),
            ..RunSummary::default()
        };

        // 依輸入順序寫入 evidence
        for report in &reports {
            self.sink.record_evidence(&report.id, &report.candidates)?;
            summary.tally(report);
        }

        Ok(ClassificationBatch { reports, summary })
    }

    async fn load(&self, batch: ClassificationBatch) -> Result<RunSummary> {
        for report in &batch.reports {
            if let Some(row) = ResultRow::from_report(report) {
                self.sink.record_result(&row)?;
            }
        }

        let summary = batch.summary;
        self.log(&format!(
            "errors: {}\nsuccess: {}",
            summary.errors, summary.successes
        ))?;
        self.sink.finish()?;

        let json = serde_json::to_string_pretty(&summary)?;
        self.storage
            .write_file(&self.summary_path(), json.as_bytes())
            .await?;

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryReportSink;
    use crate::core::classifier::ClassifierConfig;
    use crate::domain::model::Superfamily;
    use crate::utils::error::ClassifError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put(&self, path: &str, content: &str) {
            self.files
                .lock()
                .await
                .insert(path.to_string(), content.as_bytes().to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            self.get_file(path).await.ok_or_else(|| {
                ClassifError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    path.to_string(),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files
                .lock()
                .await
                .insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        parallel: bool,
    }

    impl ConfigProvider for MockConfig {
        fn orf_file(&self) -> &str {
            "orfs.fa"
        }

        fn hit_file(&self) -> &str {
            "hits.tbl"
        }

        fn output_path(&self) -> &str {
            "out"
        }

        fn job_name(&self) -> &str {
            "test-job"
        }

        fn classifier(&self) -> ClassifierConfig {
            ClassifierConfig::default()
        }

        fn parallel(&self) -> bool {
            self.parallel
        }
    }

    fn domtbl(target: &str, profile: &str, score: f64, env: (i64, i64), orf: &str) -> String {
        format!(
            "{} - 300 {} - 250 1e-20 80.0 0.0 1 1 1e-22 1e-20 {} 0.0 1 250 1 250 {} {} 0.97 {}",
            target, profile, score, env.0, env.1, orf
        )
    }

    async fn fixture() -> MockStorage {
        let storage = MockStorage::new();
        storage
            .put(
                "orfs.fa",
                ">gypsy1|orf1\tGypsy\nMKV\n>copia1|orf1\tGypsy\nMKV\n>novel1|orf1\nMKV\n>bare1|orf1\tCopia\nMKV\n",
            )
            .await;

        // gypsy1: GAG, RT, IN (no EN) -> fallback Gypsy
        // copia1: IN, RT, RH -> Copia, disagrees with prior Gypsy
        // novel1: lone RT -> unclassified
        let lines = vec![
            "# domtblout header".to_string(),
            domtbl("gypsy1|orf1", "GAG_ltr", 10.0, (1, 17), "gypsy1:0-3000"),
            domtbl("gypsy1|orf1", "RT_ltr", 8.0, (21, 34), "gypsy1:0-3000"),
            domtbl("gypsy1|orf1", "INT_ltr", 9.0, (51, 68), "gypsy1:0-3000"),
            domtbl("copia1|orf1", "INT_ltr", 4.0, (1, 30), "copia1:100-4000"),
            domtbl("copia1|orf1", "RT_ltr", 6.0, (60, 100), "copia1:100-4000"),
            domtbl("copia1|orf1", "RH_ltr", 3.0, (130, 160), "copia1:100-4000"),
            domtbl("novel1|orf1", "RT_ltr", 5.0, (1, 40), "novel1:0-900"),
            domtbl("ghost|orf9", "RT_ltr", 5.0, (1, 40), "ghost:0-900"),
            "truncated line".to_string(),
        ];
        storage.put("hits.tbl", &lines.join("\n")).await;
        storage
    }

    #[tokio::test]
    async fn test_extract_attaches_hits_and_reports_problems() {
        let storage = fixture().await;
        let pipeline = ClassifyPipeline::new(
            storage,
            MockConfig { parallel: false },
            MemoryReportSink::new(),
        );

        let records = pipeline.extract().await.unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].id, "gypsy1");
        assert_eq!(records[0].hits.len(), 3);
        assert_eq!(records[1].hits.len(), 3);
        assert_eq!(records[3].id, "bare1");
        assert!(records[3].hits.is_empty());

        let log = pipeline.sink().log_lines();
        assert!(log.iter().any(|l| l == "ghost not in sequences"));
        assert!(log.iter().any(|l| l.starts_with("Could not parse line 10")));
    }

    #[tokio::test]
    async fn test_transform_classifies_sequences_with_hits() {
        let storage = fixture().await;
        let pipeline = ClassifyPipeline::new(
            storage,
            MockConfig { parallel: false },
            MemoryReportSink::new(),
        );

        let records = pipeline.extract().await.unwrap();
        let batch = pipeline.transform(records).await.unwrap();

        assert_eq!(batch.reports.len(), 3);
        assert_eq!(batch.reports[0].decision.label, Some(Superfamily::Gypsy));
        assert_eq!(batch.reports[0].decision.score, 18.0);
        assert_eq!(batch.reports[1].decision.label, Some(Superfamily::Copia));
        assert_eq!(batch.reports[1].decision.score, 13.0);
        assert_eq!(batch.reports[2].decision.label_str(), "");

        assert_eq!(batch.summary.sequences_loaded, 4);
        assert_eq!(batch.summary.sequences_classified, 3);
        assert_eq!(batch.summary.successes, 1);
        assert_eq!(batch.summary.errors, 1);
        assert_eq!(batch.summary.no_prior, 1);
        assert_eq!(batch.summary.skipped_hit_lines, 1);
        assert_eq!(batch.summary.dropped_hits, 1);

        let evidence = pipeline.sink().evidence();
        assert!(evidence.starts_with("gypsy1: \n\tGypsy:18.0,Gypsy:8.0\n"));
        assert!(evidence.ends_with("novel1: \n"));
        assert!(!evidence.contains("bare1"));
    }

    #[tokio::test]
    async fn test_load_writes_results_and_summary() {
        let storage = fixture().await;
        let pipeline = ClassifyPipeline::new(
            storage.clone(),
            MockConfig { parallel: true },
            MemoryReportSink::new(),
        );

        let records = pipeline.extract().await.unwrap();
        let batch = pipeline.transform(records).await.unwrap();
        let summary = pipeline.load(batch).await.unwrap();

        assert_eq!(summary.copia, 1);
        assert_eq!(summary.gypsy, 1);
        assert_eq!(summary.unclassified, 1);

        let rows = pipeline.sink().results();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fields(), vec!["copia1", "Gypsy", "Copia", "13.0"]);

        let json = storage.get_file("out/test-job-summary.json").await.unwrap();
        let parsed: RunSummary = serde_json::from_slice(&json).unwrap();
        assert_eq!(parsed, summary);
    }

    #[tokio::test]
    async fn test_undecodable_line_is_skipped_and_valid_hits_survive() {
        let storage = MockStorage::new();
        storage.put("orfs.fa", ">te1|orf1\tCopia\nMKV\n").await;

        let mut table = domtbl("te1|orf1", "INT_ltr", 4.0, (1, 30), "te1:0-900").into_bytes();
        table.push(b'\n');
        let rt = domtbl("te1|orf1", "RT_ltr", 6.0, (40, 60), "te1:0-900");
        table.extend_from_slice(rt.as_bytes());
        table.push(0xE9);
        table.push(b'\n');
        let rh = domtbl("te1|orf1", "RH_ltr", 3.0, (60, 100), "te1:0-900");
        table.extend_from_slice(rh.as_bytes());
        storage
            .files
            .lock()
            .await
            .insert("hits.tbl".to_string(), table);

        let pipeline = ClassifyPipeline::new(
            storage,
            MockConfig { parallel: false },
            MemoryReportSink::new(),
        );
        let records = pipeline.extract().await.unwrap();
        assert_eq!(records[0].hits.len(), 2);

        let batch = pipeline.transform(records).await.unwrap();
        assert_eq!(batch.summary.skipped_hit_lines, 1);
        assert_eq!(batch.reports[0].decision.label, Some(Superfamily::Copia));
        assert_eq!(batch.reports[0].decision.score, 7.0);
        assert!(pipeline
            .sink()
            .log_lines()
            .iter()
            .any(|l| l.starts_with("Could not parse line 2")));
    }

    #[tokio::test]
    async fn test_missing_input_is_an_error() {
        let pipeline = ClassifyPipeline::new(
            MockStorage::new(),
            MockConfig { parallel: false },
            MemoryReportSink::new(),
        );
        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, ClassifError::IoError(_)));
    }
}
