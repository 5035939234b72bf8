use crate::core::selector::format_evidence;
use crate::core::ReportSink;
use crate::domain::model::{Candidate, ResultRow};
use crate::utils::error::{ClassifError, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

pub const RESULTS_HEADER: [&str; 3] = ["Sequence", "Old classification", "New classification"];

/// Evidence entry for one sequence: an id line, then the ranked candidates
/// on a tab-indented line when there are any.
pub fn evidence_block(sequence_id: &str, candidates: &[Candidate]) -> String {
    let mut block = format!("{}: \n", sequence_id);
    if !candidates.is_empty() {
        block.push('\t');
        block.push_str(&format_evidence(candidates));
        block.push('\n');
    }
    block
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| ClassifError::SinkError {
        message: "report writer lock poisoned".to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub evidence: PathBuf,
    pub results: PathBuf,
    pub log: PathBuf,
}

impl ReportPaths {
    pub fn for_job(output_dir: impl AsRef<Path>, job_name: &str) -> Self {
        let dir = output_dir.as_ref();
        Self {
            evidence: dir.join(format!("{}-evidence.txt", job_name)),
            results: dir.join(format!("{}-results.txt", job_name)),
            log: dir.join(format!("{}-log.txt", job_name)),
        }
    }
}

/// Writes `<job>-evidence.txt`, `<job>-results.txt` and `<job>-log.txt`.
pub struct FileReportSink {
    paths: ReportPaths,
    evidence: Mutex<BufWriter<File>>,
    results: Mutex<csv::Writer<File>>,
    log: Mutex<BufWriter<File>>,
}

impl FileReportSink {
    pub fn create(output_dir: impl AsRef<Path>, job_name: &str) -> Result<Self> {
        fs::create_dir_all(output_dir.as_ref())?;
        let paths = ReportPaths::for_job(output_dir, job_name);

        let mut results = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_path(&paths.results)?;
        results.write_record(RESULTS_HEADER)?;

        let evidence = BufWriter::new(File::create(&paths.evidence)?);
        let log = BufWriter::new(File::create(&paths.log)?);

        tracing::debug!("Writing reports under prefix {}", job_name);
        Ok(Self {
            paths,
            evidence: Mutex::new(evidence),
            results: Mutex::new(results),
            log: Mutex::new(log),
        })
    }

    pub fn paths(&self) -> &ReportPaths {
        &self.paths
    }
}

impl ReportSink for FileReportSink {
    fn record_evidence(&self, sequence_id: &str, candidates: &[Candidate]) -> Result<()> {
        let mut writer = lock(&self.evidence)?;
        writer.write_all(evidence_block(sequence_id, candidates).as_bytes())?;
        Ok(())
    }

    fn record_result(&self, row: &ResultRow) -> Result<()> {
        lock(&self.results)?.write_record(row.fields())?;
        Ok(())
    }

    fn record_log(&self, line: &str) -> Result<()> {
        let mut writer = lock(&self.log)?;
        writeln!(writer, "{}", line)?;
        Ok(())
    }

    fn finish(&self) -> Result<()> {
        lock(&self.evidence)?.flush()?;
        lock(&self.results)?.flush()?;
        lock(&self.log)?.flush()?;
        Ok(())
    }
}

/// Keeps reports in memory; used by tests and when embedding the classifier.
#[derive(Debug, Default)]
pub struct MemoryReportSink {
    evidence: Mutex<String>,
    results: Mutex<Vec<ResultRow>>,
    log: Mutex<Vec<String>>,
}

impl MemoryReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evidence(&self) -> String {
        self.evidence.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn results(&self) -> Vec<ResultRow> {
        self.results.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn log_lines(&self) -> Vec<String> {
        self.log.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl ReportSink for MemoryReportSink {
    fn record_evidence(&self, sequence_id: &str, candidates: &[Candidate]) -> Result<()> {
        lock(&self.evidence)?.push_str(&evidence_block(sequence_id, candidates));
        Ok(())
    }

    fn record_result(&self, row: &ResultRow) -> Result<()> {
        lock(&self.results)?.push(row.clone());
        Ok(())
    }

    fn record_log(&self, line: &str) -> Result<()> {
        lock(&self.log)?.push(line.to_string());
        Ok(())
    }
}
