pub mod classifier;
pub mod engine;
pub mod hmm_hits;
pub mod orf_fasta;
pub mod pipeline;
pub mod selector;
pub mod state_machine;
pub mod transitions;

pub use crate::domain::model::{Candidate, Decision, DomainHit, SequenceRecord, SequenceReport};
pub use crate::domain::ports::{ClassificationBatch, ConfigProvider, Pipeline, ReportSink, Storage};
pub use crate::utils::error::Result;
