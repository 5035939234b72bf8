// Adapters layer: concrete implementations for the ports (storage, report sinks).

pub mod report_sink;
pub mod storage;

pub use report_sink::{FileReportSink, MemoryReportSink, ReportPaths};
pub use storage::LocalStorage;
