use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Results table error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("FASTA parsing error in {path}: {message}")]
    FastaError { path: String, message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Report sink error: {message}")]
    SinkError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Input,
    Configuration,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ClassifError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClassifError::IoError(_) => ErrorCategory::Io,
            ClassifError::FastaError { .. } => ErrorCategory::Input,
            ClassifError::InvalidConfigValueError { .. }
            | ClassifError::MissingConfigError { .. }
            | ClassifError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            ClassifError::CsvError(_)
            | ClassifError::SerializationError(_)
            | ClassifError::SinkError { .. } => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Output => ErrorSeverity::Medium,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ClassifError::IoError(_) => {
                "Check that the input files exist and the output directory is writable"
            }
            ClassifError::FastaError { .. } => {
                "Make sure the ORF file is valid FASTA with one '>' header per record"
            }
            ClassifError::CsvError(_) | ClassifError::SerializationError(_) => {
                "Check free disk space and permissions on the output directory"
            }
            ClassifError::SinkError { .. } => "Re-run the job; report files may be incomplete",
            ClassifError::InvalidConfigValueError { .. }
            | ClassifError::MissingConfigError { .. }
            | ClassifError::ConfigValidationError { .. } => {
                "Review the command-line flags or the TOML configuration file"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Io => format!("Could not access a file: {}", self),
            ErrorCategory::Input => format!("Input could not be read: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Output => format!("Could not write reports: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClassifError>;
