use crate::config::{default_job_name, validate_classifier};
use crate::core::classifier::ClassifierConfig;
use crate::core::ConfigProvider;
use crate::utils::error::{ClassifError, Result};
use crate::utils::validation::{validate_job_name, validate_path, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub job: JobConfig,
    pub input: InputConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: Option<String>,
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default)]
    pub parallel: bool,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            name: None,
            output_path: default_output_path(),
            parallel: false,
        }
    }
}

fn default_output_path() -> String {
    ".".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub orfs: String,
    pub hits: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub json: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ClassifError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，未指定作業名稱時以時間戳產生
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        let mut config: TomlConfig =
            toml::from_str(&processed_content).map_err(|e| ClassifError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;

        if config.job.name.is_none() {
            config.job.name = Some(default_job_name());
        }
        Ok(config)
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let re = PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn verbose(&self) -> bool {
        self.logging.as_ref().map(|l| l.verbose).unwrap_or(false)
    }

    pub fn log_json(&self) -> bool {
        self.logging.as_ref().map(|l| l.json).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn orf_file(&self) -> &str {
        &self.input.orfs
    }

    fn hit_file(&self) -> &str {
        &self.input.hits
    }

    fn output_path(&self) -> &str {
        &self.job.output_path
    }

    fn job_name(&self) -> &str {
        self.job.name.as_deref().unwrap_or_default()
    }

    fn classifier(&self) -> ClassifierConfig {
        self.classifier
    }

    fn parallel(&self) -> bool {
        self.job.parallel
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input.orfs", &self.input.orfs)?;
        validate_path("input.hits", &self.input.hits)?;
        validate_path("job.output_path", &self.job.output_path)?;
        validate_job_name("job.name", self.job_name())?;
        validate_classifier("classifier", &self.classifier)
    }
}
