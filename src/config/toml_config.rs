use crate::domain::model::SUCCESS_DISMISS_AFTER;
use crate::domain::ports::RemoteConfigProvider;
use crate::utils::error::{LeadError, Result};
use crate::utils::validation::{
    validate_identifier, validate_non_empty_string, validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

const DEFAULT_TABLE: &str = "leads";
const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

static ENV_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env placeholder pattern compiles"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub remote: RemoteConfig,
    pub form: Option<FormConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: String,
    pub table: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormConfig {
    pub dismiss_after_seconds: Option<u64>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LeadError::Io)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| LeadError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 從環境變數建立配置（SUPABASE_URL / SUPABASE_ANON_KEY / LEADS_TABLE）
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("SUPABASE_URL").map_err(|_| LeadError::MissingConfigError {
            field: "SUPABASE_URL".to_string(),
        })?;
        let api_key =
            std::env::var("SUPABASE_ANON_KEY").map_err(|_| LeadError::MissingConfigError {
                field: "SUPABASE_ANON_KEY".to_string(),
            })?;

        Ok(Self {
            remote: RemoteConfig {
                base_url,
                api_key,
                table: std::env::var("LEADS_TABLE").ok(),
                timeout_seconds: None,
            },
            form: None,
        })
    }

    /// 替換環境變數 (例如 ${SUPABASE_ANON_KEY})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn dismiss_after(&self) -> Duration {
        self.form
            .as_ref()
            .and_then(|form| form.dismiss_after_seconds)
            .map(Duration::from_secs)
            .unwrap_or(SUCCESS_DISMISS_AFTER)
    }
}

impl RemoteConfigProvider for TomlConfig {
    fn base_url(&self) -> &str {
        &self.remote.base_url
    }

    fn api_key(&self) -> &str {
        &self.remote.api_key
    }

    fn table(&self) -> &str {
        self.remote.table.as_deref().unwrap_or(DEFAULT_TABLE)
    }

    fn timeout_seconds(&self) -> u64 {
        self.remote.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_url("remote.base_url", &self.remote.base_url)?;
        validate_non_empty_string("remote.api_key", &self.remote.api_key)?;

        // 未替換的 placeholder 代表環境變數沒有設定
        if ENV_VAR_RE.is_match(&self.remote.api_key) {
            return Err(LeadError::MissingConfigError {
                field: self.remote.api_key.clone(),
            });
        }

        validate_identifier("remote.table", self.table())?;
        validate_range("remote.timeout_seconds", self.timeout_seconds(), 1, 120)?;

        if let Some(seconds) = self.form.as_ref().and_then(|f| f.dismiss_after_seconds) {
            validate_range("form.dismiss_after_seconds", seconds, 1, 60)?;
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}
