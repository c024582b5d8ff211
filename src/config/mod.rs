pub mod toml_config;

use crate::core::rules::free_text_error;
use crate::domain::model::{FieldErrors, FieldValue, Lead, LeadField};
use crate::utils::error::{LeadError, Result};
use std::path::Path;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "lead-capture")]
#[command(about = "Validate and submit a lead to the hosted leads table")]
pub struct CliConfig {
    /// Path to TOML configuration file (falls back to SUPABASE_* environment variables)
    #[arg(short, long)]
    pub config: Option<String>,

    /// TOML file with the lead fields; flags below override its values
    #[arg(long)]
    pub lead_file: Option<String>,

    #[arg(long)]
    pub full_name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub company_name: Option<String>,

    #[arg(long)]
    pub company_size: Option<String>,

    #[arg(long)]
    pub industry: Option<String>,

    #[arg(long)]
    pub systems: Option<String>,

    #[arg(long)]
    pub challenge: Option<String>,

    #[arg(long)]
    pub modernization_focus: bool,

    /// Validate and store in memory instead of calling the remote table
    #[arg(long)]
    pub dry_run: bool,

    /// Print the valid company sizes and industries, then exit
    #[arg(long)]
    pub list_options: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 命令列上給的欄位，依表單順序
    pub fn field_overrides(&self) -> Vec<(LeadField, FieldValue)> {
        let text_fields = [
            (LeadField::FullName, &self.full_name),
            (LeadField::Email, &self.email),
            (LeadField::CompanyName, &self.company_name),
            (LeadField::CompanySize, &self.company_size),
            (LeadField::Industry, &self.industry),
            (LeadField::Systems, &self.systems),
            (LeadField::Challenge, &self.challenge),
        ];

        let mut overrides: Vec<(LeadField, FieldValue)> = text_fields
            .into_iter()
            .filter_map(|(field, value)| {
                value
                    .as_ref()
                    .map(|v| (field, FieldValue::Text(v.clone())))
            })
            .collect();

        if self.modernization_focus {
            overrides.push((LeadField::ModernizationFocus, FieldValue::Flag(true)));
        }
        overrides
    }
}

/// 從 TOML 檔讀取 Lead 欄位，缺少的欄位視為空白
///
/// 超過長度上限的自由文字會以 `LeadError::Validation` 回報，不會被截斷
pub fn load_lead_file<P: AsRef<Path>>(path: P) -> Result<Lead> {
    let content = std::fs::read_to_string(&path)?;
    let lead: Lead = toml::from_str(&content).map_err(|e| LeadError::ConfigValidationError {
        field: path.as_ref().display().to_string(),
        message: format!("Lead file parsing error: {}", e),
    })?;
    check_free_text_lengths(&lead_field_values(&lead))?;
    Ok(lead)
}

/// update_field 會截斷超長文字，重播前先檢查長度
pub fn check_free_text_lengths(values: &[(LeadField, FieldValue)]) -> Result<()> {
    let errors: FieldErrors = values
        .iter()
        .filter_map(|(field, value)| match value {
            FieldValue::Text(text) => {
                free_text_error(*field, text).map(|message| (*field, message))
            }
            FieldValue::Flag(_) => None,
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(LeadError::Validation { errors })
    }
}

/// 把 Lead 拆成 update_field 用的欄位值
pub fn lead_field_values(lead: &Lead) -> Vec<(LeadField, FieldValue)> {
    LeadField::ALL
        .into_iter()
        .map(|field| match lead.text(field) {
            Some(text) => (field, FieldValue::Text(text.to_string())),
            None => (field, FieldValue::Flag(lead.modernization_focus)),
        })
        .collect()
}
