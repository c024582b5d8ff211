use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const NAME_MIN_CHARS: usize = 2;
pub const SYSTEMS_MAX_CHARS: usize = 500;
pub const CHALLENGE_MAX_CHARS: usize = 1000;
pub const SUCCESS_DISMISS_AFTER: Duration = Duration::from_secs(5);

/// 欄位名稱 -> 錯誤訊息，沒有出現的欄位即為合法
pub type FieldErrors = BTreeMap<LeadField, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadField {
    FullName,
    Email,
    CompanyName,
    CompanySize,
    Industry,
    Systems,
    Challenge,
    ModernizationFocus,
}

impl LeadField {
    pub const ALL: [LeadField; 8] = [
        LeadField::FullName,
        LeadField::Email,
        LeadField::CompanyName,
        LeadField::CompanySize,
        LeadField::Industry,
        LeadField::Systems,
        LeadField::Challenge,
        LeadField::ModernizationFocus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadField::FullName => "full_name",
            LeadField::Email => "email",
            LeadField::CompanyName => "company_name",
            LeadField::CompanySize => "company_size",
            LeadField::Industry => "industry",
            LeadField::Systems => "systems",
            LeadField::Challenge => "challenge",
            LeadField::ModernizationFocus => "modernization_focus",
        }
    }

    /// 自由文字欄位的輸入上限（以字元計）
    pub fn max_chars(&self) -> Option<usize> {
        match self {
            LeadField::Systems => Some(SYSTEMS_MAX_CHARS),
            LeadField::Challenge => Some(CHALLENGE_MAX_CHARS),
            _ => None,
        }
    }
}

impl fmt::Display for LeadField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeadField::ALL
            .into_iter()
            .find(|field| field.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown lead field: {}", s))
    }
}

/// 表單輸入值：文字或 checkbox
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident, $kind:tt { $($variant:ident => $label:tt),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// 寬鬆比對（忽略前後空白與大小寫），只給輸入端正規化用
            pub fn from_label_loose(s: &str) -> Option<Self> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|option| option.label().eq_ignore_ascii_case(wanted))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|option| option.label() == s)
                    .ok_or_else(|| format!("Unknown {}: {}", $kind, s))
            }
        }
    };
}

labelled_enum!(
    /// 公司規模選項
    CompanySize, "company size" {
        Small => "1-50",
        Medium => "51-200",
        Large => "201-1000",
        Enterprise => "1001-5000",
        Global => "5000+",
    }
);

labelled_enum!(
    Industry, "industry" {
        FinancialServices => "Financial Services",
        Healthcare => "Healthcare",
        Manufacturing => "Manufacturing",
        Retail => "Retail",
        Government => "Government",
        Technology => "Technology",
        Other => "Other",
    }
);

/// 表單上的 Lead 狀態，選單欄位保存原始選取值（空字串 = 未選）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lead {
    pub full_name: String,
    pub email: String,
    pub company_name: String,
    pub company_size: String,
    pub industry: String,
    pub systems: String,
    pub challenge: String,
    pub modernization_focus: bool,
}

impl Lead {
    pub fn text(&self, field: LeadField) -> Option<&str> {
        match field {
            LeadField::FullName => Some(&self.full_name),
            LeadField::Email => Some(&self.email),
            LeadField::CompanyName => Some(&self.company_name),
            LeadField::CompanySize => Some(&self.company_size),
            LeadField::Industry => Some(&self.industry),
            LeadField::Systems => Some(&self.systems),
            LeadField::Challenge => Some(&self.challenge),
            LeadField::ModernizationFocus => None,
        }
    }

    pub(crate) fn text_mut(&mut self, field: LeadField) -> Option<&mut String> {
        match field {
            LeadField::FullName => Some(&mut self.full_name),
            LeadField::Email => Some(&mut self.email),
            LeadField::CompanyName => Some(&mut self.company_name),
            LeadField::CompanySize => Some(&mut self.company_size),
            LeadField::Industry => Some(&mut self.industry),
            LeadField::Systems => Some(&mut self.systems),
            LeadField::Challenge => Some(&mut self.challenge),
            LeadField::ModernizationFocus => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Lead::default()
    }
}

/// 寫入遠端資料表的一列，欄位值與表單上的 `Lead` 相同（空白文字送 `""`）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub full_name: String,
    pub email: String,
    pub company_name: String,
    pub company_size: CompanySize,
    pub industry: Industry,
    pub systems: String,
    pub challenge: String,
    pub modernization_focus: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

impl fmt::Display for SubmissionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubmissionPhase::Idle => "idle",
            SubmissionPhase::Submitting => "submitting",
            SubmissionPhase::Succeeded => "succeeded",
            SubmissionPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// 一次 submit() 的結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 本地驗證失敗，沒有呼叫遠端
    Rejected(FieldErrors),
    Succeeded,
    /// 遠端寫入失敗，欄位保留
    Failed,
    /// 已有送出中的請求，本次呼叫被忽略
    InFlight,
}
