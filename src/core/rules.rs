use crate::domain::model::{
    CompanySize, FieldErrors, Industry, Lead, LeadField, LeadRecord, CHALLENGE_MAX_CHARS,
    NAME_MIN_CHARS, SYSTEMS_MAX_CHARS,
};
use crate::utils::error::LeadError;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// 檢查整筆 Lead，回傳所有不合法欄位的錯誤訊息
pub fn validate_lead(lead: &Lead) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if let Some(message) = check_min_chars(&lead.full_name, NAME_MIN_CHARS, "Full name") {
        errors.insert(LeadField::FullName, message);
    }

    if !is_valid_email(&lead.email) {
        errors.insert(
            LeadField::Email,
            "Please enter a valid email address".to_string(),
        );
    }

    if let Some(message) = check_min_chars(&lead.company_name, NAME_MIN_CHARS, "Company name") {
        errors.insert(LeadField::CompanyName, message);
    }

    if let Some(message) = check_selection::<CompanySize>(
        &lead.company_size,
        "Please select a company size",
        "company size",
    ) {
        errors.insert(LeadField::CompanySize, message);
    }

    if let Some(message) =
        check_selection::<Industry>(&lead.industry, "Please select an industry", "industry")
    {
        errors.insert(LeadField::Industry, message);
    }

    // 只有繞過 update_field 建立的 Lead（例如從檔案載入）才會超長
    for field in [LeadField::Systems, LeadField::Challenge] {
        let value = lead.text(field).unwrap_or_default();
        if let Some(message) = free_text_error(field, value) {
            errors.insert(field, message);
        }
    }

    errors
}

/// 不做 trim，前後有空白即不合法
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// 自由文字欄位超過上限時的錯誤訊息，其他欄位一律回傳 None
pub fn free_text_error(field: LeadField, value: &str) -> Option<String> {
    match field {
        LeadField::Systems => check_max_chars(value, SYSTEMS_MAX_CHARS, "Current systems"),
        LeadField::Challenge => check_max_chars(value, CHALLENGE_MAX_CHARS, "Primary challenge"),
        _ => None,
    }
}

fn check_min_chars(value: &str, min: usize, label: &str) -> Option<String> {
    if value.trim().chars().count() < min {
        Some(format!("{} must be at least {} characters", label, min))
    } else {
        None
    }
}

fn check_max_chars(value: &str, max: usize, label: &str) -> Option<String> {
    if value.chars().count() > max {
        Some(format!("{} must be at most {} characters", label, max))
    } else {
        None
    }
}

fn check_selection<T: FromStr>(value: &str, missing: &str, kind: &str) -> Option<String> {
    if value.trim().is_empty() {
        Some(missing.to_string())
    } else if value.parse::<T>().is_err() {
        Some(format!("Please select a valid {}", kind))
    } else {
        None
    }
}

/// 依 maxlength 規則截斷輸入（以字元計，不切斷多位元組字元）
pub fn truncate_chars(value: String, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((byte_idx, _)) => value[..byte_idx].to_string(),
        None => value,
    }
}

/// 驗證並轉成寫入用的資料列，失敗時回傳欄位錯誤
///
/// 文字欄位原樣寫入，空白的選填欄位送 `""`
pub fn build_record(lead: &Lead) -> Result<LeadRecord, FieldErrors> {
    let errors = validate_lead(lead);
    let company_size = lead.company_size.parse::<CompanySize>().ok();
    let industry = lead.industry.parse::<Industry>().ok();

    // validate_lead 使用相同的解析，選項無法解析時 errors 必定非空
    let (Some(company_size), Some(industry)) = (company_size, industry) else {
        return Err(errors);
    };
    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(LeadRecord {
        full_name: lead.full_name.clone(),
        email: lead.email.clone(),
        company_name: lead.company_name.clone(),
        company_size,
        industry,
        systems: lead.systems.clone(),
        challenge: lead.challenge.clone(),
        modernization_focus: lead.modernization_focus,
    })
}

impl TryFrom<&Lead> for LeadRecord {
    type Error = LeadError;

    fn try_from(lead: &Lead) -> Result<Self, Self::Error> {
        build_record(lead).map_err(|errors| LeadError::Validation { errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_lead() -> Lead {
        Lead {
            full_name: "Jane Doe".to_string(),
            email: "jane@company.com".to_string(),
            company_name: "Acme Corp".to_string(),
            company_size: "201-1000".to_string(),
            industry: "Manufacturing".to_string(),
            ..Lead::default()
        }
    }

    #[test]
    fn test_valid_lead_has_no_errors() {
        assert!(validate_lead(&valid_lead()).is_empty());
    }

    #[test]
    fn test_full_name_minimum_length() {
        for name in ["", "J", "  J  "] {
            let lead = Lead {
                full_name: name.to_string(),
                ..valid_lead()
            };
            let errors = validate_lead(&lead);
            assert_eq!(
                errors.get(&LeadField::FullName).map(String::as_str),
                Some("Full name must be at least 2 characters")
            );
            assert_eq!(errors.len(), 1);
        }
    }

    #[test]
    fn test_email_shape() {
        assert!(!is_valid_email("not-an-email"));
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("jane@company"));
        assert!(!is_valid_email("jane doe@company.com"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email(" jane@company.com"));

        let lead = Lead {
            email: "not-an-email".to_string(),
            ..valid_lead()
        };
        assert!(validate_lead(&lead).contains_key(&LeadField::Email));
    }

    #[test]
    fn test_missing_selections_report_exactly_two_keys() {
        let lead = Lead {
            company_size: String::new(),
            industry: String::new(),
            ..valid_lead()
        };

        let errors = validate_lead(&lead);
        let keys: Vec<LeadField> = errors.keys().copied().collect();
        assert_eq!(keys, vec![LeadField::CompanySize, LeadField::Industry]);
        assert_eq!(errors[&LeadField::CompanySize], "Please select a company size");
        assert_eq!(errors[&LeadField::Industry], "Please select an industry");
    }

    #[test]
    fn test_unknown_selection_is_rejected() {
        let lead = Lead {
            company_size: "10 people".to_string(),
            ..valid_lead()
        };
        assert_eq!(
            validate_lead(&lead)[&LeadField::CompanySize],
            "Please select a valid company size"
        );

        // 選項必須是完整的標籤，不接受大小寫不同的寫法
        let lead = Lead {
            industry: "manufacturing".to_string(),
            ..valid_lead()
        };
        assert_eq!(
            validate_lead(&lead)[&LeadField::Industry],
            "Please select a valid industry"
        );
    }

    #[test]
    fn test_overlong_free_text_is_rejected() {
        let lead = Lead {
            challenge: "x".repeat(CHALLENGE_MAX_CHARS + 1),
            systems: "y".repeat(SYSTEMS_MAX_CHARS),
            ..valid_lead()
        };
        let errors = validate_lead(&lead);
        assert!(errors.contains_key(&LeadField::Challenge));
        assert!(!errors.contains_key(&LeadField::Systems));
    }

    #[test]
    fn test_free_text_error_only_for_capped_fields() {
        assert_eq!(
            free_text_error(LeadField::Systems, &"s".repeat(SYSTEMS_MAX_CHARS + 1)).as_deref(),
            Some("Current systems must be at most 500 characters")
        );
        assert_eq!(free_text_error(LeadField::Challenge, "short"), None);
        assert_eq!(free_text_error(LeadField::FullName, &"n".repeat(5000)), None);
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo".to_string(), 2), "hé");
        assert_eq!(truncate_chars("abc".to_string(), 10), "abc");
        assert_eq!(truncate_chars("系統遷移".to_string(), 3), "系統遷");
    }

    #[test]
    fn test_record_from_lead() {
        let lead = Lead {
            full_name: "  Jane Doe ".to_string(),
            systems: "  ".to_string(),
            challenge: "Mainframe batch".to_string(),
            modernization_focus: true,
            ..valid_lead()
        };

        let record = LeadRecord::try_from(&lead).unwrap();
        assert_eq!(record.full_name, "  Jane Doe ");
        assert_eq!(record.company_size, CompanySize::Large);
        assert_eq!(record.industry, Industry::Manufacturing);
        assert_eq!(record.systems, "  ");
        assert_eq!(record.challenge, "Mainframe batch");
        assert!(record.modernization_focus);

        let invalid = Lead::default();
        assert!(matches!(
            LeadRecord::try_from(&invalid),
            Err(LeadError::Validation { errors }) if errors.len() == 5
        ));
    }
}
