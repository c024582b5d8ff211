use crate::core::rules::{build_record, truncate_chars, validate_lead};
use crate::domain::model::{
    CompanySize, FieldErrors, FieldValue, Industry, Lead, LeadField, SubmissionPhase,
    SubmitOutcome, SUCCESS_DISMISS_AFTER,
};
use crate::domain::ports::{Clock, LeadRepository};
use crate::utils::error::{LeadError, Result};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

pub const SUCCESS_MESSAGE: &str = "Thank you! We'll be in touch within 24 hours.";
pub const FAILURE_MESSAGE: &str =
    "Something went wrong while sending your request. Please try again.";

#[derive(Debug)]
struct FormState {
    fields: Lead,
    field_errors: FieldErrors,
    phase: SubmissionPhase,
    dismiss_at: Option<Instant>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            fields: Lead::default(),
            field_errors: FieldErrors::new(),
            phase: SubmissionPhase::Idle,
            dismiss_at: None,
        }
    }
}

/// 選單值換成選項的標準標籤；對不上任何選項時原樣保留，交給驗證回報
fn canonical_label<T: ToString>(text: String, lookup: impl Fn(&str) -> Option<T>) -> String {
    match lookup(&text) {
        Some(option) => option.to_string(),
        None => text,
    }
}

/// 送出中被 drop 時把階段改成 failed，避免永遠卡在 submitting
struct InFlightGuard<'a> {
    state: &'a Mutex<FormState>,
    armed: bool,
}

impl<'a> InFlightGuard<'a> {
    fn arm(state: &'a Mutex<FormState>) -> Self {
        Self { state, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.phase == SubmissionPhase::Submitting {
            tracing::warn!("Submission dropped before completion, phase: submitting -> failed");
            state.phase = SubmissionPhase::Failed;
        }
    }
}

/// Lead 表單控制器
///
/// 持有欄位、欄位錯誤與送出階段。狀態放在 `Mutex` 內，
/// 同一個控制器可以被多個 `submit()` future 共用；鎖不會跨越 `.await`。
pub struct LeadFormController<R: LeadRepository, C: Clock> {
    repository: R,
    clock: C,
    dismiss_after: Duration,
    state: Mutex<FormState>,
}

impl<R: LeadRepository, C: Clock> LeadFormController<R, C> {
    pub fn new(repository: R, clock: C) -> Self {
        Self {
            repository,
            clock,
            dismiss_after: SUCCESS_DISMISS_AFTER,
            state: Mutex::new(FormState::default()),
        }
    }

    pub fn with_dismiss_after(mut self, dismiss_after: Duration) -> Self {
        self.dismiss_after = dismiss_after;
        self
    }

    fn state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 成功提示到期後回到 idle
    fn expire_dismissal(&self, state: &mut FormState) {
        if state.phase != SubmissionPhase::Succeeded {
            return;
        }
        if let Some(deadline) = state.dismiss_at {
            if self.clock.now() >= deadline {
                tracing::debug!("Success notice dismissed, phase: succeeded -> idle");
                state.phase = SubmissionPhase::Idle;
                state.dismiss_at = None;
            }
        }
    }

    /// 覆寫單一欄位；若該欄位有錯誤則清除（不重新驗證）
    pub fn update_field(&self, field: LeadField, value: impl Into<FieldValue>) -> Result<()> {
        let value = value.into();
        let mut state = self.state();

        match (field, value) {
            (LeadField::ModernizationFocus, FieldValue::Flag(flag)) => {
                state.fields.modernization_focus = flag;
            }
            (LeadField::ModernizationFocus, FieldValue::Text(_)) => {
                return Err(LeadError::FieldType {
                    field,
                    expected: "boolean",
                });
            }
            (_, FieldValue::Flag(_)) => {
                return Err(LeadError::FieldType {
                    field,
                    expected: "text",
                });
            }
            (_, FieldValue::Text(text)) => {
                let text = match field {
                    LeadField::CompanySize => canonical_label(text, CompanySize::from_label_loose),
                    LeadField::Industry => canonical_label(text, Industry::from_label_loose),
                    _ => match field.max_chars() {
                        Some(max) => truncate_chars(text, max),
                        None => text,
                    },
                };
                if let Some(slot) = state.fields.text_mut(field) {
                    *slot = text;
                }
            }
        }

        if state.field_errors.remove(&field).is_some() {
            tracing::debug!("Cleared validation error for {}", field);
        }
        Ok(())
    }

    pub fn validate(&self) -> FieldErrors {
        validate_lead(&self.state().fields)
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let record = {
            let mut state = self.state();
            self.expire_dismissal(&mut state);

            if state.phase == SubmissionPhase::Submitting {
                tracing::debug!("Submission already in flight, ignoring submit");
                return SubmitOutcome::InFlight;
            }

            match build_record(&state.fields) {
                Ok(record) => {
                    tracing::debug!("Phase: {} -> submitting", state.phase);
                    state.field_errors.clear();
                    state.phase = SubmissionPhase::Submitting;
                    state.dismiss_at = None;
                    record
                }
                Err(errors) => {
                    tracing::info!(
                        "Lead rejected by validation: {}",
                        errors
                            .keys()
                            .map(|field| field.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    );
                    state.field_errors = errors.clone();
                    state.phase = SubmissionPhase::Idle;
                    state.dismiss_at = None;
                    return SubmitOutcome::Rejected(errors);
                }
            }
        };

        let guard = InFlightGuard::arm(&self.state);
        let result = self.repository.insert(&record).await;
        guard.disarm();

        let mut state = self.state();
        match result {
            Ok(()) => {
                tracing::info!("✅ Lead submitted for {}", record.company_name);
                state.phase = SubmissionPhase::Succeeded;
                state.fields = Lead::default();
                state.dismiss_at = Some(self.clock.now() + self.dismiss_after);
                SubmitOutcome::Succeeded
            }
            Err(e) => {
                tracing::warn!(
                    "❌ Lead submission failed: {} (Category: {:?})",
                    e,
                    e.category()
                );
                state.phase = SubmissionPhase::Failed;
                SubmitOutcome::Failed
            }
        }
    }

    pub fn phase(&self) -> SubmissionPhase {
        let mut state = self.state();
        self.expire_dismissal(&mut state);
        state.phase
    }

    /// 套用到期的計時器並回傳目前階段，給宿主的事件迴圈呼叫
    pub fn tick(&self) -> SubmissionPhase {
        self.phase()
    }

    pub fn dismiss_deadline(&self) -> Option<Instant> {
        let mut state = self.state();
        self.expire_dismissal(&mut state);
        state.dismiss_at
    }

    pub fn is_submitting(&self) -> bool {
        self.phase() == SubmissionPhase::Submitting
    }

    pub fn fields(&self) -> Lead {
        self.state().fields.clone()
    }

    pub fn field_errors(&self) -> FieldErrors {
        self.state().field_errors.clone()
    }

    pub fn field_error(&self, field: LeadField) -> Option<String> {
        self.state().field_errors.get(&field).cloned()
    }

    pub fn status_message(&self) -> Option<&'static str> {
        match self.phase() {
            SubmissionPhase::Succeeded => Some(SUCCESS_MESSAGE),
            SubmissionPhase::Failed => Some(FAILURE_MESSAGE),
            SubmissionPhase::Idle | SubmissionPhase::Submitting => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::ManualClock;
    use crate::adapters::memory::InMemoryLeadStore;
    use crate::domain::model::{CHALLENGE_MAX_CHARS, SYSTEMS_MAX_CHARS};
    use std::sync::Arc;

    fn controller() -> (
        LeadFormController<Arc<InMemoryLeadStore>, Arc<ManualClock>>,
        Arc<InMemoryLeadStore>,
        Arc<ManualClock>,
    ) {
        let store = Arc::new(InMemoryLeadStore::new());
        let clock = Arc::new(ManualClock::new());
        (
            LeadFormController::new(store.clone(), clock.clone()),
            store,
            clock,
        )
    }

    fn fill_valid(form: &LeadFormController<Arc<InMemoryLeadStore>, Arc<ManualClock>>) {
        form.update_field(LeadField::FullName, "Jane Doe").unwrap();
        form.update_field(LeadField::Email, "jane@company.com").unwrap();
        form.update_field(LeadField::CompanyName, "Acme Corp").unwrap();
        form.update_field(LeadField::CompanySize, "51-200").unwrap();
        form.update_field(LeadField::Industry, "Retail").unwrap();
    }

    #[test]
    fn test_starts_idle_and_empty() {
        let (form, _, _) = controller();
        assert_eq!(form.phase(), SubmissionPhase::Idle);
        assert!(form.fields().is_empty());
        assert!(form.field_errors().is_empty());
        assert_eq!(form.status_message(), None);
        assert_eq!(form.dismiss_deadline(), None);
    }

    #[test]
    fn test_update_field_type_mismatch() {
        let (form, _, _) = controller();

        let err = form
            .update_field(LeadField::ModernizationFocus, "yes")
            .unwrap_err();
        assert!(matches!(
            err,
            LeadError::FieldType {
                expected: "boolean",
                ..
            }
        ));
        assert!(form.update_field(LeadField::Email, true).is_err());

        form.update_field(LeadField::ModernizationFocus, true).unwrap();
        assert!(form.fields().modernization_focus);
        assert_eq!(form.fields().email, "");
    }

    #[test]
    fn test_update_field_caps_free_text() {
        let (form, _, _) = controller();
        form.update_field(LeadField::Systems, "s".repeat(SYSTEMS_MAX_CHARS + 20))
            .unwrap();
        form.update_field(LeadField::Challenge, "c".repeat(CHALLENGE_MAX_CHARS * 2))
            .unwrap();
        form.update_field(LeadField::FullName, "n".repeat(2000)).unwrap();

        let fields = form.fields();
        assert_eq!(fields.systems.chars().count(), SYSTEMS_MAX_CHARS);
        assert_eq!(fields.challenge.chars().count(), CHALLENGE_MAX_CHARS);
        assert_eq!(fields.full_name.chars().count(), 2000);
    }

    #[test]
    fn test_update_field_stores_canonical_option_label() {
        let (form, _, _) = controller();
        form.update_field(LeadField::Industry, " financial services ")
            .unwrap();
        form.update_field(LeadField::CompanySize, "5000+").unwrap();
        assert_eq!(form.fields().industry, "Financial Services");
        assert_eq!(form.fields().company_size, "5000+");

        form.update_field(LeadField::CompanySize, "huge").unwrap();
        assert_eq!(form.fields().company_size, "huge");
        assert!(form.validate().contains_key(&LeadField::CompanySize));
    }

    #[tokio::test]
    async fn test_custom_dismiss_delay() {
        let (form, _, clock) = controller();
        let form = form.with_dismiss_after(Duration::from_secs(1));
        fill_valid(&form);

        assert_eq!(form.submit().await, SubmitOutcome::Succeeded);
        assert_eq!(form.status_message(), Some(SUCCESS_MESSAGE));

        clock.advance(Duration::from_millis(999));
        assert_eq!(form.tick(), SubmissionPhase::Succeeded);
        clock.advance(Duration::from_millis(1));
        assert_eq!(form.tick(), SubmissionPhase::Idle);
        assert_eq!(form.status_message(), None);
    }

    #[tokio::test]
    async fn test_resubmit_during_success_notice_drops_old_deadline() {
        let (form, store, clock) = controller();
        fill_valid(&form);
        assert_eq!(form.submit().await, SubmitOutcome::Succeeded);
        let first_deadline = form.dismiss_deadline().unwrap();

        clock.advance(Duration::from_secs(3));
        fill_valid(&form);
        assert_eq!(form.submit().await, SubmitOutcome::Succeeded);

        let second_deadline = form.dismiss_deadline().unwrap();
        assert!(second_deadline > first_deadline);
        assert_eq!(store.len(), 2);

        // 舊的期限已過，但新的還沒到
        clock.advance(Duration::from_secs(3));
        assert_eq!(form.phase(), SubmissionPhase::Succeeded);
    }

    #[tokio::test]
    async fn test_validation_failure_after_failed_returns_to_idle() {
        let (form, store, _) = controller();
        store.fail_next("connection reset");
        fill_valid(&form);

        assert_eq!(form.submit().await, SubmitOutcome::Failed);
        assert_eq!(form.status_message(), Some(FAILURE_MESSAGE));

        form.update_field(LeadField::Email, "broken").unwrap();
        let outcome = form.submit().await;
        assert!(matches!(outcome, SubmitOutcome::Rejected(ref errors) if errors.len() == 1));
        assert_eq!(form.phase(), SubmissionPhase::Idle);
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_successful_submit_clears_previous_errors() {
        let (form, _, _) = controller();
        assert!(matches!(form.submit().await, SubmitOutcome::Rejected(_)));
        assert_eq!(form.field_errors().len(), 5);

        fill_valid(&form);
        assert!(form.field_errors().is_empty());
        assert_eq!(form.submit().await, SubmitOutcome::Succeeded);
        assert!(form.field_errors().is_empty());
    }
}
