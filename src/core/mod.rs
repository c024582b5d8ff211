pub mod form;
pub mod rules;

pub use crate::domain::model::{FieldErrors, Lead, LeadField, SubmissionPhase, SubmitOutcome};
pub use crate::domain::ports::{Clock, LeadRepository};
pub use crate::utils::error::Result;
