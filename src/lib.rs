pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::clock::{ManualClock, SystemClock};
pub use adapters::memory::InMemoryLeadStore;
pub use adapters::supabase::SupabaseLeadStore;
pub use config::toml_config::TomlConfig;
pub use core::form::LeadFormController;
pub use domain::model::{
    CompanySize, FieldErrors, FieldValue, Industry, Lead, LeadField, LeadRecord, SubmissionPhase,
    SubmitOutcome,
};
pub use domain::ports::{Clock, LeadRepository, RemoteConfigProvider};
pub use utils::error::{LeadError, Result};
