use clap::Parser;
use lead_capture::config::{check_free_text_lengths, lead_field_values, load_lead_file};
use lead_capture::utils::{logger, validation::Validate};
use lead_capture::{
    CliConfig, CompanySize, FieldErrors, Industry, InMemoryLeadStore, Lead, LeadError,
    LeadFormController, LeadRepository, SubmitOutcome, SupabaseLeadStore, SystemClock, TomlConfig,
};
use std::sync::Arc;
use std::time::Duration;

const EXIT_REMOTE_FAILURE: i32 = 1;
const EXIT_VALIDATION: i32 = 2;
const EXIT_CONFIG: i32 = 3;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    if config.list_options {
        print_options();
        return Ok(());
    }

    // .env 不存在時忽略
    dotenvy::dotenv().ok();

    tracing::info!("Starting lead-capture CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let lead = match &config.lead_file {
        Some(path) => match load_lead_file(path) {
            Ok(lead) => lead,
            Err(LeadError::Validation { errors }) => exit_with_field_errors(&errors),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("failed to load lead file '{}'", path)));
            }
        },
        None => Lead::default(),
    };

    let overrides = config.field_overrides();
    if let Err(LeadError::Validation { errors }) = check_free_text_lengths(&overrides) {
        exit_with_field_errors(&errors);
    }

    let (repository, memory_store, dismiss_after) = match build_repository(&config) {
        Ok(parts) => parts,
        Err(e) => {
            tracing::error!("❌ Configuration failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(EXIT_CONFIG);
        }
    };

    let form = LeadFormController::new(repository, SystemClock).with_dismiss_after(dismiss_after);

    // 檔案的值先填，命令列參數覆蓋
    for (field, value) in lead_field_values(&lead).into_iter().chain(overrides) {
        form.update_field(field, value)?;
    }

    match form.submit().await {
        SubmitOutcome::Succeeded => {
            if let Some(message) = form.status_message() {
                println!("✅ {}", message);
            }
            if let Some(store) = memory_store {
                for record in store.records() {
                    println!("{}", serde_json::to_string_pretty(&record)?);
                }
            }
            Ok(())
        }
        SubmitOutcome::Rejected(errors) => exit_with_field_errors(&errors),
        SubmitOutcome::Failed => {
            eprintln!("❌ {}", form.status_message().unwrap_or_default());
            eprintln!("💡 Your entries were kept; run the same command again to retry.");
            std::process::exit(EXIT_REMOTE_FAILURE);
        }
        SubmitOutcome::InFlight => {
            eprintln!("❌ A submission is already in progress");
            std::process::exit(EXIT_REMOTE_FAILURE);
        }
    }
}

type RepositoryParts = (
    Arc<dyn LeadRepository>,
    Option<Arc<InMemoryLeadStore>>,
    Duration,
);

fn build_repository(config: &CliConfig) -> Result<RepositoryParts, LeadError> {
    if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - leads are kept in memory");
        let store = Arc::new(InMemoryLeadStore::new());
        let dismiss_after = match &config.config {
            Some(path) => TomlConfig::from_file(path)?.dismiss_after(),
            None => lead_capture::domain::model::SUCCESS_DISMISS_AFTER,
        };
        let repository: Arc<dyn LeadRepository> = store.clone();
        return Ok((repository, Some(store), dismiss_after));
    }

    let toml_config = match &config.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            TomlConfig::from_file(path)?
        }
        None => TomlConfig::from_env()?,
    };
    toml_config.validate()?;

    let store = SupabaseLeadStore::from_config(&toml_config)?;
    tracing::info!("Leads will be written to {}", store.endpoint());
    let repository: Arc<dyn LeadRepository> = Arc::new(store);
    Ok((repository, None, toml_config.dismiss_after()))
}

fn exit_with_field_errors(errors: &FieldErrors) -> ! {
    eprintln!("❌ Please fix the following fields:");
    for (field, message) in errors {
        eprintln!("   • {}: {}", field, message);
    }
    std::process::exit(EXIT_VALIDATION);
}

fn print_options() {
    println!("Company sizes:");
    for size in CompanySize::ALL {
        println!("  {}", size);
    }
    println!("Industries:");
    for industry in Industry::ALL {
        println!("  {}", industry);
    }
}
