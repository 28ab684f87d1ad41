use attendance_etl::utils::{logger, validation::Validate};
use attendance_etl::{EtlError, OfficeRules, RulesConfig, ServerConfig};
use clap::Parser;

fn load_rules(config: &ServerConfig) -> Result<OfficeRules, EtlError> {
    let rules = match &config.rules_path {
        Some(path) => {
            tracing::info!("📁 Loading office rules from: {}", path);
            RulesConfig::from_file(path)?
        }
        None => RulesConfig::default(),
    };
    rules.validate()?;
    Ok(rules.office)
}

fn fail(e: EtlError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // 初始化日誌
    logger::init_logger(config.verbose, config.json_logs);

    tracing::info!("Starting attendance-server");
    if config.verbose {
        tracing::debug!("Server config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        fail(e);
    }

    let rules = match load_rules(&config) {
        Ok(rules) => rules,
        Err(e) => fail(e),
    };
    tracing::info!(
        "Office rules: shift {} / grace until {} / {} grace days per month / {}h full day / {}h half day",
        rules.shift_start,
        rules.grace_limit,
        rules.max_grace_per_month,
        rules.min_full_day_hours,
        rules.min_half_day_hours
    );

    if let Err(e) = attendance_etl::server::serve(&config, rules).await {
        fail(e);
    }
}
