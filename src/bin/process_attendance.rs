use anyhow::Context;
use attendance_etl::core::Pipeline;
use attendance_etl::utils::{logger, validation::Validate};
use attendance_etl::{AttendancePipeline, EtlEngine, LocalStorage, RulesConfig};
use clap::Parser;

#[derive(Parser)]
#[command(name = "process-attendance")]
#[command(about = "Turn an attendance CSV export into an Excel report")]
struct Args {
    /// Attendance CSV export
    input: String,

    /// Directory the report is written to
    #[arg(short, long, default_value = "./output")]
    output_dir: String,

    /// File name of the report inside the output directory
    #[arg(short = 'n', long, default_value = "attendance_final.xlsx")]
    output_name: String,

    /// Path to a TOML rules file
    #[arg(short, long)]
    rules: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Print the employee summary as JSON instead of writing the report
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    let rules = match &args.rules {
        Some(path) => RulesConfig::from_file(path)
            .with_context(|| format!("failed to load rules file '{}'", path))?,
        None => RulesConfig::default(),
    };
    rules.validate().context("invalid office rules")?;

    let source = tokio::fs::read(&args.input)
        .await
        .with_context(|| format!("failed to read '{}'", args.input))?;

    let storage = LocalStorage::new(&args.output_dir);
    let pipeline =
        AttendancePipeline::with_output_name(storage, rules.office, source, &args.output_name);

    if args.dry_run {
        tracing::info!("🔍 Dry run: no report will be written");
        let sheet = pipeline.extract().await?;
        let report = pipeline.transform(sheet).await?;
        println!("{}", serde_json::to_string_pretty(&report.summary)?);
        return Ok(());
    }

    match EtlEngine::new(pipeline).run().await {
        Ok(name) => {
            let path = std::path::Path::new(&args.output_dir).join(name);
            println!("✅ Report written to {}", path.display());
            Ok(())
        }
        Err(e) => {
            tracing::error!("Category: {:?}, Severity: {:?}", e.category(), e.severity());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }
}
