use anyhow::{Context, Result};
use clap::Parser;
use emr_launcher_core::config::{LauncherSettings, SafeLogging};
use emr_launcher_core::Launcher;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_EVENT_FILE: &str = "event.json";

#[derive(Parser)]
#[command(name = "emr-launcher")]
#[command(about = "Build and submit one EMR cluster-launch request", long_about = None)]
struct Cli {
    /// Invocation event (JSON). A missing default file means an empty event.
    #[arg(long, default_value = DEFAULT_EVENT_FILE)]
    event: PathBuf,

    /// Print the redacted request instead of submitting it
    #[arg(long)]
    dry_run: bool,
}

fn init_logging(settings: &LauncherSettings) {
    let filter = EnvFilter::new(settings.log_level.to_string().to_lowercase());
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_event(path: &Path) -> Result<Value> {
    if !path.exists() && path == Path::new(DEFAULT_EVENT_FILE) {
        return Ok(Value::Object(Default::default()));
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read event file '{}'", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Event file '{}' is not valid JSON", path.display()))
}

async fn run(cli: Cli, settings: LauncherSettings) -> Result<()> {
    let event = read_event(&cli.event)?;
    let launcher = Launcher::from_settings(&settings).context("Failed to set up launcher")?;

    if cli.dry_run {
        let prepared = launcher.prepare(&event).await?;
        if prepared.payload.copy_secconfig {
            info!("Dry run, security configuration would be copied before submitting");
        }
        info!("Dry run, not submitting");
        println!("{}", prepared.document.safe_for_logging());
        return Ok(());
    }

    let response = launcher.launch(&event).await?;
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = LauncherSettings::from_env().context("Invalid launcher settings")?;
    init_logging(&settings);

    if let Err(err) = run(cli, settings).await {
        error!("{:#}", err);
        return Err(err);
    }
    Ok(())
}
