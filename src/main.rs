mod config;
mod gmail_hub;
mod inventory;
mod mailbox;
mod message_processor;
mod report_store;
mod token_refresh;
mod token_store;

use config::Config;
use inventory::{AggregationResult, InputReport, InventoryParser, ReportPreprocessor};
use report_store::ReportStore;
use std::path::{Path, PathBuf};
use std::{env, fs};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = ".config/warehouse.toml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // init tracing
    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = env::var("WAREHOUSE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
    let cfg = Config::load(&config_path)?;

    let registry = cfg.registry.build()?;
    let preprocessor = ReportPreprocessor::new(
        cfg.mailbox.signature_triggers.as_slice(),
        cfg.mailbox.inventory_marker.as_deref(),
    )?;
    let parser = InventoryParser::new(registry, preprocessor);

    match cfg.reports_file.as_deref() {
        Some(path) => {
            let reports = load_reports(path)?;
            let result = parser.parse_reports(&reports);
            write_result(&cfg.output_path, &result)?;
        }
        None => run_mailbox(&cfg, &config_path, &parser).await?,
    }

    Ok(())
}

/// Fetch new reports into the store, count everything not yet processed,
/// write the result, then mark those reports processed.
async fn run_mailbox(
    cfg: &Config,
    config_path: &Path,
    parser: &InventoryParser,
) -> Result<(), Box<dyn std::error::Error>> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| "failed to install rustls crypto provider")?;

    if let Some(dir) = Path::new(&cfg.db_path).parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let store = ReportStore::new(&cfg.db_path)?;

    let hub = gmail_hub::create_hub(cfg, config_path).await?;
    let user = &cfg.mailbox.user;
    let ids =
        mailbox::get_message_ids(&hub, &cfg.mailbox.query, user, cfg.mailbox.max_messages).await?;
    let fetched = mailbox::fetch_and_store(&hub, user, ids, &store).await?;
    info!(fetched, "Reports fetched");

    let pending = store.get_unprocessed_reports()?;
    let result = parser.parse_reports(pending.iter().map(|stored| &stored.report));
    write_result(&cfg.output_path, &result)?;

    for stored in &pending {
        store.mark_report_as_processed(&stored.uid)?;
    }

    let (total, processed) = store.get_counts()?;
    info!(
        reports_total = total,
        reports_processed = processed,
        "Report store statistics"
    );
    Ok(())
}

fn load_reports(path: &str) -> Result<Vec<InputReport>, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let reports: Vec<InputReport> = serde_json::from_str(&content)?;
    info!(path, reports = reports.len(), "Loaded reports file");
    Ok(reports)
}

fn write_result(path: &str, result: &AggregationResult) -> Result<(), Box<dyn std::error::Error>> {
    fs::write(path, serde_json::to_string_pretty(result)?)?;
    info!(
        path,
        monitors = result.monitors,
        docks = result.docks,
        unresolved = result.unresolved.len(),
        "Inventory written"
    );
    Ok(())
}
