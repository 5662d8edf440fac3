//! diarisk entrypoint: `train` runs the offline training batch and writes
//! the artifact pair; `serve` (the default) starts the prediction API.

use anyhow::bail;
use diarisk::config::ServiceConfig;
use diarisk::logging::StructuredLogger;
use diarisk::{service, train};
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var("DIARISK_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.json"));
    let config = ServiceConfig::load(&config_path);

    StructuredLogger::init(config.log.json, &config.log.level);

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("train") => {
            let csv_path = args
                .next()
                .map(PathBuf::from)
                .unwrap_or_else(|| config.training.csv_path.clone());
            let report = train::run(&config, &csv_path)?;
            info!(
                model = report.model_kind.as_str(),
                samples = report.samples,
                test_accuracy = report.test_accuracy,
                run_id = %report.meta.run_id,
                "training complete"
            );
        }
        Some("serve") | None => {
            service::serve(config).await?;
        }
        Some(other) => bail!("unknown command `{}`; expected `train` or `serve`", other),
    }
    Ok(())
}
