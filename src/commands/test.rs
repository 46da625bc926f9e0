use std::path::PathBuf;

use console::style;
use decoy_cli::events::SinkConfig;
use decoy_cli::{RegistryHandle, Result, Supervisor};

pub async fn cmd_test(
    registry: &RegistryHandle,
    name: &str,
    json_log: Option<PathBuf>,
    syslog: Option<String>,
) -> Result<String> {
    let supervisor = Supervisor::new(registry.clone());
    let event = supervisor
        .test(name, SinkConfig { json_log, syslog })
        .await?;

    println!(
        "{} Published simulated alert {} for {}",
        style("✓").green().bold(),
        style(&event.event_type).cyan().bold(),
        style(name).bold()
    );
    println!(
        "  Check the debug log: {}",
        style(registry.debug_log_path().display()).dim()
    );
    Ok(format!("published simulated {} alert", event.event_type))
}
