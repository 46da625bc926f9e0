use std::path::PathBuf;

use console::style;
use decoy_cli::events::SinkConfig;
use decoy_cli::supervisor::Shutdown;
use decoy_cli::validator;
use decoy_cli::{RegistryHandle, Result, Supervisor};

#[allow(clippy::too_many_arguments)]
pub async fn cmd_run(
    registry: &RegistryHandle,
    name: &str,
    args: &[String],
    daemon: bool,
    json_log: Option<PathBuf>,
    syslog: Option<String>,
    daemon_worker: bool,
) -> Result<String> {
    let raw_args = validator::parse_raw_args(args)?;
    let sinks = SinkConfig { json_log, syslog };
    let supervisor = Supervisor::new(registry.clone());

    if daemon_worker {
        // Detached supervision worker: stdout is the readiness pipe back to
        // the launching process, so nothing else is printed here.
        supervisor
            .run_foreground(name, &raw_args, sinks, Shutdown::on_os_signals(), true)
            .await?;
        return Ok(format!("daemon worker for {} exited", name));
    }

    if daemon {
        let record = supervisor.run_daemon(name, &raw_args, sinks).await?;
        println!(
            "{} Service {} running in the background (PID {})",
            style("✓").green().bold(),
            style(name).cyan().bold(),
            record.pid
        );
        println!(
            "  Stop with: {}",
            style(format!("decoy stop {}", name)).bold()
        );
        return Ok(format!("started {} as daemon (pid {})", name, record.pid));
    }

    println!(
        "{} Running {} in the foreground (Ctrl+C to stop)",
        style("i").cyan(),
        style(name).cyan().bold()
    );
    supervisor
        .run_foreground(name, &raw_args, sinks, Shutdown::on_os_signals(), false)
        .await?;
    println!("{} Service {} stopped", style("✓").green().bold(), name);
    Ok(format!("foreground run of {} finished", name))
}
