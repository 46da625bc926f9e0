use console::style;
use decoy_cli::error::DecoyError;
use decoy_cli::supervisor::ServiceStatus;
use decoy_cli::{RegistryHandle, Result, Supervisor};

pub fn cmd_status(registry: &RegistryHandle, name: Option<String>, all: bool) -> Result<String> {
    let supervisor = Supervisor::new(registry.clone());

    if let Some(name) = name {
        let status = supervisor.status(&name)?;
        print_status(&name, status);
        return Ok(format!("{} is {}", name, status.as_str()));
    }

    if !all {
        return Err(DecoyError::MissingServiceName);
    }

    let report = supervisor.status_all()?;
    if report.is_empty() {
        println!("  {} No services installed", style("i").cyan());
        return Ok("no services installed".into());
    }
    for (name, status) in &report {
        print_status(name, *status);
    }
    let running = report
        .iter()
        .filter(|(_, s)| matches!(s, ServiceStatus::Running { .. }))
        .count();
    Ok(format!("{} service(s), {} running", report.len(), running))
}

fn print_status(name: &str, status: ServiceStatus) {
    let rendered = match status {
        ServiceStatus::Running { pid } => {
            format!("{} (pid {})", style("running").green().bold(), pid)
        }
        ServiceStatus::Stopped => style("stopped").dim().to_string(),
        ServiceStatus::NoSuchService => style("no such service").yellow().to_string(),
    };
    println!("  {} {}", style(name).cyan().bold(), rendered);
}
