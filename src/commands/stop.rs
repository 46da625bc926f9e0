use console::style;
use decoy_cli::{RegistryHandle, Result, Supervisor};

pub async fn cmd_stop(registry: &RegistryHandle, name: &str) -> Result<String> {
    let supervisor = Supervisor::new(registry.clone());
    supervisor.stop(name).await?;
    println!(
        "{} Service {} stopped",
        style("✓").green().bold(),
        style(name).cyan().bold()
    );
    Ok(format!("stopped {}", name))
}
