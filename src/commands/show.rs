use console::style;
use decoy_cli::catalog::CatalogClient;
use decoy_cli::{RegistryHandle, Result};

pub async fn cmd_show(registry: &RegistryHandle, name: &str) -> Result<String> {
    if registry.is_installed(name) {
        let service = registry.resolve(name)?;
        let manifest = &service.manifest;

        println!(
            "{} {} {}",
            style(&manifest.name).cyan().bold(),
            style(format!("v{}", manifest.version)).dim(),
            style("(installed)").green()
        );
        if let Some(description) = &manifest.description {
            println!("  {}", description);
        }
        println!("  Path:   {}", style(service.root.display()).dim());
        if !manifest.ports.is_empty() {
            let ports: Vec<String> = manifest.ports.iter().map(|p| p.to_string()).collect();
            println!("  Ports:  {}", ports.join(", "));
        }
        if !manifest.alerts.is_empty() {
            println!("  Alerts: {}", manifest.alerts.join(", "));
        }
        for arg in &manifest.arguments {
            let mut details = vec![arg.kind.as_str().to_string()];
            if arg.required {
                details.push("required".into());
            }
            if let Some(default) = &arg.default {
                details.push(format!("default: {}", default));
            }
            println!(
                "  Arg:    {} ({}){}",
                style(&arg.name).bold(),
                details.join(", "),
                arg.description
                    .as_deref()
                    .map(|d| format!(" - {}", d))
                    .unwrap_or_default()
            );
        }
        return Ok(format!("{} v{} is installed", manifest.name, manifest.version));
    }

    // Not installed locally; fall back to the catalog entry.
    let entry = CatalogClient::default().entry(name).await?;
    println!(
        "{} {} {}",
        style(&entry.name).cyan().bold(),
        style(format!("v{}", entry.version)).dim(),
        style("(not installed)").yellow()
    );
    if let Some(description) = &entry.description {
        println!("  {}", description);
    }
    println!(
        "  Install with: {}",
        style(format!("decoy install {}", entry.name)).bold()
    );
    Ok(format!("{} v{} is not installed", entry.name, entry.version))
}
