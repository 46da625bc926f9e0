use console::style;
use decoy_cli::catalog::CatalogClient;
use decoy_cli::{RegistryHandle, Result};

pub async fn cmd_list(registry: &RegistryHandle, remote: bool) -> Result<String> {
    if remote {
        return cmd_list_remote().await;
    }

    let mut count = 0usize;
    for manifest in registry.list_local()? {
        let manifest = manifest?;
        count += 1;
        let ports: Vec<String> = manifest.ports.iter().map(|p| p.to_string()).collect();
        println!(
            "  {} {} {}",
            style(&manifest.name).cyan().bold(),
            style(format!("v{}", manifest.version)).dim(),
            if ports.is_empty() {
                String::new()
            } else {
                style(format!("[{}]", ports.join(", "))).dim().to_string()
            }
        );
        if let Some(description) = &manifest.description {
            println!("    {}", style(description).dim());
        }
    }

    if count == 0 {
        println!(
            "  {} No services installed (try {})",
            style("i").cyan(),
            style("decoy list --remote").bold()
        );
    }
    Ok(format!("{} installed service(s)", count))
}

async fn cmd_list_remote() -> Result<String> {
    let entries = CatalogClient::default().list().await?;
    for entry in &entries {
        println!(
            "  {} {} - {}",
            style(&entry.name).cyan().bold(),
            style(format!("v{}", entry.version)).dim(),
            entry.description.as_deref().unwrap_or("")
        );
    }
    Ok(format!("{} service(s) in catalog", entries.len()))
}
