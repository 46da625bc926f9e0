use console::style;
use decoy_cli::catalog::CatalogClient;
use decoy_cli::{InstallSource, Installer, RegistryHandle, Result};

pub async fn cmd_install(
    registry: &RegistryHandle,
    source: &str,
    force: bool,
) -> Result<String> {
    let source = InstallSource::detect(source);
    let installer = Installer::new(registry.clone(), CatalogClient::default());

    let manifest = installer.install(source, force).await?;

    println!(
        "{} Installed {} {}",
        style("✓").green().bold(),
        style(&manifest.name).cyan().bold(),
        style(format!("v{}", manifest.version)).dim()
    );
    if !manifest.ports.is_empty() {
        let ports: Vec<String> = manifest.ports.iter().map(|p| p.to_string()).collect();
        println!("  Ports: {}", style(ports.join(", ")).dim());
    }
    if !manifest.arguments.is_empty() {
        println!(
            "  Run with: {} {} {}",
            style("decoy run").bold(),
            manifest.name,
            style(
                manifest
                    .arguments
                    .iter()
                    .map(|a| format!("{}=<{}>", a.name, a.kind.as_str()))
                    .collect::<Vec<_>>()
                    .join(" ")
            )
            .dim()
        );
    }

    Ok(format!("installed {} v{}", manifest.name, manifest.version))
}
