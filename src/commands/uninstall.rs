use console::style;
use decoy_cli::catalog::CatalogClient;
use decoy_cli::error::DecoyError;
use decoy_cli::{Installer, RegistryHandle, Result};

pub fn cmd_uninstall(registry: &RegistryHandle, name: &str, yes: bool) -> Result<String> {
    if !registry.is_installed(name) {
        return Err(DecoyError::NotFound(name.to_string()));
    }

    if !yes {
        if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
            return Err(DecoyError::Io(std::io::Error::other(
                "uninstall requires confirmation; pass --yes in non-interactive sessions",
            )));
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Uninstall service '{}'?", name))
            .default(false)
            .interact()
            .map_err(|e| DecoyError::Io(std::io::Error::other(e.to_string())))?;
        if !confirmed {
            println!("{} Aborted", style("!").yellow().bold());
            return Ok(format!("uninstall of {} aborted by operator", name));
        }
    }

    let installer = Installer::new(registry.clone(), CatalogClient::default());
    installer.uninstall(name)?;

    println!(
        "{} Uninstalled {}",
        style("✓").green().bold(),
        style(name).cyan().bold()
    );
    Ok(format!("uninstalled {}", name))
}
