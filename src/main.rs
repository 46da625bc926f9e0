mod args;
mod commands;

use args::{Cli, Commands};
use clap::Parser;
use decoy_cli::clienv;
use decoy_cli::events::{DebugLog, Event, Severity};
use decoy_cli::RegistryHandle;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Completions need no registry home.
    if let Commands::Completions { shell } = &cli.command {
        commands::completions::cmd_completions(*shell);
        return Ok(());
    }

    let home = cli.home.clone().unwrap_or_else(clienv::default_home);
    let registry = RegistryHandle::open(&home)?;
    let label = command_label(&cli.command);

    let result = dispatch(cli.command, &registry).await;

    // Every operation leaves a record in the audit trail, success or failure.
    let debug = DebugLog::new(registry.debug_log_path());
    let record = match &result {
        Ok(summary) => Event::new("command", format!("{}: {}", label, summary)),
        Err(e) => {
            Event::new("command", format!("{}: {}", label, e)).with_severity(Severity::Warning)
        }
    };
    debug.append(&record).ok();

    match result {
        Ok(_) => Ok(()),
        Err(e) => {
            eprintln!("{} {}", console::style("error:").red().bold(), e);
            std::process::exit(1);
        }
    }
}

async fn dispatch(command: Commands, registry: &RegistryHandle) -> decoy_cli::Result<String> {
    match command {
        Commands::Install { source, force } => {
            commands::install::cmd_install(registry, &source, force).await
        }
        Commands::Uninstall { name, yes } => {
            commands::uninstall::cmd_uninstall(registry, &name, yes)
        }
        Commands::List { remote } => commands::list::cmd_list(registry, remote).await,
        Commands::Show { name } => commands::show::cmd_show(registry, &name).await,
        Commands::Run {
            name,
            args,
            daemon,
            json_log,
            syslog,
            daemon_worker,
        } => {
            commands::run::cmd_run(
                registry,
                &name,
                &args,
                daemon,
                json_log,
                syslog,
                daemon_worker,
            )
            .await
        }
        Commands::Status { name, all } => commands::status::cmd_status(registry, name, all),
        Commands::Stop { name } => commands::stop::cmd_stop(registry, &name).await,
        Commands::Test {
            name,
            json_log,
            syslog,
        } => commands::test::cmd_test(registry, &name, json_log, syslog).await,
        Commands::Completions { .. } => unreachable!("handled before registry setup"),
    }
}

fn command_label(command: &Commands) -> String {
    match command {
        Commands::Install { source, .. } => format!("install {}", source),
        Commands::Uninstall { name, .. } => format!("uninstall {}", name),
        Commands::List { remote: true } => "list --remote".into(),
        Commands::List { remote: false } => "list".into(),
        Commands::Show { name } => format!("show {}", name),
        Commands::Run { name, daemon, .. } => {
            if *daemon {
                format!("run -d {}", name)
            } else {
                format!("run {}", name)
            }
        }
        Commands::Status { name, .. } => match name {
            Some(name) => format!("status {}", name),
            None => "status".into(),
        },
        Commands::Stop { name } => format!("stop {}", name),
        Commands::Test { name, .. } => format!("test {}", name),
        Commands::Completions { .. } => "completions".into(),
    }
}
