use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "decoy")]
#[command(version)]
#[command(about = "Install, run and supervise decoy services", long_about = None)]
pub(crate) struct Cli {
    /// Registry home directory. Can also be set via DECOY_HOME env var.
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Install a service from the catalog, a local directory or an archive
    Install {
        /// Service name, directory path, or .zip/.tar.gz archive path
        source: String,

        /// Overwrite an existing installation
        #[arg(long)]
        force: bool,
    },

    /// Uninstall an installed service
    Uninstall {
        /// Service name
        name: String,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List installed services, or the remote catalog
    List {
        /// Query the remote catalog instead of the local registry
        #[arg(long)]
        remote: bool,
    },

    /// Show a service's manifest and install state
    Show {
        /// Service name
        name: String,
    },

    /// Run an installed service
    Run {
        /// Service name
        name: String,

        /// Service arguments as key=value pairs
        args: Vec<String>,

        /// Detach and run in the background
        #[arg(short = 'd', long)]
        daemon: bool,

        /// Copy events to an extra JSON-lines file
        #[arg(long, value_name = "PATH")]
        json_log: Option<PathBuf>,

        /// Send CEF-formatted alerts to a syslog endpoint (UDP)
        #[arg(long, value_name = "HOST:PORT")]
        syslog: Option<String>,

        /// Run as the detached supervision worker (internal)
        #[arg(long, hide = true)]
        daemon_worker: bool,
    },

    /// Report the status of one service or of every installed service
    Status {
        /// Service name
        name: Option<String>,

        /// Report every installed service
        #[arg(short = 'a', long)]
        all: bool,
    },

    /// Stop a running service
    Stop {
        /// Service name
        name: String,
    },

    /// Publish a simulated alert to exercise the sink pipeline
    Test {
        /// Service name
        name: String,

        /// Copy events to an extra JSON-lines file
        #[arg(long, value_name = "PATH")]
        json_log: Option<PathBuf>,

        /// Send CEF-formatted alerts to a syslog endpoint (UDP)
        #[arg(long, value_name = "HOST:PORT")]
        syslog: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}
