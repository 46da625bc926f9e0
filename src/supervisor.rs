//! Process supervisor: starts validated services as child processes or
//! detached daemons, tracks liveness through on-disk instance records, and
//! pumps child-emitted events into the sink pipeline.
//!
//! # Service process contract
//!
//! The spawned entry point receives the registry home, its validated
//! arguments and the sink configuration via `DECOY_HOME`, `DECOY_SERVICE`,
//! `DECOY_ARGS` and `DECOY_SINKS`. It must print a single `READY` line on
//! stdout once it is listening; every later stdout line is either a
//! JSON-encoded event or free text (wrapped into an event by the
//! supervisor). A graceful-termination signal (SIGTERM) must make it exit.
//!
//! Daemon mode re-executes the current binary as a detached supervision
//! worker; the worker relays the child's `READY` line through its own stdout
//! pipe, so readiness is an explicit signal rather than log polling.

use std::collections::BTreeMap;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::clienv;
use crate::error::{DecoyError, Result};
use crate::events::{build_sinks, DebugLog, Event, EventBus, Severity, SinkConfig};
use crate::registry::{InstalledService, RegistryHandle};
use crate::validator::{self, RuntimeArguments};

/// Readiness line the service process prints on stdout.
pub const READY_LINE: &str = "READY";

const READY_TIMEOUT: Duration = Duration::from_secs(30);
const STOP_GRACE: Duration = Duration::from_secs(10);

/// Runtime metadata for a currently-or-last-running service, persisted under
/// `instances/<name>.json` and overwritten on each new run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub name: String,
    pub pid: u32,
    pub started_at: DateTime<Utc>,
    pub daemon: bool,
    pub sinks: SinkConfig,
}

impl InstanceRecord {
    pub fn save(&self, registry: &RegistryHandle) -> Result<()> {
        let path = registry.instance_path(&self.name);
        std::fs::write(&path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    pub fn load(registry: &RegistryHandle, name: &str) -> Result<Option<Self>> {
        let path = registry.instance_path(name);
        if !path.is_file() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn remove(registry: &RegistryHandle, name: &str) {
        let path = registry.instance_path(name);
        if path.exists() {
            std::fs::remove_file(&path).ok();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Running { pid: u32 },
    Stopped,
    NoSuchService,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Running { .. } => "running",
            ServiceStatus::Stopped => "stopped",
            ServiceStatus::NoSuchService => "no such service",
        }
    }
}

#[cfg(unix)]
pub fn is_process_running(pid: u32) -> bool {
    unsafe { libc::kill(pid as i32, 0) == 0 }
}

#[cfg(not(unix))]
pub fn is_process_running(_pid: u32) -> bool {
    false
}

#[cfg(unix)]
fn send_sigterm(pid: u32) {
    unsafe {
        libc::kill(pid as i32, libc::SIGTERM);
    }
}

#[cfg(not(unix))]
fn send_sigterm(_pid: u32) {}

/// Cancellation signal handed to the spawn/wait loop; triggered by OS
/// signals in production and directly in tests.
#[derive(Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }
}

pub fn shutdown_channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

impl Shutdown {
    /// Shutdown driven by SIGINT/SIGTERM (Ctrl-C on non-Unix).
    pub fn on_os_signals() -> Self {
        let (trigger, shutdown) = shutdown_channel();
        tokio::spawn(async move {
            wait_for_signal().await;
            trigger.trigger();
        });
        shutdown
    }

    pub async fn recv(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                // Trigger dropped without firing; never resolve.
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(_) => return,
    };
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(_) => return,
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigint.recv() => {},
        _ = sigterm.recv() => {},
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    tokio::signal::ctrl_c().await.ok();
}

pub struct Supervisor {
    registry: RegistryHandle,
    debug: Arc<DebugLog>,
}

impl Supervisor {
    pub fn new(registry: RegistryHandle) -> Self {
        let debug = Arc::new(DebugLog::new(registry.debug_log_path()));
        Self { registry, debug }
    }

    pub fn debug_log(&self) -> Arc<DebugLog> {
        Arc::clone(&self.debug)
    }

    /// Run a service in the foreground: validate, spawn, wait for readiness,
    /// then pump child events into the sinks until the child exits or the
    /// shutdown signal fires. `announce_ready` makes the supervisor relay the
    /// child's readiness line on its own stdout (daemon-worker mode).
    pub async fn run_foreground(
        &self,
        name: &str,
        raw_args: &BTreeMap<String, String>,
        sinks: SinkConfig,
        mut shutdown: Shutdown,
        announce_ready: bool,
    ) -> Result<()> {
        let service = self.registry.resolve(name)?;
        let args = validator::validate(&service.manifest.arguments, raw_args)?;
        self.reject_if_running(name)?;

        // Held for the lifetime of the run so install/uninstall on the same
        // name fail fast instead of racing a live service.
        let _lock = self.registry.lock(name)?;

        // The starting event goes to the debug sink before anything spawns.
        self.debug
            .append(&Event::new(name, format!("starting service '{}'", name)))?;

        let sink_set = build_sinks(Arc::clone(&self.debug), &sinks).await?;
        let bus = EventBus::new(sink_set, Arc::clone(&self.debug));

        let mut child = spawn_service(&service, &args, &sinks, self.registry.home())?;
        let pid = child.id().unwrap_or_default();
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DecoyError::NotRunning(name.to_string()))?;
        let mut lines = BufReader::new(stdout).lines();

        match wait_for_ready(&mut lines, &mut shutdown).await {
            ReadyOutcome::Ready => {}
            ReadyOutcome::Interrupted => {
                terminate_and_reap(&mut child, pid).await;
                bus.shutdown().await;
                return Ok(());
            }
            ReadyOutcome::TimedOut | ReadyOutcome::Exited => {
                terminate_and_reap(&mut child, pid).await;
                bus.shutdown().await;
                return Err(DecoyError::StartupTimeout {
                    name: name.to_string(),
                    seconds: READY_TIMEOUT.as_secs(),
                });
            }
        }

        info!(name, pid, "Service reported ready");
        bus.publish(listening_event(&service));
        if announce_ready {
            use std::io::Write;
            let mut out = std::io::stdout();
            writeln!(out, "{}", READY_LINE).ok();
            out.flush().ok();
        }

        // Foreground runs record the service child itself; daemon workers are
        // recorded by the launching parent under the worker's pid.
        if !announce_ready {
            InstanceRecord {
                name: name.to_string(),
                pid,
                started_at: Utc::now(),
                daemon: false,
                sinks: sinks.clone(),
            }
            .save(&self.registry)?;
        }

        let interrupted = pump_events(name, &mut lines, &bus, &mut shutdown).await;
        if interrupted {
            debug!(name, "Shutdown requested, terminating service");
            bus.publish(Event::new(name, format!("stopping service '{}'", name)));
        }
        let status = terminate_and_reap(&mut child, pid).await;

        match status {
            Some(status) if !interrupted && !status.success() => {
                bus.publish(
                    Event::new(name, format!("service '{}' exited unexpectedly", name))
                        .with_severity(Severity::Warning),
                );
            }
            _ => {
                bus.publish(Event::new(name, format!("service '{}' stopped", name)));
            }
        }

        InstanceRecord::remove(&self.registry, name);
        bus.shutdown().await;
        Ok(())
    }

    /// Run a service as a detached daemon: validate up front, re-execute the
    /// current binary as a supervision worker, confirm readiness through the
    /// worker's stdout pipe, then persist the instance record and return.
    pub async fn run_daemon(
        &self,
        name: &str,
        raw_args: &BTreeMap<String, String>,
        sinks: SinkConfig,
    ) -> Result<InstanceRecord> {
        let service = self.registry.resolve(name)?;
        validator::validate(&service.manifest.arguments, raw_args)?;
        self.reject_if_running(name)?;

        let exe = std::env::current_exe()?;
        let log_path = self.registry.logs_dir().join(format!("{}.log", name));
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let mut cmd = Command::new(&exe);
        cmd.arg("--home")
            .arg(self.registry.home())
            .arg("run")
            .arg(name)
            .args(raw_args.iter().map(|(k, v)| format!("{}={}", k, v)))
            .arg("--daemon-worker");
        if let Some(path) = &sinks.json_log {
            cmd.arg("--json-log").arg(path);
        }
        if let Some(target) = &sinks.syslog {
            cmd.arg("--syslog").arg(target);
        }
        cmd.env(clienv::ENV_HOME, self.registry.home())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(log_file);
        #[cfg(unix)]
        cmd.process_group(0);

        let mut worker = cmd.spawn()?;
        let pid = worker.id().unwrap_or_default();
        let stdout = worker
            .stdout
            .take()
            .ok_or_else(|| DecoyError::NotRunning(name.to_string()))?;
        let mut lines = BufReader::new(stdout).lines();

        let ready = tokio::time::timeout(READY_TIMEOUT, async {
            while let Ok(Some(line)) = lines.next_line().await {
                if line.trim() == READY_LINE {
                    return true;
                }
            }
            false
        })
        .await;

        if !matches!(ready, Ok(true)) {
            warn!(name, pid, "Daemon worker failed to report ready");
            send_sigterm(pid);
            worker.kill().await.ok();
            return Err(DecoyError::StartupTimeout {
                name: name.to_string(),
                seconds: READY_TIMEOUT.as_secs(),
            });
        }

        let record = InstanceRecord {
            name: name.to_string(),
            pid,
            started_at: Utc::now(),
            daemon: true,
            sinks,
        };
        record.save(&self.registry)?;
        info!(name, pid, "Daemon started");
        Ok(record)
    }

    /// Report one service's state without failing on unknown names.
    pub fn status(&self, name: &str) -> Result<ServiceStatus> {
        let record = InstanceRecord::load(&self.registry, name)?;
        if let Some(record) = &record {
            if is_process_running(record.pid) {
                return Ok(ServiceStatus::Running { pid: record.pid });
            }
        }
        if self.registry.is_installed(name) || record.is_some() {
            Ok(ServiceStatus::Stopped)
        } else {
            Ok(ServiceStatus::NoSuchService)
        }
    }

    /// Report every installed service's state; services that never ran show
    /// as stopped. An empty registry yields an empty report.
    pub fn status_all(&self) -> Result<Vec<(String, ServiceStatus)>> {
        let mut report = Vec::new();
        for manifest in self.registry.list_local()? {
            let manifest = manifest?;
            let status = self.status(&manifest.name)?;
            report.push((manifest.name, status));
        }
        report.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(report)
    }

    /// Gracefully stop a running instance: SIGTERM, bounded wait, SIGKILL
    /// escalation, then clear the instance record.
    pub async fn stop(&self, name: &str) -> Result<()> {
        let record = InstanceRecord::load(&self.registry, name)?
            .ok_or_else(|| DecoyError::NotRunning(name.to_string()))?;

        if !is_process_running(record.pid) {
            InstanceRecord::remove(&self.registry, name);
            return Err(DecoyError::NotRunning(name.to_string()));
        }

        self.debug
            .append(&Event::new(name, format!("stopping service '{}'", name)))?;
        send_sigterm(record.pid);

        let deadline = tokio::time::Instant::now() + STOP_GRACE;
        while is_process_running(record.pid) {
            if tokio::time::Instant::now() >= deadline {
                warn!(name, pid = record.pid, "Grace period exceeded, killing");
                #[cfg(unix)]
                unsafe {
                    libc::kill(record.pid as i32, libc::SIGKILL);
                }
                tokio::time::sleep(Duration::from_millis(200)).await;
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        InstanceRecord::remove(&self.registry, name);
        self.debug
            .append(&Event::new(name, format!("service '{}' stopped", name)))?;
        info!(name, "Service stopped");
        Ok(())
    }

    /// Publish a synthetic alert for the service's first declared alert
    /// category to exercise the sink pipeline end to end. Reports the
    /// publish, not downstream sink outcomes.
    pub async fn test(&self, name: &str, sinks: SinkConfig) -> Result<Event> {
        let service = self.registry.resolve(name)?;

        // Default to the last run's sink set when none is given explicitly.
        let sinks = if sinks.json_log.is_none() && sinks.syslog.is_none() {
            InstanceRecord::load(&self.registry, name)?
                .map(|r| r.sinks)
                .unwrap_or(sinks)
        } else {
            sinks
        };

        let category = service
            .manifest
            .alerts
            .first()
            .cloned()
            .unwrap_or_else(|| name.to_string());
        let event = Event::alert(category, format!("simulated alert for service '{}'", name))
            .with_field(crate::events::FIELD_REQUEST, "GET /")
            .with_field(crate::events::FIELD_SRC, "127.0.0.1");

        let sink_set = build_sinks(Arc::clone(&self.debug), &sinks).await?;
        let bus = EventBus::new(sink_set, Arc::clone(&self.debug));
        bus.publish(event.clone());
        bus.shutdown().await;
        Ok(event)
    }

    fn reject_if_running(&self, name: &str) -> Result<()> {
        if let Some(record) = InstanceRecord::load(&self.registry, name)? {
            if is_process_running(record.pid) {
                return Err(DecoyError::OperationInProgress(name.to_string()));
            }
        }
        Ok(())
    }
}

fn listening_event(service: &InstalledService) -> Event {
    let mut event = Event::new(
        &service.manifest.name,
        format!("service '{}' listening", service.manifest.name),
    );
    if let Some(port) = service.manifest.ports.first() {
        event = event.with_field("port", i64::from(port.port));
    }
    event
}

fn spawn_service(
    service: &InstalledService,
    args: &RuntimeArguments,
    sinks: &SinkConfig,
    home: &std::path::Path,
) -> Result<Child> {
    let entry = service.entry_path();
    let mut cmd = Command::new(&entry);
    cmd.current_dir(&service.root)
        .env(clienv::ENV_HOME, home)
        .env(clienv::ENV_SERVICE, &service.manifest.name)
        .env(clienv::ENV_ARGS, serde_json::to_string(args)?)
        .env(clienv::ENV_SINKS, serde_json::to_string(sinks)?)
        .stdin(Stdio::null())
        .stdout(Stdio::piped());

    let child = cmd.spawn().map_err(|e| {
        DecoyError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to spawn {}: {}", entry.display(), e),
        ))
    })?;
    debug!(entry = %entry.display(), pid = ?child.id(), "Spawned service process");
    Ok(child)
}

enum ReadyOutcome {
    Ready,
    TimedOut,
    Exited,
    Interrupted,
}

async fn wait_for_ready(
    lines: &mut Lines<BufReader<ChildStdout>>,
    shutdown: &mut Shutdown,
) -> ReadyOutcome {
    let deadline = tokio::time::Instant::now() + READY_TIMEOUT;
    loop {
        tokio::select! {
            maybe = lines.next_line() => match maybe {
                Ok(Some(line)) if line.trim() == READY_LINE => return ReadyOutcome::Ready,
                Ok(Some(_)) => continue,
                Ok(None) | Err(_) => return ReadyOutcome::Exited,
            },
            _ = tokio::time::sleep_until(deadline) => return ReadyOutcome::TimedOut,
            _ = shutdown.recv() => return ReadyOutcome::Interrupted,
        }
    }
}

/// Pump child stdout lines into the bus until EOF or shutdown. Returns true
/// when the loop ended because of a shutdown request.
async fn pump_events(
    name: &str,
    lines: &mut Lines<BufReader<ChildStdout>>,
    bus: &EventBus,
    shutdown: &mut Shutdown,
) -> bool {
    loop {
        tokio::select! {
            maybe = lines.next_line() => match maybe {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let event = serde_json::from_str::<Event>(&line)
                        .unwrap_or_else(|_| Event::new(name, line));
                    bus.publish(event);
                }
                Ok(None) | Err(_) => return false,
            },
            _ = shutdown.recv() => return true,
        }
    }
}

/// SIGTERM, bounded wait, SIGKILL escalation. Returns the exit status when
/// the child could be reaped.
async fn terminate_and_reap(child: &mut Child, pid: u32) -> Option<std::process::ExitStatus> {
    send_sigterm(pid);
    match tokio::time::timeout(STOP_GRACE, child.wait()).await {
        Ok(status) => status.ok(),
        Err(_) => {
            warn!(pid, "Service did not stop in time, force killing");
            child.kill().await.ok();
            child.wait().await.ok()
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::manifest::MANIFEST_FILE;
    use std::os::unix::fs::PermissionsExt;

    const ENTRY_SCRIPT: &str = "#!/bin/sh\n\
        echo READY\n\
        trap 'exit 0' TERM INT\n\
        while true; do sleep 0.1; done\n";

    fn install_fixture(registry: &RegistryHandle, name: &str) {
        let root = registry.service_dir(name);
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(
            root.join(MANIFEST_FILE),
            format!(
                r#"
                [service]
                name = "{name}"
                version = "0.1.0"
                entry = "run.sh"
                alerts = ["{name}"]

                [[service.ports]]
                port = 8888
                protocol = "TCP"

                [[service.arguments]]
                name = "port"
                type = "int"
                required = true
                "#
            ),
        )
        .unwrap();
        let script = root.join("run.sh");
        std::fs::write(&script, ENTRY_SCRIPT).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn scratch() -> (tempfile::TempDir, RegistryHandle, Supervisor) {
        let dir = tempfile::tempdir().unwrap();
        let registry = RegistryHandle::open(dir.path()).unwrap();
        let supervisor = Supervisor::new(registry.clone());
        (dir, registry, supervisor)
    }

    fn port_args() -> BTreeMap<String, String> {
        [("port".to_string(), "8888".to_string())].into()
    }

    #[test]
    fn test_status_unknown_and_empty_report() {
        let (_dir, _registry, supervisor) = scratch();
        assert_eq!(
            supervisor.status("ghost").unwrap(),
            ServiceStatus::NoSuchService
        );
        assert!(supervisor.status_all().unwrap().is_empty());
    }

    #[test]
    fn test_status_installed_but_never_run() {
        let (_dir, registry, supervisor) = scratch();
        install_fixture(&registry, "simple_http");
        assert_eq!(supervisor.status("simple_http").unwrap(), ServiceStatus::Stopped);
        let report = supervisor.status_all().unwrap();
        assert_eq!(report, vec![("simple_http".into(), ServiceStatus::Stopped)]);
    }

    #[tokio::test]
    async fn test_run_status_stop_cycle() {
        let (_dir, registry, supervisor) = scratch();
        install_fixture(&registry, "simple_http");

        let (_trigger, shutdown) = shutdown_channel();
        let runner = {
            let supervisor = Supervisor::new(registry.clone());
            tokio::spawn(async move {
                supervisor
                    .run_foreground(
                        "simple_http",
                        &port_args(),
                        SinkConfig::default(),
                        shutdown,
                        false,
                    )
                    .await
            })
        };

        // Wait until the instance record shows a live process.
        let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
        loop {
            if let ServiceStatus::Running { .. } = supervisor.status("simple_http").unwrap() {
                break;
            }
            assert!(tokio::time::Instant::now() < deadline, "service never ready");
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        supervisor.stop("simple_http").await.unwrap();
        runner.await.unwrap().unwrap();
        assert_eq!(
            supervisor.status("simple_http").unwrap(),
            ServiceStatus::Stopped
        );

        // Every line of the audit trail parses as JSON and the lifecycle
        // events are present.
        let content = std::fs::read_to_string(registry.debug_log_path()).unwrap();
        for line in content.lines() {
            serde_json::from_str::<serde_json::Value>(line).unwrap();
        }
        assert!(content.contains("starting service 'simple_http'"));
        assert!(content.contains("service 'simple_http' listening"));
    }

    #[tokio::test]
    async fn test_interrupt_terminates_child() {
        let (_dir, registry, supervisor) = scratch();
        install_fixture(&registry, "simple_http");

        let (trigger, shutdown) = shutdown_channel();
        let runner = {
            let supervisor = Supervisor::new(registry.clone());
            tokio::spawn(async move {
                supervisor
                    .run_foreground(
                        "simple_http",
                        &port_args(),
                        SinkConfig::default(),
                        shutdown,
                        false,
                    )
                    .await
            })
        };

        let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
        loop {
            if let ServiceStatus::Running { .. } = supervisor.status("simple_http").unwrap() {
                break;
            }
            assert!(tokio::time::Instant::now() < deadline, "service never ready");
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        trigger.trigger();
        runner.await.unwrap().unwrap();
        assert_eq!(
            supervisor.status("simple_http").unwrap(),
            ServiceStatus::Stopped
        );
    }

    #[tokio::test]
    async fn test_run_rejects_bad_args_before_spawn() {
        let (_dir, registry, supervisor) = scratch();
        install_fixture(&registry, "simple_http");

        let (_trigger, shutdown) = shutdown_channel();
        let raw = [("port".to_string(), "eighty".to_string())].into();
        let err = supervisor
            .run_foreground("simple_http", &raw, SinkConfig::default(), shutdown, false)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "port=eighty (must be integer)");
    }

    #[tokio::test]
    async fn test_stop_without_instance() {
        let (_dir, registry, supervisor) = scratch();
        install_fixture(&registry, "simple_http");
        let err = supervisor.stop("simple_http").await.unwrap_err();
        assert!(matches!(err, DecoyError::NotRunning(_)));
    }

    #[tokio::test]
    async fn test_test_publishes_alert_to_sinks() {
        let (dir, registry, supervisor) = scratch();
        install_fixture(&registry, "simple_http");

        let json_log = dir.path().join("external.json");
        let event = supervisor
            .test(
                "simple_http",
                SinkConfig {
                    json_log: Some(json_log.clone()),
                    syslog: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(event.field_str("act"), Some("simple_http"));

        for path in [registry.debug_log_path(), json_log] {
            let content = std::fs::read_to_string(&path).unwrap();
            let line = content.lines().last().unwrap();
            let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(parsed["act"], "simple_http");
            assert_eq!(parsed["request"], "GET /");
            assert_eq!(parsed["src"], "127.0.0.1");
        }
    }

    #[tokio::test]
    async fn test_test_unknown_service() {
        let (_dir, _registry, supervisor) = scratch();
        let err = supervisor
            .test("ghost", SinkConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DecoyError::NotFound(_)));
    }
}
