//! Event sinks: independent delivery targets for structured events.
//!
//! The debug sink is always active and is the canonical audit trail; the
//! JSON-file and syslog/CEF sinks are enabled per run by [`SinkConfig`].

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::net::UdpSocket;

use crate::error::Result;
use crate::events::event::{Event, Severity, FIELD_ACT, FIELD_REQUEST, FIELD_SRC};

/// Run-time sink selection, passed through to daemon workers and service
/// processes as JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Extra JSON-lines log for external ingestion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_log: Option<PathBuf>,
    /// Syslog/CEF destination as `host:port` (UDP).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syslog: Option<String>,
}

/// Append-only JSON-lines log. Each record is one `write` of a single line,
/// so concurrent writers (CLI process, daemon workers) interleave at line
/// granularity and every line stays valid JSON.
#[derive(Debug, Clone)]
pub struct DebugLog {
    path: PathBuf,
}

impl DebugLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, event: &Event) -> Result<()> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

#[async_trait]
pub trait Sink: Send + Sync + 'static {
    async fn deliver(&self, event: &Event) -> Result<()>;

    /// Human-readable name (for drop warnings and failure records).
    fn name(&self) -> &'static str;

    /// Capacity of this sink's delivery queue.
    fn queue_capacity(&self) -> usize {
        256
    }

    /// Upper bound for a single delivery attempt.
    fn write_timeout(&self) -> Duration {
        Duration::from_secs(3)
    }
}

/// Always-active sink appending to the registry's debug log.
pub struct DebugSink {
    log: Arc<DebugLog>,
}

#[async_trait]
impl Sink for DebugSink {
    async fn deliver(&self, event: &Event) -> Result<()> {
        self.log.append(event)
    }

    fn name(&self) -> &'static str {
        "debug"
    }
}

/// Optional operator-specified JSON-lines file.
pub struct JsonFileSink {
    log: DebugLog,
}

#[async_trait]
impl Sink for JsonFileSink {
    async fn deliver(&self, event: &Event) -> Result<()> {
        self.log.append(event)
    }

    fn name(&self) -> &'static str {
        "json-file"
    }
}

/// Optional syslog sink sending one CEF line per event over UDP.
pub struct SyslogSink {
    target: String,
    socket: UdpSocket,
}

impl SyslogSink {
    pub async fn bind(target: &str) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        Ok(Self {
            target: target.to_string(),
            socket,
        })
    }
}

#[async_trait]
impl Sink for SyslogSink {
    async fn deliver(&self, event: &Event) -> Result<()> {
        let line = cef_line(event);
        self.socket.send_to(line.as_bytes(), &self.target).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "syslog"
    }
}

/// Render an event as a single CEF line:
/// `CEF:0|vendor|product|version|signature|name|severity|extensions`.
pub fn cef_line(event: &Event) -> String {
    let severity = match event.severity {
        Severity::Info => 3,
        Severity::Warning => 6,
        Severity::Critical => 9,
    };

    let mut extensions = Vec::new();
    for key in [FIELD_ACT, FIELD_REQUEST, FIELD_SRC] {
        if let Some(value) = event.field_str(key) {
            extensions.push(format!("{}={}", key, cef_escape(value)));
        }
    }
    for (key, value) in &event.fields {
        if [FIELD_ACT, FIELD_REQUEST, FIELD_SRC].contains(&key.as_str()) {
            continue;
        }
        let value = value
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string());
        extensions.push(format!("{}={}", key, cef_escape(&value)));
    }

    format!(
        "CEF:0|decoy|decoy|{}|{}|{}|{}|{}",
        env!("CARGO_PKG_VERSION"),
        cef_header_escape(&event.event_type),
        cef_header_escape(&event.message),
        severity,
        extensions.join(" ")
    )
}

fn cef_escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('=', "\\=")
        .replace('\n', " ")
}

fn cef_header_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('|', "\\|")
}

/// Assemble the sink set for one run: debug sink always, the rest per config.
pub async fn build_sinks(debug: Arc<DebugLog>, config: &SinkConfig) -> Result<Vec<Arc<dyn Sink>>> {
    let mut sinks: Vec<Arc<dyn Sink>> = vec![Arc::new(DebugSink { log: debug })];
    if let Some(path) = &config.json_log {
        sinks.push(Arc::new(JsonFileSink {
            log: DebugLog::new(path),
        }));
    }
    if let Some(target) = &config.syslog {
        sinks.push(Arc::new(SyslogSink::bind(target).await?));
    }
    Ok(sinks)
}
