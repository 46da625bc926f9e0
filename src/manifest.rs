//! Service manifest: the packaged metadata describing an installable decoy
//! service (identity, advisory ports, alert categories, argument schema).
//!
//! Parsed once at install time from `service.toml` at the root of the service
//! package; immutable afterwards.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DecoyError, Result};

/// Manifest file name inside a service package.
pub const MANIFEST_FILE: &str = "service.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceManifest {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Executable entry point, relative to the service directory or absolute.
    pub entry: String,
    /// Alert categories this service may raise.
    #[serde(default)]
    pub alerts: Vec<String>,
    /// Advisory: ports the service intends to listen on.
    #[serde(default)]
    pub ports: Vec<PortSpec>,
    /// Ordered argument schema.
    #[serde(default)]
    pub arguments: Vec<ArgSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortSpec {
    pub port: u16,
    pub protocol: String,
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.port, self.protocol)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArgSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ArgType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ArgValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArgType {
    #[serde(rename = "int", alias = "integer")]
    Int,
    #[serde(rename = "bool", alias = "boolean")]
    Bool,
    #[serde(rename = "string")]
    String,
}

impl ArgType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArgType::Int => "int",
            ArgType::Bool => "bool",
            ArgType::String => "string",
        }
    }
}

/// A typed argument value, either a schema default or a validated user input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Int(i64),
    Bool(bool),
    Str(String),
}

impl ArgValue {
    pub fn matches(&self, kind: ArgType) -> bool {
        matches!(
            (self, kind),
            (ArgValue::Int(_), ArgType::Int)
                | (ArgValue::Bool(_), ArgType::Bool)
                | (ArgValue::Str(_), ArgType::String)
        )
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Int(v) => write!(f, "{}", v),
            ArgValue::Bool(v) => write!(f, "{}", v),
            ArgValue::Str(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Deserialize)]
struct ManifestFile {
    service: ServiceManifest,
}

impl ServiceManifest {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ManifestFile =
            toml::from_str(content).map_err(|e| DecoyError::Manifest(e.to_string()))?;
        let manifest = file.service;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DecoyError::Manifest(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(DecoyError::Manifest("service name is empty".into()));
        }
        if self.version.is_empty() {
            return Err(DecoyError::Manifest("service version is empty".into()));
        }
        if self.entry.is_empty() {
            return Err(DecoyError::Manifest("service entry point is empty".into()));
        }
        for arg in &self.arguments {
            if let Some(default) = &arg.default {
                if !default.matches(arg.kind) {
                    return Err(DecoyError::Manifest(format!(
                        "default for argument '{}' does not match declared type {}",
                        arg.name,
                        arg.kind.as_str()
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [service]
        name = "simple_http"
        version = "0.1.0"
        description = "Emulated HTTP server"
        entry = "bin/simple_http"
        alerts = ["simple_http"]

        [[service.ports]]
        port = 8888
        protocol = "TCP"

        [[service.arguments]]
        name = "port"
        type = "int"
        required = true

        [[service.arguments]]
        name = "banner"
        type = "string"
        default = "Apache/2.4.41"
    "#;

    #[test]
    fn test_parse_manifest() {
        let m = ServiceManifest::from_toml_str(SAMPLE).unwrap();
        assert_eq!(m.name, "simple_http");
        assert_eq!(m.ports[0].to_string(), "8888/TCP");
        assert_eq!(m.arguments.len(), 2);
        assert!(m.arguments[0].required);
        assert_eq!(
            m.arguments[1].default,
            Some(ArgValue::Str("Apache/2.4.41".into()))
        );
    }

    #[test]
    fn test_type_aliases() {
        let m = ServiceManifest::from_toml_str(
            r#"
            [service]
            name = "x"
            version = "1"
            entry = "run"

            [[service.arguments]]
            name = "port"
            type = "integer"

            [[service.arguments]]
            name = "debug"
            type = "boolean"
            "#,
        )
        .unwrap();
        assert_eq!(m.arguments[0].kind, ArgType::Int);
        assert_eq!(m.arguments[1].kind, ArgType::Bool);
    }

    #[test]
    fn test_missing_required_field() {
        let err = ServiceManifest::from_toml_str("[service]\nname = \"x\"\n").unwrap_err();
        assert!(matches!(err, DecoyError::Manifest(_)));
    }

    #[test]
    fn test_default_type_mismatch() {
        let err = ServiceManifest::from_toml_str(
            r#"
            [service]
            name = "x"
            version = "1"
            entry = "run"

            [[service.arguments]]
            name = "port"
            type = "int"
            default = "eighty"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, DecoyError::Manifest(_)));
    }
}
