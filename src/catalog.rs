//! Remote service catalog client.
//!
//! The catalog is an HTTP tree: `catalog.json` at the base URL lists the
//! available services, and each service is packaged as `<name>.tar.gz` next
//! to it.

use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::clienv;
use crate::error::{DecoyError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Deserialize)]
struct CatalogIndex {
    services: Vec<CatalogEntry>,
}

pub struct CatalogClient {
    base_url: String,
    http: reqwest::Client,
}

impl Default for CatalogClient {
    fn default() -> Self {
        Self::new(&clienv::catalog_url())
    }
}

impl CatalogClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Fetch the catalog index.
    pub async fn list(&self) -> Result<Vec<CatalogEntry>> {
        let url = format!("{}/catalog.json", self.base_url);
        tracing::debug!(url = %url, "Fetching catalog index");
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(DecoyError::Catalog(format!(
                "catalog index request failed: {}",
                response.status()
            )));
        }
        let index: CatalogIndex = response
            .json()
            .await
            .map_err(|e| DecoyError::Catalog(format!("malformed catalog index: {}", e)))?;
        Ok(index.services)
    }

    /// Look up one entry by name.
    pub async fn entry(&self, name: &str) -> Result<CatalogEntry> {
        self.list()
            .await?
            .into_iter()
            .find(|e| e.name == name)
            .ok_or_else(|| DecoyError::NotFound(name.to_string()))
    }

    /// Download a service package (`<name>.tar.gz`) with a progress bar.
    pub async fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        let url = format!("{}/{}.tar.gz", self.base_url, name);
        tracing::debug!(url = %url, "Downloading service package");

        let response = self.http.get(&url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(DecoyError::NotFound(name.to_string()));
        }
        if !response.status().is_success() {
            return Err(DecoyError::Catalog(format!(
                "download of '{}' failed: {}",
                name,
                response.status()
            )));
        }

        let total = response.content_length().unwrap_or(0);
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                .unwrap()
                .progress_chars("#>-"),
        );

        let mut bytes = Vec::with_capacity(total as usize);
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            bytes.extend_from_slice(&chunk);
            pb.set_position(bytes.len() as u64);
        }
        pb.finish_and_clear();

        Ok(bytes)
    }
}
