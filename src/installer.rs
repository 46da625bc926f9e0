//! Service installer: materializes a service package into the registry home
//! from a local directory, a local archive or the remote catalog, and
//! reverses the process on uninstall.
//!
//! Installs are all-or-nothing: the package is staged under `.staging/`,
//! its manifest parsed and checked, and only then atomically renamed into
//! `services/<name>`. A failed install never leaves a partial directory
//! visible.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::catalog::CatalogClient;
use crate::error::{DecoyError, Result};
use crate::manifest::{ServiceManifest, MANIFEST_FILE};
use crate::registry::RegistryHandle;

/// Where an installable service comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallSource {
    /// Service name, fetched from the remote catalog.
    Catalog(String),
    /// Local directory containing the service package.
    Dir(PathBuf),
    /// Local `.zip` / `.tar.gz` / `.tgz` archive.
    Archive(PathBuf),
}

impl InstallSource {
    /// Auto-detect the source kind from a user-supplied string.
    pub fn detect(source: &str) -> Self {
        let path = Path::new(source);
        if path.is_dir() {
            return InstallSource::Dir(path.to_path_buf());
        }
        if path.is_file() && is_archive(path) {
            return InstallSource::Archive(path.to_path_buf());
        }
        InstallSource::Catalog(source.to_string())
    }
}

fn is_archive(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    name.ends_with(".zip") || name.ends_with(".tar.gz") || name.ends_with(".tgz")
}

pub struct Installer {
    registry: RegistryHandle,
    catalog: CatalogClient,
}

impl Installer {
    pub fn new(registry: RegistryHandle, catalog: CatalogClient) -> Self {
        Self { registry, catalog }
    }

    /// Install a service. Returns the parsed manifest on success.
    pub async fn install(&self, source: InstallSource, force: bool) -> Result<ServiceManifest> {
        let staging = Staging::create(&self.registry)?;

        let package_root = match &source {
            InstallSource::Dir(path) => {
                copy_dir_all(path, staging.path())?;
                staging.path().to_path_buf()
            }
            InstallSource::Archive(path) => {
                let bytes = fs::read(path)?;
                if path.extension().is_some_and(|e| e == "zip") {
                    unpack_zip(&bytes, staging.path())?;
                } else {
                    unpack_tar_gz(&bytes, staging.path())?;
                }
                package_root(staging.path())?
            }
            InstallSource::Catalog(name) => {
                let bytes = self.catalog.fetch(name).await?;
                unpack_tar_gz(&bytes, staging.path())?;
                package_root(staging.path())?
            }
        };

        let manifest = ServiceManifest::load(&package_root.join(MANIFEST_FILE))?;
        let _lock = self.registry.lock(&manifest.name)?;

        let target = self.registry.service_dir(&manifest.name);
        if target.exists() {
            if !force {
                return Err(DecoyError::AlreadyInstalled(manifest.name.clone()));
            }
            tracing::info!(name = %manifest.name, "Overwriting existing installation");
            fs::remove_dir_all(&target)?;
        }

        // Staging lives inside the registry home, so the rename is atomic.
        fs::rename(&package_root, &target)?;
        tracing::info!(name = %manifest.name, version = %manifest.version, "Installed service");

        Ok(manifest)
    }

    /// Remove an installed service and its runtime leftovers. The caller is
    /// responsible for having obtained the operator's confirmation.
    pub fn uninstall(&self, name: &str) -> Result<()> {
        let _lock = self.registry.lock(name)?;

        if !self.registry.is_installed(name) {
            return Err(DecoyError::NotFound(name.to_string()));
        }

        fs::remove_dir_all(self.registry.service_dir(name))?;
        for leftover in [
            self.registry.instance_path(name),
            self.registry.logs_dir().join(format!("{}.log", name)),
        ] {
            if leftover.exists() {
                fs::remove_file(&leftover)?;
            }
        }
        tracing::info!(name, "Uninstalled service");
        Ok(())
    }
}

/// Scratch directory for one install attempt; removed on drop so a failed
/// install leaves nothing behind.
struct Staging {
    path: PathBuf,
}

impl Staging {
    fn create(registry: &RegistryHandle) -> Result<Self> {
        static STAGE_SEQ: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);
        let seq = STAGE_SEQ.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let path = registry
            .staging_dir()
            .join(format!("stage-{}-{}", std::process::id(), seq));
        if path.exists() {
            fs::remove_dir_all(&path)?;
        }
        fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Staging {
    fn drop(&mut self) {
        if self.path.exists() {
            fs::remove_dir_all(&self.path).ok();
        }
    }
}

/// Locate the manifest-bearing root inside an unpacked archive: either the
/// staging dir itself, or a single top-level directory wrapping the package.
fn package_root(staging: &Path) -> Result<PathBuf> {
    if staging.join(MANIFEST_FILE).is_file() {
        return Ok(staging.to_path_buf());
    }
    let entries: Vec<_> = fs::read_dir(staging)?.filter_map(|e| e.ok()).collect();
    if entries.len() == 1 && entries[0].path().is_dir() {
        let inner = entries[0].path();
        if inner.join(MANIFEST_FILE).is_file() {
            return Ok(inner);
        }
    }
    Err(DecoyError::Manifest(format!(
        "package does not contain {}",
        MANIFEST_FILE
    )))
}

fn unpack_tar_gz(bytes: &[u8], dest: &Path) -> Result<()> {
    let decoder = flate2::read::GzDecoder::new(bytes);
    let mut archive = tar::Archive::new(decoder);
    archive.unpack(dest)?;
    Ok(())
}

fn unpack_zip(bytes: &[u8], dest: &Path) -> Result<()> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| DecoyError::Manifest(format!("unreadable zip archive: {}", e)))?;
    archive
        .extract(dest)
        .map_err(|e| DecoyError::Manifest(format!("zip extraction failed: {}", e)))?;
    Ok(())
}

fn copy_dir_all(src: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
