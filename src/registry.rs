//! On-disk service registry.
//!
//! The registry home is a single directory tree keyed by service name:
//!
//! ```text
//! <home>/
//!   decoy.debug.log        audit trail (JSON lines)
//!   services/<name>/       installed services, one directory each
//!   instances/<name>.json  runtime instance records
//!   logs/<name>.log        daemon worker logs
//!   .locks/<name>.lock     per-name write locks
//!   .staging/              installer scratch space
//! ```
//!
//! Every operation takes an explicit [`RegistryHandle`] instead of relying on
//! process-wide state, so tests run against disposable homes.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{DecoyError, Result};
use crate::manifest::{ServiceManifest, MANIFEST_FILE};
use crate::supervisor::is_process_running;

pub const DEBUG_LOG_FILE: &str = "decoy.debug.log";

#[derive(Debug, Clone)]
pub struct RegistryHandle {
    home: PathBuf,
}

/// A [`ServiceManifest`] bound to its location inside the registry home.
#[derive(Debug, Clone)]
pub struct InstalledService {
    pub manifest: ServiceManifest,
    pub root: PathBuf,
}

impl InstalledService {
    /// Absolute path of the service's executable entry point.
    pub fn entry_path(&self) -> PathBuf {
        let entry = Path::new(&self.manifest.entry);
        if entry.is_absolute() {
            entry.to_path_buf()
        } else {
            self.root.join(entry)
        }
    }
}

impl RegistryHandle {
    /// Open a registry home, creating the directory layout if needed.
    pub fn open(home: impl Into<PathBuf>) -> Result<Self> {
        let home = home.into();
        for dir in ["services", "instances", "logs", ".locks", ".staging"] {
            fs::create_dir_all(home.join(dir))?;
        }
        tracing::debug!(home = %home.display(), "Opened registry home");
        Ok(Self { home })
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn services_dir(&self) -> PathBuf {
        self.home.join("services")
    }

    pub fn instances_dir(&self) -> PathBuf {
        self.home.join("instances")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.home.join("logs")
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.home.join(".staging")
    }

    pub fn debug_log_path(&self) -> PathBuf {
        self.home.join(DEBUG_LOG_FILE)
    }

    pub fn service_dir(&self, name: &str) -> PathBuf {
        self.services_dir().join(name)
    }

    pub fn instance_path(&self, name: &str) -> PathBuf {
        self.instances_dir().join(format!("{}.json", name))
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.service_dir(name).join(MANIFEST_FILE).is_file()
    }

    /// Resolve a name to its installed service, or `NotFound`.
    pub fn resolve(&self, name: &str) -> Result<InstalledService> {
        let root = self.service_dir(name);
        let manifest_path = root.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Err(DecoyError::NotFound(name.to_string()));
        }
        let manifest = ServiceManifest::load(&manifest_path)?;
        Ok(InstalledService { manifest, root })
    }

    /// Lazily enumerate installed manifests. Unreadable entries surface as
    /// per-item errors rather than aborting the scan.
    pub fn list_local(&self) -> Result<impl Iterator<Item = Result<ServiceManifest>>> {
        let entries = fs::read_dir(self.services_dir())?;
        Ok(entries.filter_map(|entry| {
            let entry = entry.ok()?;
            let manifest_path = entry.path().join(MANIFEST_FILE);
            if !manifest_path.is_file() {
                return None;
            }
            Some(ServiceManifest::load(&manifest_path))
        }))
    }

    /// Claim the per-name write lock. Install, uninstall and run for the same
    /// name are mutually exclusive; a held lock fails fast with
    /// `OperationInProgress`. A lock whose holder is dead is reclaimed.
    pub fn lock(&self, name: &str) -> Result<NameLock> {
        let path = self.home.join(".locks").join(format!("{}.lock", name));
        match NameLock::claim(&path) {
            Ok(lock) => Ok(lock),
            Err(_) if Self::lock_is_stale(&path) => {
                tracing::warn!(name, "Removing stale lock from dead process");
                fs::remove_file(&path).ok();
                NameLock::claim(&path)
                    .map_err(|_| DecoyError::OperationInProgress(name.to_string()))
            }
            Err(_) => Err(DecoyError::OperationInProgress(name.to_string())),
        }
    }

    fn lock_is_stale(path: &Path) -> bool {
        match fs::read_to_string(path) {
            Ok(content) => match content.trim().parse::<u32>() {
                Ok(pid) => !is_process_running(pid),
                Err(_) => true,
            },
            Err(_) => false,
        }
    }
}

/// Holds the per-name lock marker; removed on drop.
#[derive(Debug)]
pub struct NameLock {
    path: PathBuf,
}

impl NameLock {
    fn claim(path: &Path) -> std::io::Result<Self> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        write!(file, "{}", std::process::id())?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }
}

impl Drop for NameLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), "Failed to release lock: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_registry() -> (tempfile::TempDir, RegistryHandle) {
        let dir = tempfile::tempdir().unwrap();
        let registry = RegistryHandle::open(dir.path()).unwrap();
        (dir, registry)
    }

    fn install_fixture(registry: &RegistryHandle, name: &str) {
        let root = registry.service_dir(name);
        fs::create_dir_all(&root).unwrap();
        fs::write(
            root.join(MANIFEST_FILE),
            format!(
                "[service]\nname = \"{}\"\nversion = \"0.1.0\"\nentry = \"run.sh\"\n",
                name
            ),
        )
        .unwrap();
    }

    #[test]
    fn test_resolve_not_found() {
        let (_dir, registry) = scratch_registry();
        let err = registry.resolve("ghost").unwrap_err();
        assert!(matches!(err, DecoyError::NotFound(n) if n == "ghost"));
    }

    #[test]
    fn test_resolve_installed() {
        let (_dir, registry) = scratch_registry();
        install_fixture(&registry, "simple_http");
        let svc = registry.resolve("simple_http").unwrap();
        assert_eq!(svc.manifest.name, "simple_http");
        assert!(svc.entry_path().ends_with("services/simple_http/run.sh"));
    }

    #[test]
    fn test_list_local_empty_then_populated() {
        let (_dir, registry) = scratch_registry();
        assert_eq!(registry.list_local().unwrap().count(), 0);

        install_fixture(&registry, "a_svc");
        install_fixture(&registry, "b_svc");
        let names: Vec<String> = registry
            .list_local()
            .unwrap()
            .map(|m| m.unwrap().name)
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"a_svc".to_string()));
    }

    #[test]
    fn test_lock_conflicts_and_releases() {
        let (_dir, registry) = scratch_registry();
        let lock = registry.lock("simple_http").unwrap();
        let err = registry.lock("simple_http").unwrap_err();
        assert!(matches!(err, DecoyError::OperationInProgress(_)));

        drop(lock);
        registry.lock("simple_http").unwrap();
    }

    #[test]
    fn test_stale_lock_reclaimed() {
        let (_dir, registry) = scratch_registry();
        let path = registry.home().join(".locks/simple_http.lock");
        // A pid that cannot be a live process on any test machine.
        fs::write(&path, "999999999").unwrap();
        registry.lock("simple_http").unwrap();
    }
}
