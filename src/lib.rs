pub mod catalog;
pub mod clienv;
pub mod error;
pub mod events;
pub mod installer;
pub mod manifest;
pub mod registry;
pub mod supervisor;
pub mod validator;

pub use error::{DecoyError, Result};
pub use installer::{InstallSource, Installer};
pub use registry::RegistryHandle;
pub use supervisor::Supervisor;
