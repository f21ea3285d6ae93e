use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use tracing::{info, warn};

/// Persists interactively entered credentials for future shell sessions
pub trait ProfileWriter {
    fn persist(&self, name: &str, value: &str) -> io::Result<()>;
}

impl<W: ProfileWriter + ?Sized> ProfileWriter for &W {
    fn persist(&self, name: &str, value: &str) -> io::Result<()> {
        (**self).persist(name, value)
    }
}

/// Appends `export NAME=value` to a shell startup file.
///
/// Append-only: running setup twice writes the line twice.
pub struct ShellProfile {
    path: Option<PathBuf>,
}

impl ShellProfile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: Some(path.into()) }
    }

    /// `~/.bashrc`, or a no-op profile when HOME is not set
    pub fn bashrc() -> Self {
        Self {
            path: std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".bashrc")),
        }
    }
}

impl ProfileWriter for ShellProfile {
    fn persist(&self, name: &str, value: &str) -> io::Result<()> {
        let Some(path) = &self.path else {
            warn!("HOME is not set, {} will not be persisted", name);
            return Ok(());
        };

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        write!(file, "\nexport {}={}\n", name, value)?;

        info!("Persisted {} to {}", name, path.display());
        Ok(())
    }
}
