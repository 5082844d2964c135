/// On-disk container registry
use crate::config::types::RegistryError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Name of the per-container state file
pub const STATE_FILE: &str = "state.json";

/// Sandbox backing a container, as recorded when it was started
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxState {
    pub id: String,
    pub pid: i32,
    /// Unix socket serving the sandbox control API
    pub control_socket: PathBuf,
}

/// Persistent container record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerState {
    pub id: String,
    #[serde(default)]
    pub sandbox: Option<SandboxState>,
}

impl ContainerState {
    /// PID of the sandbox process, or 0 when the container has no sandbox
    pub fn sandbox_pid(&self) -> i32 {
        self.sandbox.as_ref().map_or(0, |sandbox| sandbox.pid)
    }
}

/// Enumerates and loads containers
pub trait ContainerRegistry {
    /// Container IDs in a deterministic order for a fixed registry state
    fn list(&self) -> Result<Vec<String>, RegistryError>;

    fn load(&self, id: &str) -> Result<ContainerState, RegistryError>;
}

/// Registry backed by `<root>/<id>/state.json`
#[derive(Clone, Debug)]
pub struct FsRegistry {
    root: PathBuf,
}

impl FsRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn state_path(&self, id: &str) -> PathBuf {
        self.root.join(id).join(STATE_FILE)
    }

    /// Persist a container record, creating its directory as needed
    pub fn save(&self, state: &ContainerState) -> Result<(), RegistryError> {
        let dir = self.root.join(&state.id);
        fs::create_dir_all(&dir).map_err(|source| RegistryError::Io {
            path: dir.clone(),
            source,
        })?;

        let path = self.state_path(&state.id);
        let content = serde_json::to_vec_pretty(state).map_err(|source| RegistryError::Corrupt {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, content).map_err(|source| RegistryError::Io { path, source })
    }
}

impl ContainerRegistry for FsRegistry {
    fn list(&self) -> Result<Vec<String>, RegistryError> {
        let entries = fs::read_dir(&self.root).map_err(|source| RegistryError::Io {
            path: self.root.clone(),
            source,
        })?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| RegistryError::Io {
                path: self.root.clone(),
                source,
            })?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if entry.path().join(STATE_FILE).is_file() {
                ids.push(name);
            }
        }

        ids.sort();
        debug!("Found {} containers under {}", ids.len(), self.root.display());
        Ok(ids)
    }

    fn load(&self, id: &str) -> Result<ContainerState, RegistryError> {
        if id.is_empty() || id.contains('/') || id == "." || id == ".." {
            return Err(RegistryError::Missing(id.to_string()));
        }

        let path = self.state_path(id);
        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RegistryError::Missing(id.to_string()));
            }
            Err(source) => return Err(RegistryError::Io { path, source }),
        };

        serde_json::from_slice(&content).map_err(|source| RegistryError::Corrupt { path, source })
    }
}
