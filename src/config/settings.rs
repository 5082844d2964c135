//! Runtime settings shared by every debug invocation.

use std::path::PathBuf;

/// Environment variable overriding the container root directory
pub const ROOT_ENV: &str = "SANDBOXCTL_ROOT";

/// Default log filter when neither `--log-filter` nor `RUST_LOG` is set
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DebugSettings {
    /// Directory holding one state directory per container
    pub root_dir: PathBuf,
    pub log_filter: Option<String>,
}

impl DebugSettings {
    /// Resolve settings: explicit flag, then environment, then the per-user runtime root.
    pub fn resolve(root_flag: Option<PathBuf>, log_filter: Option<String>) -> Self {
        let root_dir = root_flag
            .or_else(|| {
                std::env::var_os(ROOT_ENV)
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
            })
            .unwrap_or_else(Self::runtime_root_dir);

        Self {
            root_dir,
            log_filter,
        }
    }

    /// UID-scoped default root so unprivileged users never share state
    pub fn runtime_root_dir() -> PathBuf {
        let euid = nix::unistd::geteuid();
        std::env::temp_dir().join(format!("sandbox-uid-{}", euid))
    }
}
