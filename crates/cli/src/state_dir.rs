//! Platform-specific state directory management

use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::warn;

/// Locates the directory holding the persisted session token
pub struct StateDir {
    /// Project directories from the directories crate
    project_dirs: Option<ProjectDirs>,
    /// Override directory for testing or custom installations
    override_dir: Option<PathBuf>,
}

impl StateDir {
    pub fn new() -> Self {
        let project_dirs = ProjectDirs::from("com", "Shopkeep", "shopkeep");
        if project_dirs.is_none() {
            warn!("Failed to determine platform-specific directories, will use fallback");
        }
        Self {
            project_dirs,
            override_dir: None,
        }
    }

    pub fn with_override(path: impl Into<PathBuf>) -> Self {
        Self {
            project_dirs: None,
            override_dir: Some(path.into()),
        }
    }

    /// Default location of the configuration file
    pub fn config_file(&self) -> PathBuf {
        if let Some(override_dir) = &self.override_dir {
            return override_dir.join("shopkeep.toml");
        }

        if let Some(project_dirs) = &self.project_dirs {
            project_dirs.config_dir().join("shopkeep.toml")
        } else {
            PathBuf::from("./.shopkeep/shopkeep.toml")
        }
    }

    /// Directory the token store writes into
    pub fn session_dir(&self) -> PathBuf {
        if let Some(override_dir) = &self.override_dir {
            return override_dir.join("session");
        }

        if let Some(project_dirs) = &self.project_dirs {
            project_dirs.data_local_dir().join("session")
        } else {
            // Fallback to current directory
            PathBuf::from("./.shopkeep/session")
        }
    }
}

impl Default for StateDir {
    fn default() -> Self {
        Self::new()
    }
}
