use directories::ProjectDirs;
use std::path::PathBuf;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "orderly", "orderly")
}

/// Where `orderly.{toml,yaml,json}` is looked up, if the platform has a
/// config directory at all.
pub fn user_config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Default cache and blob root.
///
/// Falls back to `.orderly` in the working directory on platforms without a
/// data directory, and to a relative path (which fails validation) if even
/// that can't be resolved.
pub fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .or_else(|| std::env::current_dir().ok().map(|cwd| cwd.join(".orderly")))
        .unwrap_or_else(|| PathBuf::from(".orderly"))
}
