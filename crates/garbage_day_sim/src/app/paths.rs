use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub(crate) const ROOT_ENV_VAR: &str = "GARBAGE_DAY_ROOT";

#[derive(Debug, Clone)]
pub(crate) struct SimPaths {
    pub(crate) root: PathBuf,
    pub(crate) maps_dir: PathBuf,
    pub(crate) loot_file: PathBuf,
    pub(crate) world_file: PathBuf,
    pub(crate) config_file: PathBuf,
    pub(crate) save_file: PathBuf,
}

impl SimPaths {
    pub(crate) fn under(root: PathBuf) -> Self {
        let data_dir = root.join("data");
        Self {
            maps_dir: data_dir.join("maps"),
            loot_file: data_dir.join("loot.json"),
            world_file: data_dir.join("world.json"),
            config_file: data_dir.join(garbage_day::CONFIG_FILE_NAME),
            save_file: root.join("cache").join("saves").join("garbage_day.json"),
            root,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error("{env_var}={path} has no Cargo.toml and data/ directory")]
    InvalidEnvRoot {
        path: PathBuf,
        env_var: &'static str,
    },
    #[error(
        "no directory with Cargo.toml and data/ found above {start_dir}; set {env_var} to the sim root"
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub(crate) fn resolve_sim_paths() -> Result<SimPaths, StartupError> {
    resolve_root().map(SimPaths::under)
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => explicit_root(Path::new(&value)),
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;
            search_upward(exe_dir)
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

/// A root named in the environment is taken as-is but must already hold the
/// sim's data.
fn explicit_root(path: &Path) -> Result<PathBuf, StartupError> {
    let root = normalize_path(path);
    if !is_root_marker(&root) {
        return Err(StartupError::InvalidEnvRoot {
            path: root,
            env_var: ROOT_ENV_VAR,
        });
    }
    Ok(root)
}

/// Nearest directory at or above `start` that looks like a root.
fn search_upward(start: &Path) -> Result<PathBuf, StartupError> {
    match start.ancestors().find(|candidate| is_root_marker(candidate)) {
        Some(root) => Ok(normalize_path(root)),
        None => Err(StartupError::RootNotFound {
            start_dir: normalize_path(start),
            env_var: ROOT_ENV_VAR,
        }),
    }
}

fn is_root_marker(path: &Path) -> bool {
    path.join("Cargo.toml").is_file() && path.join("data").is_dir()
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
