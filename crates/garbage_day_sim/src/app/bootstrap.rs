use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use garbage_day::{
    load_map_file, load_or_create_config, ConfigError, GameDate, GarbageDay, LootEngine,
    LootTableError, LootTables, MapData, MapIdentity, MapLoadError, Role, WorldHost,
};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::paths::{resolve_sim_paths, SimPaths, StartupError};
use super::save::{load_save, SaveError};
use super::world::{load_world_file, SimWorld, WorldFileError};

const DAYS_ENV_VAR: &str = "GARBAGE_DAY_DAYS";
const DEFAULT_DAYS: u32 = 7;
const MAP_FILE_EXTENSION: &str = "xml";

pub(crate) struct AppWiring {
    pub(crate) paths: SimPaths,
    pub(crate) days: u32,
    pub(crate) start_date: GameDate,
    pub(crate) session: GarbageDay<LootTables>,
    pub(crate) world: SimWorld,
    /// Unpatched map assets by identity, as a content loader would serve them.
    pub(crate) maps: BTreeMap<MapIdentity, MapData>,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Paths(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Loot(#[from] LootTableError),
    #[error(transparent)]
    World(#[from] WorldFileError),
    #[error(transparent)]
    Map(#[from] MapLoadError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error("failed to list map directory {path}: {source}")]
    ReadMapsDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("location '{location}' needs map '{map}' but no map file declares it")]
    MissingMap { location: String, map: MapIdentity },
    #[error("{var} must be a whole number of days, got '{value}'")]
    InvalidDays { var: &'static str, value: String },
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Garbage Day Sim Startup ===");

    let paths = resolve_sim_paths()?;
    let days = parse_days_from_env()?;
    build_from_paths(paths, days)
}

pub(crate) fn build_from_paths(paths: SimPaths, days: u32) -> Result<AppWiring, BootstrapError> {
    let config = load_or_create_config(&paths.config_file)?;
    let loot = LootTables::load(&paths.loot_file)?;
    let mut world = SimWorld::from_file(load_world_file(&paths.world_file)?);
    let maps = load_maps(&paths.maps_dir)?;

    for location in world.loaded_locations() {
        if !maps.contains_key(&location.map) {
            return Err(BootstrapError::MissingMap {
                location: location.id.to_string(),
                map: location.map,
            });
        }
    }

    let start_date = match load_save(&paths.save_file)? {
        Some(save) => {
            let date = save.restore_into(&mut world);
            info!(date = %date, path = %paths.save_file.display(), "save_restored");
            date
        }
        None => GameDate::first(),
    };

    let mut session = GarbageDay::new(config, LootEngine::new(loot), Role::Authority);
    session.init();
    info!(
        root = %paths.root.display(),
        maps = maps.len(),
        days,
        start = %start_date,
        "sim_ready"
    );

    Ok(AppWiring {
        paths,
        days,
        start_date,
        session,
        world,
        maps,
    })
}

fn load_maps(dir: &Path) -> Result<BTreeMap<MapIdentity, MapData>, BootstrapError> {
    let entries = fs::read_dir(dir).map_err(|source| BootstrapError::ReadMapsDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .is_some_and(|extension| extension == MAP_FILE_EXTENSION)
        })
        .collect::<Vec<_>>();
    files.sort();

    let mut maps = BTreeMap::new();
    for path in files {
        let loaded = load_map_file(&path)?;
        if maps.contains_key(&loaded.identity) {
            warn!(
                map = %loaded.identity,
                path = %path.display(),
                "duplicate_map_identity_ignored"
            );
            continue;
        }
        maps.insert(loaded.identity, loaded.data);
    }
    Ok(maps)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn parse_days_from_env() -> Result<u32, BootstrapError> {
    match env::var(DAYS_ENV_VAR) {
        Ok(raw) => parse_days(&raw),
        Err(_) => Ok(DEFAULT_DAYS),
    }
}

fn parse_days(raw: &str) -> Result<u32, BootstrapError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| BootstrapError::InvalidDays {
            var: DAYS_ENV_VAR,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_must_be_a_whole_number() {
        assert_eq!(parse_days(" 12 ").expect("days"), 12);
        assert!(matches!(
            parse_days("three"),
            Err(BootstrapError::InvalidDays { .. })
        ));
        assert!(parse_days("-1").is_err());
    }
}
