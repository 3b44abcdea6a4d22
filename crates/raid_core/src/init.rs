use cap_std::{ambient_authority, fs_utf8::camino::Utf8PathBuf, fs_utf8::Dir};
use miette::{Context, IntoDiagnostic, Result};

/// Raidmap data directory
/// We will read a path from env `RAIDMAP_DATA_DIR` or use data_local_dir/raidmap, where data_local_dir is platform specific
/// Inside this directory, we will store all of raidmap's data like configuration, storage values, logs etc..
pub const DATA_DIR_ENV: &str = "RAIDMAP_DATA_DIR";

pub fn get_raidmap_path() -> Result<Utf8PathBuf> {
    if let Ok(env_dir) = std::env::var(DATA_DIR_ENV) {
        return Ok(Utf8PathBuf::from(env_dir));
    }
    let project_dir = directories_next::ProjectDirs::from("com.raidmap", "", "raidmap")
        .ok_or(miette::miette!("getting project path failed for some reason"))?;
    Utf8PathBuf::from_path_buf(project_dir.data_local_dir().to_path_buf())
        .map_err(|p| miette::miette!("data directory {p:?} is not valid utf-8"))
}

pub fn get_raidmap_dir(raidmap_path: &Utf8PathBuf) -> Result<Dir> {
    let authoratah = ambient_authority();
    Dir::create_ambient_dir_all(raidmap_path, authoratah)
        .into_diagnostic()
        .wrap_err(raidmap_path.clone())
        .wrap_err("failed to create raidmap directory")?;
    Dir::open_ambient_dir(raidmap_path, authoratah)
        .into_diagnostic()
        .wrap_err(raidmap_path.clone())
        .wrap_err("failed to open raidmap data dir")
}
