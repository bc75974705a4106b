use crate::mordhau;
use anyhow::{bail, Context, Result};
use directories::BaseDirs;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

const CONFIG_FILENAME: &str = "game-path.txt";
/// Alternate config under ~/.config so the binary and its config can live
/// apart on Linux.
const XDG_CONFIG_FILENAME: &str = "mordmend";

/// Resolve the mods directory: an explicit override wins, otherwise the
/// configured game root plus the mod.io layout. The directory must exist;
/// there is nothing useful to do without it.
pub fn resolve_mods_dir(override_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        if !dir.is_dir() {
            bail!("mods directory not found: {}", dir.display());
        }
        return Ok(dir.to_path_buf());
    }

    let config_path = find_config_file()?;
    tracing::debug!("using game path config {}", config_path.display());
    let game_root = read_game_root(&config_path)?;
    let mods_dir = mordhau::mods_dir(&game_root);
    if !mods_dir.is_dir() {
        bail!(
            "mods directory not found: {} (is the game path in {} correct?)",
            mods_dir.display(),
            config_path.display()
        );
    }
    Ok(mods_dir)
}

/// The config is a single line of text: the game installation root.
fn read_game_root(config_path: &Path) -> Result<PathBuf> {
    let raw = fs::read_to_string(config_path)
        .with_context(|| format!("read {}", config_path.display()))?;
    let line = raw.lines().next().unwrap_or("").trim();
    if line.is_empty() {
        bail!("config file {} is empty", config_path.display());
    }
    Ok(PathBuf::from(line))
}

fn find_config_file() -> Result<PathBuf> {
    if let Some(path) = exe_side_config() {
        return Ok(path);
    }
    if let Some(path) = xdg_config() {
        return Ok(path);
    }
    bail!(
        "could not find {CONFIG_FILENAME} next to the executable or \
         {XDG_CONFIG_FILENAME} in your config directory"
    );
}

fn exe_side_config() -> Option<PathBuf> {
    let exe = env::current_exe().ok()?;
    let path = exe.parent()?.join(CONFIG_FILENAME);
    path.is_file().then_some(path)
}

fn xdg_config() -> Option<PathBuf> {
    let base = BaseDirs::new()?;
    let path = base.config_dir().join(XDG_CONFIG_FILENAME);
    path.is_file().then_some(path)
}
