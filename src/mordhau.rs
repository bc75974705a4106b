use std::path::{Path, PathBuf};

pub const GAME_NAME: &str = "Mordhau";

/// Sidecar the in-game mod.io client writes next to every installed mod.
pub const MODIO_SIDECAR: &str = "modio.json";

pub const PAK_EXT: &str = ".pak";
pub const CLIENT_PAK_SUFFIX: &str = "WindowsClient.pak";
pub const SERVER_PAK_SUFFIX: &str = "Server.pak";

/// Where the mod.io client keeps installed mods, one subdirectory per mod,
/// relative to the game installation root.
pub fn mods_dir(game_root: &Path) -> PathBuf {
    game_root
        .join(GAME_NAME)
        .join("Content")
        .join(".modio")
        .join("mods")
}

pub fn is_pak(name: &str) -> bool {
    name.ends_with(PAK_EXT)
}

pub fn is_client_pak(name: &str) -> bool {
    name.ends_with(CLIENT_PAK_SUFFIX)
}

pub fn is_server_pak(name: &str) -> bool {
    name.ends_with(SERVER_PAK_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mods_dir_follows_modio_layout() {
        let dir = mods_dir(Path::new("/games"));
        assert_eq!(
            dir,
            Path::new("/games/Mordhau/Content/.modio/mods").to_path_buf()
        );
    }

    #[test]
    fn client_pak_is_also_a_pak() {
        assert!(is_pak("Sample_WindowsClient.pak"));
        assert!(is_client_pak("Sample_WindowsClient.pak"));
        assert!(!is_server_pak("Sample_WindowsClient.pak"));
    }

    #[test]
    fn suffix_checks_are_exact() {
        assert!(is_server_pak("Sample_Server.pak"));
        assert!(!is_client_pak("Sample_Server.pak"));
        assert!(!is_pak("Sample_WindowsClient.pak.bak"));
    }
}
