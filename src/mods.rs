use crate::{
    fstime::{self, FileTimes},
    metadata::ModioSidecar,
    mordhau,
};
use anyhow::{Context, Result};
use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

/// How one mod directory stands relative to what its sidecar says it should
/// hold. Exactly one state applies per mod: classification reports the first
/// applicable problem, never a combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Valid,
    OutOfDate,
    NoModFile,
    NoModioJson,
    NoClientModFile,
    VagueModFile,
}

impl Validity {
    /// Whether the auditor should offer to re-install this mod. A
    /// non-standard pak name is only a warning: the file could still be a
    /// working payload, and deleting it on a hunch would be unjustified.
    pub fn needs_repair(self) -> bool {
        !matches!(self, Validity::Valid | Validity::VagueModFile)
    }
}

/// Snapshot of one installed mod directory: its file listing plus whatever
/// the `modio.json` sidecar could tell us about it.
///
/// The listing is taken once when the snapshot is built. Payload deletion
/// prunes it in place and [`refresh_files`](Self::refresh_files) re-lists
/// after an extraction; nothing else refreshes it.
#[derive(Debug)]
pub struct InstalledMod {
    path: PathBuf,
    files: BTreeMap<String, PathBuf>,
    sidecar: ModioSidecar,
    remote_updated_at: Option<i64>,
}

impl InstalledMod {
    /// Build a snapshot of `path`. Never fails: an unreadable directory
    /// yields an empty listing and classifies accordingly.
    pub fn open(path: &Path) -> Self {
        let files = list_files(path).unwrap_or_else(|err| {
            tracing::warn!("could not list {}: {err}", path.display());
            BTreeMap::new()
        });
        let sidecar = ModioSidecar::read(&path.join(mordhau::MODIO_SIDECAR));
        let remote_updated_at = sidecar.date_added();
        if sidecar.is_present() && remote_updated_at.is_none() {
            tracing::debug!(
                "{}: modio.json has no usable modfile.date_added",
                path.display()
            );
        }
        InstalledMod {
            path: path.to_path_buf(),
            files,
            sidecar,
            remote_updated_at,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn id(&self) -> Option<String> {
        self.sidecar.id()
    }

    pub fn name(&self) -> Option<String> {
        self.sidecar.name()
    }

    pub fn download_url(&self) -> Option<String> {
        self.sidecar.download_url()
    }

    /// Sidecar name when present, directory name otherwise, so status and
    /// skip lines stay legible for mods with a broken sidecar.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name() {
            return name;
        }
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Classify the installation. Pure and idempotent: repeated calls give
    /// the same answer unless the file listing was rebuilt in between.
    pub fn validity(&self) -> Validity {
        self.validity_with(fstime::file_times)
    }

    // The timestamp source is a parameter so the classification stays
    // platform-agnostic; tests feed synthetic times through it.
    fn validity_with(&self, file_times: impl Fn(&Path) -> FileTimes) -> Validity {
        // Everything we know about the mod comes from the sidecar. Without
        // a usable one there is nothing to compare the files against.
        let Some(remote_updated_at) = self.remote_updated_at else {
            return Validity::NoModioJson;
        };

        if !self.files.keys().any(|name| mordhau::is_pak(name)) {
            return Validity::NoModFile;
        }

        if !self.files.keys().any(|name| mordhau::is_client_pak(name)) {
            if self.files.keys().any(|name| mordhau::is_server_pak(name)) {
                return Validity::NoClientModFile;
            }
            // A client pak could hide under a name matching no known
            // suffix; without a recognizable name we cannot say either way.
            return Validity::VagueModFile;
        }

        let stale = self
            .files
            .iter()
            .filter(|(name, _)| mordhau::is_pak(name))
            .any(|(_, path)| is_stale(file_times(path), remote_updated_at));
        if stale {
            Validity::OutOfDate
        } else {
            Validity::Valid
        }
    }

    /// Remove every pak from the directory. The sidecar stays behind, a
    /// re-extract needs it untouched. The listing is pruned as files go so
    /// a later [`validity`](Self::validity) call sees the directory as it
    /// now is.
    pub fn delete_pak_files(&mut self) -> Result<()> {
        let paks: Vec<String> = self
            .files
            .keys()
            .filter(|name| mordhau::is_pak(name))
            .cloned()
            .collect();
        for name in paks {
            let path = &self.files[&name];
            fs::remove_file(path).with_context(|| format!("delete {}", path.display()))?;
            self.files.remove(&name);
        }
        Ok(())
    }

    /// Re-list the directory, picking up whatever a repair extracted.
    pub fn refresh_files(&mut self) {
        self.files = list_files(&self.path).unwrap_or_else(|err| {
            tracing::warn!("could not re-list {}: {err}", self.path.display());
            BTreeMap::new()
        });
    }
}

/// A pak is stale only when both of its timestamps predate the remote
/// update. Extraction leaves the creation time fresh even where the archive
/// mtime is restored (and the reverse holds on some filesystems), so
/// requiring both avoids flagging a freshly repaired mod.
fn is_stale(times: FileTimes, remote_updated_at: i64) -> bool {
    times.created < remote_updated_at && times.modified < remote_updated_at
}

fn list_files(dir: &Path) -> io::Result<BTreeMap<String, PathBuf>> {
    let mut files = BTreeMap::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.insert(entry.file_name().to_string_lossy().into_owned(), entry.path());
        }
    }
    Ok(files)
}

/// One snapshot per immediate subdirectory of the mods root, in path order.
pub fn scan_mods(mods_dir: &Path) -> Result<Vec<InstalledMod>> {
    let mut mods = Vec::new();
    let entries = fs::read_dir(mods_dir)
        .with_context(|| format!("read mods directory {}", mods_dir.display()))?;
    for entry in entries {
        let entry = entry.context("read mods directory entry")?;
        if entry.file_type().map(|kind| kind.is_dir()).unwrap_or(false) {
            mods.push(InstalledMod::open(&entry.path()));
        }
    }
    mods.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(mods)
}
