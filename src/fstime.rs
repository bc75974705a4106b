use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Sentinel for a timestamp that could not be obtained. It is below any real
/// mod.io timestamp, so files we cannot stat lean toward "out of date"
/// instead of being silently skipped.
pub const UNKNOWN: i64 = -1;

/// Creation and modification time of a file in UTC epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTimes {
    pub created: i64,
    pub modified: i64,
}

impl FileTimes {
    pub const UNKNOWN: FileTimes = FileTimes {
        created: UNKNOWN,
        modified: UNKNOWN,
    };
}

/// Stat one file. Never fails; anything unreadable comes back as the
/// [`UNKNOWN`] sentinel.
pub fn file_times(path: &Path) -> FileTimes {
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(err) => {
            tracing::debug!("stat {} failed: {err}", path.display());
            return FileTimes::UNKNOWN;
        }
    };

    let modified = meta
        .modified()
        .ok()
        .and_then(system_time_to_epoch)
        .unwrap_or(UNKNOWN);

    // Birth time is not exposed through fs::metadata on every Linux
    // filesystem; stat(1) can still read it where the kernel has it.
    let created = match meta.created() {
        Ok(time) => system_time_to_epoch(time).unwrap_or(UNKNOWN),
        Err(_) => stat_birth_time(path).unwrap_or(UNKNOWN),
    };

    FileTimes { created, modified }
}

#[cfg(target_os = "linux")]
fn stat_birth_time(path: &Path) -> Option<i64> {
    let output = std::process::Command::new("stat")
        .arg("-c")
        .arg("%W")
        .arg(path)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8_lossy(&output.stdout).trim().parse().ok()
}

#[cfg(not(target_os = "linux"))]
fn stat_birth_time(_path: &Path) -> Option<i64> {
    None
}

fn system_time_to_epoch(time: SystemTime) -> Option<i64> {
    time.duration_since(UNIX_EPOCH)
        .ok()
        .map(|duration| duration.as_secs() as i64)
}
