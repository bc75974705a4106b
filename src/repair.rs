use crate::mods::InstalledMod;
use anyhow::{Context, Result};
use filetime::{set_file_mtime, FileTime};
use std::{fs, io, path::Path, time::Duration};
use time::{Date, Month, PrimitiveDateTime, Time};

/// Dropped into the mod's own directory during a repair and removed after
/// extraction. Fixed name so a crashed run is easy to recognize and clean.
const TEMP_ARCHIVE_NAME: &str = "mordmend-download.zip";
const USER_AGENT: &str = "mordmend";

/// Presentation hooks for the repair pass. The console front end colors and
/// prints; tests record.
pub trait RepairReporter {
    fn reinstalling(&mut self, mod_name: &str);
    fn reinstalled(&mut self, mod_name: &str);
    fn skipped(&mut self, mod_name: &str, reason: &str);
}

/// Re-install each mod in order: wipe its paks, pull the archive mod.io
/// serves for it, extract into the mod's directory, drop the archive.
///
/// Strictly sequential. The transfer dominates the cost and nothing is
/// gained by overlapping extraction with it. A download or extraction
/// failure halts the remaining queue; mods repaired before it stay repaired.
pub fn reinstall_mods(
    mods: &mut [InstalledMod],
    reporter: &mut dyn RepairReporter,
) -> Result<()> {
    let agent = download_agent();
    for entry in mods.iter_mut() {
        let name = entry.display_name();

        // Resolve everything the repair needs before touching the payload,
        // so a gutted sidecar cannot leave the directory empty.
        if entry.id().is_none() {
            tracing::warn!("{name}: sidecar has no mod id, leaving it alone");
            reporter.skipped(&name, "no mod id in modio.json");
            continue;
        }
        let Some(url) = entry.download_url() else {
            tracing::warn!("{name}: sidecar has no download url, leaving it alone");
            reporter.skipped(&name, "no download url in modio.json");
            continue;
        };

        reporter.reinstalling(&name);
        entry.delete_pak_files()?;

        let archive_path = entry.path().join(TEMP_ARCHIVE_NAME);
        download_to(&agent, &url, &archive_path)
            .with_context(|| format!("download {name}"))?;
        let extracted = extract_zip(&archive_path, entry.path());
        let removed = fs::remove_file(&archive_path);
        extracted.with_context(|| format!("extract {name}"))?;
        removed.context("remove downloaded archive")?;

        entry.refresh_files();
        reporter.reinstalled(&name);
    }
    Ok(())
}

fn download_agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(5))
        .timeout_read(Duration::from_secs(60))
        .timeout_write(Duration::from_secs(60))
        .build()
}

fn download_to(agent: &ureq::Agent, url: &str, path: &Path) -> Result<()> {
    let response = agent
        .get(url)
        .set("User-Agent", USER_AGENT)
        .call()
        .context("fetch mod archive")?;
    let mut reader = response.into_reader();
    let mut file = fs::File::create(path).context("create archive file")?;
    io::copy(&mut reader, &mut file).context("write archive file")?;
    Ok(())
}

fn extract_zip(path: &Path, dest: &Path) -> Result<()> {
    let file = fs::File::open(path).context("open zip")?;
    let mut archive = zip::ZipArchive::new(file).context("read zip")?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).context("zip entry")?;
        let Some(out_path) = entry.enclosed_name() else {
            continue;
        };

        let out_path = dest.join(out_path);
        if entry.is_dir() {
            fs::create_dir_all(&out_path).context("create zip dir")?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).context("create zip dir")?;
        }

        let mut out_file = fs::File::create(&out_path).context("write zip entry")?;
        io::copy(&mut entry, &mut out_file).context("extract zip entry")?;
        // Keep the archive's mtime on disk; the staleness check compares it
        // against the remote timestamp on the next run.
        if let Some(dt) = entry.last_modified() {
            if let Some(mtime) = zip_time_to_unix(dt) {
                let _ = set_file_mtime(&out_path, FileTime::from_unix_time(mtime, 0));
            }
        }
    }

    Ok(())
}

fn zip_time_to_unix(dt: zip::DateTime) -> Option<i64> {
    let month = Month::try_from(dt.month()).ok()?;
    let date = Date::from_calendar_date(dt.year() as i32, month, dt.day()).ok()?;
    let time = Time::from_hms(dt.hour(), dt.minute(), dt.second()).ok()?;
    let datetime = PrimitiveDateTime::new(date, time).assume_utc();
    Some(datetime.unix_timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mordhau;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    #[derive(Default)]
    struct Recorder {
        reinstalling: Vec<String>,
        reinstalled: Vec<String>,
        skipped: Vec<(String, String)>,
    }

    impl RepairReporter for Recorder {
        fn reinstalling(&mut self, mod_name: &str) {
            self.reinstalling.push(mod_name.to_string());
        }

        fn reinstalled(&mut self, mod_name: &str) {
            self.reinstalled.push(mod_name.to_string());
        }

        fn skipped(&mut self, mod_name: &str, reason: &str) {
            self.skipped.push((mod_name.to_string(), reason.to_string()));
        }
    }

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, bytes) in entries {
            writer
                .start_file(name.to_string(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn extract_zip_materializes_entries() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("mod.zip");
        write_zip(
            &archive,
            &[
                ("Sample_WindowsClient.pak", b"client bytes"),
                ("docs/readme.txt", b"hello"),
            ],
        );

        let dest = dir.path().join("out");
        fs::create_dir_all(&dest).unwrap();
        extract_zip(&archive, &dest).unwrap();

        assert_eq!(
            fs::read(dest.join("Sample_WindowsClient.pak")).unwrap(),
            b"client bytes"
        );
        assert_eq!(fs::read(dest.join("docs/readme.txt")).unwrap(), b"hello");
    }

    #[test]
    fn mod_without_id_is_skipped_with_payload_intact() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(mordhau::MODIO_SIDECAR),
            r#"{"name":"Sample","modfile":{"date_added":1000,"download":{"binary_url":"https://modcdn.example/a.zip"}}}"#,
        )
        .unwrap();
        fs::write(dir.path().join("Sample_WindowsClient.pak"), b"pak").unwrap();

        let mut mods = vec![InstalledMod::open(dir.path())];
        let mut recorder = Recorder::default();
        reinstall_mods(&mut mods, &mut recorder).unwrap();

        assert!(dir.path().join("Sample_WindowsClient.pak").exists());
        assert!(recorder.reinstalling.is_empty());
        assert_eq!(recorder.skipped.len(), 1);
        assert_eq!(recorder.skipped[0].1, "no mod id in modio.json");
    }

    #[test]
    fn mod_without_download_url_is_skipped_with_payload_intact() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(mordhau::MODIO_SIDECAR),
            r#"{"id":7,"name":"Sample","modfile":{"date_added":1000}}"#,
        )
        .unwrap();
        fs::write(dir.path().join("Sample_WindowsClient.pak"), b"pak").unwrap();

        let mut mods = vec![InstalledMod::open(dir.path())];
        let mut recorder = Recorder::default();
        reinstall_mods(&mut mods, &mut recorder).unwrap();

        assert!(dir.path().join("Sample_WindowsClient.pak").exists());
        assert_eq!(recorder.skipped.len(), 1);
        assert_eq!(recorder.skipped[0].1, "no download url in modio.json");
    }

    #[test]
    fn zip_times_convert_to_epoch_seconds() {
        let dt = zip::DateTime::from_date_and_time(2024, 7, 1, 12, 0, 0).unwrap();
        // 2024-07-01T12:00:00Z
        assert_eq!(zip_time_to_unix(dt), Some(1_719_835_200));
    }
}
