//! Size-rotated file destination with bounded archive retention
//!
//! One [`RotateWriter`] owns the single live handle for its `(dir, name)`
//! pair. All writers in the process share it through [`shared`], so
//! concurrent sinks can never open duplicate handles or interleave records.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, Weak};

use crate::core::error::{LogError, Result};

const DEFAULT_DIR: &str = ".";
const DEFAULT_NAME: &str = "out.log";
const DEFAULT_MAX_SIZE_MB: u64 = 500;
const DEFAULT_MAX_BACKUPS: usize = 10;
const DEFAULT_MAX_AGE_DAYS: u64 = 1;

/// Timestamp embedded in archived filenames, sub-second precision so two
/// rotations in quick succession can never collide on a name:
/// `out-2025-01-08T10-30-45.123456789.log`
const ARCHIVE_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.9f";

/// Rotation policy for one physical log file.
///
/// Zero/empty fields mean "unset" and resolve to the defaults, so a
/// partially populated configuration section behaves like the original.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRotateConfig {
    pub dir: String,
    pub name: String,
    /// Maximum live-file size in megabytes before rollover
    pub max_size: u64,
    /// Maximum number of archived files kept
    pub max_backup: usize,
    /// Archives older than this many days are deleted
    pub max_age: u64,
    /// Embed local instead of UTC timestamps in archive names
    pub local_time: bool,
    /// Gzip archives after rotation
    pub compress: bool,
}

impl FileRotateConfig {
    /// Resolve unset fields to their defaults.
    #[must_use]
    pub fn resolved(&self) -> Self {
        Self {
            dir: if self.dir.is_empty() {
                DEFAULT_DIR.to_string()
            } else {
                self.dir.clone()
            },
            name: if self.name.is_empty() {
                DEFAULT_NAME.to_string()
            } else {
                self.name.clone()
            },
            max_size: if self.max_size == 0 {
                DEFAULT_MAX_SIZE_MB
            } else {
                self.max_size
            },
            max_backup: if self.max_backup == 0 {
                DEFAULT_MAX_BACKUPS
            } else {
                self.max_backup
            },
            max_age: if self.max_age == 0 {
                DEFAULT_MAX_AGE_DAYS
            } else {
                self.max_age
            },
            local_time: self.local_time,
            compress: self.compress,
        }
    }

    /// Live file path for this configuration, after defaults.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        let resolved = self.resolved();
        Path::new(&resolved.dir).join(&resolved.name)
    }
}

struct WriterState {
    file: Option<File>,
    size: u64,
}

/// Serialized, size-rotating append destination.
///
/// Every write goes through one internal mutex, so bytes of two records
/// never interleave and each size-threshold crossing rotates exactly once.
pub struct RotateWriter {
    path: PathBuf,
    config: FileRotateConfig,
    max_bytes: u64,
    state: Mutex<WriterState>,
}

impl RotateWriter {
    /// Open (or create) the live file for `config`.
    pub fn open(config: &FileRotateConfig) -> Result<Self> {
        let config = config.resolved();
        let path = Path::new(&config.dir).join(&config.name);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                LogError::config(
                    "file.dir",
                    format!("cannot create log directory '{}': {}", parent.display(), e),
                )
            })?;
        }

        let file = open_append(&path)?;
        let size = file.metadata().map(|m| m.len()).unwrap_or(0);

        Ok(Self {
            path,
            max_bytes: config.max_size * 1024 * 1024,
            config,
            state: Mutex::new(WriterState {
                file: Some(file),
                size,
            }),
        })
    }

    /// Path of the live file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current live-file size in bytes.
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.state.lock().size
    }

    /// Append one encoded record.
    ///
    /// If appending would push the live file past the size limit, the file
    /// is rotated first so the record lands whole in the fresh file.
    pub fn write_record(&self, bytes: &[u8]) -> io::Result<()> {
        let len = bytes.len() as u64;
        if len > self.max_bytes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "record of {} bytes exceeds the {} byte rotation limit",
                    len, self.max_bytes
                ),
            ));
        }

        let mut state = self.state.lock();

        if state.size + len > self.max_bytes && state.size > 0 {
            self.rotate(&mut state);
        }

        if state.file.is_none() {
            // Recover from an earlier failed rollover
            let file = open_append(&self.path)?;
            state.size = file.metadata().map(|m| m.len()).unwrap_or(0);
            state.file = Some(file);
        }

        if let Some(file) = state.file.as_mut() {
            file.write_all(bytes)?;
            state.size += len;
        }
        Ok(())
    }

    pub fn flush(&self) -> io::Result<()> {
        if let Some(file) = self.state.lock().file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }

    /// Roll the live file over to a timestamped archive and start fresh.
    ///
    /// A failed rollover is reported to stderr and the writer keeps
    /// appending to the current file; log delivery never stops for a
    /// rotation hiccup.
    fn rotate(&self, state: &mut WriterState) {
        // Close the live handle before renaming
        state.file.take();

        let archive = self.archive_path();
        if let Err(e) = fs::rename(&self.path, &archive) {
            report_rotation_error(&LogError::rotation(
                self.path.display().to_string(),
                format!("cannot archive live file: {}", e),
            ));
            // Keep appending to the oversized file; restarting the counter
            // keeps a persistent failure from retriggering rotation on
            // every write
            match open_append(&self.path) {
                Ok(file) => state.file = Some(file),
                Err(e) => report_rotation_error(&LogError::rotation(
                    self.path.display().to_string(),
                    format!("cannot reopen after failed archive: {}", e),
                )),
            }
            state.size = 0;
            return;
        }

        match open_append(&self.path) {
            Ok(file) => {
                state.file = Some(file);
                state.size = 0;
            }
            Err(e) => {
                report_rotation_error(&LogError::rotation(
                    self.path.display().to_string(),
                    format!("cannot reopen after rotation: {}", e),
                ));
                state.size = 0;
                // write_record reopens lazily on the next call
            }
        }

        if self.config.compress {
            if let Err(e) = compress_archive(&archive) {
                report_rotation_error(&e);
            }
        }

        self.prune_archives();
    }

    fn archive_path(&self) -> PathBuf {
        let (stem, ext) = split_name(&self.config.name);
        let stamp = if self.config.local_time {
            Local::now().format(ARCHIVE_TIME_FORMAT).to_string()
        } else {
            Utc::now().format(ARCHIVE_TIME_FORMAT).to_string()
        };
        Path::new(&self.config.dir).join(format!("{}-{}{}", stem, stamp, ext))
    }

    /// Delete archives past the age limit, then the oldest beyond the
    /// backup-count limit. Best effort only.
    fn prune_archives(&self) {
        let archives = match self.list_archives() {
            Ok(archives) => archives,
            Err(e) => {
                report_rotation_error(&e);
                return;
            }
        };

        let cutoff = Utc::now() - chrono::Duration::days(self.config.max_age as i64);
        let mut survivors: Vec<(DateTime<Utc>, PathBuf)> = Vec::new();

        for (stamp, path) in archives {
            if stamp < cutoff {
                remove_archive(&path);
            } else {
                survivors.push((stamp, path));
            }
        }

        // Newest first; everything past max_backup goes
        survivors.sort_by(|a, b| b.0.cmp(&a.0));
        for (_, path) in survivors.iter().skip(self.config.max_backup) {
            remove_archive(path);
        }
    }

    /// Archived siblings of the live file, with the timestamp parsed out of
    /// each name. Files that don't match the archive pattern are ignored.
    fn list_archives(&self) -> Result<Vec<(DateTime<Utc>, PathBuf)>> {
        let (stem, ext) = split_name(&self.config.name);
        let prefix = format!("{}-", stem);

        let entries = fs::read_dir(&self.config.dir).map_err(|e| {
            LogError::rotation(
                self.config.dir.clone(),
                format!("cannot list archives: {}", e),
            )
        })?;

        let mut archives = Vec::new();
        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let Some(rest) = name.strip_prefix(&prefix) else {
                continue;
            };
            let stamp_text = rest
                .strip_suffix(".gz")
                .unwrap_or(rest)
                .strip_suffix(&ext)
                .unwrap_or(rest);
            if let Some(stamp) = self.parse_archive_stamp(stamp_text) {
                archives.push((stamp, entry.path()));
            }
        }
        Ok(archives)
    }

    fn parse_archive_stamp(&self, text: &str) -> Option<DateTime<Utc>> {
        let naive = NaiveDateTime::parse_from_str(text, ARCHIVE_TIME_FORMAT).ok()?;
        if self.config.local_time {
            Local
                .from_local_datetime(&naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc))
        } else {
            Some(Utc.from_utc_datetime(&naive))
        }
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

fn remove_archive(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        report_rotation_error(&LogError::rotation(
            path.display().to_string(),
            format!("cannot delete archive: {}", e),
        ));
    }
}

/// Rotation problems must never reach the application caller; they go to
/// the process error stream instead.
fn report_rotation_error(err: &LogError) {
    eprintln!("[fanlog] {}", err);
}

/// Gzip an archive in place, replacing `path` with `path.gz`.
///
/// The original is removed only after the compressed file is complete, so a
/// failed compression never loses data.
fn compress_archive(path: &Path) -> Result<()> {
    let gz_path = {
        let mut os = path.as_os_str().to_owned();
        os.push(".gz");
        PathBuf::from(os)
    };

    let mut input = File::open(path).map_err(|e| {
        LogError::rotation(
            path.display().to_string(),
            format!("cannot open archive for compression: {}", e),
        )
    })?;
    let output = File::create(&gz_path).map_err(|e| {
        LogError::rotation(
            gz_path.display().to_string(),
            format!("cannot create compressed archive: {}", e),
        )
    })?;

    let mut encoder = flate2::write::GzEncoder::new(output, flate2::Compression::default());
    let mut buffer = vec![0u8; 64 * 1024];
    loop {
        let n = input.read(&mut buffer).map_err(|e| {
            let _ = fs::remove_file(&gz_path);
            LogError::rotation(
                path.display().to_string(),
                format!("read failed during compression: {}", e),
            )
        })?;
        if n == 0 {
            break;
        }
        encoder.write_all(&buffer[..n]).map_err(|e| {
            let _ = fs::remove_file(&gz_path);
            LogError::rotation(
                gz_path.display().to_string(),
                format!("write failed during compression: {}", e),
            )
        })?;
    }
    encoder.finish().map_err(|e| {
        let _ = fs::remove_file(&gz_path);
        LogError::rotation(
            gz_path.display().to_string(),
            format!("cannot finish compression: {}", e),
        )
    })?;

    if let Err(e) = fs::remove_file(path) {
        report_rotation_error(&LogError::rotation(
            path.display().to_string(),
            format!("compressed but cannot remove original: {}", e),
        ));
    }
    Ok(())
}

type SharedWriters = Mutex<HashMap<PathBuf, Weak<RotateWriter>>>;

fn shared_writers() -> &'static SharedWriters {
    static WRITERS: OnceLock<SharedWriters> = OnceLock::new();
    WRITERS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Process-wide shared handle for a rotation destination.
///
/// Repeated requests for the same `(dir, name)` return the same
/// reference-counted writer, so at most one live handle exists per path.
/// The entry is dropped once every sink holding it is gone.
pub fn shared(config: &FileRotateConfig) -> Result<Arc<RotateWriter>> {
    let path = config.path();
    let mut writers = shared_writers().lock();

    if let Some(existing) = writers.get(&path).and_then(Weak::upgrade) {
        return Ok(existing);
    }

    let writer = Arc::new(RotateWriter::open(config)?);
    writers.insert(path, Arc::downgrade(&writer));
    Ok(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn small_config(dir: &Path, name: &str, max_backup: usize) -> FileRotateConfig {
        FileRotateConfig {
            dir: dir.to_str().unwrap().to_string(),
            name: name.to_string(),
            max_size: 1, // 1 MB
            max_backup,
            max_age: 7,
            local_time: false,
            compress: false,
        }
    }

    #[test]
    fn test_defaults_resolution() {
        let resolved = FileRotateConfig::default().resolved();
        assert_eq!(resolved.dir, ".");
        assert_eq!(resolved.name, "out.log");
        assert_eq!(resolved.max_size, 500);
        assert_eq!(resolved.max_backup, 10);
        assert_eq!(resolved.max_age, 1);
        assert!(!resolved.local_time);
        assert!(!resolved.compress);
    }

    #[test]
    fn test_partial_config_keeps_set_fields() {
        let resolved = FileRotateConfig {
            name: "svc.log".to_string(),
            max_backup: 3,
            ..Default::default()
        }
        .resolved();
        assert_eq!(resolved.name, "svc.log");
        assert_eq!(resolved.max_backup, 3);
        assert_eq!(resolved.max_size, 500);
    }

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("out.log"), ("out", ".log"));
        assert_eq!(split_name("noext"), ("noext", ""));
        assert_eq!(split_name("a.b.log"), ("a.b", ".log"));
    }

    #[test]
    fn test_append_tracks_size() {
        let dir = tempdir().unwrap();
        let writer = RotateWriter::open(&small_config(dir.path(), "t.log", 3)).unwrap();

        writer.write_record(b"hello\n").unwrap();
        writer.write_record(b"world\n").unwrap();
        assert_eq!(writer.current_size(), 12);
        assert_eq!(
            fs::read_to_string(dir.path().join("t.log")).unwrap(),
            "hello\nworld\n"
        );
    }

    #[test]
    fn test_oversized_record_rejected() {
        let dir = tempdir().unwrap();
        let writer = RotateWriter::open(&small_config(dir.path(), "t.log", 3)).unwrap();
        let huge = vec![b'x'; 2 * 1024 * 1024];
        assert!(writer.write_record(&huge).is_err());
    }

    #[test]
    fn test_rotation_on_threshold_crossing() {
        let dir = tempdir().unwrap();
        let writer = RotateWriter::open(&small_config(dir.path(), "r.log", 5)).unwrap();

        // Fill just under the 1 MB limit, then cross it with one record
        let chunk = vec![b'a'; 512 * 1024];
        writer.write_record(&chunk).unwrap();
        writer.write_record(&chunk).unwrap(); // exactly 1 MB, no rotation yet
        writer.write_record(b"fresh-file-first-record\n").unwrap();

        let entries: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();

        let archives: Vec<&String> =
            entries.iter().filter(|n| n.starts_with("r-")).collect();
        assert_eq!(archives.len(), 1, "exactly one rotation: {:?}", entries);

        // The record that triggered rotation landed whole in the new file
        let live = fs::read_to_string(dir.path().join("r.log")).unwrap();
        assert_eq!(live, "fresh-file-first-record\n");

        // The archive holds the full pre-rotation content
        let archive = fs::read(dir.path().join(archives[0])).unwrap();
        assert_eq!(archive.len(), 1024 * 1024);
    }

    #[test]
    fn test_backup_count_is_bounded() {
        let dir = tempdir().unwrap();
        let writer = RotateWriter::open(&small_config(dir.path(), "b.log", 2)).unwrap();

        let chunk = vec![b'z'; 600 * 1024];
        for _ in 0..10 {
            writer.write_record(&chunk).unwrap();
        }

        let archives = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("b-"))
            .count();
        assert!(archives <= 2, "retained {} archives", archives);
        assert!(dir.path().join("b.log").exists());
    }

    #[test]
    fn test_compressed_archive() {
        let dir = tempdir().unwrap();
        let config = FileRotateConfig {
            compress: true,
            ..small_config(dir.path(), "c.log", 3)
        };
        let writer = RotateWriter::open(&config).unwrap();

        let chunk = vec![b'q'; 700 * 1024];
        writer.write_record(&chunk).unwrap();
        writer.write_record(&chunk).unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert!(
            names.iter().any(|n| n.starts_with("c-") && n.ends_with(".log.gz")),
            "no compressed archive in {:?}",
            names
        );
        assert!(
            !names.iter().any(|n| n.starts_with("c-") && n.ends_with(".log")),
            "uncompressed original left behind in {:?}",
            names
        );
    }

    #[test]
    fn test_concurrent_writers_never_interleave() {
        let dir = tempdir().unwrap();
        let writer = Arc::new(RotateWriter::open(&small_config(dir.path(), "w.log", 5)).unwrap());

        let mut handles = Vec::new();
        for t in 0..4 {
            let w = Arc::clone(&writer);
            handles.push(std::thread::spawn(move || {
                for i in 0..200 {
                    let line = format!("thread{}-record{}\n", t, i);
                    w.write_record(line.as_bytes()).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let content = fs::read_to_string(dir.path().join("w.log")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 800);
        for line in lines {
            assert!(
                line.starts_with("thread") && line.contains("-record"),
                "interleaved line: {:?}",
                line
            );
        }
    }

    #[test]
    fn test_shared_returns_same_handle() {
        let dir = tempdir().unwrap();
        let config = small_config(dir.path(), "s.log", 3);

        let first = shared(&config).unwrap();
        let second = shared(&config).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let other = shared(&small_config(dir.path(), "other.log", 3)).unwrap();
        assert!(!Arc::ptr_eq(&first, &other));
    }
}
