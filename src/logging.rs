//! Tracing setup: a rotated log file in the data directory, or stderr.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::LineWriter;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "id_extractor=info,warn";
const LOG_FILE_NAME: &str = "extractor.log";
const KEEP_GENERATIONS: u32 = 3;

/// Where tracing output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// `extractor.log` in the data directory, rotated on every start.
    File,
    Stderr,
}

/// A log file plus its numbered predecessors (`extractor.log.1` is the most
/// recent, `.{keep}` the oldest kept).
#[derive(Debug, Clone)]
pub struct LogFile {
    path: PathBuf,
    keep: u32,
}

impl LogFile {
    pub fn new(path: impl Into<PathBuf>, keep: u32) -> Self {
        Self {
            path: path.into(),
            keep,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of generation `n`; generation 0 is the live file.
    pub fn generation(&self, n: u32) -> PathBuf {
        if n == 0 {
            return self.path.clone();
        }
        let mut name = OsString::from(self.path.as_os_str());
        name.push(format!(".{n}"));
        PathBuf::from(name)
    }

    /// Shift every generation up by one, dropping the oldest. Missing
    /// generations are skipped; I/O errors are ignored.
    pub fn rotate(&self) {
        let _ = fs::remove_file(self.generation(self.keep));
        for n in (0..self.keep).rev() {
            let from = self.generation(n);
            if from.exists() {
                let _ = fs::rename(&from, self.generation(n + 1));
            }
        }
    }

    /// Rotate, then open a fresh live file.
    pub fn open_fresh(&self) -> std::io::Result<File> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        self.rotate();
        OpenOptions::new().create(true).append(true).open(&self.path)
    }
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` overrides the default filter. File output goes through a
/// `LineWriter`, so each event reaches the file as soon as its line ends.
/// When the file cannot be opened, output falls back to stderr.
pub fn init_tracing(target: LogTarget) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let log = LogFile::new(crate::data_dir().join(LOG_FILE_NAME), KEEP_GENERATIONS);

    let file = match target {
        LogTarget::File => match log.open_fresh() {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("id-extractor: cannot open {}: {e}", log.path().display());
                None
            }
        },
        LogTarget::Stderr => None,
    };

    match file {
        Some(file) => {
            fmt::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(LineWriter::new(file)))
                .with_ansi(false)
                .with_target(true)
                .init();
            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                log_file = %log.path().display(),
                pid = std::process::id(),
                "=== id-extractor starting ==="
            );
        }
        None => {
            fmt::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(path: PathBuf) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_generation_paths() {
        let log = LogFile::new("/var/log/extractor.log", 3);
        assert_eq!(log.generation(0), PathBuf::from("/var/log/extractor.log"));
        assert_eq!(log.generation(2), PathBuf::from("/var/log/extractor.log.2"));
    }

    #[test]
    fn test_rotate_shifts_and_drops_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let log = LogFile::new(dir.path().join("extractor.log"), 3);
        fs::write(log.generation(0), "current").unwrap();
        fs::write(log.generation(1), "one").unwrap();
        fs::write(log.generation(3), "three").unwrap();

        log.rotate();

        assert!(!log.generation(0).exists());
        assert_eq!(read(log.generation(1)), "current");
        assert_eq!(read(log.generation(2)), "one");
        assert!(!log.generation(3).exists());
    }

    #[test]
    fn test_open_fresh_creates_directory_and_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = LogFile::new(dir.path().join("nested/extractor.log"), 3);
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(log.path(), "previous run").unwrap();

        let _file = log.open_fresh().unwrap();

        assert_eq!(read(log.path().to_path_buf()), "");
        assert_eq!(read(log.generation(1)), "previous run");
    }

    #[test]
    fn test_line_writer_flushes_each_line() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let log = LogFile::new(dir.path().join("extractor.log"), 3);
        let mut writer = LineWriter::new(log.open_fresh().unwrap());
        writer.write_all(b"first event\n").unwrap();
        assert_eq!(read(log.path().to_path_buf()), "first event\n");
    }
}
