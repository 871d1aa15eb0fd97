//! Run log for the shadow tool.
//!
//! One file per invocation, truncated on open, so a batch that misbehaved
//! can be inspected right after it finishes:
//!   Windows:  `%APPDATA%\elevation-shadow\run.log`
//!   Linux:    `$XDG_DATA_HOME/elevation-shadow/run.log` (or `~/.local/share`)
//!   macOS:    `~/Library/Application Support/elevation-shadow/run.log`
//!
//! Library code logs through `log_info!` / `log_warn!` / `log_err!`.  Those
//! stay silent until the binary opens a run log with [`init`].

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

const APP_DIR: &str = "elevation-shadow";
const LOG_NAME: &str = "run.log";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
    Panic,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Panic => "PANIC",
        }
    }
}

struct RunLog {
    path: PathBuf,
    file: Mutex<File>,
}

static RUN_LOG: OnceLock<RunLog> = OnceLock::new();

/// Where the current run log lives, once opened.
pub fn log_path() -> Option<&'static Path> {
    RUN_LOG.get().map(|log| log.path.as_path())
}

/// Append one record.  Write failures are dropped; a full disk must not
/// abort a batch.
pub fn write(level: Level, msg: &str) {
    let Some(log) = RUN_LOG.get() else { return };
    if let Ok(mut file) = log.file.lock() {
        let _ = writeln!(file, "{} {:<5} {}", clock(), level.tag(), msg);
    }
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Info, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Warn, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_err {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Error, &format!($($arg)*))
    };
}

/// Open the run log in the platform data directory.  Failing to open it is
/// reported on stderr and the tool carries on unlogged.
pub fn init() {
    let path = data_dir().join(APP_DIR).join(LOG_NAME);
    if let Err(e) = init_at(&path) {
        eprintln!("warning: no run log at {}: {}", path.display(), e);
    }
}

/// Open the run log at `path`.  The first successful call in a process wins;
/// later calls leave the existing log in place.
pub fn init_at(path: &Path) -> io::Result<()> {
    if RUN_LOG.get().is_some() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    writeln!(
        file,
        "# elevation-shadow {} started at unix {}",
        env!("CARGO_PKG_VERSION"),
        unix_secs().unwrap_or(0)
    )?;

    let installed = RUN_LOG
        .set(RunLog {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
        .is_ok();
    if installed {
        let prev = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            write(Level::Panic, &info.to_string());
            prev(info);
        }));
    }
    Ok(())
}

fn data_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata);
        }
    }
    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join("Library").join("Application Support");
        }
    }
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".local").join("share")))
        .unwrap_or_else(|_| PathBuf::from("."))
}

fn unix_secs() -> Option<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs())
}

/// UTC wall clock as HH:MM:SS.
fn clock() -> String {
    match unix_secs() {
        Some(secs) => format!(
            "{:02}:{:02}:{:02}",
            (secs % 86_400) / 3_600,
            (secs % 3_600) / 60,
            secs % 60
        ),
        None => "--:--:--".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_hh_mm_ss() {
        let ts = clock();
        assert_eq!(ts.len(), 8);
        assert_eq!(ts.as_bytes()[2], b':');
        assert_eq!(ts.as_bytes()[5], b':');
    }

    #[test]
    fn records_are_tagged_by_level() {
        let path = std::env::temp_dir()
            .join(format!("elevation-shadow-log-{}", std::process::id()))
            .join(LOG_NAME);
        init_at(&path).unwrap();
        crate::log_warn!("tint batch {}", 7);
        // Only inspect the file if this test opened the process-wide log.
        if log_path() == Some(path.as_path()) {
            let content = std::fs::read_to_string(&path).unwrap();
            assert!(content.starts_with("# elevation-shadow"));
            assert!(content.contains("WARN  tint batch 7"));
        }
    }
}
