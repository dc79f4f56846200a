//! Macro file storage - plain text, one event per line
//!
//! Files use the `replica_core::codec` line format. Saves go through a
//! sibling temp file and a rename so an interrupted write never leaves a
//! half-written macro under the target name.

use chrono::Local;
use replica_core::{codec, MacroLog, Result};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Conventional extension for macro files.
pub const MACRO_EXTENSION: &str = "macro";

/// Timestamped name for a freshly captured macro, e.g.
/// `macro-20260821-174503.macro`.
pub fn default_filename() -> PathBuf {
    let ts = Local::now().format("%Y%m%d-%H%M%S");
    PathBuf::from(format!("macro-{}.{}", ts, MACRO_EXTENSION))
}

/// Read and decode a macro file.
pub fn load(path: &Path) -> Result<MacroLog> {
    let text = fs::read_to_string(path)?;
    let log = codec::decode(&text)?;
    debug!(events = log.len(), path = %path.display(), "macro file read");
    Ok(log)
}

/// Encode and write a macro file.
pub fn save(path: &Path, log: &MacroLog) -> Result<()> {
    let tmp = tmp_path(path);
    if let Err(err) = write_then_rename(&tmp, path, log) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    debug!(events = log.len(), path = %path.display(), "macro file written");
    Ok(())
}

fn write_then_rename(tmp: &Path, path: &Path, log: &MacroLog) -> Result<()> {
    let file = File::create(tmp)?;
    let mut w = BufWriter::new(file);
    w.write_all(codec::encode(log).as_bytes())?;
    w.flush()?;
    drop(w);
    fs::rename(tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut buf = OsString::from(path.as_os_str());
    buf.push(".tmp");
    PathBuf::from(buf)
}
