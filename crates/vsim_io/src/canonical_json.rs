//! Canonical JSON
//! - Objects: keys sorted lexicographically (UTF-8 codepoint order)
//! - Arrays: order preserved (callers emit rows in a stable order)
//! - Output: compact, no trailing newline
//! - Atomic write: temp file in the same dir + fsync + rename; fsync(dir) on Unix.
//!   If the rename fails (cross-device), the target is written directly.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::IoError;

/// Canonical bytes of any serializable value.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, IoError> {
    let v = serde_json::to_value(value)?;
    let mut out = Vec::with_capacity(1024);
    write_value(&v, &mut out)?;
    Ok(out)
}

fn write_value(v: &Value, out: &mut Vec<u8>) -> Result<(), IoError> {
    match v {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            serde_json::to_writer(&mut *out, v)?;
        }
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(item, out)?;
            }
            out.push(b']');
        }
        Value::Object(map) => {
            out.push(b'{');
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            for (i, k) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                serde_json::to_writer(&mut *out, k)?;
                out.push(b':');
                write_value(&map[k.as_str()], out)?;
            }
            out.push(b'}');
        }
    }
    Ok(())
}

/// Serialize `value` canonically and write it to `path` atomically.
pub fn write_canonical_file<T: Serialize>(path: &Path, value: &T) -> Result<(), IoError> {
    let bytes = to_canonical_bytes(value)?;
    write_atomic(path, &bytes)?;
    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let tmp = unique_tmp_path(path, &parent);
    {
        let mut tf = OpenOptions::new().write(true).create_new(true).open(&tmp)?;
        tf.write_all(bytes)?;
        tf.sync_all()?;
    }

    if fs::rename(&tmp, path).is_err() {
        let direct = (|| -> io::Result<()> {
            let mut f = OpenOptions::new().write(true).create(true).truncate(true).open(path)?;
            f.write_all(bytes)?;
            f.sync_all()
        })();
        let _ = fs::remove_file(&tmp);
        direct?;
    }
    let _ = fsync_dir(&parent);
    Ok(())
}

/// "<filename>.<pid>.<counter>.tmp" next to the target.
fn unique_tmp_path(target: &Path, dir: &Path) -> PathBuf {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let fname = target.file_name().and_then(|s| s.to_str()).unwrap_or("file");
    dir.join(format!("{fname}.{}.{n}.tmp", std::process::id()))
}

#[cfg(unix)]
fn fsync_dir(dir: &Path) -> io::Result<()> {
    OpenOptions::new().read(true).open(dir)?.sync_all()
}

#[cfg(not(unix))]
#[inline]
fn fsync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
