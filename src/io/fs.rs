//! Output file handling for the CLI.

use std::{fs::{self, File}, io::Write, path::Path};

use anyhow::{Context, Result, bail};
use tempfile::NamedTempFile;

/// Reject `-` as an output path.
pub(crate) fn assert_not_stdout(path: &Path) -> Result<()> {
    if path == Path::new("-") {
        bail!("[io::fs] stdout is not supported; provide a real file path.");
    }
    Ok(())
}

/// Write `bytes` to `target` through a temp file and rename, so readers never
/// observe a partial file.
pub(crate) fn write_atomic(target: &Path, bytes: &[u8], force: bool) -> Result<()> {
    assert_not_stdout(target)?;
    if !force && target.exists() {
        bail!("[io::fs] Refusing to overwrite existing file: {} (use --force)", target.display());
    }

    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent)
                .with_context(|| format!("[io::fs] create dir {}", parent.display()))?;
            parent
        }
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).context("[io::fs] create temp file")?;
    tmp.write_all(bytes).context("[io::fs] write temp file")?;
    tmp.as_file().sync_all().ok(); // best-effort fsync file
    tmp.persist(target)
        .with_context(|| format!("[io::fs] rename to {}", target.display()))?;

    let _ = File::open(dir).and_then(|f| f.sync_all());
    Ok(())
}
