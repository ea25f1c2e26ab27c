use std::fs::File;
use std::path::Path;

use tempfile::{NamedTempFile, TempPath};

use crate::error::{EngineError, EngineResult};

/// Run `write` against a temporary file next to `path`, then rename it over `path`.
///
/// On any error the temporary file is removed (dropped) and `path` is left untouched.
pub(crate) fn write_atomically<F>(path: &Path, write: F) -> EngineResult<()>
where
    F: FnOnce(&mut File) -> EngineResult<()>,
{
    let mut tmp = temp_beside(path)?;
    write(tmp.as_file_mut())?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path).map_err(|e| EngineError::Io(e.error))?;
    Ok(())
}

/// An empty temporary file next to `path`, deleted on drop unless persisted.
///
/// Lets a caller write several outputs and only move them into place once all of them succeeded.
pub(crate) fn staged_path(path: &Path) -> EngineResult<TempPath> {
    Ok(temp_beside(path)?.into_temp_path())
}

fn temp_beside(path: &Path) -> EngineResult<NamedTempFile> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    Ok(tempfile::Builder::new()
        .prefix(".dpa-")
        .suffix(".tmp")
        .tempfile_in(dir)?)
}
