use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use gridtrace_smt::encoder::TraceQuery;

use super::CheckError;
use crate::result::TraceProperty;

/// Write `query` as `<dir>/<property>.smt2`, creating `dir` if needed.
pub fn dump_query(
    dir: &Path,
    property: TraceProperty,
    query: &TraceQuery,
) -> Result<PathBuf, CheckError> {
    fs::create_dir_all(dir).map_err(io_error(dir))?;
    let path = dir.join(format!("{}.smt2", property.name()));
    fs::write(&path, query.to_smtlib_script()).map_err(io_error(&path))?;
    info!(path = %path.display(), "SMT dump written");
    Ok(path)
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> CheckError {
    let path = path.to_path_buf();
    move |source| CheckError::Io { path, source }
}
