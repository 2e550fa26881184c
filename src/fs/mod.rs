/// File helpers shared by the configuration registry and the property store
///
/// Profile files and the active-configuration pointer are rewritten whole on
/// every change. Writes land in a temporary file next to the target and are
/// renamed over it, so a reader never observes a half-written profile.
///
/// # Examples
///
/// ```rust,no_run
/// use cloudsdk_init::fs::{read_optional, write_atomic};
///
/// fn main() -> std::io::Result<()> {
///     write_atomic("/tmp/sdk/active_config".as_ref(), b"default")?;
///     assert_eq!(read_optional("/tmp/sdk/active_config".as_ref())?.as_deref(), Some("default"));
///     Ok(())
/// }
/// ```
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Replace the contents of `path` by writing a sibling temp file and renaming it
/// into place. Parent directories are created on demand.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(contents)?;
    staged.flush()?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Read a file as UTF-8, mapping a missing file to `None`.
pub fn read_optional(path: &Path) -> io::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
