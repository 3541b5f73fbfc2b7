use std::io;
use std::path::Path;

/// The full set of status marker file names that may live at the root of an output
/// directory; a directory carries at most one at a time.
pub const STATUS_MARKERS: [&str; 3] = ["SUCCESS", "FAILURE", "ABORT"];

/// Deletes any pre-existing status marker in `dir`, then writes an empty `marker` file.
/// `marker` should be one of [`STATUS_MARKERS`].
pub fn write_status_marker(dir: &Path, marker: &str) -> io::Result<()> {
  clear_status_markers(dir)?;
  std::fs::write(dir.join(marker), [])
}

/// Removes every status marker file from `dir`, if present.
pub fn clear_status_markers(dir: &Path) -> io::Result<()> {
  for marker in STATUS_MARKERS {
    let path = dir.join(marker);
    match std::fs::remove_file(&path) {
      Ok(()) => {}
      Err(e) if e.kind() == io::ErrorKind::NotFound => {}
      Err(e) => return Err(e),
    }
  }
  Ok(())
}
