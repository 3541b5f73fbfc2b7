use std::io;
use std::path::Path;

use walkdir::WalkDir;

/// Recursively copies `src` onto `dst`, creating `dst` and any intermediate directories as
/// needed. Regular files are copied byte-for-byte; symlinks are recreated as symlinks
/// (never followed, so a symlink into unrelated data never gets pulled into the copy).
pub fn copy_dir_tree(src: &Path, dst: &Path) -> io::Result<()> {
  for entry in WalkDir::new(src).follow_links(false) {
    let entry = entry.map_err(io::Error::other)?;
    let rel = entry
      .path()
      .strip_prefix(src)
      .expect("walkdir yields paths under its root");
    let target = dst.join(rel);
    let file_type = entry.file_type();
    if file_type.is_dir() {
      std::fs::create_dir_all(&target)?;
    } else if file_type.is_symlink() {
      let link_target = std::fs::read_link(entry.path())?;
      if target.symlink_metadata().is_ok() {
        std::fs::remove_file(&target)?;
      }
      #[cfg(unix)]
      std::os::unix::fs::symlink(&link_target, &target)?;
    } else {
      if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
      }
      std::fs::copy(entry.path(), &target)?;
    }
  }
  Ok(())
}
