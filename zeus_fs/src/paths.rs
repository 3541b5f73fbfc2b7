use std::io;
use std::path::{Path, PathBuf};

/// The tmp-side root that all pipelines share, mirroring the original's `/tmp/pipeline`.
pub fn pipeline_tmp_root() -> PathBuf {
  PathBuf::from("/tmp/pipeline")
}

/// A user-friendly `~/pipeline` symlink pointed at [`pipeline_tmp_root`], so a user can
/// `cd ~/pipeline` instead of remembering the tmp path. `None` if the home directory can't
/// be resolved.
pub fn pipeline_home_link() -> Option<PathBuf> {
  dirs_next::home_dir().map(|home| home.join("pipeline"))
}

/// Creates [`pipeline_tmp_root`] and, best-effort, the `~/pipeline` convenience symlink to
/// it if one doesn't already exist.
pub fn ensure_pipeline_link() -> io::Result<()> {
  let target = pipeline_tmp_root();
  std::fs::create_dir_all(&target)?;
  if let Some(link) = pipeline_home_link() {
    if !link.exists() {
      #[cfg(unix)]
      {
        if let Err(e) = std::os::unix::fs::symlink(&target, &link) {
          log::warn!("could not create {}: {e}", link.display());
        }
      }
    }
  }
  Ok(())
}

/// Returns the chronologically previous sibling of a dated directory (one whose name sorts
/// immediately before `dir`'s own name among its siblings), or `None` if there isn't one.
///
/// Dated directory names (`YYYYMMDD`) sort correctly as plain strings, so this is a string
/// comparison rather than a date parse.
pub fn previous_dated_sibling(dir: &Path) -> Option<PathBuf> {
  let parent = dir.parent()?;
  let name = dir.file_name()?.to_str()?;
  let mut candidates: Vec<String> = std::fs::read_dir(parent)
    .ok()?
    .filter_map(|entry| entry.ok())
    .filter(|entry| entry.path().is_dir())
    .filter_map(|entry| entry.file_name().into_string().ok())
    .filter(|sibling| sibling.as_str() < name)
    .collect();
  candidates.sort();
  candidates.pop().map(|sibling| parent.join(sibling))
}

/// Walks backwards through previous dated siblings of `dir` until one containing `file_name`
/// is found, or the chain runs out.
pub fn previous_dated_sibling_containing(dir: &Path, file_name: &str) -> Option<PathBuf> {
  let mut cursor = dir.to_path_buf();
  loop {
    let prev = previous_dated_sibling(&cursor)?;
    if prev.join(file_name).exists() {
      return Some(prev);
    }
    cursor = prev;
  }
}

/// Atomically repoints the symlink at `link_path` to `target`, never leaving a window where
/// `link_path` doesn't exist: a new symlink is created next to it under a temp name, then
/// renamed over it.
pub fn replace_symlink(link_path: &Path, target: &Path) -> io::Result<()> {
  let parent = link_path.parent().ok_or_else(|| {
    io::Error::new(
      io::ErrorKind::InvalidInput,
      format!("{} has no parent directory", link_path.display()),
    )
  })?;
  let tmp = tempfile::Builder::new()
    .prefix(".zeus-link-")
    .tempfile_in(parent)?;
  let tmp_path = tmp.path().to_path_buf();
  // `tempfile` reserves the name by creating a plain file; drop it so the name is free for
  // the symlink we actually want there.
  tmp.close()?;
  #[cfg(unix)]
  std::os::unix::fs::symlink(target, &tmp_path)?;
  std::fs::rename(&tmp_path, link_path)
}
