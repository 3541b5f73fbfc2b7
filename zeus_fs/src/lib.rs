// Filesystem primitives shared by the rest of Zeus: path/sibling helpers, status-marker
// I/O, recursive directory copy, and a bounded process-parallel map. None of these know
// about tasks or priorities; they operate purely on paths.

mod copy;
#[cfg(test)]
mod copy_tests;
mod parallel;
mod paths;
#[cfg(test)]
mod paths_tests;
mod status;
#[cfg(test)]
mod status_tests;

pub use copy::copy_dir_tree;
pub use parallel::parallel_map;
pub use paths::{
  ensure_pipeline_link, pipeline_home_link, pipeline_tmp_root, previous_dated_sibling,
  previous_dated_sibling_containing, replace_symlink,
};
pub use status::{clear_status_markers, write_status_marker, STATUS_MARKERS};

use std::io;
use std::path::Path;

/// `std::fs::create_dir_all`, named to match the rest of this crate's vocabulary.
pub fn make_dirs(path: &Path) -> io::Result<()> {
  std::fs::create_dir_all(path)
}

/// Removes a directory tree, ignoring the error if it does not exist. Mirrors
/// `shutil.rmtree(path, ignore_errors=True)`.
pub fn remove_dir_all_lenient(path: &Path) {
  if let Err(e) = std::fs::remove_dir_all(path) {
    if e.kind() != io::ErrorKind::NotFound {
      log::warn!("failed to remove {}: {e}", path.display());
    }
  }
}
