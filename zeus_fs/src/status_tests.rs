use super::status::*;
use tempfile::tempdir;

#[test]
fn write_status_marker_replaces_prior_marker() {
  let dir = tempdir().unwrap();
  write_status_marker(dir.path(), "FAILURE").unwrap();
  assert!(dir.path().join("FAILURE").exists());

  write_status_marker(dir.path(), "SUCCESS").unwrap();
  assert!(dir.path().join("SUCCESS").exists());
  assert!(!dir.path().join("FAILURE").exists());
}

#[test]
fn clear_status_markers_is_a_noop_on_empty_dir() {
  let dir = tempdir().unwrap();
  clear_status_markers(dir.path()).unwrap();
}
