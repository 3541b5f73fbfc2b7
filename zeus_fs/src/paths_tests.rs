use super::paths::*;
use tempfile::tempdir;

#[test]
fn previous_dated_sibling_picks_nearest_earlier_date() {
  let root = tempdir().unwrap();
  for name in ["20260101", "20260115", "20260201"] {
    std::fs::create_dir(root.path().join(name)).unwrap();
  }
  let prev = previous_dated_sibling(&root.path().join("20260201")).unwrap();
  assert_eq!(prev.file_name().unwrap().to_str().unwrap(), "20260115");
}

#[test]
fn previous_dated_sibling_none_when_earliest() {
  let root = tempdir().unwrap();
  std::fs::create_dir(root.path().join("20260101")).unwrap();
  assert!(previous_dated_sibling(&root.path().join("20260101")).is_none());
}

#[test]
fn previous_dated_sibling_containing_skips_dirs_without_marker() {
  let root = tempdir().unwrap();
  for name in ["20260101", "20260110", "20260120"] {
    std::fs::create_dir(root.path().join(name)).unwrap();
  }
  std::fs::write(root.path().join("20260101").join("SUCCESS"), []).unwrap();
  let found =
    previous_dated_sibling_containing(&root.path().join("20260120"), "SUCCESS").unwrap();
  assert_eq!(found.file_name().unwrap().to_str().unwrap(), "20260101");
}

#[test]
fn replace_symlink_repoints_atomically() {
  let root = tempdir().unwrap();
  let target_a = root.path().join("a");
  let target_b = root.path().join("b");
  std::fs::create_dir(&target_a).unwrap();
  std::fs::create_dir(&target_b).unwrap();
  let link = root.path().join("current");

  replace_symlink(&link, &target_a).unwrap();
  assert_eq!(std::fs::read_link(&link).unwrap(), target_a);

  replace_symlink(&link, &target_b).unwrap();
  assert_eq!(std::fs::read_link(&link).unwrap(), target_b);
}
