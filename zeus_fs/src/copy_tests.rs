use super::copy::copy_dir_tree;
use tempfile::tempdir;

#[test]
fn copy_dir_tree_preserves_bytes_and_structure() {
  let src = tempdir().unwrap();
  std::fs::create_dir(src.path().join("a")).unwrap();
  std::fs::write(src.path().join("a").join("f.txt"), b"hello").unwrap();
  std::fs::write(src.path().join("top.txt"), b"world").unwrap();

  let dst = tempdir().unwrap();
  let target = dst.path().join("out");
  copy_dir_tree(src.path(), &target).unwrap();

  assert_eq!(
    std::fs::read(target.join("a").join("f.txt")).unwrap(),
    b"hello"
  );
  assert_eq!(std::fs::read(target.join("top.txt")).unwrap(), b"world");
}

#[cfg(unix)]
#[test]
fn copy_dir_tree_recreates_symlinks_without_following() {
  let src = tempdir().unwrap();
  std::fs::write(src.path().join("real.txt"), b"data").unwrap();
  std::os::unix::fs::symlink("real.txt", src.path().join("link.txt")).unwrap();

  let dst = tempdir().unwrap();
  let target = dst.path().join("out");
  copy_dir_tree(src.path(), &target).unwrap();

  let link_meta = std::fs::symlink_metadata(target.join("link.txt")).unwrap();
  assert!(link_meta.file_type().is_symlink());
  assert_eq!(
    std::fs::read_link(target.join("link.txt")).unwrap(),
    std::path::PathBuf::from("real.txt")
  );
}
