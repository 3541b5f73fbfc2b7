use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use zeus_config::PipelineConfig;
use zeus_discovery::{ExitClass, Task};

/// Tracks, per directory, the worst `ExitClass` seen across a run. Two views are kept
/// because they answer different questions: `by_task_dir` is keyed by the task's own parent
/// directory in the source tree (what `require_dir_success` consults), `by_out_dir` is keyed
/// by a produced dated output directory (what `StatusWriter` persists markers into).
#[derive(Debug, Default, Clone)]
pub struct DirectoryStatus {
  by_task_dir: BTreeMap<PathBuf, ExitClass>,
  by_out_dir: BTreeMap<PathBuf, ExitClass>,
}

fn worsen(map: &mut BTreeMap<PathBuf, ExitClass>, dir: PathBuf, class: ExitClass) {
  map
    .entry(dir)
    .and_modify(|worst| *worst = (*worst).max(class))
    .or_insert(class);
}

impl DirectoryStatus {
  /// Folds one task's result into both views.
  pub fn record(&mut self, task: &Task, config: &PipelineConfig, class: ExitClass) {
    if let Some(task_dir) = task.parent() {
      worsen(&mut self.by_task_dir, task_dir.to_path_buf(), class);
    }
    if let Some(rel_dir) = zeus_discovery::output_rel_dir(task, config) {
      for out_dir in config.subdirs_for_path(&rel_dir).into_values() {
        worsen(&mut self.by_out_dir, out_dir, class);
      }
    }
  }

  /// The worst class seen so far for `task`'s own source directory, `Success` if none.
  pub fn task_dir_status(&self, task: &Task) -> ExitClass {
    task
      .parent()
      .and_then(|dir| self.by_task_dir.get(dir))
      .copied()
      .unwrap_or(ExitClass::Success)
  }

  pub fn by_out_dir(&self) -> &BTreeMap<PathBuf, ExitClass> {
    &self.by_out_dir
  }
}

/// Writes one status marker per output directory touched by a run, from the worst exit
/// class recorded against it.
pub fn write_status_markers(status: &DirectoryStatus) -> io::Result<()> {
  for (dir, class) in status.by_out_dir() {
    zeus_fs::write_status_marker(dir, class.status_marker())?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;
  use zeus_config::GlobalArgs;

  fn config(root: PathBuf) -> PipelineConfig {
    let args = GlobalArgs {
      id: "zeus-exec-status-test".to_string(),
      root,
      publish_root: None,
      bin_root: None,
      utils_root: None,
      out_dirs: vec!["d".to_string()],
      date: "20260101".to_string(),
      nolog_output: false,
      log_to_tmp: false,
    };
    PipelineConfig::new(&args).unwrap()
  }

  #[test]
  fn worst_class_wins_per_out_dir() {
    let root = tempdir().unwrap();
    let config = config(root.path().to_path_buf());
    let a = config.base_dir().join("01_x").join("10_a.sh");
    let b = config.base_dir().join("01_x").join("10_b.sh");

    let mut status = DirectoryStatus::default();
    status.record(&a, &config, ExitClass::Success);
    status.record(&b, &config, ExitClass::Failure);

    let out_dirs: Vec<_> = status.by_out_dir().values().copied().collect();
    assert_eq!(out_dirs, vec![ExitClass::Failure]);

    zeus_fs::remove_dir_all_lenient(config.output_dir().unwrap());
  }

  #[test]
  fn task_dir_status_tracks_source_directory_not_output_directory() {
    let root = tempdir().unwrap();
    let config = config(root.path().to_path_buf());
    let a = config.base_dir().join("01_x").join("10_a.sh");
    let b = config.base_dir().join("01_x").join("10_b.sh");

    let mut status = DirectoryStatus::default();
    assert_eq!(status.task_dir_status(&b), ExitClass::Success);
    status.record(&a, &config, ExitClass::AbortFail);
    assert_eq!(status.task_dir_status(&b), ExitClass::AbortFail);

    zeus_fs::remove_dir_all_lenient(config.output_dir().unwrap());
  }

  #[test]
  fn write_status_markers_persists_one_file_per_out_dir() {
    let root = tempdir().unwrap();
    let config = config(root.path().to_path_buf());
    let task = config.base_dir().join("01_x").join("10_a.sh");

    let out_dir = config
      .subdirs()
      .get("PIPELINE_D_DIR")
      .unwrap()
      .join("x")
      .join("20260101");
    std::fs::create_dir_all(&out_dir).unwrap();

    let mut status = DirectoryStatus::default();
    status.record(&task, &config, ExitClass::AllowFail);
    write_status_markers(&status).unwrap();

    assert!(out_dir.join("SUCCESS").exists());

    zeus_fs::remove_dir_all_lenient(config.output_dir().unwrap());
  }
}
