use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use zeus_config::PipelineConfig;
use zeus_discovery::{Task, TaskOptions};

/// Creates every dated output subdirectory this task will write to, and returns the
/// environment it should see: the parent process's environment, `config`'s base variables,
/// one `PIPELINE_<S>_DIR` / `PIPELINE_<S>_DIR_PREV` pair per configured output subdir, and
/// the task-option markers.
pub fn build_env(task: &Task, config: &PipelineConfig, options: TaskOptions) -> io::Result<BTreeMap<String, String>> {
  let mut env: BTreeMap<String, String> = std::env::vars().collect();
  env.extend(config.base_env_vars());

  let rel_dir = zeus_discovery::output_rel_dir(task, config).unwrap_or_default();
  for (key, dated_dir) in config.subdirs_for_path(&rel_dir) {
    zeus_fs::make_dirs(&dated_dir)?;
    let prev = dated_dir
      .parent()
      .and_then(zeus_fs::previous_dated_sibling)
      .unwrap_or_else(|| dated_dir.clone());
    env.insert(format!("{key}_PREV"), display(&prev));
    env.insert(key, display(&dated_dir));
  }

  if options.abort_fail {
    env.insert("PIPELINE_TASK_ABORT_FAIL".to_string(), "1".to_string());
  }
  if options.allow_fail {
    env.insert("PIPELINE_TASK_ALLOW_FAIL".to_string(), "1".to_string());
  }

  Ok(env)
}

fn display(path: &PathBuf) -> String {
  path.display().to_string()
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;
  use zeus_config::GlobalArgs;

  fn config(root: PathBuf, out_dirs: Vec<String>) -> PipelineConfig {
    let args = GlobalArgs {
      id: "zeus-exec-env-test".to_string(),
      root,
      publish_root: None,
      bin_root: None,
      utils_root: None,
      out_dirs,
      date: "20260101".to_string(),
      nolog_output: false,
      log_to_tmp: false,
    };
    PipelineConfig::new(&args).unwrap()
  }

  #[test]
  fn creates_dated_output_dirs_and_sets_env() {
    let root = tempdir().unwrap();
    let config = config(root.path().to_path_buf(), vec!["d".to_string()]);
    let task = config.base_dir().join("01_a").join("02_run.sh");
    std::fs::create_dir_all(task.parent().unwrap()).unwrap();

    let env = build_env(&task, &config, TaskOptions::default()).unwrap();
    let dir = env.get("PIPELINE_D_DIR").unwrap();
    assert!(PathBuf::from(dir).is_dir());
    assert!(dir.ends_with("a/20260101"));
    // No previous sibling yet, so _PREV falls back to the same directory.
    assert_eq!(env.get("PIPELINE_D_DIR_PREV").unwrap(), dir);

    zeus_fs::remove_dir_all_lenient(config.output_dir().unwrap());
  }

  #[test]
  fn abort_fail_option_sets_marker_var() {
    let root = tempdir().unwrap();
    let config = config(root.path().to_path_buf(), vec![]);
    let task = config.base_dir().join("01_a").join("02_run.sh");
    std::fs::create_dir_all(task.parent().unwrap()).unwrap();

    let opts = TaskOptions {
      abort_fail: true,
      ..Default::default()
    };
    let env = build_env(&task, &config, opts).unwrap();
    assert_eq!(env.get("PIPELINE_TASK_ABORT_FAIL").map(String::as_str), Some("1"));
    assert!(!env.contains_key("PIPELINE_TASK_ALLOW_FAIL"));

    zeus_fs::remove_dir_all_lenient(config.output_dir().unwrap());
  }

  #[test]
  fn prev_points_at_earlier_dated_sibling_when_one_exists() {
    let root = tempdir().unwrap();
    let config = config(root.path().to_path_buf(), vec!["d".to_string()]);
    let task = config.base_dir().join("01_a").join("02_run.sh");
    std::fs::create_dir_all(task.parent().unwrap()).unwrap();

    let rel_dir = zeus_discovery::output_rel_dir(&task, &config).unwrap();
    let base = config.subdirs().get("PIPELINE_D_DIR").unwrap().join(&rel_dir);
    std::fs::create_dir_all(base.join("20251231")).unwrap();

    let env = build_env(&task, &config, TaskOptions::default()).unwrap();
    assert!(env.get("PIPELINE_D_DIR_PREV").unwrap().ends_with("20251231"));

    zeus_fs::remove_dir_all_lenient(config.output_dir().unwrap());
  }
}
