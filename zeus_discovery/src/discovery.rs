use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zeus_config::PipelineConfig;

use crate::task::priority;
use crate::Task;

/// Tasks grouped by priority string, in ascending priority order, with groups that
/// differ only by a trailing run of zeros folded together. This is the schedule order:
/// the scheduler runs one group fully (with bounded internal concurrency) before moving
/// on to the next.
pub type PriorityMap = Vec<(String, BTreeSet<Task>)>;

/// If `ignore` contains a substring of `candidate`, returns that substring so the caller
/// can log which rule fired.
fn ignore_match<'a>(candidate: &str, ignore: &'a [String]) -> Option<&'a str> {
  ignore
    .iter()
    .find(|needle| !needle.is_empty() && candidate.contains(needle.as_str()))
    .map(String::as_str)
}

fn add_file(tasks: &mut BTreeMap<String, BTreeSet<Task>>, path: &Path, config: &PipelineConfig) {
  match priority(&path.to_path_buf(), config) {
    Some(key) => {
      tasks.entry(key).or_default().insert(path.to_path_buf());
    }
    None => log::warn!(
      "Ignored target {} as it has no priority info.",
      path.display()
    ),
  }
}

/// Visits a resolved target: a file is added directly, a directory is listed (depth 1 if
/// `recurse` is false, unbounded if true) and every entry is ignore-checked and re-fed
/// through this same procedure. A non-recursive directory listing that turns up a
/// subdirectory re-enters non-recursively for that subdirectory, so the net effect of
/// `recurse = false` is the same full walk as `recurse = true`, just one depth-1 listing
/// at a time instead of a single unbounded one.
fn visit(
  target: &Path,
  recurse: bool,
  ignore: &[String],
  config: &PipelineConfig,
  tasks: &mut BTreeMap<String, BTreeSet<Task>>,
) {
  if target.is_file() {
    add_file(tasks, target, config);
    return;
  }
  if !target.is_dir() {
    log::warn!("[{}] is not supported", target.display());
    return;
  }

  let walker = if recurse {
    WalkDir::new(target).min_depth(1)
  } else {
    WalkDir::new(target).min_depth(1).max_depth(1)
  };

  for entry in walker {
    let entry = match entry {
      Ok(entry) => entry,
      Err(e) => {
        log::warn!("failed to read {}: {e}", target.display());
        continue;
      }
    };
    let path = entry.path();
    if let Some(matched) = ignore_match(&path.to_string_lossy(), ignore) {
      log::warn!(
        "Ignored target {} as anything with [{matched}] is ignored.",
        path.display()
      );
      continue;
    }
    if entry.file_type().is_dir() {
      if !recurse {
        visit(path, false, ignore, config, tasks);
      }
      // When recurse is true, WalkDir has already descended into this directory itself.
    } else if entry.file_type().is_file() {
      add_file(tasks, path, config);
    }
  }
}

/// Resolves a single target string into `(search root, recurse)`. A target whose final
/// path component is exactly `"..."` means "everything under the parent, recursively";
/// the parent defaults to the current directory if it is under `base_dir`, or to
/// `base_dir` itself otherwise. Anything else names a single file or directory,
/// non-recursively.
fn resolve_target(target: &str, config: &PipelineConfig) -> (PathBuf, bool) {
  let path = Path::new(target);
  if path.file_name().map(|n| n == "...").unwrap_or(false) {
    let parent = path
      .parent()
      .filter(|p| !p.as_os_str().is_empty())
      .map(Path::to_path_buf);
    let root = parent.unwrap_or_else(|| {
      std::env::current_dir()
        .ok()
        .filter(|cwd| cwd.starts_with(config.base_dir()))
        .unwrap_or_else(|| config.base_dir().to_path_buf())
    });
    (to_absolute(&root, config), true)
  } else {
    (to_absolute(path, config), false)
  }
}

fn to_absolute(path: &Path, config: &PipelineConfig) -> PathBuf {
  if path.is_absolute() {
    path.to_path_buf()
  } else {
    config.base_dir().join(path)
  }
}

/// Later keys fold into the current primary key when they are a strict extension of it
/// whose suffix is all zeros: `"010"` is equivalent to `"01"`, since the extra digit just
/// names a deeper level that was never subdivided. `BTreeMap` iteration visits keys in
/// ascending lexicographic order, which is exactly the order the original processes them
/// in, so no explicit sort is needed here.
fn fold_priorities(tasks: BTreeMap<String, BTreeSet<Task>>) -> PriorityMap {
  let mut result: PriorityMap = Vec::new();
  for (key, set) in tasks {
    let folds_into_current = result.last().is_some_and(|(primary, _): &(String, _)| {
      key.len() > primary.len()
        && key.starts_with(primary.as_str())
        && key[primary.len()..].chars().all(|c| c == '0')
    });
    if folds_into_current {
      result.last_mut().unwrap().1.extend(set);
    } else {
      result.push((key, set));
    }
  }
  result
}

/// Resolves `targets` into a priority-ordered, priority-folded set of tasks. Targets are
/// processed breadth-first: resolving a directory can enqueue more targets (its entries),
/// which are resolved in turn before discovery completes.
pub fn discover(targets: &[String], ignore: &[String], config: &PipelineConfig) -> PriorityMap {
  let mut tasks: BTreeMap<String, BTreeSet<Task>> = BTreeMap::new();
  let mut queue: VecDeque<String> = targets.iter().cloned().collect();

  while let Some(target) = queue.pop_front() {
    if let Some(matched) = ignore_match(&target, ignore) {
      log::warn!("Ignored target {target} as anything with [{matched}] is ignored.");
      continue;
    }
    let (root, recurse) = resolve_target(&target, config);
    visit(&root, recurse, ignore, config, &mut tasks);
  }

  fold_priorities(tasks)
}
