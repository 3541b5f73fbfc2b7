use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use zeus_config::{GlobalArgs, PipelineConfig, RunArgs, TaskSelectArgs};
use zeus_discovery::PriorityMap;

use crate::exit::{EXIT_CONFIG_ERROR, EXIT_INTERRUPTED, EXIT_NO_TASKS, EXIT_SUCCESS, EXIT_TASKS_FAILED};

fn load_config(global: &GlobalArgs) -> Result<PipelineConfig, i32> {
  PipelineConfig::new(global).map_err(|e| {
    log::error!("{e}");
    EXIT_CONFIG_ERROR
  })
}

fn discover(select: &TaskSelectArgs, config: &PipelineConfig) -> PriorityMap {
  zeus_discovery::discover(&select.targets(), &select.ignore_tasks, config)
}

/// The distinct output-relative directories touched by a discovered task set, in no
/// particular order — the unit every walk-only verb (`clean`/`publish`/`export`/`import`)
/// operates on, since several tasks commonly share one output directory.
fn distinct_rel_dirs(priority_map: &PriorityMap, config: &PipelineConfig) -> Vec<PathBuf> {
  let mut rel_dirs = BTreeSet::new();
  for (_, group) in priority_map {
    for task in group {
      if let Some(rel_dir) = zeus_discovery::output_rel_dir(task, config) {
        rel_dirs.insert(rel_dir);
      }
    }
  }
  rel_dirs.into_iter().collect()
}

pub async fn run_or_continue(global: GlobalArgs, select: TaskSelectArgs, run: RunArgs, is_continue: bool) -> i32 {
  let config = match load_config(&global) {
    Ok(config) => config,
    Err(code) => return code,
  };

  let priority_map = discover(&select, &config);
  if priority_map.is_empty() {
    log::warn!("no tasks discovered");
    return EXIT_NO_TASKS;
  }

  let priority_map = if is_continue {
    let (filtered, skipped) = zeus_exec::filter_already_successful(&priority_map, &config);
    for task in &skipped {
      log::info!("{} already succeeded, skipping", zeus_discovery::display_name(task, &config));
    }
    filtered
  } else {
    priority_map
  };

  let executor = zeus_task_executor::Executor::new();
  let cancel = zeus_exec::CancelToken::new();
  let cancel_for_signal = cancel.clone();
  let signal_task = tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      log::warn!("interrupted, cancelling running tasks");
      cancel_for_signal.cancel();
    }
  });

  let mailer: Box<dyn zeus_notify::Mailer> = Box::new(zeus_notify::SendmailMailer);
  let notifier = zeus_notify::Notifier::new(
    mailer,
    run.success_mail.clone(),
    run.failure_mail.clone(),
    run.mail_domain.clone(),
    run.detailed_success_mail,
  );

  let options = zeus_exec::SchedulerOptions {
    pool_size: run.pool_size(),
    default_timeout: run.timeout(),
  };

  let started = std::time::Instant::now();
  let outcome = zeus_exec::run_schedule(&executor, &config, &priority_map, &options, Some(&notifier), &cancel).await;
  signal_task.abort();

  if let Err(e) = zeus_exec::write_status_markers(&outcome.directory_status) {
    log::warn!("failed to write status markers: {e}");
  }

  let successful: Vec<String> = outcome
    .succeeded
    .iter()
    .map(|t| zeus_discovery::display_name(t, &config))
    .collect();
  let failed: Vec<String> = outcome
    .failed
    .iter()
    .map(|t| zeus_discovery::display_name(t, &config))
    .collect();
  let aborted_by = outcome.aborted_by.as_ref().map(|t| zeus_discovery::display_name(t, &config));
  notifier.notify_final(
    &config,
    &successful,
    &failed,
    aborted_by.as_deref(),
    started.elapsed(),
    &config.config_string(),
  );

  if outcome.cancelled {
    EXIT_INTERRUPTED
  } else if !outcome.failed.is_empty() {
    EXIT_TASKS_FAILED
  } else {
    EXIT_SUCCESS
  }
}

pub fn clean(global: GlobalArgs, select: TaskSelectArgs, all: bool) -> i32 {
  let config = match load_config(&global) {
    Ok(config) => config,
    Err(code) => return code,
  };

  if all {
    if let Some(output_dir) = config.output_dir() {
      zeus_fs::remove_dir_all_lenient(output_dir);
    }
    return EXIT_SUCCESS;
  }

  let priority_map = discover(&select, &config);
  if priority_map.is_empty() {
    log::warn!("no tasks discovered");
    return EXIT_NO_TASKS;
  }

  for rel_dir in distinct_rel_dirs(&priority_map, &config) {
    for name in config.out_dir_names() {
      if let Some(base) = config.output_dir_named(name) {
        zeus_fs::remove_dir_all_lenient(&base.join(&rel_dir).join(config.date()));
      }
    }
  }
  EXIT_SUCCESS
}

/// The directory holding a dated-sibling chain under `publishDir`: `<publish>/<name>/<rel>`.
/// `current` lives directly inside it, alongside the dated directories it points between.
fn publish_family_dir(config: &PipelineConfig, name: &str, rel_dir: &Path) -> Option<PathBuf> {
  Some(config.publish_dir_named(name)?.join(rel_dir))
}

fn repoint_current(config: &PipelineConfig, rel_dir: &Path) {
  for name in config.out_dir_names() {
    let Some(family) = publish_family_dir(config, name, rel_dir) else {
      continue;
    };
    let today = family.join(config.date());
    let publishable = if today.join("SUCCESS").is_file() {
      Some(today.clone())
    } else {
      zeus_fs::previous_dated_sibling_containing(&today, "SUCCESS")
    };
    match publishable {
      Some(dir) => {
        if let Err(e) = zeus_fs::replace_symlink(&family.join("current"), &dir) {
          log::error!("failed to repoint {}: {e}", family.join("current").display());
        }
      }
      None => log::warn!("no publishable directory found under {}", family.display()),
    }
  }
}

pub async fn publish(global: GlobalArgs, select: TaskSelectArgs, pool_size: Option<usize>) -> i32 {
  let config = match load_config(&global) {
    Ok(config) => config,
    Err(code) => return code,
  };
  if config.publish_dir().is_none() {
    log::error!("--publish_root is required for publish");
    return EXIT_CONFIG_ERROR;
  }

  let priority_map = discover(&select, &config);
  if priority_map.is_empty() {
    log::warn!("no tasks discovered");
    return EXIT_NO_TASKS;
  }

  let rel_dirs = distinct_rel_dirs(&priority_map, &config);
  let executor = zeus_task_executor::Executor::new();
  let pool_size = pool_size.unwrap_or_else(num_cpus::get);
  let config_for_closure = config.clone();
  zeus_fs::parallel_map(&executor, rel_dirs, pool_size, move |rel_dir| {
    let config = config_for_closure.clone();
    async move { repoint_current(&config, &rel_dir) }
  })
  .await;
  EXIT_SUCCESS
}

/// Whether any produced output directory across the whole run is marked `ABORT`. Checked
/// as a pre-pass over every `rel_dir` before any copying starts, since one aborted
/// directory blocks export of the entire run, not just that directory.
fn any_dated_dir_aborted(config: &PipelineConfig, rel_dirs: &[PathBuf]) -> bool {
  rel_dirs.iter().any(|rel_dir| {
    config.out_dir_names().iter().any(|name| {
      config
        .output_dir_named(name)
        .map(|base| base.join(rel_dir).join(config.date()).join("ABORT").is_file())
        .unwrap_or(false)
    })
  })
}

fn export_one(config: &PipelineConfig, rel_dir: &Path) {
  for name in config.out_dir_names() {
    let (Some(src_base), Some(dst_base)) = (config.output_dir_named(name), config.publish_dir_named(name)) else {
      continue;
    };
    let src = src_base.join(rel_dir).join(config.date());
    if !src.is_dir() {
      continue;
    }
    let dst = dst_base.join(rel_dir).join(config.date());
    if let Err(e) = zeus_fs::copy_dir_tree(&src, &dst) {
      log::error!("failed to export {} to {}: {e}", src.display(), dst.display());
    }
  }
}

pub async fn export(global: GlobalArgs, select: TaskSelectArgs, pool_size: Option<usize>) -> i32 {
  let config = match load_config(&global) {
    Ok(config) => config,
    Err(code) => return code,
  };
  if config.publish_dir().is_none() {
    log::error!("--publish_root is required for export");
    return EXIT_CONFIG_ERROR;
  }

  let priority_map = discover(&select, &config);
  if priority_map.is_empty() {
    log::warn!("no tasks discovered");
    return EXIT_NO_TASKS;
  }

  let rel_dirs = distinct_rel_dirs(&priority_map, &config);
  if any_dated_dir_aborted(&config, &rel_dirs) {
    log::error!("refusing to export: run for {} is marked ABORT", config.date());
    return EXIT_TASKS_FAILED;
  }

  let executor = zeus_task_executor::Executor::new();
  let pool_size = pool_size.unwrap_or_else(num_cpus::get);
  let config_for_closure = config.clone();
  zeus_fs::parallel_map(&executor, rel_dirs, pool_size, move |rel_dir| {
    let config = config_for_closure.clone();
    async move { export_one(&config, &rel_dir) }
  })
  .await;
  EXIT_SUCCESS
}

fn import_one(config: &PipelineConfig, rel_dir: &Path) {
  for name in config.out_dir_names() {
    let (Some(pub_base), Some(out_base)) = (config.publish_dir_named(name), config.output_dir_named(name)) else {
      continue;
    };
    let current = pub_base.join(rel_dir).join("current");
    let resolved = match current.canonicalize() {
      Ok(resolved) => resolved,
      Err(_) => {
        log::warn!("no current publish directory at {}", current.display());
        continue;
      }
    };
    let dst = out_base.join(rel_dir).join(config.date());
    if let Err(e) = zeus_fs::copy_dir_tree(&resolved, &dst) {
      log::error!("failed to import {} to {}: {e}", resolved.display(), dst.display());
    }
  }
}

pub async fn import(global: GlobalArgs, select: TaskSelectArgs, pool_size: Option<usize>) -> i32 {
  let config = match load_config(&global) {
    Ok(config) => config,
    Err(code) => return code,
  };
  if config.publish_dir().is_none() {
    log::error!("--publish_root is required for import");
    return EXIT_CONFIG_ERROR;
  }

  let priority_map = discover(&select, &config);
  if priority_map.is_empty() {
    log::warn!("no tasks discovered");
    return EXIT_NO_TASKS;
  }

  let rel_dirs = distinct_rel_dirs(&priority_map, &config);
  let executor = zeus_task_executor::Executor::new();
  let pool_size = pool_size.unwrap_or_else(num_cpus::get);
  let config_for_closure = config.clone();
  zeus_fs::parallel_map(&executor, rel_dirs, pool_size, move |rel_dir| {
    let config = config_for_closure.clone();
    async move { import_one(&config, &rel_dir) }
  })
  .await;
  EXIT_SUCCESS
}
