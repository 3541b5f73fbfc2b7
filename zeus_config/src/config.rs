use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::args::GlobalArgs;

#[derive(Debug)]
pub enum ConfigError {
  MissingId,
  InvalidRoot(PathBuf),
  Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::MissingId => write!(f, "--id must not be empty"),
      ConfigError::InvalidRoot(path) => {
        write!(f, "invalid root directory: {}", path.display())
      }
      ConfigError::Io { path, source } => {
        write!(f, "{}: {source}", path.display())
      }
    }
  }
}

impl std::error::Error for ConfigError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ConfigError::Io { source, .. } => Some(source),
      _ => None,
    }
  }
}

fn io_err(path: &Path, source: io::Error) -> ConfigError {
  ConfigError::Io {
    path: path.to_path_buf(),
    source,
  }
}

/// Resolves a user-supplied path to an absolute one without requiring it to exist:
/// absolute paths pass through, relative ones are joined onto the current directory.
fn resolve_unchecked(path: &Path) -> io::Result<PathBuf> {
  if path.is_absolute() {
    Ok(path.to_path_buf())
  } else {
    Ok(std::env::current_dir()?.join(path))
  }
}

/// Process-wide configuration for a single pipeline invocation: the source root, the
/// optional bin/utils/publish roots, and the computed output/log layout. Constructed once
/// at CLI dispatch and immutable thereafter.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
  id: String,
  date: String,
  base_dir: PathBuf,
  bin_dir: Option<PathBuf>,
  utils_dir: PathBuf,
  publish_dir: Option<PathBuf>,
  output_dir: Option<PathBuf>,
  log_dir: Option<PathBuf>,
  subdirs: BTreeMap<String, PathBuf>,
  out_dir_names: Vec<String>,
}

impl PipelineConfig {
  pub fn new(args: &GlobalArgs) -> Result<Self, ConfigError> {
    if args.id.trim().is_empty() {
      return Err(ConfigError::MissingId);
    }

    let base_dir = args
      .root
      .canonicalize()
      .map_err(|e| io_err(&args.root, e))?;
    if !base_dir.is_dir() {
      return Err(ConfigError::InvalidRoot(base_dir));
    }

    let bin_dir = args
      .bin_root
      .as_deref()
      .map(resolve_unchecked)
      .transpose()
      .map_err(|e| io_err(args.bin_root.as_deref().unwrap(), e))?;

    let utils_dir = match &args.utils_root {
      Some(utils_root) => resolve_unchecked(utils_root).map_err(|e| io_err(utils_root, e))?,
      None => base_dir.join("utils"),
    };

    let publish_dir = args
      .publish_root
      .as_deref()
      .map(resolve_unchecked)
      .transpose()
      .map_err(|e| io_err(args.publish_root.as_deref().unwrap(), e))?;

    let mut output_dir = None;
    let mut log_dir = None;
    let mut subdirs = BTreeMap::new();

    if !(args.out_dirs.is_empty() && args.nolog_output) {
      zeus_fs::ensure_pipeline_link().map_err(|e| io_err(&zeus_fs::pipeline_tmp_root(), e))?;

      if !args.out_dirs.is_empty() || !args.log_to_tmp {
        let dir = zeus_fs::pipeline_tmp_root().join(&args.id);
        zeus_fs::make_dirs(&dir).map_err(|e| io_err(&dir, e))?;
        output_dir = Some(dir);
      }

      if !args.nolog_output {
        let log_root = if args.log_to_tmp {
          zeus_fs::pipeline_tmp_root().join(&args.id)
        } else {
          output_dir
            .clone()
            .expect("output_dir is set whenever logging is not tmp-only")
        };
        let dir = log_root.join("log").join(&args.date);
        zeus_fs::make_dirs(&dir).map_err(|e| io_err(&dir, e))?;
        log_dir = Some(dir);
      }

      if let Some(output_dir) = &output_dir {
        for name in &args.out_dirs {
          let subdir = output_dir.join(name);
          zeus_fs::make_dirs(&subdir).map_err(|e| io_err(&subdir, e))?;
          subdirs.insert(format!("PIPELINE_{}_DIR", name.to_uppercase()), subdir);
        }
      }
    }

    Ok(Self {
      id: args.id.clone(),
      date: args.date.clone(),
      base_dir,
      bin_dir,
      utils_dir,
      publish_dir,
      output_dir,
      log_dir,
      subdirs,
      out_dir_names: args.out_dirs.clone(),
    })
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn date(&self) -> &str {
    &self.date
  }

  pub fn base_dir(&self) -> &Path {
    &self.base_dir
  }

  pub fn bin_dir(&self) -> Option<&Path> {
    self.bin_dir.as_deref()
  }

  pub fn utils_dir(&self) -> &Path {
    &self.utils_dir
  }

  pub fn publish_dir(&self) -> Option<&Path> {
    self.publish_dir.as_deref()
  }

  pub fn output_dir(&self) -> Option<&Path> {
    self.output_dir.as_deref()
  }

  pub fn log_dir(&self) -> Option<&Path> {
    self.log_dir.as_deref()
  }

  pub fn subdirs(&self) -> &BTreeMap<String, PathBuf> {
    &self.subdirs
  }

  /// The raw `--out_dirs` names, as declared on the CLI (unlike [`Self::subdirs`], which is
  /// keyed by the derived `PIPELINE_<NAME>_DIR` environment variable name). Used by verbs
  /// that walk the publish tree, which mirrors `output_dir`'s layout by name rather than by
  /// env-var key.
  pub fn out_dir_names(&self) -> &[String] {
    &self.out_dir_names
  }

  /// `<output_dir>/<name>`, or `None` if no output directory is configured for this run.
  pub fn output_dir_named(&self, name: &str) -> Option<PathBuf> {
    self.output_dir.as_deref().map(|dir| dir.join(name))
  }

  /// `<publish_dir>/<name>`, or `None` if `--publish_root` was not given.
  pub fn publish_dir_named(&self, name: &str) -> Option<PathBuf> {
    self.publish_dir.as_deref().map(|dir| dir.join(name))
  }

  /// Every configured output subdir rebased under `output_rel_dir`, with the pipeline
  /// date appended. `PIPELINE_OUT_DIR` for a task with `output_rel_dir = "a/b"` becomes
  /// `<output_dir>/out/a/b/<date>`.
  pub fn subdirs_for_path(&self, output_rel_dir: &Path) -> BTreeMap<String, PathBuf> {
    self
      .subdirs
      .iter()
      .map(|(key, base)| (key.clone(), base.join(output_rel_dir).join(&self.date)))
      .collect()
  }

  /// The environment variables every task (and the parent process, for display) sees
  /// regardless of its own output subdirs: pipeline identity and the configured roots.
  pub fn base_env_vars(&self) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    vars.insert("PIPELINE_ID".to_string(), self.id.clone());
    vars.insert("PIPELINE_DATE".to_string(), self.date.clone());
    vars.insert(
      "PIPELINE_SRC_ROOT".to_string(),
      self.base_dir.display().to_string(),
    );
    vars.insert(
      "PIPELINE_BASE_DIR".to_string(),
      self.base_dir.display().to_string(),
    );
    vars.insert(
      "PIPELINE_UTILS_DIR".to_string(),
      self.utils_dir.display().to_string(),
    );
    if let Some(bin_dir) = &self.bin_dir {
      vars.insert("PIPELINE_BIN_DIR".to_string(), bin_dir.display().to_string());
    }
    if let Some(output_dir) = &self.output_dir {
      vars.insert(
        "PIPELINE_OUT_ROOT".to_string(),
        output_dir.display().to_string(),
      );
    }
    if let Some(log_dir) = &self.log_dir {
      vars.insert(
        "PIPELINE_LOG_DIR".to_string(),
        log_dir.display().to_string(),
      );
    }
    if let Some(publish_dir) = &self.publish_dir {
      vars.insert(
        "PIPELINE_PUBLISH_DIR".to_string(),
        publish_dir.display().to_string(),
      );
    }
    vars
  }

  /// A human-readable dump of the effective config, used by `PrintConfig`/the final
  /// notification summary.
  pub fn config_string(&self) -> String {
    format!(
      "CONFIG:\nEnvVars:\n{:#?}\nSubdirs:\n{:#?}\n",
      self.base_env_vars(),
      self.subdirs
    )
  }
}
